use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

/// Failures inside the UI. Converted to `JsValue` only at the wasm boundary.
#[derive(Debug, Error)]
pub enum UiError {
    #[error("no global window")]
    NoWindow,
    #[error("element #{0} not found")]
    MissingElement(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("microphone unavailable: {0}")]
    Media(String),
    #[error("{0}")]
    Js(String),
}

impl UiError {
    pub fn network(value: &JsValue) -> Self {
        Self::Network(describe_js(value))
    }

    pub fn media(value: &JsValue) -> Self {
        Self::Media(describe_js(value))
    }
}

impl From<JsValue> for UiError {
    fn from(value: JsValue) -> Self {
        Self::Js(describe_js(&value))
    }
}

impl From<UiError> for JsValue {
    fn from(err: UiError) -> Self {
        Self::from_str(&err.to_string())
    }
}

/// Human-readable text for a thrown JS value
pub fn describe_js(value: &JsValue) -> String {
    if let Some(err) = value.dyn_ref::<js_sys::Error>() {
        return String::from(err.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}
