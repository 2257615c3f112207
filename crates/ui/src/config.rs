//! Runtime configuration
//!
//! The host injects `window.LIGHTDECK_CONFIG` through `/config.js`; every
//! field is optional.

use serde::Deserialize;
use wasm_bindgen::JsValue;

use crate::audio::spectrum::DEFAULT_FFT_SIZE;
use crate::error::UiError;

pub const CONFIG_GLOBAL: &str = "LIGHTDECK_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct UiConfig {
    /// Prefix for REST calls, empty for same origin
    pub api_base: String,
    /// Event-channel port, defaults to the page's port
    pub ws_port: Option<u16>,
    pub ws_path: String,
    pub fft_size: u32,
    pub reconnect_max_attempts: u32,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            api_base: String::new(),
            ws_port: None,
            ws_path: "/".to_string(),
            fft_size: DEFAULT_FFT_SIZE,
            reconnect_max_attempts: 10,
        }
    }
}

impl UiConfig {
    /// Read `window.LIGHTDECK_CONFIG`, falling back to defaults
    pub fn from_window() -> Self {
        let Some(win) = web_sys::window() else {
            return Self::default();
        };
        let raw = js_sys::Reflect::get(&win, &CONFIG_GLOBAL.into()).unwrap_or(JsValue::UNDEFINED);
        if raw.is_undefined() || raw.is_null() {
            tracing::warn!("{CONFIG_GLOBAL} not found, using defaults");
            return Self::default();
        }
        match serde_wasm_bindgen::from_value(raw) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid {CONFIG_GLOBAL}, using defaults");
                Self::default()
            }
        }
    }

    /// FFT window for the analyser; invalid sizes fall back to the default.
    ///
    /// `AnalyserNode` accepts powers of two from 32 to 32768.
    pub const fn effective_fft_size(&self) -> u32 {
        if self.fft_size.is_power_of_two() && self.fft_size >= 32 && self.fft_size <= 32768 {
            self.fft_size
        } else {
            DEFAULT_FFT_SIZE
        }
    }

    /// Event-channel URL for a page served from `protocol//hostname:port`
    pub fn channel_url(&self, protocol: &str, hostname: &str, page_port: &str) -> String {
        let scheme = if protocol == "https:" { "wss:" } else { "ws:" };
        let path = if self.ws_path.starts_with('/') {
            self.ws_path.clone()
        } else {
            format!("/{}", self.ws_path)
        };
        let port = self
            .ws_port
            .map_or_else(|| page_port.to_string(), |p| p.to_string());

        if port.is_empty() {
            format!("{scheme}//{hostname}{path}")
        } else {
            format!("{scheme}//{hostname}:{port}{path}")
        }
    }

    /// Channel URL derived from the current `window.location`
    pub fn current_channel_url(&self) -> Result<String, UiError> {
        let location = web_sys::window().ok_or(UiError::NoWindow)?.location();
        let protocol = location.protocol().unwrap_or_else(|_| "http:".to_string());
        let hostname = location
            .hostname()
            .unwrap_or_else(|_| "localhost".to_string());
        let port = location.port().unwrap_or_default();
        Ok(self.channel_url(&protocol, &hostname, &port))
    }

    pub fn api_url(&self, path: &str) -> String {
        format!("{}{path}", self.api_base.trim_end_matches('/'))
    }
}
