//! REST client for the light endpoints

use lightdeck_protocol::{control_path, ControlAction, ControlRequest, ControlResponse, Light, LightList};
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

use crate::config::UiConfig;
use crate::error::UiError;

pub const LIGHTS_PATH: &str = "/api/lights";

#[allow(async_fn_in_trait)]
pub trait LightsApi {
    /// `GET /api/lights`
    async fn list_lights(&self) -> Result<Vec<Light>, UiError>;
    /// `POST /api/lights/{id}/control`
    async fn control(&self, id: &str, action: ControlAction) -> Result<ControlResponse, UiError>;
}

/// `window.fetch` implementation
#[derive(Debug, Clone)]
pub struct FetchApi {
    config: UiConfig,
}

impl FetchApi {
    pub const fn new(config: UiConfig) -> Self {
        Self { config }
    }

    async fn send<T: DeserializeOwned>(&self, request: &Request) -> Result<T, UiError> {
        let win = web_sys::window().ok_or(UiError::NoWindow)?;
        let resp: Response = JsFuture::from(win.fetch_with_request(request))
            .await
            .map_err(|e| UiError::network(&e))?
            .dyn_into()?;

        if !resp.ok() {
            return Err(UiError::Status {
                status: resp.status(),
                url: request.url(),
            });
        }

        let text = JsFuture::from(resp.text()?)
            .await
            .map_err(|e| UiError::network(&e))?
            .as_string()
            .unwrap_or_default();
        Ok(serde_json::from_str(&text)?)
    }
}

impl LightsApi for FetchApi {
    async fn list_lights(&self) -> Result<Vec<Light>, UiError> {
        let url = self.config.api_url(LIGHTS_PATH);
        let request = Request::new_with_str(&url)?;
        let list: LightList = self.send(&request).await?;
        Ok(list.lights)
    }

    async fn control(&self, id: &str, action: ControlAction) -> Result<ControlResponse, UiError> {
        let url = self.config.api_url(&control_path(id));
        let body = serde_json::to_string(&ControlRequest { action })?;

        let headers = Headers::new()?;
        headers.set("Content-Type", "application/json")?;
        let init = RequestInit::new();
        init.set_method("POST");
        init.set_headers(&headers);
        init.set_body(&body.into());

        let request = Request::new_with_str_and_init(&url, &init)?;
        self.send(&request).await
    }
}
