//! REST API server for lightdeck
//!
//! Serves the device list and control endpoint, the page's `config.js`,
//! and the static UI bundle.

use std::path::Path;

use axum::{
    extract::{Path as UrlPath, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use lightdeck_protocol::{ControlRequest, ControlResponse, LightList, STATUS_SUCCESS};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::registry::{LightRegistry, RegistryError};

// Shared state
#[derive(Clone)]
pub struct AppState {
    pub registry: LightRegistry,
    pub ws_port: u16,
}

// Routes
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/lights", get(list_lights))
        .route("/lights/:id/control", post(control_light))
}

/// Full HTTP application: API, dynamic config and static files
pub fn app(state: AppState, static_dir: &Path) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/config.js", get(serve_config_js))
        .nest("/api", api_router())
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
        .layer(cors)
}

// Handlers

async fn list_lights(State(state): State<AppState>) -> Json<LightList> {
    let lights = state.registry.list().await;
    tracing::debug!(count = lights.len(), "Listing lights");
    Json(LightList {
        lights,
        status: Some(STATUS_SUCCESS.to_string()),
    })
}

async fn control_light(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
    Json(request): Json<ControlRequest>,
) -> impl IntoResponse {
    match state.registry.apply(&id, request.action).await {
        Ok(light) => {
            tracing::info!(light = %id, action = %request.action, status = %light.status, "Light controlled");
            (StatusCode::OK, Json(ControlResponse::success(&id)))
        }
        Err(e @ RegistryError::NotFound(_)) => {
            tracing::warn!(light = %id, "Control for unknown light");
            (StatusCode::NOT_FOUND, Json(ControlResponse::error(e.to_string())))
        }
    }
}

/// Serve /config.js with the event-channel port
async fn serve_config_js(State(state): State<AppState>) -> impl IntoResponse {
    let js = format!("window.LIGHTDECK_CONFIG = {{ wsPort: {} }};", state.ws_port);
    ([(header::CONTENT_TYPE, "application/javascript")], js)
}
