//! Common test utilities
#![allow(dead_code)] // Not every test file uses every helper

use axum::Router;
use lightdeck_host::api::{self, AppState};
use lightdeck_host::registry::LightRegistry;
use lightdeck_protocol::{Light, LightStatus};
use tempfile::TempDir;

pub const WS_PORT: u16 = 9123;

/// Router over a seeded registry with a temp static directory
pub struct TestHarness {
    pub static_dir: TempDir,
    pub registry: LightRegistry,
}

impl TestHarness {
    pub fn new() -> std::io::Result<Self> {
        Self::with_lights(vec![
            light("strip-1", "Living room strip", LightStatus::Off, Some("H6159")),
            light("strip-2", "Desk strip", LightStatus::On, None),
        ])
    }

    pub fn with_lights(lights: Vec<Light>) -> std::io::Result<Self> {
        let static_dir = tempfile::tempdir()?;
        std::fs::write(
            static_dir.path().join("index.html"),
            "<html><body><div id=\"lights-container\"></div></body></html>",
        )?;

        let registry = LightRegistry::new(lights);

        Ok(Self {
            static_dir,
            registry,
        })
    }

    pub fn app(&self) -> Router {
        api::app(
            AppState {
                registry: self.registry.clone(),
                ws_port: WS_PORT,
            },
            self.static_dir.path(),
        )
    }
}

pub fn light(id: &str, name: &str, status: LightStatus, kind: Option<&str>) -> Light {
    Light {
        id: id.to_string(),
        name: name.to_string(),
        status,
        kind: kind.map(ToString::to_string),
    }
}
