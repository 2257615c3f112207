//! In-memory device registry
//!
//! Stands in for the vendor cloud API: holds the configured lights and
//! applies control actions to their power state.

use std::sync::Arc;

use lightdeck_protocol::{ControlAction, Light, LightStatus};
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("light `{0}` not found")]
    NotFound(String),
}

/// Shared, cloneable handle to the device list
#[derive(Debug, Clone, Default)]
pub struct LightRegistry {
    lights: Arc<RwLock<Vec<Light>>>,
}

impl LightRegistry {
    pub fn new(lights: Vec<Light>) -> Self {
        Self {
            lights: Arc::new(RwLock::new(lights)),
        }
    }

    /// Snapshot of all lights in registration order
    pub async fn list(&self) -> Vec<Light> {
        self.lights.read().await.clone()
    }

    pub async fn get(&self, id: &str) -> Option<Light> {
        self.lights.read().await.iter().find(|l| l.id == id).cloned()
    }

    /// Apply an action and return the updated light
    pub async fn apply(&self, id: &str, action: ControlAction) -> Result<Light, RegistryError> {
        let mut lights = self.lights.write().await;
        let light = lights
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;
        light.status = next_status(&light.status, action);
        Ok(light.clone())
    }
}

/// Power state after `action`; toggling an unknown state turns the light on
pub fn next_status(current: &LightStatus, action: ControlAction) -> LightStatus {
    match action {
        ControlAction::On => LightStatus::On,
        ControlAction::Off => LightStatus::Off,
        ControlAction::Toggle if current.is_on() => LightStatus::Off,
        ControlAction::Toggle => LightStatus::On,
    }
}
