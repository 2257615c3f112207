//! Configuration system for lightdeck-host
//!
//! Reads config from `./lightdeck.toml`, or the path in `LIGHTDECK_CONFIG`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lightdeck_protocol::{Light, LightStatus};
use serde::Deserialize;

pub const CONFIG_ENV: &str = "LIGHTDECK_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "lightdeck.toml";

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub http_port: u16,
    pub ws_port: u16,
    /// Directory holding `index.html` and the wasm bundle
    pub static_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            http_port: 5000,
            ws_port: 5001,
            static_dir: PathBuf::from("crates/ui/www"),
        }
    }
}

/// A device entry seeding the registry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LightConfig {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub on: bool,
}

impl From<LightConfig> for Light {
    fn from(cfg: LightConfig) -> Self {
        Self {
            id: cfg.id,
            name: cfg.name,
            status: if cfg.on { LightStatus::On } else { LightStatus::Off },
            kind: cfg.kind,
        }
    }
}

/// Full host configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    pub server: ServerConfig,
    pub lights: Vec<LightConfig>,
}

impl HostConfig {
    /// Load configuration from the env-selected or default path.
    ///
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load() -> Result<Self> {
        let path = std::env::var_os(CONFIG_ENV)
            .map_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE), PathBuf::from);

        let mut config = if path.exists() {
            Self::load_from_path(&path)?
        } else {
            tracing::info!(path = %path.display(), "No config file, using defaults");
            Self::default()
        };

        if let Some(port) = std::env::var("PORT").ok().and_then(|p| p.parse().ok()) {
            config.server.http_port = port;
        }

        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("Invalid config in {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn initial_lights(&self) -> Vec<Light> {
        self.lights.iter().cloned().map(Light::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HostConfig::default();
        assert_eq!(config.server.http_port, 5000);
        assert_eq!(config.server.ws_port, 5001);
        assert_eq!(config.server.bind, "127.0.0.1");
        assert!(config.lights.is_empty());
    }

    #[test]
    fn test_parse_partial_config() {
        let config = HostConfig::parse(
            r#"
[server]
ws_port = 9100

[[lights]]
id = "AA:BB"
name = "Desk strip"
type = "H6159"
on = true

[[lights]]
id = "CC:DD"
name = "Shelf"
"#,
        )
        .unwrap();

        assert_eq!(config.server.ws_port, 9100);
        assert_eq!(config.server.http_port, 5000);

        let lights = config.initial_lights();
        assert_eq!(lights.len(), 2);
        assert_eq!(lights[0].status, LightStatus::On);
        assert_eq!(lights[0].kind.as_deref(), Some("H6159"));
        assert_eq!(lights[1].status, LightStatus::Off);
        assert_eq!(lights[1].kind, None);
    }

    #[test]
    fn test_parse_rejects_bad_types() {
        assert!(HostConfig::parse("[server]\nhttp_port = \"eighty\"").is_err());
    }
}
