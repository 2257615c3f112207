//! REST payloads for the `/api/lights` endpoints

use serde::{Deserialize, Serialize};

/// Power state reported by the server.
///
/// Anything other than `on`/`off` is kept verbatim so the badge can still
/// show it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LightStatus {
    On,
    Off,
    Other(String),
}

impl LightStatus {
    pub fn as_str(&self) -> &str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::Other(s) => s,
        }
    }

    /// Upper-cased label for the status badge
    pub fn badge_label(&self) -> String {
        self.as_str().to_uppercase()
    }

    pub const fn is_on(&self) -> bool {
        matches!(self, Self::On)
    }
}

impl Default for LightStatus {
    fn default() -> Self {
        Self::Other("unknown".to_string())
    }
}

impl From<String> for LightStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "on" => Self::On,
            "off" => Self::Off,
            _ => Self::Other(s),
        }
    }
}

impl From<LightStatus> for String {
    fn from(status: LightStatus) -> Self {
        match status {
            LightStatus::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for LightStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A controllable device as listed by `GET /api/lights`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Light {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub status: LightStatus,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl Light {
    /// Device type for display, `Unknown` when the server omits it
    pub fn kind_label(&self) -> &str {
        self.kind.as_deref().unwrap_or("Unknown")
    }
}

/// Body of `GET /api/lights`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LightList {
    #[serde(default)]
    pub lights: Vec<Light>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Action token sent to `POST /api/lights/{id}/control`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlAction {
    Toggle,
    On,
    Off,
}

impl ControlAction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Toggle => "toggle",
            Self::On => "on",
            Self::Off => "off",
        }
    }
}

impl std::str::FromStr for ControlAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "toggle" => Ok(Self::Toggle),
            "on" => Ok(Self::On),
            "off" => Ok(Self::Off),
            other => Err(format!("unknown action `{other}`")),
        }
    }
}

impl std::fmt::Display for ControlAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRequest {
    pub action: ControlAction,
}

pub const STATUS_SUCCESS: &str = "success";
pub const STATUS_ERROR: &str = "error";

/// Body returned by the control endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub light_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ControlResponse {
    pub fn success(light_id: &str) -> Self {
        Self {
            status: STATUS_SUCCESS.to_string(),
            light_id: Some(light_id.to_string()),
            message: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            status: STATUS_ERROR.to_string(),
            light_id: None,
            message: Some(message.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == STATUS_SUCCESS
    }
}

/// Path of the control endpoint for one device
pub fn control_path(light_id: &str) -> String {
    format!("/api/lights/{}/control", urlencoding::encode(light_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_light_list_parses_optional_type() {
        let json = r#"{"lights":[
            {"id":"a1","name":"Desk","status":"on","type":"H6159"},
            {"id":"b2","name":"Shelf","status":"off"}
        ]}"#;
        let list: LightList = serde_json::from_str(json).unwrap();
        assert_eq!(list.lights.len(), 2);
        assert_eq!(list.lights[0].kind.as_deref(), Some("H6159"));
        assert_eq!(list.lights[1].kind_label(), "Unknown");
        assert!(list.lights[0].status.is_on());
    }

    #[test]
    fn test_light_list_missing_lights_is_empty() {
        let list: LightList = serde_json::from_str(r#"{"status":"success"}"#).unwrap();
        assert!(list.lights.is_empty());
    }

    #[test]
    fn test_unknown_status_kept_verbatim() {
        let light: Light =
            serde_json::from_str(r#"{"id":"x","name":"Lamp","status":"offline"}"#).unwrap();
        assert_eq!(light.status, LightStatus::Other("offline".to_string()));
        assert_eq!(light.status.badge_label(), "OFFLINE");
    }

    #[test]
    fn test_control_request_body() {
        let body = serde_json::to_string(&ControlRequest {
            action: ControlAction::Toggle,
        })
        .unwrap();
        assert_eq!(body, r#"{"action":"toggle"}"#);
    }

    #[test]
    fn test_control_response_success() {
        let ok: ControlResponse =
            serde_json::from_str(r#"{"status":"success","light_id":"a1"}"#).unwrap();
        assert!(ok.is_success());
        let failed: ControlResponse = serde_json::from_str(r#"{"status":"pending"}"#).unwrap();
        assert!(!failed.is_success());
    }

    #[test]
    fn test_control_action_from_str() {
        assert_eq!("toggle".parse::<ControlAction>(), Ok(ControlAction::Toggle));
        assert_eq!("off".parse::<ControlAction>(), Ok(ControlAction::Off));
        assert!("dim".parse::<ControlAction>().is_err());
    }

    #[test]
    fn test_control_path() {
        assert_eq!(control_path("a1"), "/api/lights/a1/control");
    }

    #[test]
    fn test_control_path_encodes_id() {
        assert_eq!(
            control_path("a/b#c"),
            "/api/lights/a%2Fb%23c/control"
        );
        assert_eq!(
            control_path("AA:BB:CC"),
            "/api/lights/AA%3ABB%3ACC/control"
        );
    }
}
