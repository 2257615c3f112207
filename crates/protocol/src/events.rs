//! Event-channel message types
//!
//! Client events flow UI -> host, server events host -> UI.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Known event names on the channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventName {
    // Host -> UI
    Connect,      // connect
    Status,       // status
    ColorUpdate,  // color_update
    EffectStatus, // effect_status

    // UI -> Host
    AudioStarted,   // audio_started
    AudioStopped,   // audio_stopped
    AudioFrequency, // audio_frequency
    StartRolling,   // start_rolling
    StopRolling,    // stop_rolling

    Unknown(String),
}

impl From<&str> for EventName {
    fn from(s: &str) -> Self {
        match s {
            "connect" => Self::Connect,
            "status" => Self::Status,
            "color_update" => Self::ColorUpdate,
            "effect_status" => Self::EffectStatus,
            "audio_started" => Self::AudioStarted,
            "audio_stopped" => Self::AudioStopped,
            "audio_frequency" => Self::AudioFrequency,
            "start_rolling" => Self::StartRolling,
            "stop_rolling" => Self::StopRolling,
            other => Self::Unknown(other.to_string()),
        }
    }
}

impl std::fmt::Display for EventName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Connect => "connect",
            Self::Status => "status",
            Self::ColorUpdate => "color_update",
            Self::EffectStatus => "effect_status",
            Self::AudioStarted => "audio_started",
            Self::AudioStopped => "audio_stopped",
            Self::AudioFrequency => "audio_frequency",
            Self::StartRolling => "start_rolling",
            Self::StopRolling => "stop_rolling",
            Self::Unknown(s) => s,
        };
        write!(f, "{s}")
    }
}

/// Dominant frequency of one analysis frame, in Hz
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FrequencySample {
    pub frequency: f64,
}

/// Start request for the rolling effect across two strips
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingRequest {
    pub strip1: String,
    pub strip2: String,
    pub speed: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub message: String,
}

/// Events the UI emits
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    AudioStarted,
    AudioStopped,
    AudioFrequency(FrequencySample),
    StartRolling(RollingRequest),
    StopRolling,
}

impl ClientEvent {
    pub const fn name(&self) -> EventName {
        match self {
            Self::AudioStarted => EventName::AudioStarted,
            Self::AudioStopped => EventName::AudioStopped,
            Self::AudioFrequency(_) => EventName::AudioFrequency,
            Self::StartRolling(_) => EventName::StartRolling,
            Self::StopRolling => EventName::StopRolling,
        }
    }

    /// JSON payload, `None` for payload-less events
    pub fn payload(&self) -> Option<Value> {
        match self {
            Self::AudioStarted | Self::AudioStopped | Self::StopRolling => None,
            Self::AudioFrequency(sample) => serde_json::to_value(sample).ok(),
            Self::StartRolling(req) => serde_json::to_value(req).ok(),
        }
    }
}

/// Events the host pushes to the UI.
///
/// Color and effect payloads are left untyped; the UI only logs them.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    Connect,
    Status(StatusMessage),
    ColorUpdate(Value),
    EffectStatus(Value),
    Unknown { name: String, payload: Option<Value> },
}

impl ServerEvent {
    pub fn name(&self) -> EventName {
        match self {
            Self::Connect => EventName::Connect,
            Self::Status(_) => EventName::Status,
            Self::ColorUpdate(_) => EventName::ColorUpdate,
            Self::EffectStatus(_) => EventName::EffectStatus,
            Self::Unknown { name, .. } => EventName::Unknown(name.clone()),
        }
    }

    pub fn payload(&self) -> Option<Value> {
        match self {
            Self::Connect => None,
            Self::Status(msg) => serde_json::to_value(msg).ok(),
            Self::ColorUpdate(v) | Self::EffectStatus(v) => Some(v.clone()),
            Self::Unknown { payload, .. } => payload.clone(),
        }
    }

    pub fn status(message: impl Into<String>) -> Self {
        Self::Status(StatusMessage {
            message: message.into(),
        })
    }
}
