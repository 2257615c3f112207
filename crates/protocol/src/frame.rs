//! Event-channel framing
//!
//! One WebSocket text message carries one event as a JSON array:
//! `["name"]` or `["name", payload]`.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::events::{ClientEvent, EventName, ServerEvent};

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid frame json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("frame is not a non-empty array")]
    NotAnArray,
    #[error("frame has no event name")]
    MissingName,
    #[error("event `{0}` requires a payload")]
    MissingPayload(String),
    #[error("invalid payload for `{event}`: {source}")]
    Payload {
        event: String,
        source: serde_json::Error,
    },
    #[error("unexpected event `{0}`")]
    UnexpectedEvent(String),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

/// A single decoded frame, before the payload is typed
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub event: EventName,
    pub payload: Option<Value>,
}

impl Frame {
    pub fn new(event: EventName, payload: Option<Value>) -> Self {
        Self { event, payload }
    }

    pub fn parse(text: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(text)?;
        let Value::Array(mut parts) = value else {
            return Err(ProtocolError::NotAnArray);
        };
        if parts.is_empty() {
            return Err(ProtocolError::NotAnArray);
        }
        let payload = if parts.len() > 1 {
            Some(parts.swap_remove(1))
        } else {
            None
        };
        let name = parts[0].as_str().ok_or(ProtocolError::MissingName)?;
        Ok(Self {
            event: EventName::from(name),
            payload: payload.filter(|p| !p.is_null()),
        })
    }

    pub fn to_text(&self) -> String {
        let mut parts = vec![Value::String(self.event.to_string())];
        if let Some(payload) = &self.payload {
            parts.push(payload.clone());
        }
        Value::Array(parts).to_string()
    }

    fn typed<T: DeserializeOwned>(self) -> Result<T> {
        let event = self.event.to_string();
        let payload = self
            .payload
            .ok_or_else(|| ProtocolError::MissingPayload(event.clone()))?;
        serde_json::from_value(payload).map_err(|source| ProtocolError::Payload { event, source })
    }
}

pub fn encode_client(event: &ClientEvent) -> String {
    Frame::new(event.name(), event.payload()).to_text()
}

pub fn decode_client(text: &str) -> Result<ClientEvent> {
    let frame = Frame::parse(text)?;
    match frame.event {
        EventName::AudioStarted => Ok(ClientEvent::AudioStarted),
        EventName::AudioStopped => Ok(ClientEvent::AudioStopped),
        EventName::StopRolling => Ok(ClientEvent::StopRolling),
        EventName::AudioFrequency => frame.typed().map(ClientEvent::AudioFrequency),
        EventName::StartRolling => frame.typed().map(ClientEvent::StartRolling),
        other => Err(ProtocolError::UnexpectedEvent(other.to_string())),
    }
}

pub fn encode_server(event: &ServerEvent) -> String {
    Frame::new(event.name(), event.payload()).to_text()
}

/// Decode a host frame; unrecognised names come back as `ServerEvent::Unknown`
pub fn decode_server(text: &str) -> Result<ServerEvent> {
    let frame = Frame::parse(text)?;
    match frame.event {
        EventName::Connect => Ok(ServerEvent::Connect),
        EventName::Status => frame.typed().map(ServerEvent::Status),
        EventName::ColorUpdate => Ok(ServerEvent::ColorUpdate(
            frame.payload.unwrap_or(Value::Null),
        )),
        EventName::EffectStatus => Ok(ServerEvent::EffectStatus(
            frame.payload.unwrap_or(Value::Null),
        )),
        EventName::Unknown(name) => Ok(ServerEvent::Unknown {
            name,
            payload: frame.payload,
        }),
        other => Err(ProtocolError::UnexpectedEvent(other.to_string())),
    }
}
