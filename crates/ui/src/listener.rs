//! Inbound event handling. Everything the host pushes is logged; color and
//! effect updates have no on-page rendering yet.

use lightdeck_protocol::ServerEvent;

pub fn handle_server_event(event: &ServerEvent) {
    match event {
        ServerEvent::Connect => tracing::info!("Connected to server"),
        ServerEvent::Status(status) => tracing::info!(message = %status.message, "Server status"),
        ServerEvent::ColorUpdate(color) => tracing::info!(%color, "Color update"),
        ServerEvent::EffectStatus(status) => tracing::info!(%status, "Effect status"),
        ServerEvent::Unknown { name, payload } => tracing::debug!(
            event = %name,
            payload = ?payload,
            "Ignoring unknown server event"
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_every_event_is_handled() {
        for event in [
            ServerEvent::Connect,
            ServerEvent::status("Connected to Lightdeck"),
            ServerEvent::ColorUpdate(json!({"r": 255, "g": 0, "b": 64})),
            ServerEvent::EffectStatus(json!({"effect": "rolling", "state": "running"})),
            ServerEvent::Unknown {
                name: "future_event".into(),
                payload: None,
            },
        ] {
            handle_server_event(&event);
        }
    }
}
