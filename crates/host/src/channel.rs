//! Event channel over WebSocket
//!
//! Each connection gets a `status` greeting, then every client frame is
//! logged. Rolling-effect requests are acknowledged with `effect_status`.
//! Color mapping for audio frames is not done here.

use std::net::SocketAddr;

use anyhow::Result;
use futures::{SinkExt, StreamExt};
use lightdeck_protocol::{decode_client, encode_server, ClientEvent, ServerEvent};
use serde_json::json;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

pub const GREETING: &str = "Connected to Lightdeck";

/// Accept event-channel connections forever
pub async fn serve_channel(listener: TcpListener) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(addr = %addr, "Event channel listening");

    loop {
        match listener.accept().await {
            Ok((stream, peer)) => {
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, peer).await {
                        tracing::warn!(peer = %peer, error = %e, "Connection error");
                    }
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "Accept failed");
            }
        }
    }
}

/// Handle a single channel connection until the client goes away
pub async fn handle_connection<S>(stream: S, peer: SocketAddr) -> Result<()>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let ws = tokio_tungstenite::accept_async(stream).await?;
    let (mut ws_tx, mut ws_rx) = ws.split();
    tracing::info!(peer = %peer, "Client connected");

    ws_tx
        .send(Message::Text(encode_server(&ServerEvent::status(GREETING))))
        .await?;

    while let Some(msg) = ws_rx.next().await {
        match msg? {
            Message::Text(text) => match decode_client(&text) {
                Ok(event) => {
                    log_event(&event);
                    if let Some(reply) = reply_for(&event) {
                        ws_tx.send(Message::Text(encode_server(&reply))).await?;
                    }
                }
                Err(e) => {
                    tracing::warn!(peer = %peer, error = %e, "Dropping malformed frame");
                }
            },
            Message::Close(_) => break,
            _ => {}
        }
    }

    tracing::info!(peer = %peer, "Client disconnected");
    Ok(())
}

fn log_event(event: &ClientEvent) {
    match event {
        ClientEvent::AudioFrequency(sample) => {
            tracing::trace!(frequency = sample.frequency, "audio_frequency");
        }
        ClientEvent::StartRolling(req) => {
            tracing::info!(strip1 = %req.strip1, strip2 = %req.strip2, speed = req.speed, "start_rolling");
        }
        other => tracing::info!(event = %other.name(), "Client event"),
    }
}

/// Acknowledgement pushed back for an event, if any
pub fn reply_for(event: &ClientEvent) -> Option<ServerEvent> {
    match event {
        ClientEvent::StartRolling(req) => Some(ServerEvent::EffectStatus(json!({
            "effect": "rolling",
            "state": "running",
            "strip1": req.strip1,
            "strip2": req.strip2,
            "speed": req.speed,
        }))),
        ClientEvent::StopRolling => Some(ServerEvent::EffectStatus(json!({
            "effect": "rolling",
            "state": "stopped",
        }))),
        _ => None,
    }
}
