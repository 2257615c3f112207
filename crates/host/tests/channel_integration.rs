use std::time::Duration;

use futures::{SinkExt, StreamExt};
use lightdeck_host::channel::{self, GREETING};
use lightdeck_protocol::{
    decode_server, encode_client, ClientEvent, RollingRequest, ServerEvent,
};
use tokio::net::TcpListener;
use tokio_tungstenite::{connect_async, tungstenite::Message};

async fn spawn_channel() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        if let Err(e) = channel::serve_channel(listener).await {
            eprintln!("Channel error: {e}");
        }
    });
    format!("ws://{addr}")
}

async fn next_event<S>(rx: &mut S) -> ServerEvent
where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    let msg = tokio::time::timeout(Duration::from_secs(5), rx.next())
        .await
        .expect("timed out waiting for frame")
        .expect("stream ended")
        .expect("websocket error");
    match msg {
        Message::Text(text) => decode_server(&text).unwrap(),
        other => panic!("unexpected message: {other:?}"),
    }
}

#[tokio::test]
async fn greets_with_status_on_connect() {
    let url = spawn_channel().await;
    let (ws, _) = connect_async(url.as_str()).await.unwrap();
    let (_tx, mut rx) = ws.split();

    assert_eq!(next_event(&mut rx).await, ServerEvent::status(GREETING));
}

#[tokio::test]
async fn acknowledges_rolling_start_and_stop() {
    let url = spawn_channel().await;
    let (ws, _) = connect_async(url.as_str()).await.unwrap();
    let (mut tx, mut rx) = ws.split();
    let _greeting = next_event(&mut rx).await;

    // Audio frames are logged only and produce no reply
    tx.send(Message::Text(encode_client(&ClientEvent::AudioStarted)))
        .await
        .unwrap();

    let start = ClientEvent::StartRolling(RollingRequest {
        strip1: "strip-1".into(),
        strip2: "strip-2".into(),
        speed: 2.0,
    });
    tx.send(Message::Text(encode_client(&start))).await.unwrap();

    let ServerEvent::EffectStatus(payload) = next_event(&mut rx).await else {
        panic!("expected effect_status");
    };
    assert_eq!(payload["state"], "running");
    assert_eq!(payload["strip1"], "strip-1");

    tx.send(Message::Text(encode_client(&ClientEvent::StopRolling)))
        .await
        .unwrap();
    let ServerEvent::EffectStatus(payload) = next_event(&mut rx).await else {
        panic!("expected effect_status");
    };
    assert_eq!(payload["state"], "stopped");
}

#[tokio::test]
async fn malformed_frames_do_not_close_the_connection() {
    let url = spawn_channel().await;
    let (ws, _) = connect_async(url.as_str()).await.unwrap();
    let (mut tx, mut rx) = ws.split();
    let _greeting = next_event(&mut rx).await;

    tx.send(Message::Text("{not a frame".to_string())).await.unwrap();
    tx.send(Message::Text(encode_client(&ClientEvent::StopRolling)))
        .await
        .unwrap();

    assert!(matches!(next_event(&mut rx).await, ServerEvent::EffectStatus(_)));
}
