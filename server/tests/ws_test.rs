//! Integration tests for live updates over WebSocket: registration on
//! connect, fan-out of event mutations, and cleanup on disconnect.

use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

use eventboard_server::ws::ConnectionRegistry;

type WsRead = futures_util::stream::SplitStream<
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
>;

/// Helper: start the server on a random port and return (base_url, addr, registry).
async fn start_test_server() -> (String, SocketAddr, ConnectionRegistry) {
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = tmp_dir.path().to_str().unwrap().to_string();

    let db = eventboard_server::db::init_db(&data_dir).expect("Failed to init DB");
    let state = eventboard_server::state::AppState::new(db, Default::default());
    let registry = state.connections.clone();

    let app = eventboard_server::routes::build_router(state);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
        let _keep = tmp_dir;
    });

    (format!("http://{}", addr), addr, registry)
}

/// Wait until the server has registered exactly `expected` connections.
async fn wait_for_connections(registry: &ConnectionRegistry, expected: usize) {
    for _ in 0..100 {
        if registry.len() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!(
        "Expected {} registered connections, found {}",
        expected,
        registry.len()
    );
}

/// Read the next JSON text frame, skipping control frames.
async fn next_json(read: &mut WsRead) -> serde_json::Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), read.next())
            .await
            .expect("Expected a message within timeout");
        match msg {
            Some(Ok(Message::Text(text))) => {
                return serde_json::from_str(text.as_str()).expect("Frame should be JSON")
            }
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
            other => panic!("Expected text frame, got: {:?}", other),
        }
    }
}

/// Assert that nothing arrives within a short window.
async fn expect_silence(read: &mut WsRead) {
    let result = tokio::time::timeout(Duration::from_millis(300), read.next()).await;
    assert!(result.is_err(), "Expected no message, got: {:?}", result);
}

async fn connect(addr: SocketAddr) -> (
    futures_util::stream::SplitSink<
        tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>,
        Message,
    >,
    WsRead,
) {
    let (ws_stream, _) = tokio_tungstenite::connect_async(format!("ws://{}/ws", addr))
        .await
        .expect("Failed to connect to WebSocket");
    ws_stream.split()
}

async fn create_user(base_url: &str, name: &str) -> i64 {
    let body: serde_json::Value = reqwest::Client::new()
        .post(format!("{}/users/", base_url))
        .json(&json!({ "name": name }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    body["id"].as_i64().unwrap()
}

async fn create_event(base_url: &str, title: &str) -> i64 {
    let resp = reqwest::Client::new()
        .post(format!("{}/event/", base_url))
        .json(&json!({
            "title": title,
            "event_dt": "2024-10-30T10:00",
            "duration": "15 min",
            "location": "Room 1",
            "organizer_id": 1,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    body["id"].as_i64().unwrap()
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn test_create_then_join_after_disconnect() {
    let (base_url, addr, registry) = start_test_server().await;
    let user_id = create_user(&base_url, "ada").await;

    let (mut write_a, mut read_a) = connect(addr).await;
    let (_write_b, mut read_b) = connect(addr).await;
    wait_for_connections(&registry, 2).await;

    let event_id = create_event(&base_url, "Standup").await;

    for read in [&mut read_a, &mut read_b] {
        let msg = next_json(read).await;
        assert_eq!(msg["action"], "create");
        assert_eq!(msg["data"]["title"], "Standup");
        assert_eq!(msg["data"]["id"], event_id);
        assert_eq!(msg["data"]["joiners"], json!([]));
    }

    // A leaves; the server must forget it
    write_a.send(Message::Close(None)).await.unwrap();
    wait_for_connections(&registry, 1).await;

    let resp = reqwest::Client::new()
        .post(format!("{}/event/join/", base_url))
        .json(&json!({ "event_id": event_id, "user_id": user_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let msg = next_json(&mut read_b).await;
    assert_eq!(msg["action"], "update");
    assert_eq!(msg["data"]["joiners"], json!([{ "id": user_id, "name": "ada" }]));
}

#[tokio::test]
async fn test_quit_broadcasts_update() {
    let (base_url, addr, registry) = start_test_server().await;
    let user_id = create_user(&base_url, "ada").await;
    let event_id = create_event(&base_url, "Standup").await;
    let client = reqwest::Client::new();
    client
        .post(format!("{}/event/join/", base_url))
        .json(&json!({ "event_id": event_id, "user_id": user_id }))
        .send()
        .await
        .unwrap();

    let (_write, mut read) = connect(addr).await;
    wait_for_connections(&registry, 1).await;

    let resp = client
        .post(format!("{}/event/quit/", base_url))
        .json(&json!({ "event_id": event_id, "user_id": user_id }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let msg = next_json(&mut read).await;
    assert_eq!(msg["action"], "update");
    assert_eq!(msg["data"]["id"], event_id);
    assert_eq!(msg["data"]["joiners"], json!([]));
}

#[tokio::test]
async fn test_cancel_broadcasts_event_id_only() {
    let (base_url, addr, registry) = start_test_server().await;
    let event_id = create_event(&base_url, "Standup").await;

    let (_write, mut read) = connect(addr).await;
    wait_for_connections(&registry, 1).await;

    let resp = reqwest::Client::new()
        .delete(format!("{}/event/cancel/{}", base_url, event_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let msg = next_json(&mut read).await;
    assert_eq!(msg, json!({ "action": "delete", "data": { "event_id": event_id } }));
}

#[tokio::test]
async fn test_cancel_with_no_connections() {
    let (base_url, _addr, registry) = start_test_server().await;
    let event_id = create_event(&base_url, "Standup").await;
    assert!(registry.is_empty());

    let resp = reqwest::Client::new()
        .delete(format!("{}/event/cancel/{}", base_url, event_id))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body, json!({ "ok": true }));
}

#[tokio::test]
async fn test_failed_mutation_broadcasts_nothing() {
    let (base_url, addr, registry) = start_test_server().await;
    let (_write, mut read) = connect(addr).await;
    wait_for_connections(&registry, 1).await;

    let resp = reqwest::Client::new()
        .delete(format!("{}/event/cancel/12345", base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    expect_silence(&mut read).await;
}

#[tokio::test]
async fn test_client_payloads_are_ignored() {
    let (base_url, addr, registry) = start_test_server().await;
    let (mut write, mut read) = connect(addr).await;
    wait_for_connections(&registry, 1).await;

    write
        .send(Message::Text("hello?".into()))
        .await
        .expect("Failed to send text");
    expect_silence(&mut read).await;
    assert_eq!(registry.len(), 1, "Client chatter must not drop the connection");

    create_event(&base_url, "Standup").await;
    let msg = next_json(&mut read).await;
    assert_eq!(msg["action"], "create");
}

#[tokio::test]
async fn test_ws_ping_pong() {
    let (_base_url, addr, registry) = start_test_server().await;
    let (mut write, mut read) = connect(addr).await;
    wait_for_connections(&registry, 1).await;

    write
        .send(Message::Ping(vec![42, 43, 44].into()))
        .await
        .expect("Failed to send ping");

    let msg = tokio::time::timeout(Duration::from_secs(2), read.next())
        .await
        .expect("Expected pong within timeout");
    match msg {
        Some(Ok(Message::Pong(data))) => {
            assert_eq!(data.as_ref(), &[42, 43, 44], "Pong data should match ping");
        }
        other => panic!("Expected Pong message, got: {:?}", other),
    }
    // One ping, one pong
    expect_silence(&mut read).await;
}

#[tokio::test]
async fn test_connection_cleanup_on_drop() {
    let (_base_url, addr, registry) = start_test_server().await;
    {
        let (_write, _read) = connect(addr).await;
        wait_for_connections(&registry, 1).await;
    }
    // Dropping both halves closes the TCP stream without a close frame
    wait_for_connections(&registry, 0).await;

    let (_write, _read) = connect(addr).await;
    wait_for_connections(&registry, 1).await;
}
