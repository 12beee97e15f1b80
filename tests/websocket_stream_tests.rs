//! Streaming transport integration tests over a live WebSocket.

use futures_util::{SinkExt, Stream, StreamExt};
use mcp_gateway::catalog::Catalog;
use mcp_gateway::config::{GatewayConfig, StreamConfig};
use mcp_gateway::dispatch::Dispatcher;
use mcp_gateway::plugins;
use mcp_gateway::registry::ToolRegistry;
use mcp_gateway::server::GatewayServer;
use mcp_gateway::session::SessionManager;
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message;

async fn spawn_server(stream: StreamConfig) -> SocketAddr {
    let config = GatewayConfig::default();
    let catalog = Arc::new(Catalog::builtin());
    let mut registry = ToolRegistry::new();
    plugins::load_builtin(&mut registry, &config, &catalog);

    let sessions = Arc::new(SessionManager::new(config.session.clone()));
    let dispatcher = Arc::new(Dispatcher::new(Arc::new(registry), sessions, catalog, 8));
    let router = GatewayServer::new(dispatcher, stream).router();

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

fn fast_heartbeat() -> StreamConfig {
    StreamConfig {
        heartbeat_interval_seconds: 1,
        idle_timeout_seconds: 300,
    }
}

async fn next_json(
    ws: &mut (impl Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin),
) -> Value {
    loop {
        let frame = tokio::time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timed out waiting for frame")
            .expect("connection closed")
            .expect("websocket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

#[tokio::test]
async fn test_heartbeat_has_no_id() {
    let addr = spawn_server(fast_heartbeat()).await;
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/mcp"))
        .await
        .unwrap();

    // first heartbeat fires immediately on connect
    let message = next_json(&mut ws).await;
    assert_eq!(message["method"], json!("heartbeat"));
    assert!(message.get("id").is_none());
}

#[tokio::test]
async fn test_unary_over_stream_round_trip() {
    let addr = spawn_server(fast_heartbeat()).await;
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/mcp"))
        .await
        .unwrap();

    ws.send(Message::Text(
        json!({"id": "req-1", "jsonrpc": "2.0", "method": "tools/list", "params": null})
            .to_string()
            .into(),
    ))
    .await
    .unwrap();

    // skip heartbeats; pushes are distinguished by the missing id
    loop {
        let message = next_json(&mut ws).await;
        if message.get("id").is_some() {
            assert_eq!(message["id"], json!("req-1"));
            assert_eq!(message["result"]["tools"].as_array().unwrap().len(), 6);
            break;
        }
        assert_eq!(message["method"], json!("heartbeat"));
    }
}

#[tokio::test]
async fn test_concurrent_requests_correlated_by_id() {
    let addr = spawn_server(fast_heartbeat()).await;
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/mcp"))
        .await
        .unwrap();

    // find the echo tool id first
    ws.send(Message::Text(
        json!({"id": "list", "jsonrpc": "2.0", "method": "tools/list", "params": null})
            .to_string()
            .into(),
    ))
    .await
    .unwrap();
    let echo_id = loop {
        let message = next_json(&mut ws).await;
        if message["id"] == json!("list") {
            let tools = message["result"]["tools"].as_array().unwrap().clone();
            break tools
                .iter()
                .find(|t| t["name"] == "echo")
                .unwrap()["id"]
                .as_str()
                .unwrap()
                .to_string();
        }
    };

    for text in ["alpha", "beta"] {
        ws.send(Message::Text(
            json!({
                "id": text, "jsonrpc": "2.0", "method": "tools/call",
                "params": {"toolId": echo_id, "arguments": {"text": text}}
            })
            .to_string()
            .into(),
        ))
        .await
        .unwrap();
    }

    // responses may arrive in either order; collect both by id
    let mut seen = Vec::new();
    while seen.len() < 2 {
        let message = next_json(&mut ws).await;
        if let Some(id) = message["id"].as_str() {
            if id == "alpha" || id == "beta" {
                assert_eq!(message["result"]["echo"], json!(id));
                seen.push(id.to_string());
            }
        }
    }
    seen.sort();
    assert_eq!(seen, vec!["alpha", "beta"]);
}

#[tokio::test]
async fn test_malformed_frame_gets_invalid_request() {
    let addr = spawn_server(fast_heartbeat()).await;
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/mcp"))
        .await
        .unwrap();

    ws.send(Message::Text("{\"method\":\"x\",\"id\":1}".into()))
        .await
        .unwrap();

    loop {
        let message = next_json(&mut ws).await;
        if let Some(error) = message.get("error") {
            assert_eq!(error["code"], json!(-32600));
            assert_eq!(message["id"], Value::Null);
            break;
        }
    }
}

#[tokio::test]
async fn test_idle_timeout_closes_connection() {
    let addr = spawn_server(StreamConfig {
        heartbeat_interval_seconds: 30,
        idle_timeout_seconds: 1,
    })
    .await;
    let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/mcp"))
        .await
        .unwrap();

    let closed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match ws.next().await {
                None | Some(Ok(Message::Close(_))) | Some(Err(_)) => break,
                _ => {}
            }
        }
    })
    .await;
    assert!(closed.is_ok(), "server did not close an idle connection");
}
