//! WebSocket streaming transport.
//!
//! One long-lived connection multiplexes unary request/response exchanges
//! and server-pushed notifications. Each inbound frame is dispatched on
//! its own task, so responses are pushed in completion order; clients
//! correlate by request `id`. Heartbeat notifications carry no `id`.
//! When the client disconnects, in-flight dispatches finish but their
//! sends fail silently and the results are discarded.

use crate::config::StreamConfig;
use crate::dispatch::Dispatcher;
use crate::protocol::{JsonRpcMessage, JsonRpcNotification, JsonRpcResponse};
use axum::extract::ws::{Message, WebSocket};
use chrono::{SecondsFormat, Utc};
use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

/// Drive one streaming connection until close or idle timeout.
pub async fn handle_socket(
    socket: WebSocket,
    dispatcher: Arc<Dispatcher>,
    config: StreamConfig,
    bearer: Option<String>,
) {
    let (mut sink, mut inbound) = socket.split();

    // Single writer task preserves frame boundaries; everything else
    // funnels through the channel.
    let (tx, mut rx) = mpsc::channel::<Message>(64);
    let writer = tokio::spawn(async move {
        while let Some(message) = rx.recv().await {
            if sink.send(message).await.is_err() {
                break;
            }
        }
    });

    let heartbeat = spawn_heartbeat(tx.clone(), config.heartbeat_interval_seconds);
    let idle_timeout = Duration::from_secs(config.idle_timeout_seconds.max(1));

    loop {
        let frame = match tokio::time::timeout(idle_timeout, inbound.next()).await {
            Err(_) => {
                info!("Closing streaming connection after idle timeout");
                break;
            }
            Ok(None) => break,
            Ok(Some(Err(_))) => break,
            Ok(Some(Ok(frame))) => frame,
        };

        match frame {
            Message::Text(text) => {
                let dispatcher = Arc::clone(&dispatcher);
                let tx = tx.clone();
                let bearer = bearer.clone();
                tokio::spawn(async move {
                    let response = match JsonRpcMessage::from_json_str(text.as_str()) {
                        Ok(JsonRpcMessage::Request(request)) => {
                            dispatcher.dispatch(request, bearer.as_deref()).await
                        }
                        Ok(_) => {
                            // Inbound notifications and responses have no
                            // reply; nothing to push.
                            debug!("Ignoring non-request frame");
                            return;
                        }
                        Err(e) => JsonRpcResponse::invalid_request(e.to_string()),
                    };
                    if let Ok(text) = serde_json::to_string(&response) {
                        // Send failure means the client is gone; discard.
                        let _ = tx.send(Message::Text(text.into())).await;
                    }
                });
            }
            Message::Close(_) => break,
            // Ping/Pong are answered by the protocol layer.
            _ => {}
        }
    }

    heartbeat.abort();
    drop(tx);
    let _ = writer.await;
}

fn spawn_heartbeat(tx: mpsc::Sender<Message>, interval_seconds: u64) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker =
            tokio::time::interval(Duration::from_secs(interval_seconds.max(1)));
        // The first tick fires immediately, so every connection gets a
        // heartbeat up front.
        loop {
            ticker.tick().await;
            let notification = JsonRpcMessage::Notification(JsonRpcNotification::new(
                "heartbeat",
                Some(json!({
                    "time": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                })),
            ));
            let Ok(text) = notification.to_json_string() else {
                continue;
            };
            if tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
    })
}
