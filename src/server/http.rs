//! HTTP surface of the gateway.
//!
//! `POST /mcp` is the unified JSON-RPC endpoint; `GET /mcp` upgrades to
//! the WebSocket streaming transport. The `/v1` and `/api` routes expose
//! discovery, invocation, session bootstrap and the per-session document
//! store as plain REST for clients without a JSON-RPC stack.

use crate::config::StreamConfig;
use crate::dispatch::Dispatcher;
use crate::error::{Error, Result};
use crate::protocol::{error_codes, JsonRpcRequest, JsonRpcResponse, RequestId};
use crate::registry::ToolId;
use axum::{
    extract::{Path, State, WebSocketUpgrade},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

/// Shared state injected into every route handler
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub stream: StreamConfig,
    pub started_at: Instant,
}

/// Binds the router and serves it.
pub struct GatewayServer {
    state: AppState,
}

impl GatewayServer {
    pub fn new(dispatcher: Arc<Dispatcher>, stream: StreamConfig) -> Self {
        Self {
            state: AppState {
                dispatcher,
                stream,
                started_at: Instant::now(),
            },
        }
    }

    pub fn router(&self) -> Router {
        router(self.state.clone())
    }

    pub async fn serve(&self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!("Gateway listening on {}", addr);
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

/// Build the full route table over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/v1/initialize", post(initialize))
        .route("/v1/tools", get(list_tools))
        .route("/v1/resources", get(list_resources))
        .route("/v1/prompts", get(list_prompts))
        .route("/v1/tools/{tool_id}/invoke", post(invoke_tool))
        .route("/mcp", post(rpc_exchange).get(open_stream))
        .route(
            "/api/user/data",
            get(user_data_get)
                .post(user_data_put)
                .delete(user_data_delete),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": self.json_rpc_code(),
                "message": self.to_string(),
            }
        });
        (self.http_status(), Json(body)).into_response()
    }
}

/// HTTP status mirroring an already-built envelope
fn envelope_status(response: &JsonRpcResponse) -> StatusCode {
    match &response.error {
        None => StatusCode::OK,
        Some(err) => match err.code {
            error_codes::INVALID_REQUEST | error_codes::INVALID_PARAMS
            | error_codes::PARSE_ERROR => StatusCode::BAD_REQUEST,
            error_codes::UNAUTHORIZED => StatusCode::UNAUTHORIZED,
            error_codes::METHOD_NOT_FOUND
            | error_codes::TOOL_NOT_FOUND
            | error_codes::KEY_NOT_FOUND => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

async fn health(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "uptime_seconds": state.started_at.elapsed().as_secs(),
        "now": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    }))
}

/// Ordered `{toolId: descriptor}` pairs.
async fn list_tools(State(state): State<AppState>) -> Json<Value> {
    let entries: Vec<Value> = state
        .dispatcher
        .registry()
        .list()
        .into_iter()
        .map(|descriptor| json!({ descriptor.id.as_str(): descriptor }))
        .collect();
    Json(Value::Array(entries))
}

/// Bare array of resource descriptors
async fn list_resources(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.dispatcher.catalog().resources()))
}

/// Bare array of prompt templates
async fn list_prompts(State(state): State<AppState>) -> Json<Value> {
    Json(json!(state.dispatcher.catalog().prompts()))
}

async fn initialize(
    State(state): State<AppState>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    let response = match state.dispatcher.initialize().await {
        Ok(result) => JsonRpcResponse::success(request.id, result),
        Err(err) => JsonRpcResponse::from_error(request.id, &err),
    };
    (envelope_status(&response), Json(response))
}

async fn invoke_tool(
    State(state): State<AppState>,
    Path(tool_id): Path<String>,
    Json(request): Json<JsonRpcRequest>,
) -> impl IntoResponse {
    let arguments = match request.params {
        Some(Value::Object(map)) => map,
        Some(_) => {
            let response = JsonRpcResponse::failure(
                request.id,
                error_codes::INVALID_PARAMS,
                "params must be an object",
            );
            return (envelope_status(&response), Json(response));
        }
        None => Map::new(),
    };

    let id = ToolId::from(tool_id.as_str());
    let response = match state.dispatcher.invoke_tool(&id, arguments).await {
        Ok(result) => JsonRpcResponse::success(request.id, result),
        Err(err) => JsonRpcResponse::from_error(request.id, &err),
    };
    (envelope_status(&response), Json(response))
}

/// Unified single request/response JSON-RPC exchange.
async fn rpc_exchange(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let request: JsonRpcRequest = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            let response = JsonRpcResponse::failure(
                RequestId::Null,
                error_codes::PARSE_ERROR,
                format!("Parse error: {e}"),
            );
            return (envelope_status(&response), Json(response));
        }
    };

    let bearer = bearer_token(&headers);
    let response = state.dispatcher.dispatch(request, bearer.as_deref()).await;
    (envelope_status(&response), Json(response))
}

/// Upgrade to the long-lived streaming transport.
async fn open_stream(
    State(state): State<AppState>,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Response {
    let bearer = bearer_token(&headers);
    let dispatcher = Arc::clone(&state.dispatcher);
    let config = state.stream.clone();
    ws.on_upgrade(move |socket| super::stream::handle_socket(socket, dispatcher, config, bearer))
}

async fn user_session(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Arc<crate::session::SessionEntry>> {
    let token =
        bearer_token(headers).ok_or_else(|| Error::Unauthorized("Missing bearer token".into()))?;
    state.dispatcher.sessions().authenticate(&token).await
}

/// Whole-document read; `{}` for a fresh session.
async fn user_data_get(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    let session = user_session(&state, &headers).await?;
    Ok(Json(Value::Object(session.document().await)))
}

async fn user_data_put(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>> {
    let session = user_session(&state, &headers).await?;
    let document = match body {
        Value::Object(map) => map,
        _ => {
            return Err(Error::Validation(
                "User data document must be a JSON object".into(),
            ))
        }
    };
    session.replace_document(document).await;
    Ok(Json(json!({"ok": true})))
}

async fn user_data_delete(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Value>> {
    let session = user_session(&state, &headers).await?;
    session.clear().await;
    Ok(Json(json!({"ok": true})))
}
