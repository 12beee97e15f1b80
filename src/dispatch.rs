//! The dispatch engine: routes one request to the registry, the session
//! manager or a meta method, and always produces one response envelope.
//!
//! Per request the pipeline is strictly sequential (parse, validate,
//! route, complete); across requests everything runs concurrently. The
//! handler call is the only stage taken under a fan-out permit, so
//! validation and routing never queue behind slow backends.

use crate::catalog::Catalog;
use crate::error::{Error, Result};
use crate::protocol::{JsonRpcRequest, JsonRpcResponse, PROTOCOL_VERSION};
use crate::registry::{validate_arguments, ToolId, ToolRegistry};
use crate::session::SessionManager;
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
struct ToolCallParams {
    #[serde(rename = "toolId", alias = "tool_id")]
    tool_id: ToolId,
    #[serde(default)]
    arguments: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct UserGetParams {
    key: String,
}

#[derive(Debug, Deserialize)]
struct UserPutParams {
    key: String,
    value: Value,
}

/// Routes requests and folds every error into the response envelope.
pub struct Dispatcher {
    registry: Arc<ToolRegistry>,
    sessions: Arc<SessionManager>,
    catalog: Arc<Catalog>,
    invoke_permits: Arc<Semaphore>,
    server_id: String,
}

impl Dispatcher {
    pub fn new(
        registry: Arc<ToolRegistry>,
        sessions: Arc<SessionManager>,
        catalog: Arc<Catalog>,
        max_concurrent_invocations: usize,
    ) -> Self {
        Self {
            registry,
            sessions,
            catalog,
            invoke_permits: Arc::new(Semaphore::new(max_concurrent_invocations.max(1))),
            server_id: format!("mcp-gateway-{}", Uuid::new_v4()),
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    /// Dispatch one request. Never fails: errors become the `error` field.
    pub async fn dispatch(&self, request: JsonRpcRequest, bearer: Option<&str>) -> JsonRpcResponse {
        debug!(method = %request.method, "Dispatching request");
        let id = request.id.clone();
        match self.route(request, bearer).await {
            Ok(result) => JsonRpcResponse::success(id, result),
            Err(err) => {
                warn!(error = %err, "Request failed");
                JsonRpcResponse::from_error(id, &err)
            }
        }
    }

    async fn route(&self, request: JsonRpcRequest, bearer: Option<&str>) -> Result<Value> {
        match request.method.as_str() {
            "initialize" => self.initialize().await,
            "tools/list" => self.list_tools(),
            "resources/list" => Ok(json!({ "resources": self.catalog.resources() })),
            "prompts/list" => Ok(json!({ "prompts": self.catalog.prompts() })),
            "tools/call" => {
                let params: ToolCallParams = parse_params(request.params)?;
                self.invoke_tool(&params.tool_id, params.arguments).await
            }
            "user/get" => {
                let params: UserGetParams = parse_params(request.params)?;
                let session = self.authenticated(bearer).await?;
                session
                    .get(&params.key)
                    .await
                    .ok_or_else(|| Error::KeyNotFound(params.key))
            }
            "user/put" => {
                let params: UserPutParams = parse_params(request.params)?;
                let session = self.authenticated(bearer).await?;
                session.put(params.key, params.value).await;
                Ok(json!({"ok": true}))
            }
            "user/delete" => {
                let params: UserGetParams = parse_params(request.params)?;
                let session = self.authenticated(bearer).await?;
                session.delete(&params.key).await;
                Ok(json!({"ok": true}))
            }
            other => Err(Error::MethodNotFound(other.to_string())),
        }
    }

    /// `initialize` ignores auth and always creates a new session.
    pub async fn initialize(&self) -> Result<Value> {
        let session_id = self.sessions.create_session().await;
        Ok(json!({
            "serverId": self.server_id,
            "protocolVersion": PROTOCOL_VERSION,
            "sessionId": session_id.as_str(),
            "serverTime": iso_now(),
        }))
    }

    fn list_tools(&self) -> Result<Value> {
        Ok(json!({ "tools": self.registry.list() }))
    }

    /// Look up, validate, then run the handler under a fan-out permit.
    pub async fn invoke_tool(&self, id: &ToolId, args: Map<String, Value>) -> Result<Value> {
        let descriptor = self
            .registry
            .get(id)
            .ok_or_else(|| Error::ToolNotFound(id.to_string()))?;
        validate_arguments(descriptor, &args)?;

        let handler = self
            .registry
            .handler(id)
            .ok_or_else(|| Error::ToolNotFound(id.to_string()))?;

        let _permit = self
            .invoke_permits
            .clone()
            .acquire_owned()
            .await
            .map_err(|_| Error::Internal("Invocation limiter closed".into()))?;

        handler.invoke(&args).await
    }

    async fn authenticated(
        &self,
        bearer: Option<&str>,
    ) -> Result<Arc<crate::session::SessionEntry>> {
        let token = bearer.ok_or_else(|| Error::Unauthorized("Missing bearer token".into()))?;
        self.sessions.authenticate(token).await
    }
}

fn parse_params<T: serde::de::DeserializeOwned>(params: Option<Value>) -> Result<T> {
    serde_json::from_value(params.unwrap_or(Value::Null))
        .map_err(|e| Error::Validation(format!("Invalid params: {e}")))
}

fn iso_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
