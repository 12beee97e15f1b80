//! The `echo` tool: returns the supplied text with a server timestamp.

use crate::catalog::Catalog;
use crate::config::GatewayConfig;
use crate::error::Result;
use crate::registry::{ParamType, ToolHandler, ToolParam, ToolRegistry};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Map, Value};
use std::sync::Arc;

pub fn register(
    registry: &mut ToolRegistry,
    _config: &GatewayConfig,
    _catalog: &Arc<Catalog>,
) -> Result<()> {
    registry.register(
        "echo",
        "Echo back text",
        vec![ToolParam::required("text", ParamType::String, "Text to echo")],
        Arc::new(EchoHandler),
    )?;
    Ok(())
}

struct EchoHandler;

#[async_trait]
impl ToolHandler for EchoHandler {
    async fn invoke(&self, args: &Map<String, Value>) -> Result<Value> {
        Ok(json!({
            "echo": args["text"],
            "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }))
    }
}
