//! The `file.search` tool: keyword search over resource descriptions.

use crate::catalog::Catalog;
use crate::config::GatewayConfig;
use crate::error::Result;
use crate::registry::{ParamType, ToolHandler, ToolParam, ToolRegistry};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

pub fn register(
    registry: &mut ToolRegistry,
    _config: &GatewayConfig,
    catalog: &Arc<Catalog>,
) -> Result<()> {
    registry.register(
        "file.search",
        "Search resource descriptions",
        vec![ToolParam::required("query", ParamType::String, "Keyword")],
        Arc::new(FileSearchHandler {
            catalog: Arc::clone(catalog),
        }),
    )?;
    Ok(())
}

struct FileSearchHandler {
    catalog: Arc<Catalog>,
}

#[async_trait]
impl ToolHandler for FileSearchHandler {
    async fn invoke(&self, args: &Map<String, Value>) -> Result<Value> {
        let term = args["query"].as_str().unwrap_or_default();
        Ok(json!({ "matches": self.catalog.search_resources(term) }))
    }
}
