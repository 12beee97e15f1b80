//! The `openai.chat` tool: chat completion via an OpenAI-compatible endpoint.
//!
//! The tool registers even without an API key; a missing key surfaces as
//! a handler-level failure at invoke time.

use crate::catalog::Catalog;
use crate::config::{GatewayConfig, OpenAiConfig};
use crate::error::{Error, Result};
use crate::registry::{ParamType, ToolHandler, ToolParam, ToolRegistry};
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use std::time::Duration;

pub fn register(
    registry: &mut ToolRegistry,
    config: &GatewayConfig,
    _catalog: &Arc<Catalog>,
) -> Result<()> {
    let openai = config.openai.clone().unwrap_or_default();
    registry.register(
        "openai.chat",
        "Chat completion via an OpenAI-compatible API",
        vec![
            ToolParam::required("prompt", ParamType::String, "User prompt"),
            ToolParam::optional("model", ParamType::String, "Model override"),
        ],
        Arc::new(ChatHandler::new(openai)?),
    )?;
    Ok(())
}

struct ChatHandler {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl ChatHandler {
    fn new(config: OpenAiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl ToolHandler for ChatHandler {
    async fn invoke(&self, args: &Map<String, Value>) -> Result<Value> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .ok_or_else(|| Error::Handler("OPENAI_API_KEY not configured".into()))?;

        let prompt = args["prompt"].as_str().unwrap_or_default();
        let model = args
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or(&self.config.default_model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.config.api_base))
            .bearer_auth(api_key)
            .json(&json!({
                "model": model,
                "messages": [{"role": "user", "content": prompt}],
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Handler(format!("Model error ({status}): {body}")));
        }

        let body: Value = response.json().await?;
        let reply = body["choices"][0]["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();
        Ok(json!({ "reply": reply }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_api_key_is_handler_error() {
        let handler = ChatHandler::new(OpenAiConfig::default()).unwrap();
        let mut args = Map::new();
        args.insert("prompt".to_string(), json!("hello"));

        match handler.invoke(&args).await {
            Err(Error::Handler(msg)) => assert!(msg.contains("OPENAI_API_KEY")),
            other => panic!("Expected handler error, got {other:?}"),
        }
    }
}
