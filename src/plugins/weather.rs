//! The `weather.fake` tool: random weather report for demos.

use crate::catalog::Catalog;
use crate::config::GatewayConfig;
use crate::error::Result;
use crate::registry::{ParamType, ToolHandler, ToolParam, ToolRegistry};
use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde_json::{json, Map, Value};
use std::sync::Arc;

const CONDITIONS: &[&str] = &["sunny", "cloudy", "rainy", "windy"];

pub fn register(
    registry: &mut ToolRegistry,
    _config: &GatewayConfig,
    _catalog: &Arc<Catalog>,
) -> Result<()> {
    registry.register(
        "weather.fake",
        "Random weather",
        vec![ToolParam::required(
            "location",
            ParamType::String,
            "City or coordinates",
        )],
        Arc::new(WeatherHandler),
    )?;
    Ok(())
}

struct WeatherHandler;

#[async_trait]
impl ToolHandler for WeatherHandler {
    async fn invoke(&self, args: &Map<String, Value>) -> Result<Value> {
        let (temperature, condition) = {
            let mut rng = rand::thread_rng();
            let t: f64 = rng.gen_range(15.0..30.0);
            ((t * 10.0).round() / 10.0, *CONDITIONS.choose(&mut rng).unwrap_or(&"sunny"))
        };
        Ok(json!({
            "location": args["location"],
            "temperature_c": temperature,
            "condition": condition,
            "observed": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_report_shape() {
        let mut args = Map::new();
        args.insert("location".to_string(), json!("Berlin"));

        let result = WeatherHandler.invoke(&args).await.unwrap();
        assert_eq!(result["location"], json!("Berlin"));

        let temperature = result["temperature_c"].as_f64().unwrap();
        assert!((15.0..=30.0).contains(&temperature));
        assert!(CONDITIONS.contains(&result["condition"].as_str().unwrap()));
    }
}
