//! Layered configuration: defaults, then a TOML file, then environment.

use crate::error::{Error, Result};
use crate::session::SessionConfig;
use serde::{Deserialize, Serialize};

fn config_error(e: config::ConfigError) -> Error {
    Error::Config(e.to_string())
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub invoke: InvokeConfig,
    pub stream: StreamConfig,
    #[serde(default)]
    pub plugins: PluginsConfig,
    pub openai: Option<OpenAiConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub log_level: String,
    pub log_json: bool,
}

/// Bounded fan-out to external backends
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvokeConfig {
    pub max_concurrent: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    pub heartbeat_interval_seconds: u64,
    pub idle_timeout_seconds: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginsConfig {
    /// Plugin names from the manifest that must not be loaded
    #[serde(default)]
    pub disabled: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    pub default_model: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_addr: "127.0.0.1:8080".to_string(),
                log_level: "info".to_string(),
                log_json: false,
            },
            session: SessionConfig::default(),
            invoke: InvokeConfig { max_concurrent: 32 },
            stream: StreamConfig {
                heartbeat_interval_seconds: 30,
                idle_timeout_seconds: 300,
            },
            plugins: PluginsConfig::default(),
            openai: None,
        }
    }
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_base: "https://api.openai.com/v1".to_string(),
            api_key: None,
            default_model: "gpt-4o-mini".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration: defaults, then the first config file found,
    /// then `GATEWAY_*` environment variables.
    pub fn load() -> Result<Self> {
        let mut settings = config::Config::builder();

        let default_config = GatewayConfig::default();
        settings = settings
            .add_source(config::Config::try_from(&default_config).map_err(config_error)?);

        let config_paths = ["gateway.toml", "config.toml", "config/gateway.toml"];
        for path in &config_paths {
            if std::path::Path::new(path).exists() {
                settings = settings.add_source(config::File::with_name(path));
                break;
            }
        }

        settings = settings.add_source(
            config::Environment::with_prefix("GATEWAY")
                .separator("__")
                .try_parsing(true),
        );

        let config: GatewayConfig = settings
            .build()
            .map_err(config_error)?
            .try_deserialize()
            .map_err(config_error)?;

        // Unprefixed overrides commonly set in container deployments.
        let mut final_config = config;
        if let Ok(bind_addr) = std::env::var("BIND_ADDR") {
            final_config.server.bind_addr = bind_addr;
        }
        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            let openai = final_config.openai.get_or_insert_with(OpenAiConfig::default);
            openai.api_key = Some(api_key);
        }

        Ok(final_config)
    }
}
