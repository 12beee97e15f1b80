//! Read-only resource and prompt registries.
//!
//! Both are fixed at startup and shared behind `Arc`, like the tool
//! registry; there is no mutation path, so enumeration and search need
//! no lock.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// A readable resource advertised to clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    pub uri: String,
    pub description: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

/// A reusable prompt template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prompt {
    pub id: String,
    pub name: String,
    pub description: String,
    pub template: String,
}

/// The built-in resource and prompt sets.
#[derive(Debug, Default)]
pub struct Catalog {
    resources: Vec<Resource>,
    prompts: Vec<Prompt>,
}

impl Catalog {
    /// The sample data every deployment starts with.
    pub fn builtin() -> Self {
        let mut metadata = Map::new();
        metadata.insert("author".to_string(), json!("system"));
        metadata.insert(
            "created".to_string(),
            json!(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );

        Self {
            resources: vec![Resource {
                uri: "memory://welcome-note".to_string(),
                description: "Welcome note explaining how to use the demo MCP server"
                    .to_string(),
                metadata,
            }],
            prompts: vec![Prompt {
                id: "hello-world".to_string(),
                name: "Hello World".to_string(),
                description: "Greets the user".to_string(),
                template: "You are a helpful AI. Greet the user.".to_string(),
            }],
        }
    }

    pub fn resources(&self) -> &[Resource] {
        &self.resources
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    /// Case-insensitive keyword search over resource descriptions
    pub fn search_resources(&self, term: &str) -> Vec<&Resource> {
        let term = term.to_lowercase();
        self.resources
            .iter()
            .filter(|r| r.description.to_lowercase().contains(&term))
            .collect()
    }
}
