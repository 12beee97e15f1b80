//! Tool descriptors and the tool registry.
//!
//! Tools are registered once at startup by the plugin manifest and the
//! registry is shared behind `Arc` afterwards, so concurrent invocation
//! never races with registration and enumeration needs no lock.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Opaque tool identifier, assigned at registration.
///
/// Ids are sequential within a run, so an unchanged plugin set yields the
/// same ids across restarts and clients may cache `tools/list` output.
#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolId(pub String);

impl ToolId {
    fn from_index(index: usize) -> Self {
        Self(format!("tool-{:04}", index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ToolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for ToolId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Parameter type tags, checked structurally against the supplied value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Any,
}

impl ParamType {
    /// Permissive structural check
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Number => value.is_number(),
            ParamType::Boolean => value.is_boolean(),
            ParamType::Object => value.is_object(),
            ParamType::Array => value.is_array(),
            ParamType::Any => true,
        }
    }
}

/// One accepted input parameter of a tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolParam {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub description: String,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl ToolParam {
    pub fn required(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
            required: true,
        }
    }

    pub fn optional(name: &str, param_type: ParamType, description: &str) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            description: description.to_string(),
            required: false,
        }
    }
}

/// Immutable metadata for one registered tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub id: ToolId,
    pub name: String,
    pub description: String,
    pub parameters: Vec<ToolParam>,
}

/// The callable behind a tool.
///
/// `args` arrive already validated against the descriptor's required list
/// and type tags. Handlers may perform external I/O; they must only
/// suspend their own execution path.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    async fn invoke(&self, args: &Map<String, Value>) -> Result<Value>;
}

struct RegisteredTool {
    descriptor: ToolDescriptor,
    handler: Arc<dyn ToolHandler>,
}

/// Registry of all callable tools, insertion-ordered.
///
/// Built mutably during plugin loading, then frozen behind `Arc`.
#[derive(Default)]
pub struct ToolRegistry {
    order: Vec<ToolId>,
    tools: HashMap<ToolId, RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, assigning a fresh unique id.
    ///
    /// Fails only on a malformed schema (empty name, duplicate parameter
    /// names). Duplicate tool *names* across registrations are allowed;
    /// only the id is a uniqueness key.
    pub fn register(
        &mut self,
        name: &str,
        description: &str,
        parameters: Vec<ToolParam>,
        handler: Arc<dyn ToolHandler>,
    ) -> Result<ToolId> {
        if name.is_empty() {
            return Err(Error::InvalidRequest("Tool name must not be empty".into()));
        }
        for (i, param) in parameters.iter().enumerate() {
            if parameters[..i].iter().any(|p| p.name == param.name) {
                return Err(Error::InvalidRequest(format!(
                    "Duplicate parameter name '{}' in tool '{}'",
                    param.name, name
                )));
            }
        }

        let id = ToolId::from_index(self.order.len() + 1);
        let descriptor = ToolDescriptor {
            id: id.clone(),
            name: name.to_string(),
            description: description.to_string(),
            parameters,
        };

        info!(tool_id = %id, tool_name = %name, "Registered tool");

        self.order.push(id.clone());
        self.tools.insert(
            id.clone(),
            RegisteredTool {
                descriptor,
                handler,
            },
        );
        Ok(id)
    }

    /// Look up a descriptor by id
    pub fn get(&self, id: &ToolId) -> Option<&ToolDescriptor> {
        self.tools.get(id).map(|t| &t.descriptor)
    }

    /// Look up a handler by id
    pub fn handler(&self, id: &ToolId) -> Option<Arc<dyn ToolHandler>> {
        self.tools.get(id).map(|t| Arc::clone(&t.handler))
    }

    /// First descriptor registered under `name` (display and test lookup only)
    pub fn get_by_name(&self, name: &str) -> Option<&ToolDescriptor> {
        self.order
            .iter()
            .filter_map(|id| self.tools.get(id))
            .map(|t| &t.descriptor)
            .find(|d| d.name == name)
    }

    /// All descriptors in registration order
    pub fn list(&self) -> Vec<&ToolDescriptor> {
        self.order
            .iter()
            .filter_map(|id| self.tools.get(id))
            .map(|t| &t.descriptor)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Validate supplied arguments against a descriptor.
///
/// Required fields must be present and every supplied field whose name is
/// declared must match its type tag; undeclared extra fields pass through
/// untouched (permissive check).
pub fn validate_arguments(descriptor: &ToolDescriptor, args: &Map<String, Value>) -> Result<()> {
    for param in &descriptor.parameters {
        match args.get(&param.name) {
            Some(value) => {
                if !param.param_type.matches(value) {
                    return Err(Error::Validation(format!(
                        "Parameter '{}' of tool '{}' expects type {:?}",
                        param.name, descriptor.name, param.param_type
                    )));
                }
            }
            None if param.required => {
                return Err(Error::Validation(format!(
                    "Missing required parameter '{}' for tool '{}'",
                    param.name, descriptor.name
                )));
            }
            None => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct NullHandler;

    #[async_trait]
    impl ToolHandler for NullHandler {
        async fn invoke(&self, _args: &Map<String, Value>) -> Result<Value> {
            Ok(Value::Null)
        }
    }

    fn text_param() -> Vec<ToolParam> {
        vec![ToolParam::required(
            "text",
            ParamType::String,
            "Text to echo",
        )]
    }

    #[test]
    fn test_register_assigns_sequential_ids() {
        let mut registry = ToolRegistry::new();
        let a = registry
            .register("echo", "Echo back text", text_param(), Arc::new(NullHandler))
            .unwrap();
        let b = registry
            .register("weather.fake", "Random weather", vec![], Arc::new(NullHandler))
            .unwrap();

        assert_eq!(a.as_str(), "tool-0001");
        assert_eq!(b.as_str(), "tool-0002");
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_list_preserves_registration_order() {
        let mut registry = ToolRegistry::new();
        for name in ["c", "a", "b"] {
            registry
                .register(name, "", vec![], Arc::new(NullHandler))
                .unwrap();
        }
        let names: Vec<&str> = registry.list().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_duplicate_names_allowed_duplicate_params_rejected() {
        let mut registry = ToolRegistry::new();
        registry
            .register("echo", "first", vec![], Arc::new(NullHandler))
            .unwrap();
        // same name from a different plugin is fine; only ids are unique
        registry
            .register("echo", "second", vec![], Arc::new(NullHandler))
            .unwrap();

        let params = vec![
            ToolParam::required("q", ParamType::String, ""),
            ToolParam::required("q", ParamType::Number, ""),
        ];
        let err = registry
            .register("bad", "", params, Arc::new(NullHandler))
            .unwrap_err();
        assert!(err.to_string().contains("Duplicate parameter"));
    }

    #[test]
    fn test_validate_arguments() {
        let mut registry = ToolRegistry::new();
        let id = registry
            .register("echo", "", text_param(), Arc::new(NullHandler))
            .unwrap();
        let descriptor = registry.get(&id).unwrap();

        let mut args = Map::new();
        args.insert("text".to_string(), json!("hi"));
        assert!(validate_arguments(descriptor, &args).is_ok());

        let empty = Map::new();
        assert!(matches!(
            validate_arguments(descriptor, &empty),
            Err(Error::Validation(_))
        ));

        let mut wrong = Map::new();
        wrong.insert("text".to_string(), json!(5));
        assert!(matches!(
            validate_arguments(descriptor, &wrong),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_optional_params_may_be_absent() {
        let mut registry = ToolRegistry::new();
        let id = registry
            .register(
                "openai.chat",
                "",
                vec![
                    ToolParam::required("prompt", ParamType::String, ""),
                    ToolParam::optional("model", ParamType::String, ""),
                ],
                Arc::new(NullHandler),
            )
            .unwrap();
        let descriptor = registry.get(&id).unwrap();

        let mut args = Map::new();
        args.insert("prompt".to_string(), json!("hello"));
        assert!(validate_arguments(descriptor, &args).is_ok());
    }

    #[test]
    fn test_get_by_name_returns_first_match() {
        let mut registry = ToolRegistry::new();
        let first = registry
            .register("echo", "first", vec![], Arc::new(NullHandler))
            .unwrap();
        registry
            .register("echo", "second", vec![], Arc::new(NullHandler))
            .unwrap();

        assert_eq!(registry.get_by_name("echo").unwrap().id, first);
        assert!(registry.get_by_name("missing").is_none());
    }
}
