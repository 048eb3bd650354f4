//! Plugin system
//!
//! Each BICS API family is a plugin implementing [`ApiPlugin`]. Plugins are
//! schema-agnostic: they validate string arguments, build a path, and hand
//! back the raw JSON body from the API.

use crate::error::PluginError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Operation definition exposed to callers that dispatch by name
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the argument object
    pub parameters: Value,
}

impl OperationDefinition {
    /// All arguments are strings; `required` ones must be non-empty
    pub fn new(name: &str, description: &str, required: &[&str], optional: &[&str]) -> Self {
        let mut properties = Map::new();
        for field in required.iter().chain(optional) {
            properties.insert(field.to_string(), json!({ "type": "string" }));
        }

        Self {
            name: name.to_string(),
            description: description.to_string(),
            parameters: json!({
                "type": "object",
                "properties": properties,
                "required": required,
            }),
        }
    }
}

#[async_trait]
pub trait ApiPlugin: Send + Sync {
    /// Registry name, also used in error messages
    fn name(&self) -> &str;

    /// Base URL currently in effect
    fn base_url(&self) -> &str;

    /// Operations this plugin answers to
    fn operations(&self) -> Vec<OperationDefinition>;

    /// Run an operation by name with a JSON object of string arguments
    async fn invoke(&self, operation: &str, args: &Value) -> Result<String, PluginError>;

    fn has_operation(&self, operation: &str) -> bool {
        self.operations().iter().any(|op| op.name == operation)
    }
}

/// Fail unless `value` is non-empty
pub fn require<'a>(
    plugin: &str,
    operation: &str,
    value: &'a str,
    field: &str,
) -> Result<&'a str, PluginError> {
    if value.is_empty() {
        Err(PluginError::validation(
            plugin,
            operation,
            format!("{} is required", field),
        ))
    } else {
        Ok(value)
    }
}

/// Error for an operation name the plugin does not know
pub fn unknown_operation(plugin: &str, operation: &str) -> PluginError {
    PluginError::validation(plugin, operation, format!("Unknown operation: {}", operation))
}

/// Argument object passed to [`ApiPlugin::invoke`]
pub struct Args<'a> {
    plugin: &'a str,
    operation: &'a str,
    map: Option<&'a Map<String, Value>>,
}

impl<'a> Args<'a> {
    /// `null` is treated as an empty object; anything else must be an object
    pub fn parse(plugin: &'a str, operation: &'a str, value: &'a Value) -> Result<Self, PluginError> {
        let map = match value {
            Value::Null => None,
            Value::Object(map) => Some(map),
            _ => {
                return Err(PluginError::validation(
                    plugin,
                    operation,
                    "Arguments must be a JSON object",
                ))
            }
        };

        Ok(Self {
            plugin,
            operation,
            map,
        })
    }

    /// String argument; numbers and booleans are rendered as text
    pub fn optional(&self, key: &str) -> Result<Option<String>, PluginError> {
        match self.map.and_then(|m| m.get(key)) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::String(s)) => Ok(Some(s.clone())),
            Some(Value::Number(n)) => Ok(Some(n.to_string())),
            Some(Value::Bool(b)) => Ok(Some(b.to_string())),
            Some(Value::Object(_)) | Some(Value::Array(_)) => Err(PluginError::validation(
                self.plugin,
                self.operation,
                format!("Argument '{}' must be a string", key),
            )),
        }
    }

    /// Like [`Args::optional`], but absent becomes empty so the operation's
    /// own validation reports it
    pub fn string(&self, key: &str) -> Result<String, PluginError> {
        Ok(self.optional(key)?.unwrap_or_default())
    }
}
