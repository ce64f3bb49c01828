//! MCP verb protocol: request/response envelopes and the verb dispatcher.

pub mod dispatcher;
pub mod statement;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::database::JsonRow;

pub use dispatcher::Dispatcher;

/// HTTP body wrapper: `{"mcp_request": {...}}`
#[derive(Debug, Clone, Deserialize)]
pub struct QueryBody {
    pub mcp_request: McpRequest,
}

/// A verb plus its optional parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct McpRequest {
    #[serde(default)]
    pub verb: Value,
    #[serde(default)]
    pub parameters: Option<Map<String, Value>>,
}

impl McpRequest {
    pub fn new(verb: impl Into<String>, parameters: Value) -> Self {
        Self {
            verb: Value::String(verb.into()),
            parameters: match parameters {
                Value::Object(map) => Some(map),
                _ => None,
            },
        }
    }

    /// Non-empty string parameter, or None
    pub fn string_param(&self, key: &str) -> Option<&str> {
        self.parameters
            .as_ref()?
            .get(key)?
            .as_str()
            .filter(|s| !s.is_empty())
    }

    /// Verb as shown in error messages: the string itself, or its JSON form
    pub fn verb_label(&self) -> String {
        match &self.verb {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resource {
    pub name: String,
    pub description: String,
}

impl Resource {
    pub fn table(name: impl Into<String>) -> Self {
        let name = name.into();
        let description = format!("Table: {}", name);
        Self { name, description }
    }
}

/// The four response shapes
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum McpResponse {
    Resources { resources: Vec<Resource> },
    Data { data: Vec<JsonRow> },
    Results { results: Vec<JsonRow> },
    Error { error: String },
}

impl McpResponse {
    pub fn error(message: impl Into<String>) -> Self {
        McpResponse::Error { error: message.into() }
    }

    /// Soft error message, if this is the error shape
    pub fn error_message(&self) -> Option<&str> {
        match self {
            McpResponse::Error { error } => Some(error),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_wrapped_request() {
        let body: QueryBody = serde_json::from_value(json!({
            "mcp_request": {"verb": "read", "parameters": {"name": "users"}}
        }))
        .unwrap();
        assert_eq!(body.mcp_request.verb_label(), "read");
        assert_eq!(body.mcp_request.string_param("name"), Some("users"));
    }

    #[test]
    fn parameters_are_optional() {
        let req: McpRequest = serde_json::from_value(json!({"verb": "list_resources"})).unwrap();
        assert!(req.parameters.is_none());
        assert_eq!(req.string_param("name"), None);
    }

    #[test]
    fn empty_and_non_string_params_are_absent() {
        let req = McpRequest::new("read", json!({"name": "", "statement": 7}));
        assert_eq!(req.string_param("name"), None);
        assert_eq!(req.string_param("statement"), None);
    }

    #[test]
    fn missing_verb_labels_as_null() {
        let req: McpRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(req.verb_label(), "null");
    }

    #[test]
    fn response_shapes_serialize_to_single_key() {
        let resources = McpResponse::Resources { resources: vec![Resource::table("orders")] };
        assert_eq!(
            serde_json::to_value(&resources).unwrap(),
            json!({"resources": [{"name": "orders", "description": "Table: orders"}]})
        );
        assert_eq!(
            serde_json::to_value(McpResponse::Data { data: vec![] }).unwrap(),
            json!({"data": []})
        );
        assert_eq!(
            serde_json::to_value(McpResponse::Results { results: vec![] }).unwrap(),
            json!({"results": []})
        );
        assert_eq!(
            serde_json::to_value(McpResponse::error("nope")).unwrap(),
            json!({"error": "nope"})
        );
    }
}
