//! Core types for the MCP server: the tool trait, tool errors, and results.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use lakegate_client::ApiClient;

use crate::protocol::ToolDefinition;

// =============================================================================
// Tool Error Types
// =============================================================================

/// Errors that can occur during tool execution.
///
/// Each variant maps to a distinct JSON-RPC-style code so the dispatching
/// layer can render failures without parsing message text.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Invalid or missing parameters, including safety-gate rejections
    #[error("Invalid parameters: {0}")]
    InvalidParams(String),

    /// Referenced entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// The remote operation reached a terminal-failure state
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// Local deadline expired while the remote operation was still pending
    #[error("{0}")]
    Timeout(String),

    /// The HTTP exchange itself failed
    #[error("{0}")]
    Transport(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ToolError {
    /// Get the JSON-RPC error code for this error type
    pub fn error_code(&self) -> i32 {
        match self {
            ToolError::InvalidParams(_) => -32602,
            ToolError::NotFound(_) => -32001,
            ToolError::ExecutionFailed(_) => -32002,
            ToolError::Timeout(_) => -32003,
            ToolError::Transport(_) => -32004,
            ToolError::Internal(_) => -32603,
            ToolError::Serialization(_) => -32700,
            ToolError::Io(_) => -32603,
        }
    }
}

impl From<lakegate_client::Error> for ToolError {
    fn from(err: lakegate_client::Error) -> Self {
        use lakegate_client::Error;
        match err {
            Error::MissingArgument(_) | Error::Config(_) | Error::Rejected(_) => {
                ToolError::InvalidParams(err.to_string())
            }
            Error::Timeout { .. } => ToolError::Timeout(err.to_string()),
            Error::OperationFailed { .. } => ToolError::ExecutionFailed(err.to_string()),
            Error::Http { .. } => ToolError::Transport(err.to_string()),
            Error::UnexpectedResponse(_) => ToolError::ExecutionFailed(err.to_string()),
        }
    }
}

// =============================================================================
// Tool Trait
// =============================================================================

/// JSON Schema for tool input parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInputSchema {
    /// Schema type (always "object" for MCP tools)
    #[serde(rename = "type")]
    pub schema_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<serde_json::Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<Vec<String>>,
}

impl ToolInputSchema {
    pub fn new() -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: None,
            required: None,
        }
    }

    pub fn with_properties(properties: serde_json::Value, required: Vec<String>) -> Self {
        Self {
            schema_type: "object".to_string(),
            properties: Some(properties),
            required: if required.is_empty() {
                None
            } else {
                Some(required)
            },
        }
    }
}

impl Default for ToolInputSchema {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    /// Content blocks returned by the tool
    pub content: Vec<ToolContent>,

    /// Whether this result indicates an error
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResult {
    /// Create a successful text result
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    /// Create a successful result from a serializable value
    pub fn json<T: Serialize>(value: &T) -> Result<Self, ToolError> {
        let text = serde_json::to_string(value)?;
        Ok(Self {
            content: vec![ToolContent::Text { text }],
            is_error: false,
        })
    }

    /// Create an error result
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ToolContent::Text {
                text: message.into(),
            }],
            is_error: true,
        }
    }
}

/// Content types that can be returned by tools
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ToolContent {
    Text { text: String },

    Image { data: String, mime_type: String },

    Resource { uri: String, mime_type: Option<String> },
}

/// Shared state handed to every tool execution.
pub struct ToolContext {
    /// HTTP client bound to the configured workspace
    pub api: ApiClient,
}

impl ToolContext {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

/// Trait for implementing MCP tools
///
/// Each tool must provide:
/// - A unique name
/// - A description for the assistant to understand when to use it
/// - An input schema defining expected parameters
/// - An async execute method that performs the tool's action
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name of the tool
    fn name(&self) -> &'static str;

    /// Human-readable description of what the tool does
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters
    fn input_schema(&self) -> ToolInputSchema;

    /// Execute the tool with the given arguments
    async fn execute(
        &self,
        args: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError>;

    /// Get the tool definition for tools/list
    fn definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: serde_json::to_value(self.input_schema())
                .unwrap_or_else(|_| serde_json::json!({"type": "object"})),
        }
    }
}

/// Deserialize a tool's argument object into its typed form.
///
/// A null/absent argument object is treated as empty so tools whose
/// parameters are all optional accept a bare call.
pub fn parse_args<T: DeserializeOwned>(args: serde_json::Value) -> Result<T, ToolError> {
    let args = if args.is_null() {
        serde_json::Value::Object(Default::default())
    } else {
        args
    };
    serde_json::from_value(args).map_err(|e| ToolError::InvalidParams(e.to_string()))
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tool_result_text() {
        let result = ToolResult::text("Hello, world!");
        assert!(!result.is_error);
        assert_eq!(result.content.len(), 1);
    }

    #[test]
    fn test_tool_result_json() {
        #[derive(Serialize)]
        struct Data {
            value: i32,
        }
        let result = ToolResult::json(&Data { value: 42 }).unwrap();
        assert!(!result.is_error);
    }

    #[test]
    fn test_tool_result_error() {
        let result = ToolResult::error("Something went wrong");
        assert!(result.is_error);
    }

    #[test]
    fn test_tool_error_codes() {
        assert_eq!(ToolError::InvalidParams("".into()).error_code(), -32602);
        assert_eq!(ToolError::NotFound("".into()).error_code(), -32001);
        assert_eq!(ToolError::ExecutionFailed("".into()).error_code(), -32002);
        assert_eq!(ToolError::Timeout("".into()).error_code(), -32003);
        assert_eq!(ToolError::Transport("".into()).error_code(), -32004);
        assert_eq!(ToolError::Internal("".into()).error_code(), -32603);
    }

    #[test]
    fn test_client_errors_map_to_distinct_kinds() {
        use lakegate_client::Error;

        let err: ToolError = Error::MissingArgument("warehouse_id required".into()).into();
        assert_eq!(err.error_code(), -32602);

        let err: ToolError = Error::Timeout {
            operation: "SQL statement s1".into(),
            waited_secs: 300,
        }
        .into();
        assert_eq!(err.error_code(), -32003);
        assert!(err.to_string().contains("s1"));

        let err: ToolError = Error::OperationFailed {
            message: "Query execution failed: syntax error".into(),
            payload: serde_json::json!({}),
        }
        .into();
        assert_eq!(err.error_code(), -32002);

        let err: ToolError = Error::Http {
            method: "GET".into(),
            url: "https://example.databricks.net/api".into(),
            status: Some(500),
            message: "500 - boom".into(),
            body: None,
        }
        .into();
        assert_eq!(err.error_code(), -32004);
    }

    #[test]
    fn test_parse_args_null_becomes_empty_object() {
        #[derive(Deserialize)]
        struct Args {
            #[serde(default)]
            limit: Option<u64>,
        }
        let args: Args = parse_args(serde_json::Value::Null).unwrap();
        assert!(args.limit.is_none());
    }

    #[test]
    fn test_parse_args_reports_missing_fields() {
        #[derive(Debug, Deserialize)]
        struct Args {
            #[allow(dead_code)]
            statement: String,
        }
        let err = parse_args::<Args>(serde_json::json!({})).unwrap_err();
        assert_eq!(err.error_code(), -32602);
        assert!(err.to_string().contains("statement"));
    }

    #[test]
    fn test_input_schema_shape() {
        let schema = ToolInputSchema::with_properties(
            serde_json::json!({"path": {"type": "string"}}),
            vec!["path".to_string()],
        );
        let value = serde_json::to_value(&schema).unwrap();
        assert_eq!(value["type"], "object");
        assert_eq!(value["required"][0], "path");
    }
}
