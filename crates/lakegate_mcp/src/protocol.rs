//! MCP protocol implementation.
//!
//! Handles JSON-RPC 2.0 over stdio: newline-delimited requests in, responses
//! out. Stdout carries nothing but protocol frames; logging goes to stderr
//! and the log file.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{BufRead, Write};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin, Stdout};
use tracing::{debug, error, trace};

use crate::types::ToolError;

pub const JSONRPC_VERSION: &str = "2.0";
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

/// Method names the server dispatches on.
pub mod methods {
    pub const INITIALIZE: &str = "initialize";
    pub const INITIALIZED: &str = "notifications/initialized";
    pub const TOOLS_LIST: &str = "tools/list";
    pub const TOOLS_CALL: &str = "tools/call";
    pub const PING: &str = "ping";
}

// =============================================================================
// JSON-RPC Types
// =============================================================================

/// JSON-RPC 2.0 Request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    /// JSON-RPC version (always "2.0")
    pub jsonrpc: String,

    /// Request ID (absent for notifications)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<RequestId>,

    /// Method name
    pub method: String,

    /// Method parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

/// JSON-RPC 2.0 Response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,

    pub id: RequestId,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    pub fn success(id: RequestId, result: Value) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: RequestId, error: JsonRpcError) -> Self {
        Self {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// JSON-RPC 2.0 Error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcError {
    /// Parse error (-32700)
    pub fn parse_error(message: impl Into<String>) -> Self {
        Self {
            code: -32700,
            message: message.into(),
            data: None,
        }
    }

    /// Invalid request (-32600)
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            code: -32600,
            message: message.into(),
            data: None,
        }
    }

    /// Method not found (-32601)
    pub fn method_not_found(method: impl Into<String>) -> Self {
        Self {
            code: -32601,
            message: format!("Method not found: {}", method.into()),
            data: None,
        }
    }

    /// Invalid params (-32602)
    pub fn invalid_params(message: impl Into<String>) -> Self {
        Self {
            code: -32602,
            message: message.into(),
            data: None,
        }
    }

    /// Internal error (-32603)
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self {
            code: -32603,
            message: message.into(),
            data: None,
        }
    }

    pub fn from_tool_error(err: &ToolError) -> Self {
        Self {
            code: err.error_code(),
            message: err.to_string(),
            data: None,
        }
    }
}

/// Request ID (string, number, or null)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(untagged)]
pub enum RequestId {
    String(String),
    Number(i64),
    #[default]
    Null,
}

// =============================================================================
// MCP-Specific Types
// =============================================================================

/// MCP Initialize request params
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeParams {
    pub protocol_version: String,

    #[serde(default)]
    pub capabilities: Value,

    pub client_info: ClientInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientInfo {
    pub name: String,
    pub version: String,
}

/// MCP Initialize result
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub protocol_version: String,
    pub capabilities: ServerCapabilities,
    pub server_info: ServerInfo,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerCapabilities {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<ToolsCapability>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolsCapability {
    pub list_changed: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerInfo {
    pub name: String,
    pub version: String,
}

/// Tool definition for tools/list response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// tools/list result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsListResult {
    pub tools: Vec<ToolDefinition>,
}

/// tools/call params
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsCallParams {
    pub name: String,

    #[serde(default)]
    pub arguments: Value,
}

// =============================================================================
// Protocol Handler
// =============================================================================

/// Async protocol handler for JSON-RPC over stdio.
pub struct McpProtocol {
    stdin: BufReader<Stdin>,
    stdout: Stdout,
}

impl McpProtocol {
    pub fn new() -> Self {
        Self {
            stdin: BufReader::new(tokio::io::stdin()),
            stdout: tokio::io::stdout(),
        }
    }

    /// Read the next request. Returns None at EOF.
    pub async fn read_request(&mut self) -> Result<Option<JsonRpcRequest>, ToolError> {
        loop {
            let mut line = String::new();

            match self.stdin.read_line(&mut line).await {
                Ok(0) => {
                    debug!("stdin closed (EOF)");
                    return Ok(None);
                }
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    trace!("Received: {}", trimmed);

                    let request: JsonRpcRequest = serde_json::from_str(trimmed).map_err(|e| {
                        error!("Failed to parse request: {}", e);
                        ToolError::Serialization(e)
                    })?;

                    debug!("Parsed request: method={}", request.method);
                    return Ok(Some(request));
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    return Err(ToolError::Io(e));
                }
            }
        }
    }

    /// Write one response frame and flush.
    pub async fn write_response(&mut self, response: &JsonRpcResponse) -> Result<(), ToolError> {
        let json = serde_json::to_string(response)?;
        trace!("Sending: {}", json);

        self.stdout
            .write_all(json.as_bytes())
            .await
            .map_err(ToolError::Io)?;
        self.stdout.write_all(b"\n").await.map_err(ToolError::Io)?;
        self.stdout.flush().await.map_err(ToolError::Io)?;

        Ok(())
    }
}

impl Default for McpProtocol {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Synchronous Protocol Handler (for testing)
// =============================================================================

/// Synchronous protocol handler over arbitrary reader/writer pairs.
pub struct SyncProtocol<R: BufRead, W: Write> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> SyncProtocol<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn read_request(&mut self) -> Result<Option<JsonRpcRequest>, ToolError> {
        loop {
            let mut line = String::new();

            match self.reader.read_line(&mut line) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let request: JsonRpcRequest = serde_json::from_str(trimmed)?;
                    return Ok(Some(request));
                }
                Err(e) => return Err(ToolError::Io(e)),
            }
        }
    }

    pub fn write_response(&mut self, response: &JsonRpcResponse) -> Result<(), ToolError> {
        let json = serde_json::to_string(response)?;
        writeln!(self.writer, "{}", json).map_err(ToolError::Io)?;
        self.writer.flush().map_err(ToolError::Io)?;
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
