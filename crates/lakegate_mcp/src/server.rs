//! MCP server implementation.
//!
//! Reads JSON-RPC requests from stdin, dispatches tool calls, writes
//! responses to stdout. One request at a time: tool execution awaits the
//! remote API inline, which is the MCP contract for stdio servers.
//!
//! Tool failures become `is_error` tool results rather than protocol-level
//! errors, so the calling assistant sees the message and can adjust.

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::protocol::{
    methods, InitializeParams, InitializeResult, JsonRpcError, JsonRpcRequest, JsonRpcResponse,
    McpProtocol, RequestId, ServerCapabilities, ServerInfo, ToolsCallParams, ToolsCapability,
    ToolsListResult, JSONRPC_VERSION, MCP_PROTOCOL_VERSION,
};
use crate::tools::ToolRegistry;
use crate::types::{ToolContext, ToolError, ToolResult};

/// MCP server configuration.
#[derive(Debug, Clone)]
pub struct McpServerConfig {
    /// Server name (reported in initialize)
    pub server_name: String,

    /// Server version (reported in initialize)
    pub server_version: String,

    /// Maximum serialized response size in bytes
    pub max_response_bytes: usize,
}

impl Default for McpServerConfig {
    fn default() -> Self {
        Self {
            server_name: "lakegate".to_string(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
            max_response_bytes: 1024 * 1024, // 1MB
        }
    }
}

/// MCP server: protocol loop + tool registry + shared context.
pub struct McpServer {
    config: McpServerConfig,
    ctx: ToolContext,
    tools: ToolRegistry,
    initialized: bool,
}

impl McpServer {
    pub fn new(config: McpServerConfig, ctx: ToolContext) -> Self {
        Self {
            config,
            ctx,
            tools: ToolRegistry::new(),
            initialized: false,
        }
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Run the server until stdin closes.
    pub async fn run(&mut self) -> Result<(), ToolError> {
        let mut protocol = McpProtocol::new();

        info!("MCP server starting: {}", self.config.server_name);

        while let Some(request) = protocol.read_request().await? {
            // Notifications get handled but never answered.
            if request.is_notification() {
                self.handle_notification(&request);
                continue;
            }

            let response = self.handle_request(request).await;
            protocol.write_response(&response).await?;
        }

        info!("MCP server shutting down");
        Ok(())
    }

    fn handle_notification(&mut self, request: &JsonRpcRequest) {
        match request.method.as_str() {
            methods::INITIALIZED => {
                debug!("Client initialization complete");
                self.initialized = true;
            }
            other => debug!("Ignoring notification: {}", other),
        }
    }

    /// Handle a single request and produce its response.
    pub async fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.clone().unwrap_or_default();

        if request.jsonrpc != JSONRPC_VERSION {
            return JsonRpcResponse::error(
                id,
                JsonRpcError::invalid_request(format!(
                    "Invalid JSON-RPC version: {}",
                    request.jsonrpc
                )),
            );
        }

        match request.method.as_str() {
            methods::INITIALIZE => self.handle_initialize(id, request.params),
            // Unusual but valid: an initialized notification carrying an id.
            methods::INITIALIZED => JsonRpcResponse::success(id, Value::Null),
            methods::TOOLS_LIST => self.handle_tools_list(id),
            methods::TOOLS_CALL => self.handle_tools_call(id, request.params).await,
            methods::PING => JsonRpcResponse::success(id, Value::Object(Default::default())),
            other => JsonRpcResponse::error(id, JsonRpcError::method_not_found(other)),
        }
    }

    fn handle_initialize(&mut self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: InitializeParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params(format!("Invalid initialize params: {}", e)),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("Missing initialize params"),
                );
            }
        };

        info!(
            "Initialize from {} v{} (protocol {})",
            params.client_info.name, params.client_info.version, params.protocol_version
        );

        let result = InitializeResult {
            protocol_version: MCP_PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability {
                    list_changed: false,
                }),
            },
            server_info: ServerInfo {
                name: self.config.server_name.clone(),
                version: self.config.server_version.clone(),
            },
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
        }
    }

    fn handle_tools_list(&self, id: RequestId) -> JsonRpcResponse {
        let result = ToolsListResult {
            tools: self.tools.list_tools(),
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
        }
    }

    async fn handle_tools_call(&self, id: RequestId, params: Option<Value>) -> JsonRpcResponse {
        let params: ToolsCallParams = match params {
            Some(p) => match serde_json::from_value(p) {
                Ok(params) => params,
                Err(e) => {
                    return JsonRpcResponse::error(
                        id,
                        JsonRpcError::invalid_params(format!("Invalid tools/call params: {}", e)),
                    );
                }
            },
            None => {
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::invalid_params("Missing tools/call params"),
                );
            }
        };

        debug!("Calling tool: {}", params.name);

        let result = match self
            .tools
            .call_tool(&params.name, params.arguments, &self.ctx)
            .await
        {
            Ok(result) => self.enforce_budget(result),
            Err(ToolError::NotFound(message)) if message.starts_with("Unknown tool") => {
                // An unknown tool name is a protocol-level mistake, not a
                // failed execution.
                return JsonRpcResponse::error(
                    id,
                    JsonRpcError::from_tool_error(&ToolError::NotFound(message)),
                );
            }
            Err(e) => {
                warn!("Tool {} failed: {}", params.name, e);
                ToolResult::error(e.to_string())
            }
        };

        match serde_json::to_value(result) {
            Ok(value) => JsonRpcResponse::success(id, value),
            Err(e) => JsonRpcResponse::error(id, JsonRpcError::internal_error(e.to_string())),
        }
    }

    /// Replace an oversized result with a structured truncation notice.
    fn enforce_budget(&self, result: ToolResult) -> ToolResult {
        let size = serde_json::to_string(&result).map(|s| s.len()).unwrap_or(0);
        if size <= self.config.max_response_bytes {
            return result;
        }

        warn!(
            "Tool response of {} bytes exceeds budget of {} bytes; truncating",
            size, self.config.max_response_bytes
        );

        ToolResult::text(
            serde_json::json!({
                "truncated": true,
                "original_bytes": size,
                "limit_bytes": self.config.max_response_bytes,
                "message": "Response exceeded the maximum size. Narrow the request \
                            (row_limit, path, or detail_level) and retry."
            })
            .to_string(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lakegate_client::{ApiClient, Config};

    fn test_server(max_response_bytes: usize) -> McpServer {
        let config = Config::new("https://example.databricks.net", "dapi-test").unwrap();
        let ctx = ToolContext::new(ApiClient::new(config).unwrap());
        McpServer::new(
            McpServerConfig {
                max_response_bytes,
                ..Default::default()
            },
            ctx,
        )
    }

    fn request(method: &str, params: Option<Value>) -> JsonRpcRequest {
        JsonRpcRequest {
            jsonrpc: JSONRPC_VERSION.to_string(),
            id: Some(RequestId::Number(1)),
            method: method.to_string(),
            params,
        }
    }

    #[tokio::test]
    async fn initialize_reports_server_info() {
        let mut server = test_server(1024 * 1024);
        let response = server
            .handle_request(request(
                methods::INITIALIZE,
                Some(serde_json::json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "test", "version": "0.0.1"}
                })),
            ))
            .await;

        let result = response.result.unwrap();
        assert_eq!(result["serverInfo"]["name"], "lakegate");
        assert_eq!(result["protocolVersion"], MCP_PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn tools_list_returns_all_tools() {
        let mut server = test_server(1024 * 1024);
        let response = server.handle_request(request(methods::TOOLS_LIST, None)).await;

        let result = response.result.unwrap();
        let tools = result["tools"].as_array().unwrap();
        assert_eq!(tools.len(), server.tools().len());
        assert!(tools.iter().all(|t| t["inputSchema"]["type"] == "object"));
    }

    #[tokio::test]
    async fn unknown_method_is_rejected() {
        let mut server = test_server(1024 * 1024);
        let response = server
            .handle_request(request("resources/list", None))
            .await;

        assert_eq!(response.error.unwrap().code, -32601);
    }

    #[tokio::test]
    async fn unknown_tool_is_protocol_error() {
        let mut server = test_server(1024 * 1024);
        let response = server
            .handle_request(request(
                methods::TOOLS_CALL,
                Some(serde_json::json!({"name": "no_such_tool", "arguments": {}})),
            ))
            .await;

        assert_eq!(response.error.unwrap().code, -32001);
    }

    #[tokio::test]
    async fn invalid_tool_args_become_error_result() {
        let mut server = test_server(1024 * 1024);
        // execute_sql without a statement never reaches the network; the
        // failure comes back as an is_error tool result.
        let response = server
            .handle_request(request(
                methods::TOOLS_CALL,
                Some(serde_json::json!({"name": "execute_sql", "arguments": {}})),
            ))
            .await;

        let result = response.result.unwrap();
        assert_eq!(result["is_error"], true);
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("Invalid parameters"));
    }

    #[tokio::test]
    async fn safety_gate_rejection_reaches_caller() {
        let mut server = test_server(1024 * 1024);
        let response = server
            .handle_request(request(
                methods::TOOLS_CALL,
                Some(serde_json::json!({
                    "name": "execute_safe_sql",
                    "arguments": {"statement": "DROP TABLE important"}
                })),
            ))
            .await;

        let result = response.result.unwrap();
        assert_eq!(result["is_error"], true);
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(text.contains("destructive operation 'DROP'"));
        assert!(text.contains("DESCRIBE TABLE"));
    }

    #[tokio::test]
    async fn ping_answers_empty_object() {
        let mut server = test_server(1024 * 1024);
        let response = server.handle_request(request(methods::PING, None)).await;
        assert_eq!(response.result.unwrap(), serde_json::json!({}));
    }

    #[test]
    fn oversized_results_are_replaced() {
        let server = test_server(64);
        let result = server.enforce_budget(ToolResult::text("x".repeat(1000)));
        let text = match &result.content[0] {
            crate::types::ToolContent::Text { text } => text,
            _ => panic!("expected text"),
        };
        assert!(text.contains("\"truncated\":true"));
    }
}
