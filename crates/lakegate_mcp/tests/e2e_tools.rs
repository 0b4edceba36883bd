//! End-to-end tests for the MCP tool surface.
//!
//! These exercise the registry, schemas, and dispatch paths that do not
//! require a live workspace. Network-bound behavior is covered by the
//! poller/aggregator tests in lakegate_client, which inject their own fetch
//! functions.

use lakegate_client::{ApiClient, Config};
use lakegate_mcp::protocol::{methods, JsonRpcRequest, RequestId, JSONRPC_VERSION};
use lakegate_mcp::{McpServer, McpServerConfig, ToolContext, ToolRegistry};
use serde_json::{json, Value};

fn test_context() -> ToolContext {
    let config = Config::new("https://example.databricks.net", "dapi-test").unwrap();
    ToolContext::new(ApiClient::new(config).unwrap())
}

fn call(name: &str, arguments: Value) -> JsonRpcRequest {
    JsonRpcRequest {
        jsonrpc: JSONRPC_VERSION.to_string(),
        id: Some(RequestId::Number(7)),
        method: methods::TOOLS_CALL.to_string(),
        params: Some(json!({"name": name, "arguments": arguments})),
    }
}

// =============================================================================
// Registry
// =============================================================================

#[test]
fn all_tools_registered() {
    let registry = ToolRegistry::new();

    assert_eq!(registry.len(), 39, "expected exactly 39 tools");

    let expected_tools = [
        // SQL
        "execute_sql",
        "execute_sql_and_wait",
        "execute_safe_sql",
        "get_statement_status",
        "cancel_statement",
        // Jobs and runs
        "list_jobs",
        "create_job",
        "delete_job",
        "run_job",
        "run_notebook",
        "sync_repo_and_run_notebook",
        "get_run_status",
        "list_job_runs",
        "cancel_run",
        // Workspace
        "list_notebooks",
        "export_notebook",
        "import_notebook",
        "delete_workspace_object",
        "get_workspace_file_content",
        "get_workspace_file_info",
        // Unity Catalog
        "list_catalogs",
        "create_catalog",
        "list_schemas",
        "create_schema",
        "list_tables",
        "create_table",
        "get_table_lineage",
        // Repos
        "create_repo",
        "update_repo",
        "list_repos",
        "pull_repo",
        // Libraries
        "install_library",
        "uninstall_library",
        "list_cluster_libraries",
        // Genie
        "list_genie_spaces",
        "start_genie_conversation",
        "send_genie_followup",
        "get_genie_message_status",
        "get_genie_query_results",
    ];

    assert_eq!(expected_tools.len(), 39);
    for tool_name in expected_tools {
        assert!(
            registry.get(tool_name).is_some(),
            "tool '{}' should be registered",
            tool_name
        );
    }
}

#[test]
fn every_tool_has_description_and_object_schema() {
    let registry = ToolRegistry::new();

    for definition in registry.list_tools() {
        assert!(
            !definition.description.is_empty(),
            "tool '{}' has no description",
            definition.name
        );
        assert_eq!(
            definition.input_schema["type"], "object",
            "tool '{}' schema is not an object",
            definition.name
        );

        // Required names must exist in properties.
        if let Some(required) = definition.input_schema.get("required").and_then(Value::as_array) {
            let properties = definition
                .input_schema
                .get("properties")
                .and_then(Value::as_object)
                .unwrap_or_else(|| {
                    panic!("tool '{}' requires fields but has no properties", definition.name)
                });
            for name in required {
                let name = name.as_str().unwrap();
                assert!(
                    properties.contains_key(name),
                    "tool '{}' requires undeclared field '{}'",
                    definition.name,
                    name
                );
            }
        }
    }
}

// =============================================================================
// Dispatch
// =============================================================================

#[tokio::test]
async fn tools_call_validates_arguments_before_any_network_io() {
    let mut server = McpServer::new(McpServerConfig::default(), test_context());

    // Tools with required string/integer arguments reject an empty object
    // locally. (The fake host is never contacted: deserialization fails
    // first.)
    for tool in [
        "execute_sql",
        "get_statement_status",
        "cancel_statement",
        "run_notebook",
        "export_notebook",
        "import_notebook",
        "get_table_lineage",
        "pull_repo",
        "install_library",
        "start_genie_conversation",
    ] {
        let response = server.handle_request(call(tool, json!({}))).await;
        let result = response.result.expect("tool errors are results");
        assert_eq!(result["is_error"], true, "tool '{}' accepted empty args", tool);
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(
            text.contains("Invalid parameters"),
            "tool '{}' produced unexpected error: {}",
            tool,
            text
        );
    }
}

#[tokio::test]
async fn safe_sql_rejects_destructive_statements_with_suggestions() {
    let mut server = McpServer::new(McpServerConfig::default(), test_context());

    let cases = [
        ("DROP TABLE sales", "DROP"),
        ("DELETE FROM sales WHERE 1=1", "DELETE"),
        ("UPDATE sales SET amount = 0", "UPDATE"),
        ("TRUNCATE TABLE sales", "TRUNCATE"),
    ];

    for (statement, keyword) in cases {
        let response = server
            .handle_request(call("execute_safe_sql", json!({"statement": statement})))
            .await;
        let result = response.result.unwrap();
        assert_eq!(result["is_error"], true, "statement was not rejected: {}", statement);
        let text = result["content"][0]["text"].as_str().unwrap();
        assert!(
            text.contains(&format!("'{}'", keyword)),
            "rejection for '{}' does not name {}: {}",
            statement,
            keyword,
            text
        );
    }
}

#[tokio::test]
async fn update_repo_requires_branch_or_tag() {
    let mut server = McpServer::new(McpServerConfig::default(), test_context());

    let response = server
        .handle_request(call("update_repo", json!({"repo_id": 11})))
        .await;
    let result = response.result.unwrap();
    assert_eq!(result["is_error"], true);
    let text = result["content"][0]["text"].as_str().unwrap();
    assert!(text.contains("branch or tag"));
}

#[tokio::test]
async fn initialize_then_list_flow() {
    let mut server = McpServer::new(McpServerConfig::default(), test_context());

    let init = JsonRpcRequest {
        jsonrpc: JSONRPC_VERSION.to_string(),
        id: Some(RequestId::Number(1)),
        method: methods::INITIALIZE.to_string(),
        params: Some(json!({
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {"name": "e2e", "version": "1.0.0"}
        })),
    };
    let response = server.handle_request(init).await;
    assert!(response.error.is_none());

    let list = JsonRpcRequest {
        jsonrpc: JSONRPC_VERSION.to_string(),
        id: Some(RequestId::Number(2)),
        method: methods::TOOLS_LIST.to_string(),
        params: None,
    };
    let response = server.handle_request(list).await;
    let tools = response.result.unwrap()["tools"].as_array().unwrap().len();
    assert_eq!(tools, 39);
}
