//! Cluster library tools.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use lakegate_client::libraries;

use crate::types::{parse_args, Tool, ToolContext, ToolError, ToolInputSchema, ToolResult};

#[derive(Debug, Deserialize)]
struct LibrariesArgs {
    cluster_id: String,
    libraries: Vec<Value>,
}

fn libraries_properties() -> Value {
    json!({
        "cluster_id": {"type": "string"},
        "libraries": {
            "type": "array",
            "items": {"type": "object"},
            "description": "Library specs, e.g. [{\"pypi\": {\"package\": \"httpx\"}}]"
        }
    })
}

// ============================================================================
// install_library
// ============================================================================

pub struct InstallLibraryTool;

#[async_trait]
impl Tool for InstallLibraryTool {
    fn name(&self) -> &'static str {
        "install_library"
    }

    fn description(&self) -> &'static str {
        "Install libraries on a cluster"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            libraries_properties(),
            vec!["cluster_id".to_string(), "libraries".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: LibrariesArgs = parse_args(args)?;
        let result = libraries::install(&ctx.api, &args.cluster_id, args.libraries).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// uninstall_library
// ============================================================================

pub struct UninstallLibraryTool;

#[async_trait]
impl Tool for UninstallLibraryTool {
    fn name(&self) -> &'static str {
        "uninstall_library"
    }

    fn description(&self) -> &'static str {
        "Uninstall libraries from a cluster (takes effect on restart)"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            libraries_properties(),
            vec!["cluster_id".to_string(), "libraries".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: LibrariesArgs = parse_args(args)?;
        let result = libraries::uninstall(&ctx.api, &args.cluster_id, args.libraries).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// list_cluster_libraries
// ============================================================================

pub struct ListClusterLibrariesTool;

#[derive(Debug, Deserialize)]
struct ClusterIdArgs {
    cluster_id: String,
}

#[async_trait]
impl Tool for ListClusterLibrariesTool {
    fn name(&self) -> &'static str {
        "list_cluster_libraries"
    }

    fn description(&self) -> &'static str {
        "List library status for a cluster"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({"cluster_id": {"type": "string"}}),
            vec!["cluster_id".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: ClusterIdArgs = parse_args(args)?;
        let result = libraries::cluster_status(&ctx.api, &args.cluster_id).await?;
        ToolResult::json(&result)
    }
}
