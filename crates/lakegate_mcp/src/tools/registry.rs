//! Tool registry: discovery and dispatch by name.

use std::collections::HashMap;

use serde_json::Value;
use tracing::debug;

use super::{catalog, genie, jobs, libraries, repos, sql, workspace};
use crate::protocol::ToolDefinition;
use crate::types::{Tool, ToolContext, ToolError, ToolResult};

/// Registry of available MCP tools.
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// Create a registry with every tool registered.
    pub fn new() -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
        };

        // SQL
        registry.register(Box::new(sql::ExecuteSqlTool));
        registry.register(Box::new(sql::ExecuteSqlAndWaitTool));
        registry.register(Box::new(sql::ExecuteSafeSqlTool));
        registry.register(Box::new(sql::GetStatementStatusTool));
        registry.register(Box::new(sql::CancelStatementTool));

        // Jobs and runs
        registry.register(Box::new(jobs::ListJobsTool));
        registry.register(Box::new(jobs::CreateJobTool));
        registry.register(Box::new(jobs::DeleteJobTool));
        registry.register(Box::new(jobs::RunJobTool));
        registry.register(Box::new(jobs::RunNotebookTool));
        registry.register(Box::new(jobs::SyncRepoAndRunNotebookTool));
        registry.register(Box::new(jobs::GetRunStatusTool));
        registry.register(Box::new(jobs::ListJobRunsTool));
        registry.register(Box::new(jobs::CancelRunTool));

        // Workspace
        registry.register(Box::new(workspace::ListNotebooksTool));
        registry.register(Box::new(workspace::ExportNotebookTool));
        registry.register(Box::new(workspace::ImportNotebookTool));
        registry.register(Box::new(workspace::DeleteWorkspaceObjectTool));
        registry.register(Box::new(workspace::GetWorkspaceFileContentTool));
        registry.register(Box::new(workspace::GetWorkspaceFileInfoTool));

        // Unity Catalog
        registry.register(Box::new(catalog::ListCatalogsTool));
        registry.register(Box::new(catalog::CreateCatalogTool));
        registry.register(Box::new(catalog::ListSchemasTool));
        registry.register(Box::new(catalog::CreateSchemaTool));
        registry.register(Box::new(catalog::ListTablesTool));
        registry.register(Box::new(catalog::CreateTableTool));
        registry.register(Box::new(catalog::GetTableLineageTool));

        // Repos
        registry.register(Box::new(repos::CreateRepoTool));
        registry.register(Box::new(repos::UpdateRepoTool));
        registry.register(Box::new(repos::ListReposTool));
        registry.register(Box::new(repos::PullRepoTool));

        // Libraries
        registry.register(Box::new(libraries::InstallLibraryTool));
        registry.register(Box::new(libraries::UninstallLibraryTool));
        registry.register(Box::new(libraries::ListClusterLibrariesTool));

        // Genie
        registry.register(Box::new(genie::ListGenieSpacesTool));
        registry.register(Box::new(genie::StartGenieConversationTool));
        registry.register(Box::new(genie::SendGenieFollowupTool));
        registry.register(Box::new(genie::GetGenieMessageStatusTool));
        registry.register(Box::new(genie::GetGenieQueryResultsTool));

        debug!("Registered {} tools", registry.tools.len());

        registry
    }

    fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        debug!("Registering tool: {}", name);
        self.tools.insert(name, tool);
    }

    /// List all tool definitions, sorted by name for stable output.
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        let mut definitions: Vec<ToolDefinition> =
            self.tools.values().map(|t| t.definition()).collect();
        definitions.sort_by(|a, b| a.name.cmp(&b.name));
        definitions
    }

    /// Call a tool by name.
    pub async fn call_tool(
        &self,
        name: &str,
        args: Value,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(format!("Unknown tool: {}", name)))?;

        tool.execute(args, ctx).await
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
