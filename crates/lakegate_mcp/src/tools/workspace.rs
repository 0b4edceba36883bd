//! Workspace tools: notebooks, files, directories.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use lakegate_client::workspace;

use crate::types::{parse_args, Tool, ToolContext, ToolError, ToolInputSchema, ToolResult};

/// Exported notebook content above this length is summarized inline to keep
/// responses readable.
const NOTEBOOK_CONTENT_PREVIEW_CHARS: usize = 1000;

fn default_format() -> String {
    "SOURCE".to_string()
}

// ============================================================================
// list_notebooks
// ============================================================================

pub struct ListNotebooksTool;

#[derive(Debug, Deserialize)]
struct PathArgs {
    path: String,
}

#[async_trait]
impl Tool for ListNotebooksTool {
    fn name(&self) -> &'static str {
        "list_notebooks"
    }

    fn description(&self) -> &'static str {
        "List notebooks and other objects in a workspace directory"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({"path": {"type": "string"}}),
            vec!["path".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: PathArgs = parse_args(args)?;
        let result = workspace::list_objects(&ctx.api, &args.path).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// export_notebook
// ============================================================================

pub struct ExportNotebookTool;

#[derive(Debug, Deserialize)]
struct ExportNotebookArgs {
    path: String,

    #[serde(default = "default_format")]
    format: String,
}

#[async_trait]
impl Tool for ExportNotebookTool {
    fn name(&self) -> &'static str {
        "export_notebook"
    }

    fn description(&self) -> &'static str {
        "Export a notebook from the workspace (format: SOURCE, HTML, JUPYTER, or DBC)"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({
                "path": {"type": "string"},
                "format": {
                    "type": "string",
                    "enum": ["SOURCE", "HTML", "JUPYTER", "DBC"],
                    "default": "SOURCE"
                }
            }),
            vec!["path".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: ExportNotebookArgs = parse_args(args)?;
        let mut result = workspace::export_notebook(&ctx.api, &args.path, &args.format).await?;

        // Large notebooks are summarized so one export can't flood the reply.
        let content = result
            .get("content")
            .and_then(Value::as_str)
            .map(str::to_string);
        if let Some(content) = content {
            if content.chars().count() > NOTEBOOK_CONTENT_PREVIEW_CHARS {
                let preview: String = content.chars().take(NOTEBOOK_CONTENT_PREVIEW_CHARS).collect();
                result["content"] = Value::String(format!(
                    "{}... [content truncated, total length: {} characters]",
                    preview,
                    content.chars().count()
                ));
            }
        }

        ToolResult::json(&result)
    }
}

// ============================================================================
// import_notebook
// ============================================================================

pub struct ImportNotebookTool;

#[derive(Debug, Deserialize)]
struct ImportNotebookArgs {
    path: String,
    content: String,

    #[serde(default = "default_format")]
    format: String,

    language: Option<String>,

    #[serde(default)]
    overwrite: bool,
}

#[async_trait]
impl Tool for ImportNotebookTool {
    fn name(&self) -> &'static str {
        "import_notebook"
    }

    fn description(&self) -> &'static str {
        "Import a notebook into the workspace. Content may be raw text or base64"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({
                "path": {"type": "string"},
                "content": {"type": "string", "description": "Notebook content (base64 or text)"},
                "format": {"type": "string", "default": "SOURCE"},
                "language": {"type": "string", "enum": ["SCALA", "PYTHON", "SQL", "R"]},
                "overwrite": {"type": "boolean", "default": false}
            }),
            vec!["path".to_string(), "content".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: ImportNotebookArgs = parse_args(args)?;
        let result = workspace::import_notebook(
            &ctx.api,
            &args.path,
            &args.content,
            &args.format,
            args.language,
            args.overwrite,
        )
        .await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// delete_workspace_object
// ============================================================================

pub struct DeleteWorkspaceObjectTool;

#[derive(Debug, Deserialize)]
struct DeleteObjectArgs {
    path: String,

    #[serde(default)]
    recursive: bool,
}

#[async_trait]
impl Tool for DeleteWorkspaceObjectTool {
    fn name(&self) -> &'static str {
        "delete_workspace_object"
    }

    fn description(&self) -> &'static str {
        "Delete a notebook or directory (recursive optional)"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({
                "path": {"type": "string"},
                "recursive": {"type": "boolean", "default": false}
            }),
            vec!["path".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: DeleteObjectArgs = parse_args(args)?;
        let result = workspace::delete_object(&ctx.api, &args.path, args.recursive).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// get_workspace_file_content
// ============================================================================

pub struct GetWorkspaceFileContentTool;

#[derive(Debug, Deserialize)]
struct WorkspaceFileArgs {
    workspace_path: String,

    #[serde(default = "default_format")]
    format: String,
}

#[async_trait]
impl Tool for GetWorkspaceFileContentTool {
    fn name(&self) -> &'static str {
        "get_workspace_file_content"
    }

    fn description(&self) -> &'static str {
        "Retrieve a workspace file's content, decoded when possible \
         (content_type: text, json, or binary)"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({
                "workspace_path": {"type": "string"},
                "format": {
                    "type": "string",
                    "enum": ["SOURCE", "HTML", "JUPYTER", "DBC"],
                    "default": "SOURCE"
                }
            }),
            vec!["workspace_path".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: WorkspaceFileArgs = parse_args(args)?;
        let result = workspace::export_file(&ctx.api, &args.workspace_path, &args.format).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// get_workspace_file_info
// ============================================================================

pub struct GetWorkspaceFileInfoTool;

#[derive(Debug, Deserialize)]
struct WorkspacePathArgs {
    workspace_path: String,
}

#[async_trait]
impl Tool for GetWorkspaceFileInfoTool {
    fn name(&self) -> &'static str {
        "get_workspace_file_info"
    }

    fn description(&self) -> &'static str {
        "Get metadata about a workspace file without downloading its content"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({"workspace_path": {"type": "string"}}),
            vec!["workspace_path".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: WorkspacePathArgs = parse_args(args)?;
        let result = workspace::get_object_info(&ctx.api, &args.workspace_path)
            .await
            .map_err(|e| match e {
                lakegate_client::Error::UnexpectedResponse(msg) if msg.contains("not found") => {
                    ToolError::NotFound(msg)
                }
                other => other.into(),
            })?;
        ToolResult::json(&result)
    }
}
