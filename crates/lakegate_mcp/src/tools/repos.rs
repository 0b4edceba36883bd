//! Repo tools.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use lakegate_client::repos;

use crate::types::{parse_args, Tool, ToolContext, ToolError, ToolInputSchema, ToolResult};

// ============================================================================
// create_repo
// ============================================================================

pub struct CreateRepoTool;

#[derive(Debug, Deserialize)]
struct CreateRepoArgs {
    url: String,
    provider: String,
    branch: Option<String>,
    path: Option<String>,
}

#[async_trait]
impl Tool for CreateRepoTool {
    fn name(&self) -> &'static str {
        "create_repo"
    }

    fn description(&self) -> &'static str {
        "Create (clone) a repo in the workspace"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({
                "url": {"type": "string"},
                "provider": {"type": "string", "description": "e.g. gitHub, gitLab, azureDevOpsServices"},
                "branch": {"type": "string"},
                "path": {"type": "string"}
            }),
            vec!["url".to_string(), "provider".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: CreateRepoArgs = parse_args(args)?;
        let result =
            repos::create_repo(&ctx.api, &args.url, &args.provider, args.branch, args.path).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// update_repo
// ============================================================================

pub struct UpdateRepoTool;

#[derive(Debug, Deserialize)]
struct UpdateRepoArgs {
    repo_id: i64,
    branch: Option<String>,
    tag: Option<String>,
}

#[async_trait]
impl Tool for UpdateRepoTool {
    fn name(&self) -> &'static str {
        "update_repo"
    }

    fn description(&self) -> &'static str {
        "Check out a branch or tag in a repo"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({
                "repo_id": {"type": "integer"},
                "branch": {"type": "string"},
                "tag": {"type": "string"}
            }),
            vec!["repo_id".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: UpdateRepoArgs = parse_args(args)?;
        if args.branch.is_none() && args.tag.is_none() {
            return Err(ToolError::InvalidParams(
                "Either branch or tag must be provided".to_string(),
            ));
        }
        let result = repos::update_repo(&ctx.api, args.repo_id, args.branch, args.tag).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// list_repos
// ============================================================================

pub struct ListReposTool;

#[derive(Debug, Deserialize)]
struct ListReposArgs {
    path_prefix: Option<String>,
}

#[async_trait]
impl Tool for ListReposTool {
    fn name(&self) -> &'static str {
        "list_repos"
    }

    fn description(&self) -> &'static str {
        "List repos, optionally filtered by path prefix"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(json!({"path_prefix": {"type": "string"}}), vec![])
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: ListReposArgs = parse_args(args)?;
        let result = repos::list_repos(&ctx.api, args.path_prefix).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// pull_repo
// ============================================================================

pub struct PullRepoTool;

#[derive(Debug, Deserialize)]
struct PullRepoArgs {
    repo_id: i64,
}

#[async_trait]
impl Tool for PullRepoTool {
    fn name(&self) -> &'static str {
        "pull_repo"
    }

    fn description(&self) -> &'static str {
        "Pull the latest commit for a repo's current branch"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({"repo_id": {"type": "integer"}}),
            vec!["repo_id".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: PullRepoArgs = parse_args(args)?;
        let result = repos::pull_repo(&ctx.api, args.repo_id).await?;
        ToolResult::json(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_repo_requires_branch_or_tag() {
        let args: UpdateRepoArgs = parse_args(json!({"repo_id": 5})).unwrap();
        assert!(args.branch.is_none() && args.tag.is_none());
    }
}
