//! Job and run management tools.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use lakegate_client::{jobs, repos, WaitConfig};
use lakegate_protocol::defaults;

use crate::types::{parse_args, Tool, ToolContext, ToolError, ToolInputSchema, ToolResult};

fn default_run_timeout() -> u64 {
    defaults::RUN_MAX_WAIT_SECS
}

fn default_run_poll_interval() -> u64 {
    defaults::RUN_POLL_INTERVAL_SECS
}

fn default_runs_limit() -> u64 {
    20
}

// ============================================================================
// list_jobs
// ============================================================================

pub struct ListJobsTool;

#[async_trait]
impl Tool for ListJobsTool {
    fn name(&self) -> &'static str {
        "list_jobs"
    }

    fn description(&self) -> &'static str {
        "List all jobs in the workspace"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::new()
    }

    async fn execute(&self, _args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let result = jobs::list_jobs(&ctx.api).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// create_job
// ============================================================================

pub struct CreateJobTool;

#[derive(Debug, Deserialize)]
struct CreateJobArgs {
    /// Full job settings document, passed through to the jobs API.
    #[serde(flatten)]
    settings: Value,
}

#[async_trait]
impl Tool for CreateJobTool {
    fn name(&self) -> &'static str {
        "create_job"
    }

    fn description(&self) -> &'static str {
        "Create a job from a settings document. Provide name and a tasks list"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({
                "name": {"type": "string"},
                "tasks": {"type": "array", "items": {"type": "object"}}
            }),
            vec![],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: CreateJobArgs = parse_args(args)?;
        let result = jobs::create_job(&ctx.api, args.settings).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// delete_job
// ============================================================================

pub struct DeleteJobTool;

#[derive(Debug, Deserialize)]
struct JobIdArgs {
    job_id: i64,
}

#[async_trait]
impl Tool for DeleteJobTool {
    fn name(&self) -> &'static str {
        "delete_job"
    }

    fn description(&self) -> &'static str {
        "Delete a job"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({"job_id": {"type": "integer"}}),
            vec!["job_id".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: JobIdArgs = parse_args(args)?;
        let result = jobs::delete_job(&ctx.api, args.job_id).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// run_job
// ============================================================================

pub struct RunJobTool;

#[derive(Debug, Deserialize)]
struct RunJobArgs {
    job_id: i64,
    notebook_params: Option<Value>,
}

#[async_trait]
impl Tool for RunJobTool {
    fn name(&self) -> &'static str {
        "run_job"
    }

    fn description(&self) -> &'static str {
        "Trigger a job run now, optionally with notebook parameters"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({
                "job_id": {"type": "integer"},
                "notebook_params": {"type": "object"}
            }),
            vec!["job_id".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: RunJobArgs = parse_args(args)?;
        let result = jobs::run_job_now(&ctx.api, args.job_id, args.notebook_params).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// run_notebook
// ============================================================================

#[derive(Debug, Deserialize)]
struct RunNotebookArgs {
    notebook_path: String,
    existing_cluster_id: Option<String>,
    base_parameters: Option<Value>,

    #[serde(default = "default_run_timeout")]
    timeout_seconds: u64,

    #[serde(default = "default_run_poll_interval")]
    poll_interval_seconds: u64,
}

fn run_notebook_properties() -> Value {
    json!({
        "notebook_path": {"type": "string"},
        "existing_cluster_id": {"type": "string"},
        "base_parameters": {"type": "object"},
        "timeout_seconds": {"type": "integer", "default": defaults::RUN_MAX_WAIT_SECS},
        "poll_interval_seconds": {"type": "integer", "default": defaults::RUN_POLL_INTERVAL_SECS}
    })
}

pub struct RunNotebookTool;

#[async_trait]
impl Tool for RunNotebookTool {
    fn name(&self) -> &'static str {
        "run_notebook"
    }

    fn description(&self) -> &'static str {
        "Submit a one-time notebook run, wait for it to terminate, and return its output"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            run_notebook_properties(),
            vec!["notebook_path".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: RunNotebookArgs = parse_args(args)?;
        let wait = WaitConfig::from_secs(args.poll_interval_seconds, args.timeout_seconds);
        let result = jobs::run_notebook(
            &ctx.api,
            &args.notebook_path,
            args.existing_cluster_id,
            args.base_parameters,
            wait,
        )
        .await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// sync_repo_and_run_notebook
// ============================================================================

pub struct SyncRepoAndRunNotebookTool;

#[derive(Debug, Deserialize)]
struct SyncRepoAndRunArgs {
    repo_id: i64,

    #[serde(flatten)]
    run: RunNotebookArgs,
}

#[async_trait]
impl Tool for SyncRepoAndRunNotebookTool {
    fn name(&self) -> &'static str {
        "sync_repo_and_run_notebook"
    }

    fn description(&self) -> &'static str {
        "Pull the latest commit for a repo, then run a notebook from it and return the output"
    }

    fn input_schema(&self) -> ToolInputSchema {
        let mut properties = run_notebook_properties();
        properties["repo_id"] = json!({"type": "integer"});
        ToolInputSchema::with_properties(
            properties,
            vec!["repo_id".to_string(), "notebook_path".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: SyncRepoAndRunArgs = parse_args(args)?;

        repos::pull_repo(&ctx.api, args.repo_id).await?;

        let wait = WaitConfig::from_secs(args.run.poll_interval_seconds, args.run.timeout_seconds);
        let result = jobs::run_notebook(
            &ctx.api,
            &args.run.notebook_path,
            args.run.existing_cluster_id,
            args.run.base_parameters,
            wait,
        )
        .await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// get_run_status
// ============================================================================

pub struct GetRunStatusTool;

#[derive(Debug, Deserialize)]
struct RunIdArgs {
    run_id: i64,
}

#[async_trait]
impl Tool for GetRunStatusTool {
    fn name(&self) -> &'static str {
        "get_run_status"
    }

    fn description(&self) -> &'static str {
        "Get concise status for a job run"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({"run_id": {"type": "integer"}}),
            vec!["run_id".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: RunIdArgs = parse_args(args)?;
        let result = jobs::get_run_status(&ctx.api, args.run_id).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// list_job_runs
// ============================================================================

pub struct ListJobRunsTool;

#[derive(Debug, Deserialize)]
struct ListRunsArgs {
    job_id: Option<i64>,

    #[serde(default = "default_runs_limit")]
    limit: u64,
}

#[async_trait]
impl Tool for ListJobRunsTool {
    fn name(&self) -> &'static str {
        "list_job_runs"
    }

    fn description(&self) -> &'static str {
        "List recent runs, optionally filtered to one job"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({
                "job_id": {"type": "integer"},
                "limit": {"type": "integer", "default": 20}
            }),
            vec![],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: ListRunsArgs = parse_args(args)?;
        let result = jobs::list_runs(&ctx.api, args.job_id, args.limit).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// cancel_run
// ============================================================================

pub struct CancelRunTool;

#[async_trait]
impl Tool for CancelRunTool {
    fn name(&self) -> &'static str {
        "cancel_run"
    }

    fn description(&self) -> &'static str {
        "Cancel a job run"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({"run_id": {"type": "integer"}}),
            vec!["run_id".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: RunIdArgs = parse_args(args)?;
        let result = jobs::cancel_run(&ctx.api, args.run_id).await?;
        ToolResult::json(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_notebook_args_defaults() {
        let args: RunNotebookArgs =
            parse_args(json!({"notebook_path": "/Users/me/nb"})).unwrap();
        assert_eq!(args.timeout_seconds, defaults::RUN_MAX_WAIT_SECS);
        assert_eq!(args.poll_interval_seconds, defaults::RUN_POLL_INTERVAL_SECS);
    }

    #[test]
    fn sync_repo_args_flatten() {
        let args: SyncRepoAndRunArgs = parse_args(json!({
            "repo_id": 12,
            "notebook_path": "/Repos/team/project/nb",
            "base_parameters": {"env": "dev"}
        }))
        .unwrap();
        assert_eq!(args.repo_id, 12);
        assert_eq!(args.run.notebook_path, "/Repos/team/project/nb");
    }

    #[test]
    fn list_runs_limit_default() {
        let args: ListRunsArgs = parse_args(json!({})).unwrap();
        assert_eq!(args.limit, 20);
        assert!(args.job_id.is_none());
    }
}
