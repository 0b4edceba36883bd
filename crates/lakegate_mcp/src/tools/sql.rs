//! SQL statement tools.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use lakegate_client::sql::{self, StatementOptions};
use lakegate_client::WaitConfig;
use lakegate_protocol::defaults;

use crate::types::{parse_args, Tool, ToolContext, ToolError, ToolInputSchema, ToolResult};

fn statement_properties() -> Value {
    json!({
        "statement": {"type": "string", "description": "SQL statement to execute"},
        "warehouse_id": {
            "type": "string",
            "description": "SQL warehouse ID (falls back to DATABRICKS_WAREHOUSE_ID)"
        },
        "catalog": {"type": "string"},
        "schema": {"type": "string"},
        "parameters": {"type": "object", "description": "Statement parameters"}
    })
}

#[derive(Debug, Deserialize)]
struct StatementArgs {
    statement: String,
    warehouse_id: Option<String>,
    catalog: Option<String>,
    schema: Option<String>,
    parameters: Option<Value>,
    row_limit: Option<u64>,
}

impl StatementArgs {
    fn options(&self) -> StatementOptions {
        StatementOptions {
            warehouse_id: self.warehouse_id.clone(),
            catalog: self.catalog.clone(),
            schema: self.schema.clone(),
            parameters: self.parameters.clone(),
            row_limit: self.row_limit,
        }
    }
}

// ============================================================================
// execute_sql
// ============================================================================

pub struct ExecuteSqlTool;

#[async_trait]
impl Tool for ExecuteSqlTool {
    fn name(&self) -> &'static str {
        "execute_sql"
    }

    fn description(&self) -> &'static str {
        "Execute a SQL statement. Fast statements return results inline; \
         slower ones return a statement_id to poll with get_statement_status"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(statement_properties(), vec!["statement".to_string()])
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: StatementArgs = parse_args(args)?;
        let result = sql::execute_statement(&ctx.api, &args.statement, &args.options()).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// execute_sql_and_wait
// ============================================================================

pub struct ExecuteSqlAndWaitTool;

#[derive(Debug, Deserialize)]
struct ExecuteAndWaitArgs {
    #[serde(flatten)]
    statement: StatementArgs,

    #[serde(default = "default_sql_timeout")]
    timeout_seconds: u64,

    #[serde(default = "default_sql_poll_interval")]
    poll_interval_seconds: u64,
}

fn default_sql_timeout() -> u64 {
    defaults::SQL_MAX_WAIT_SECS
}

fn default_sql_poll_interval() -> u64 {
    defaults::SQL_POLL_INTERVAL_SECS
}

#[async_trait]
impl Tool for ExecuteSqlAndWaitTool {
    fn name(&self) -> &'static str {
        "execute_sql_and_wait"
    }

    fn description(&self) -> &'static str {
        "Execute a SQL statement and poll until it finishes. On local timeout \
         the statement keeps running; the error carries the statement_id for \
         manual follow-up"
    }

    fn input_schema(&self) -> ToolInputSchema {
        let mut properties = statement_properties();
        properties["timeout_seconds"] = json!({"type": "integer", "default": defaults::SQL_MAX_WAIT_SECS});
        properties["poll_interval_seconds"] =
            json!({"type": "integer", "default": defaults::SQL_POLL_INTERVAL_SECS});
        ToolInputSchema::with_properties(properties, vec!["statement".to_string()])
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: ExecuteAndWaitArgs = parse_args(args)?;
        let wait = WaitConfig::from_secs(args.poll_interval_seconds, args.timeout_seconds);
        let result =
            sql::execute_and_wait(&ctx.api, &args.statement.statement, &args.statement.options(), wait)
                .await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// execute_safe_sql
// ============================================================================

pub struct ExecuteSafeSqlTool;

#[async_trait]
impl Tool for ExecuteSafeSqlTool {
    fn name(&self) -> &'static str {
        "execute_safe_sql"
    }

    fn description(&self) -> &'static str {
        "Execute a SQL statement after validating it is read-only. \
         Destructive operations (DROP, DELETE, UPDATE, ...) are rejected \
         before submission with a suggested alternative"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(statement_properties(), vec!["statement".to_string()])
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: StatementArgs = parse_args(args)?;
        let result = sql::execute_safe_statement(&ctx.api, &args.statement, &args.options()).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// get_statement_status
// ============================================================================

pub struct GetStatementStatusTool;

#[derive(Debug, Deserialize)]
struct StatementIdArgs {
    statement_id: String,
}

#[async_trait]
impl Tool for GetStatementStatusTool {
    fn name(&self) -> &'static str {
        "get_statement_status"
    }

    fn description(&self) -> &'static str {
        "Get the status (and results, when finished) of a SQL statement"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({"statement_id": {"type": "string"}}),
            vec!["statement_id".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: StatementIdArgs = parse_args(args)?;
        let result = sql::get_statement_status(&ctx.api, &args.statement_id).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// cancel_statement
// ============================================================================

pub struct CancelStatementTool;

#[async_trait]
impl Tool for CancelStatementTool {
    fn name(&self) -> &'static str {
        "cancel_statement"
    }

    fn description(&self) -> &'static str {
        "Cancel a running SQL statement"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({"statement_id": {"type": "string"}}),
            vec!["statement_id".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: StatementIdArgs = parse_args(args)?;
        let result = sql::cancel_statement(&ctx.api, &args.statement_id).await?;
        ToolResult::json(&result)
    }
}
