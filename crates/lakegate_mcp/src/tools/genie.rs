//! Genie conversational AI tools.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use lakegate_client::{genie, WaitConfig};
use lakegate_protocol::defaults;

use crate::types::{parse_args, Tool, ToolContext, ToolError, ToolInputSchema, ToolResult};

fn default_wait_for_result() -> bool {
    true
}

fn genie_wait() -> WaitConfig {
    WaitConfig::from_secs(
        defaults::GENIE_POLL_INTERVAL_SECS,
        defaults::GENIE_MAX_WAIT_SECS,
    )
}

// ============================================================================
// list_genie_spaces
// ============================================================================

pub struct ListGenieSpacesTool;

#[async_trait]
impl Tool for ListGenieSpacesTool {
    fn name(&self) -> &'static str {
        "list_genie_spaces"
    }

    fn description(&self) -> &'static str {
        "List all available Genie AI spaces in the workspace"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::new()
    }

    async fn execute(&self, _args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let result = genie::list_spaces(&ctx.api).await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// start_genie_conversation
// ============================================================================

pub struct StartGenieConversationTool;

#[derive(Debug, Deserialize)]
struct StartConversationArgs {
    space_id: String,
    question: String,

    #[serde(default = "default_wait_for_result")]
    wait_for_result: bool,
}

#[async_trait]
impl Tool for StartGenieConversationTool {
    fn name(&self) -> &'static str {
        "start_genie_conversation"
    }

    fn description(&self) -> &'static str {
        "Ask Genie AI a question in natural language. Genie generates SQL, \
         runs it, and answers; with wait_for_result=false only the \
         conversation and message ids are returned"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({
                "space_id": {"type": "string"},
                "question": {"type": "string"},
                "wait_for_result": {"type": "boolean", "default": true}
            }),
            vec!["space_id".to_string(), "question".to_string()],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: StartConversationArgs = parse_args(args)?;
        let reply = genie::start_conversation(
            &ctx.api,
            &args.space_id,
            &args.question,
            args.wait_for_result,
            genie_wait(),
        )
        .await?;
        ToolResult::json(&reply)
    }
}

// ============================================================================
// send_genie_followup
// ============================================================================

pub struct SendGenieFollowupTool;

#[derive(Debug, Deserialize)]
struct FollowupArgs {
    space_id: String,
    conversation_id: String,
    question: String,

    #[serde(default = "default_wait_for_result")]
    wait_for_result: bool,
}

#[async_trait]
impl Tool for SendGenieFollowupTool {
    fn name(&self) -> &'static str {
        "send_genie_followup"
    }

    fn description(&self) -> &'static str {
        "Send a follow-up question in an existing Genie conversation; \
         Genie retains context from earlier messages"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({
                "space_id": {"type": "string"},
                "conversation_id": {"type": "string"},
                "question": {"type": "string"},
                "wait_for_result": {"type": "boolean", "default": true}
            }),
            vec![
                "space_id".to_string(),
                "conversation_id".to_string(),
                "question".to_string(),
            ],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: FollowupArgs = parse_args(args)?;
        let reply = genie::send_followup(
            &ctx.api,
            &args.space_id,
            &args.conversation_id,
            &args.question,
            args.wait_for_result,
            genie_wait(),
        )
        .await?;
        ToolResult::json(&reply)
    }
}

// ============================================================================
// get_genie_message_status
// ============================================================================

pub struct GetGenieMessageStatusTool;

#[derive(Debug, Deserialize)]
struct MessageStatusArgs {
    space_id: String,
    conversation_id: String,
    message_id: String,
}

#[async_trait]
impl Tool for GetGenieMessageStatusTool {
    fn name(&self) -> &'static str {
        "get_genie_message_status"
    }

    fn description(&self) -> &'static str {
        "Get the status of a Genie message"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({
                "space_id": {"type": "string"},
                "conversation_id": {"type": "string"},
                "message_id": {"type": "string"}
            }),
            vec![
                "space_id".to_string(),
                "conversation_id".to_string(),
                "message_id".to_string(),
            ],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: MessageStatusArgs = parse_args(args)?;
        let result = genie::get_message_status(
            &ctx.api,
            &args.space_id,
            &args.conversation_id,
            &args.message_id,
        )
        .await?;
        ToolResult::json(&result)
    }
}

// ============================================================================
// get_genie_query_results
// ============================================================================

pub struct GetGenieQueryResultsTool;

#[derive(Debug, Deserialize)]
struct QueryResultsArgs {
    space_id: String,
    conversation_id: String,
    message_id: String,
    attachment_id: String,
}

#[async_trait]
impl Tool for GetGenieQueryResultsTool {
    fn name(&self) -> &'static str {
        "get_genie_query_results"
    }

    fn description(&self) -> &'static str {
        "Get query results from a Genie message attachment"
    }

    fn input_schema(&self) -> ToolInputSchema {
        ToolInputSchema::with_properties(
            json!({
                "space_id": {"type": "string"},
                "conversation_id": {"type": "string"},
                "message_id": {"type": "string"},
                "attachment_id": {"type": "string"}
            }),
            vec![
                "space_id".to_string(),
                "conversation_id".to_string(),
                "message_id".to_string(),
                "attachment_id".to_string(),
            ],
        )
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> Result<ToolResult, ToolError> {
        let args: QueryResultsArgs = parse_args(args)?;
        let result = genie::get_query_result(
            &ctx.api,
            &args.space_id,
            &args.conversation_id,
            &args.message_id,
            &args.attachment_id,
        )
        .await?;
        ToolResult::json(&result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wait_for_result_defaults_true() {
        let args: StartConversationArgs =
            parse_args(json!({"space_id": "s1", "question": "how many rows?"})).unwrap();
        assert!(args.wait_for_result);
    }
}
