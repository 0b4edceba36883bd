//! Genie conversational AI API.
//!
//! Natural-language questions are submitted to a Genie space, polled to
//! completion, then the completed message's attachments are walked to
//! assemble one composite reply: generated SQL, fetched row data, and the
//! narrative text.

use std::future::Future;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use lakegate_protocol::defaults;
use lakegate_protocol::payloads::GenieMessageRequest;
use lakegate_protocol::MessageStatus;

use crate::error::{Error, Result};
use crate::http::ApiClient;
use crate::wait::{await_terminal, Clock, StatusClass, TokioClock, WaitConfig};

/// Composite answer assembled from a completed Genie message.
///
/// `results` holds the row payload of the last attachment whose fetch
/// succeeded and carried a non-empty `data_array`; earlier data-bearing
/// attachments are discarded, not merged. `attachments` preserves the raw
/// list for callers that need full fidelity.
#[derive(Debug, Clone, Serialize)]
pub struct GenieReply {
    pub conversation_id: String,
    pub message_id: String,
    pub status: String,
    pub question: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Value>>,
}

impl GenieReply {
    /// Reply for a message that was submitted but not waited on.
    fn pending(conversation_id: String, message_id: String, question: String) -> Self {
        Self {
            conversation_id,
            message_id,
            status: MessageStatus::Pending.as_str().to_string(),
            question,
            sql: None,
            results: None,
            response: None,
            attachments: None,
        }
    }
}

/// List the Genie spaces available in the workspace.
pub async fn list_spaces(api: &ApiClient) -> Result<Value> {
    info!("Listing Genie spaces");
    api.get("/api/2.0/genie/spaces").await
}

/// Start a conversation. With `wait_for_result` the call polls until the
/// message completes and returns the aggregated reply; without it the ids
/// come back immediately for manual follow-up.
pub async fn start_conversation(
    api: &ApiClient,
    space_id: &str,
    question: &str,
    wait_for_result: bool,
    wait: WaitConfig,
) -> Result<GenieReply> {
    info!("Starting Genie conversation in space {}", space_id);

    let request = GenieMessageRequest {
        content: question.to_string(),
    };
    let response = api
        .post(
            &format!("/api/2.0/genie/spaces/{}/start-conversation", space_id),
            &request,
        )
        .await?;

    let conversation_id = response["conversation_id"].as_str().map(str::to_string);
    let message_id = response["message_id"].as_str().map(str::to_string);

    let (conversation_id, message_id) = match (conversation_id, message_id) {
        (Some(c), Some(m)) => (c, m),
        _ => {
            return Err(Error::UnexpectedResponse(
                "No conversation_id or message_id returned from Genie".to_string(),
            ))
        }
    };

    if !wait_for_result {
        return Ok(GenieReply::pending(
            conversation_id,
            message_id,
            question.to_string(),
        ));
    }

    let clock = TokioClock::default();
    wait_for_reply_with_clock(api, space_id, &conversation_id, &message_id, question, wait, &clock)
        .await
}

/// Send a follow-up message in an existing conversation. Genie retains the
/// context from earlier messages.
pub async fn send_followup(
    api: &ApiClient,
    space_id: &str,
    conversation_id: &str,
    question: &str,
    wait_for_result: bool,
    wait: WaitConfig,
) -> Result<GenieReply> {
    info!("Sending Genie follow-up in conversation {}", conversation_id);

    let request = GenieMessageRequest {
        content: question.to_string(),
    };
    let response = api
        .post(
            &format!(
                "/api/2.0/genie/spaces/{}/conversations/{}/messages",
                space_id, conversation_id
            ),
            &request,
        )
        .await?;

    let message_id = response["message_id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            Error::UnexpectedResponse("No message_id returned from Genie".to_string())
        })?;

    if !wait_for_result {
        return Ok(GenieReply::pending(
            conversation_id.to_string(),
            message_id,
            question.to_string(),
        ));
    }

    let clock = TokioClock::default();
    wait_for_reply_with_clock(api, space_id, conversation_id, &message_id, question, wait, &clock)
        .await
}

/// Fetch the current status of a message. Idempotent.
pub async fn get_message_status(
    api: &ApiClient,
    space_id: &str,
    conversation_id: &str,
    message_id: &str,
) -> Result<Value> {
    info!("Getting Genie message status: {}", message_id);
    api.get(&format!(
        "/api/2.0/genie/spaces/{}/conversations/{}/messages/{}",
        space_id, conversation_id, message_id
    ))
    .await
}

/// Fetch the query results behind one attachment.
pub async fn get_query_result(
    api: &ApiClient,
    space_id: &str,
    conversation_id: &str,
    message_id: &str,
    attachment_id: &str,
) -> Result<Value> {
    info!("Getting Genie query results for attachment {}", attachment_id);
    api.get(&format!(
        "/api/2.0/genie/spaces/{}/conversations/{}/messages/{}/query-result/{}",
        space_id, conversation_id, message_id, attachment_id
    ))
    .await
}

/// Poll a message to a terminal state, then aggregate its attachments.
pub async fn wait_for_reply_with_clock<C: Clock + ?Sized>(
    api: &ApiClient,
    space_id: &str,
    conversation_id: &str,
    message_id: &str,
    question: &str,
    wait: WaitConfig,
    clock: &C,
) -> Result<GenieReply> {
    let operation = format!(
        "Genie message (conversation_id={}, message_id={})",
        conversation_id, message_id
    );

    let payload = await_terminal(
        &operation,
        None,
        || get_message_status(api, space_id, conversation_id, message_id),
        classify_message,
        wait,
        clock,
    )
    .await?;

    Ok(assemble_reply(
        conversation_id,
        message_id,
        question,
        &payload,
        |attachment_id| async move {
            get_query_result(api, space_id, conversation_id, message_id, &attachment_id).await
        },
    )
    .await)
}

/// Walk a completed message's attachments and build the composite reply.
///
/// Best-effort by design: a failed attachment fetch is logged at warning
/// level and skipped, never propagated. The caller gets whatever subset of
/// the answer could be materialized.
pub(crate) async fn assemble_reply<F, Fut>(
    conversation_id: &str,
    message_id: &str,
    question: &str,
    payload: &Value,
    mut fetch_artifact: F,
) -> GenieReply
where
    F: FnMut(String) -> Fut,
    Fut: Future<Output = Result<Value>>,
{
    let attachments = payload["attachments"]
        .as_array()
        .cloned()
        .unwrap_or_default();

    let mut sql: Option<String> = None;
    let mut results: Option<Value> = None;

    for attachment in &attachments {
        if let Some(text) = attachment
            .pointer("/query/query")
            .and_then(Value::as_str)
        {
            sql = Some(text.to_string());
        }

        if let Some(attachment_id) = attachment.get("id").and_then(Value::as_str) {
            match fetch_artifact(attachment_id.to_string()).await {
                Ok(query_result) => {
                    let has_rows = query_result
                        .get("data_array")
                        .and_then(Value::as_array)
                        .map(|rows| !rows.is_empty())
                        .unwrap_or(false);
                    if has_rows {
                        results = Some(query_result);
                    }
                }
                Err(e) => {
                    warn!("Failed to fetch query results: {}", e);
                }
            }
        }
    }

    GenieReply {
        conversation_id: conversation_id.to_string(),
        message_id: message_id.to_string(),
        status: MessageStatus::Completed.as_str().to_string(),
        question: question.to_string(),
        sql,
        results,
        response: Some(
            payload
                .get("text")
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
        ),
        attachments: Some(attachments),
    }
}

/// Map a message status payload onto the poller's vocabulary.
pub(crate) fn classify_message(payload: &Value) -> StatusClass {
    let status = payload
        .get("status")
        .and_then(Value::as_str)
        .unwrap_or("");

    match status.parse::<MessageStatus>() {
        Ok(MessageStatus::Completed) => StatusClass::Succeeded,
        Ok(s) if s.is_terminal() => {
            let message = payload
                .pointer("/error/message")
                .and_then(Value::as_str)
                .unwrap_or(defaults::UNKNOWN_ERROR_MESSAGE);
            StatusClass::Failed {
                message: format!("Genie message failed: {}", message),
            }
        }
        _ => StatusClass::Pending,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wait::ManualClock;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn classify_message_vocabulary() {
        assert_eq!(
            classify_message(&json!({"status": "COMPLETED"})),
            StatusClass::Succeeded
        );
        for status in ["PENDING", "EXECUTING_QUERY", "FILTERING_CONTEXT", ""] {
            assert_eq!(
                classify_message(&json!({"status": status})),
                StatusClass::Pending
            );
        }
        match classify_message(&json!({
            "status": "FAILED",
            "error": {"message": "model unavailable"}
        })) {
            StatusClass::Failed { message } => {
                assert_eq!(message, "Genie message failed: model unavailable")
            }
            other => panic!("expected Failed, got {:?}", other),
        }
        match classify_message(&json!({"status": "CANCELLED"})) {
            StatusClass::Failed { message } => {
                assert_eq!(message, "Genie message failed: Unknown error")
            }
            other => panic!("expected Failed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn aggregation_keeps_last_successful_artifact_with_rows() {
        let payload = json!({
            "status": "COMPLETED",
            "text": "Here are your results",
            "attachments": [
                {"id": "a1", "query": {"query": "SELECT 1"}},
                {"id": "a2", "query": {"query": "SELECT 2"}},
                {"id": "a3"}
            ]
        });

        let calls = AtomicUsize::new(0);
        let reply = assemble_reply("c1", "m1", "how many?", &payload, |attachment_id| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move {
                match attachment_id.as_str() {
                    "a1" => Err(Error::UnexpectedResponse("transient".to_string())),
                    "a2" => Ok(json!({"data_array": [["42"]], "attachment": "a2"})),
                    _ => Err(Error::UnexpectedResponse("gone".to_string())),
                }
            }
        })
        .await;

        // Every attachment got its one fetch; the failures were skipped.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(reply.results.as_ref().unwrap()["attachment"], "a2");
        // Last query text wins.
        assert_eq!(reply.sql.as_deref(), Some("SELECT 2"));
        assert_eq!(reply.response.as_deref(), Some("Here are your results"));
        assert_eq!(reply.attachments.as_ref().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn aggregation_ignores_empty_data_arrays() {
        let payload = json!({
            "status": "COMPLETED",
            "attachments": [
                {"id": "a1"},
                {"id": "a2"}
            ]
        });

        let reply = assemble_reply("c1", "m1", "q", &payload, |attachment_id| async move {
            match attachment_id.as_str() {
                "a1" => Ok(json!({"data_array": [["real"]]})),
                _ => Ok(json!({"data_array": []})),
            }
        })
        .await;

        // a2 fetched fine but carried no rows; a1's payload is retained.
        assert_eq!(reply.results.unwrap()["data_array"][0][0], "real");
    }

    #[tokio::test]
    async fn aggregation_degrades_on_malformed_payload() {
        let payload = json!({"status": "COMPLETED"});
        let reply = assemble_reply("c1", "m1", "q", &payload, |_| async {
            Ok(Value::Null)
        })
        .await;

        assert!(reply.sql.is_none());
        assert!(reply.results.is_none());
        assert_eq!(reply.response.as_deref(), Some(""));
        assert_eq!(reply.attachments.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn poll_then_aggregate_end_to_end() {
        let clock = ManualClock::new();
        let status_calls = AtomicUsize::new(0);

        let payload = await_terminal(
            "Genie message (conversation_id=c1, message_id=m1)",
            None,
            || {
                let call = status_calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    match call {
                        1 => Ok(json!({"status": "PENDING"})),
                        2 => Ok(json!({"status": "EXECUTING_QUERY"})),
                        _ => Ok(json!({
                            "status": "COMPLETED",
                            "text": "done",
                            "attachments": [{"id": "a1", "query": {"query": "SELECT count(*) FROM t"}}]
                        })),
                    }
                }
            },
            classify_message,
            WaitConfig::from_secs(
                defaults::GENIE_POLL_INTERVAL_SECS,
                defaults::GENIE_MAX_WAIT_SECS,
            ),
            &clock,
        )
        .await
        .unwrap();

        assert_eq!(status_calls.load(Ordering::SeqCst), 3);

        let reply = assemble_reply("c1", "m1", "how many?", &payload, |_| async move {
            Ok(json!({"data_array": [["17"]]}))
        })
        .await;

        assert_eq!(reply.sql.as_deref(), Some("SELECT count(*) FROM t"));
        assert_eq!(reply.results.unwrap()["data_array"][0][0], "17");
        assert_eq!(reply.status, "COMPLETED");
    }

    #[tokio::test]
    async fn timeout_mentions_both_identifiers() {
        let clock = ManualClock::new();
        let err = await_terminal(
            "Genie message (conversation_id=c9, message_id=m9)",
            None,
            || async { Ok(json!({"status": "PENDING"})) },
            classify_message,
            WaitConfig::from_secs(2, 10),
            &clock,
        )
        .await
        .unwrap_err();

        let text = err.to_string();
        assert!(text.contains("c9"));
        assert!(text.contains("m9"));
    }
}
