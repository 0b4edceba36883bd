//! SQL statement execution API.

use serde_json::Value;
use tracing::info;

use lakegate_protocol::defaults;
use lakegate_protocol::payloads::ExecuteStatementRequest;
use lakegate_protocol::StatementState;

use lakegate_security::{check_sql_safety, sanitize_sql_for_logging};

use crate::error::{Error, Result};
use crate::http::ApiClient;
use crate::wait::{await_terminal, Clock, StatusClass, TokioClock, WaitConfig};

/// Optional knobs for statement execution. `Default` gives the standard
/// read path: config-default warehouse, no catalog/schema override.
#[derive(Debug, Clone, Default)]
pub struct StatementOptions {
    pub warehouse_id: Option<String>,
    pub catalog: Option<String>,
    pub schema: Option<String>,
    pub parameters: Option<Value>,
    pub row_limit: Option<u64>,
}

/// Submit a statement for execution.
///
/// The warehouse comes from the options or falls back to the configured
/// default; with neither available this fails before any network call.
pub async fn execute_statement(
    api: &ApiClient,
    statement: &str,
    opts: &StatementOptions,
) -> Result<Value> {
    info!(
        "Executing SQL statement: {}",
        sanitize_sql_for_logging(statement, 100)
    );

    let warehouse_id = opts
        .warehouse_id
        .as_deref()
        .or_else(|| api.warehouse_id())
        .ok_or_else(|| {
            Error::MissingArgument(
                "warehouse_id must be provided either as parameter or \
                 set DATABRICKS_WAREHOUSE_ID environment variable"
                    .to_string(),
            )
        })?;

    let mut request = ExecuteStatementRequest::new(statement, warehouse_id);
    request.catalog = opts.catalog.clone();
    request.schema = opts.schema.clone();
    request.parameters = opts.parameters.clone();
    if let Some(row_limit) = opts.row_limit {
        request.row_limit = row_limit;
    }

    api.post("/api/2.0/sql/statements", &request).await
}

/// Submit a statement and poll until it reaches a terminal state.
///
/// Fast statements often come back already SUCCEEDED on the submit response
/// (the server holds the request briefly); those resolve without a single
/// status fetch. A local timeout leaves the statement running remotely.
pub async fn execute_and_wait(
    api: &ApiClient,
    statement: &str,
    opts: &StatementOptions,
    wait: WaitConfig,
) -> Result<Value> {
    let clock = TokioClock::default();
    execute_and_wait_with_clock(api, statement, opts, wait, &clock).await
}

pub async fn execute_and_wait_with_clock<C: Clock + ?Sized>(
    api: &ApiClient,
    statement: &str,
    opts: &StatementOptions,
    wait: WaitConfig,
    clock: &C,
) -> Result<Value> {
    let response = execute_statement(api, statement, opts).await?;

    let statement_id = response["statement_id"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| {
            Error::UnexpectedResponse("No statement_id returned from execution".to_string())
        })?;

    let operation = format!("SQL statement {}", statement_id);
    let fetch_id = statement_id.clone();

    await_terminal(
        &operation,
        Some(response),
        || get_statement_status(api, &fetch_id),
        classify_statement,
        wait,
        clock,
    )
    .await
}

/// Fetch the current status of a statement. Idempotent.
pub async fn get_statement_status(api: &ApiClient, statement_id: &str) -> Result<Value> {
    info!("Getting status of SQL statement: {}", statement_id);
    api.get(&format!("/api/2.0/sql/statements/{}", statement_id))
        .await
}

/// Cancel a running statement.
pub async fn cancel_statement(api: &ApiClient, statement_id: &str) -> Result<Value> {
    info!("Cancelling SQL statement: {}", statement_id);
    api.post(
        &format!("/api/2.0/sql/statements/{}/cancel", statement_id),
        &Value::Object(Default::default()),
    )
    .await
}

/// Run the read-only gate, then submit. The gate rejects before any network
/// activity; the row cap is tightened for this path.
pub async fn execute_safe_statement(
    api: &ApiClient,
    statement: &str,
    opts: &StatementOptions,
) -> Result<Value> {
    check_sql_safety(statement, true)?;
    info!("SQL safety validation passed");

    let mut opts = opts.clone();
    if opts.row_limit.is_none() {
        opts.row_limit = Some(defaults::SAFE_SQL_ROW_LIMIT);
    }

    execute_statement(api, statement, &opts).await
}

/// Map a statement status payload onto the poller's vocabulary.
pub(crate) fn classify_statement(payload: &Value) -> StatusClass {
    let state = payload
        .pointer("/status/state")
        .and_then(Value::as_str)
        .unwrap_or("");

    match state.parse::<StatementState>() {
        Ok(StatementState::Succeeded) => StatusClass::Succeeded,
        Ok(s) if s.is_terminal() => {
            let message = payload
                .pointer("/status/error/message")
                .and_then(Value::as_str)
                .unwrap_or(defaults::UNKNOWN_ERROR_MESSAGE);
            StatusClass::Failed {
                message: format!("Query execution failed: {}", message),
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
    fn classify_pending_states() {
        for state in ["PENDING", "RUNNING", "BRAND_NEW_STATE", ""] {
            let payload = json!({"status": {"state": state}});
            assert_eq!(classify_statement(&payload), StatusClass::Pending);
        }
    }

    #[test]
    fn classify_success() {
        let payload = json!({"status": {"state": "SUCCEEDED"}});
        assert_eq!(classify_statement(&payload), StatusClass::Succeeded);
    }

    #[test]
    fn classify_failures_use_error_message() {
        let payload = json!({
            "status": {"state": "FAILED", "error": {"message": "syntax error"}}
        });
        assert_eq!(
            classify_statement(&payload),
            StatusClass::Failed {
                message: "Query execution failed: syntax error".to_string()
            }
        );

        for state in ["CANCELED", "CLOSED"] {
            let payload = json!({"status": {"state": state}});
            assert_eq!(
                classify_statement(&payload),
                StatusClass::Failed {
                    message: "Query execution failed: Unknown error".to_string()
                }
            );
        }
    }

    /// Submit, two pending polls, then a terminal failure: the caller sees
    /// the remote-supplied reason verbatim.
    #[tokio::test]
    async fn submit_poll_then_failure_surfaces_reason() {
        let clock = ManualClock::new();
        let calls = AtomicUsize::new(0);

        let err = await_terminal(
            "SQL statement 01ef-abc",
            Some(json!({"statement_id": "01ef-abc", "status": {"state": "PENDING"}})),
            || {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if call <= 2 {
                        Ok(json!({"status": {"state": "RUNNING"}}))
                    } else {
                        Ok(json!({
                            "status": {"state": "FAILED", "error": {"message": "syntax error"}}
                        }))
                    }
                }
            },
            classify_statement,
            WaitConfig::from_secs(1, 300),
            &clock,
        )
        .await
        .unwrap_err();

        match err {
            Error::OperationFailed { message, payload } => {
                assert!(message.contains("syntax error"));
                assert_eq!(payload["status"]["state"], "FAILED");
            }
            other => panic!("expected OperationFailed, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    /// A submit response that already reports SUCCEEDED resolves the wait
    /// without any status fetches.
    #[tokio::test]
    async fn inline_success_resolves_without_polling() {
        let clock = ManualClock::new();
        let calls = AtomicUsize::new(0);

        let result = await_terminal(
            "SQL statement 01ef-abc",
            Some(json!({
                "statement_id": "01ef-abc",
                "status": {"state": "SUCCEEDED"},
                "result": {"data_array": [["1"]]}
            })),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(json!({})) }
            },
            classify_statement,
            WaitConfig::from_secs(1, 300),
            &clock,
        )
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(result["result"]["data_array"][0][0], "1");
    }
}
