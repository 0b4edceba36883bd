//! Generic long-running-operation poller.
//!
//! SQL statements, job runs, and Genie messages all share the same shape:
//! submit, then poll status at a fixed cadence until a terminal state or a
//! local deadline. This module implements that loop once, parameterized by a
//! fetch capability and a status classifier. Timing goes through the [`Clock`]
//! trait so tests can drive arbitrarily many iterations without sleeping.

use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

/// How one status payload classifies against the domain's vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusClass {
    /// Keep polling. Unrecognized statuses land here; the deadline is the
    /// backstop if the remote never says anything we understand.
    Pending,
    /// Terminal success; the payload is handed back to the caller.
    Succeeded,
    /// Terminal failure with the most specific reason the payload exposed.
    Failed { message: String },
}

/// Poll cadence and local deadline.
#[derive(Debug, Clone, Copy)]
pub struct WaitConfig {
    pub poll_interval: Duration,
    pub max_wait: Duration,
}

impl WaitConfig {
    pub fn from_secs(poll_interval_secs: u64, max_wait_secs: u64) -> Self {
        Self {
            poll_interval: Duration::from_secs(poll_interval_secs),
            max_wait: Duration::from_secs(max_wait_secs),
        }
    }
}

/// Time source for the poll loop.
#[async_trait]
pub trait Clock: Send + Sync {
    /// Monotonic reading; only differences are meaningful.
    fn now(&self) -> Duration;

    async fn sleep(&self, duration: Duration);
}

/// Real clock backed by the tokio timer.
#[derive(Debug)]
pub struct TokioClock {
    start: std::time::Instant,
}

impl Default for TokioClock {
    fn default() -> Self {
        Self {
            start: std::time::Instant::now(),
        }
    }
}

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Fixed-step clock: `sleep` advances `now` by the requested amount and
/// returns immediately. Lets tests walk a poll loop through hours of
/// simulated waiting in microseconds.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Mutex<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> Duration {
        *self.now.lock().expect("manual clock lock")
    }

    async fn sleep(&self, duration: Duration) {
        let mut now = self.now.lock().expect("manual clock lock");
        *now += duration;
    }
}

/// Drive an operation to a terminal state.
///
/// `operation` labels the wait in log lines and in the timeout error, so it
/// should embed the identifiers a caller needs to resume polling manually
/// (the remote operation is NOT cancelled when the local deadline fires).
///
/// An `initial` payload, when given, is classified before any fetch: a submit
/// response that already reports a terminal state resolves the wait with zero
/// status fetches. Each loop iteration checks the deadline, sleeps one
/// interval, then performs exactly one fetch; intermediate statuses are not
/// cached.
pub async fn await_terminal<F, Fut, S, C>(
    operation: &str,
    initial: Option<Value>,
    mut fetch: F,
    classify: S,
    config: WaitConfig,
    clock: &C,
) -> Result<Value>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Value>>,
    S: Fn(&Value) -> StatusClass,
    C: Clock + ?Sized,
{
    if let Some(payload) = initial {
        match classify(&payload) {
            StatusClass::Succeeded => return Ok(payload),
            StatusClass::Failed { message } => {
                return Err(Error::OperationFailed { message, payload })
            }
            StatusClass::Pending => {}
        }
    }

    let start = clock.now();

    loop {
        let elapsed = clock.now().saturating_sub(start);
        if elapsed > config.max_wait {
            return Err(Error::Timeout {
                operation: operation.to_string(),
                waited_secs: elapsed.as_secs(),
            });
        }

        clock.sleep(config.poll_interval).await;

        let payload = fetch().await?;
        match classify(&payload) {
            StatusClass::Pending => {
                debug!("{} still pending after {:?}", operation, elapsed);
            }
            StatusClass::Succeeded => return Ok(payload),
            StatusClass::Failed { message } => {
                return Err(Error::OperationFailed { message, payload })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn classify_simple(payload: &Value) -> StatusClass {
        match payload["status"].as_str().unwrap_or("") {
            "SUCCEEDED" => StatusClass::Succeeded,
            "FAILED" => StatusClass::Failed {
                message: payload["message"]
                    .as_str()
                    .unwrap_or("Unknown error")
                    .to_string(),
            },
            _ => StatusClass::Pending,
        }
    }

    #[tokio::test]
    async fn terminal_initial_payload_skips_fetching() {
        let clock = ManualClock::new();
        let calls = AtomicUsize::new(0);

        let result = await_terminal(
            "statement s1",
            Some(json!({"status": "SUCCEEDED", "rows": 3})),
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(json!({"status": "SUCCEEDED"})) }
            },
            classify_simple,
            WaitConfig::from_secs(1, 10),
            &clock,
        )
        .await
        .unwrap();

        assert_eq!(result["rows"], 3);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failed_initial_payload_errors_immediately() {
        let clock = ManualClock::new();
        let err = await_terminal(
            "statement s1",
            Some(json!({"status": "FAILED", "message": "boom"})),
            || async { Ok(json!({})) },
            classify_simple,
            WaitConfig::from_secs(1, 10),
            &clock,
        )
        .await
        .unwrap_err();

        match err {
            Error::OperationFailed { message, .. } => assert_eq!(message, "boom"),
            other => panic!("expected OperationFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn pending_then_succeeded_fetches_exactly_n_plus_one() {
        let clock = ManualClock::new();
        let calls = AtomicUsize::new(0);
        let n = 5;

        let result = await_terminal(
            "statement s1",
            None,
            || {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move {
                    if call <= n {
                        Ok(json!({"status": "PENDING"}))
                    } else {
                        Ok(json!({"status": "SUCCEEDED", "call": call}))
                    }
                }
            },
            classify_simple,
            WaitConfig::from_secs(1, 300),
            &clock,
        )
        .await
        .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), n + 1);
        assert_eq!(result["call"], n + 1);
        // Never slept past the point where the terminal state arrived.
        assert_eq!(clock.now(), Duration::from_secs((n + 1) as u64));
    }

    #[tokio::test]
    async fn never_terminal_times_out_after_deadline() {
        let clock = ManualClock::new();
        let calls = AtomicUsize::new(0);

        let err = await_terminal(
            "run 42",
            None,
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(json!({"status": "PENDING"})) }
            },
            classify_simple,
            WaitConfig::from_secs(2, 60),
            &clock,
        )
        .await
        .unwrap_err();

        match err {
            Error::Timeout {
                operation,
                waited_secs,
            } => {
                assert!(operation.contains("run 42"));
                assert!(waited_secs >= 60);
            }
            other => panic!("expected Timeout, got {:?}", other),
        }

        // max_wait / poll_interval iterations, give or take the boundary one.
        let fetches = calls.load(Ordering::SeqCst);
        assert!((30..=31).contains(&fetches), "made {} fetches", fetches);
    }

    #[tokio::test]
    async fn unknown_statuses_stay_pending_until_deadline() {
        let clock = ManualClock::new();
        let err = await_terminal(
            "statement s1",
            None,
            || async { Ok(json!({"status": "SOMETHING_NEW"})) },
            classify_simple,
            WaitConfig::from_secs(1, 5),
            &clock,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Timeout { .. }));
    }

    #[tokio::test]
    async fn fetch_errors_propagate() {
        let clock = ManualClock::new();
        let err = await_terminal(
            "statement s1",
            None,
            || async {
                Err(Error::Http {
                    method: "GET".to_string(),
                    url: "https://example.databricks.net/x".to_string(),
                    status: Some(500),
                    message: "500 - internal".to_string(),
                    body: None,
                })
            },
            classify_simple,
            WaitConfig::from_secs(1, 10),
            &clock,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::Http { .. }));
    }
}
