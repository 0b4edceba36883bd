//! Status vocabularies for the remote APIs.
//!
//! These are the CANONICAL definitions - use these everywhere a remote status
//! string is interpreted. Unknown strings fail `FromStr`; pollers treat a
//! failed parse as "still pending" rather than guessing.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// SQL Statement Execution
// ============================================================================

/// Lifecycle of a SQL statement submitted to `/api/2.0/sql/statements`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatementState {
    /// Statement accepted, waiting for a warehouse slot
    #[default]
    Pending,
    /// Statement is executing
    Running,
    /// Statement finished and results are available
    Succeeded,
    /// Statement failed with an error
    Failed,
    /// Statement was cancelled
    Canceled,
    /// Statement handle expired or was closed server-side
    Closed,
}

impl StatementState {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatementState::Pending => "PENDING",
            StatementState::Running => "RUNNING",
            StatementState::Succeeded => "SUCCEEDED",
            StatementState::Failed => "FAILED",
            StatementState::Canceled => "CANCELED",
            StatementState::Closed => "CLOSED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StatementState::Succeeded
                | StatementState::Failed
                | StatementState::Canceled
                | StatementState::Closed
        )
    }
}

impl fmt::Display for StatementState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StatementState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(StatementState::Pending),
            "RUNNING" => Ok(StatementState::Running),
            "SUCCEEDED" => Ok(StatementState::Succeeded),
            "FAILED" => Ok(StatementState::Failed),
            "CANCELED" => Ok(StatementState::Canceled),
            "CLOSED" => Ok(StatementState::Closed),
            _ => Err(format!("Invalid statement state: '{}'", s)),
        }
    }
}

// ============================================================================
// Job Runs
// ============================================================================

/// Life-cycle state of a job run (`state.life_cycle_state` on runs/get).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunLifeCycleState {
    #[default]
    Pending,
    Running,
    Terminating,
    /// Run finished; `state.result_state` tells success vs failure
    Terminated,
    /// Run was skipped because an earlier attempt is still active
    Skipped,
    /// The service failed the run without executing it
    InternalError,
    Queued,
    Blocked,
    WaitingForRetry,
}

impl RunLifeCycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunLifeCycleState::Pending => "PENDING",
            RunLifeCycleState::Running => "RUNNING",
            RunLifeCycleState::Terminating => "TERMINATING",
            RunLifeCycleState::Terminated => "TERMINATED",
            RunLifeCycleState::Skipped => "SKIPPED",
            RunLifeCycleState::InternalError => "INTERNAL_ERROR",
            RunLifeCycleState::Queued => "QUEUED",
            RunLifeCycleState::Blocked => "BLOCKED",
            RunLifeCycleState::WaitingForRetry => "WAITING_FOR_RETRY",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunLifeCycleState::Terminated
                | RunLifeCycleState::Skipped
                | RunLifeCycleState::InternalError
        )
    }
}

impl fmt::Display for RunLifeCycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RunLifeCycleState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(RunLifeCycleState::Pending),
            "RUNNING" => Ok(RunLifeCycleState::Running),
            "TERMINATING" => Ok(RunLifeCycleState::Terminating),
            "TERMINATED" => Ok(RunLifeCycleState::Terminated),
            "SKIPPED" => Ok(RunLifeCycleState::Skipped),
            "INTERNAL_ERROR" => Ok(RunLifeCycleState::InternalError),
            "QUEUED" => Ok(RunLifeCycleState::Queued),
            "BLOCKED" => Ok(RunLifeCycleState::Blocked),
            "WAITING_FOR_RETRY" => Ok(RunLifeCycleState::WaitingForRetry),
            _ => Err(format!("Invalid run life-cycle state: '{}'", s)),
        }
    }
}

/// Result state of a terminated run (`state.result_state`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunResultState {
    Success,
    Failed,
    Timedout,
    Canceled,
}

impl RunResultState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunResultState::Success => "SUCCESS",
            RunResultState::Failed => "FAILED",
            RunResultState::Timedout => "TIMEDOUT",
            RunResultState::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for RunResultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RunResultState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "SUCCESS" => Ok(RunResultState::Success),
            "FAILED" => Ok(RunResultState::Failed),
            "TIMEDOUT" => Ok(RunResultState::Timedout),
            "CANCELED" => Ok(RunResultState::Canceled),
            _ => Err(format!("Invalid run result state: '{}'", s)),
        }
    }
}

// ============================================================================
// Genie Conversations
// ============================================================================

/// Status of a Genie conversational message.
///
/// The remote API grows statuses over time; only the ones the adapter acts on
/// are modeled. Anything else parses as an error and is treated as pending by
/// the poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStatus {
    #[default]
    Pending,
    ExecutingQuery,
    /// Reply and attachments are ready
    Completed,
    Failed,
    Cancelled,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Pending => "PENDING",
            MessageStatus::ExecutingQuery => "EXECUTING_QUERY",
            MessageStatus::Completed => "COMPLETED",
            MessageStatus::Failed => "FAILED",
            MessageStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            MessageStatus::Completed | MessageStatus::Failed | MessageStatus::Cancelled
        )
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MessageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "PENDING" => Ok(MessageStatus::Pending),
            "EXECUTING_QUERY" => Ok(MessageStatus::ExecutingQuery),
            "COMPLETED" => Ok(MessageStatus::Completed),
            "FAILED" => Ok(MessageStatus::Failed),
            "CANCELLED" => Ok(MessageStatus::Cancelled),
            _ => Err(format!("Invalid message status: '{}'", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statement_state_roundtrip() {
        for state in [
            StatementState::Pending,
            StatementState::Running,
            StatementState::Succeeded,
            StatementState::Failed,
            StatementState::Canceled,
            StatementState::Closed,
        ] {
            assert_eq!(state.as_str().parse::<StatementState>().unwrap(), state);
        }
    }

    #[test]
    fn statement_state_terminal() {
        assert!(!StatementState::Pending.is_terminal());
        assert!(!StatementState::Running.is_terminal());
        assert!(StatementState::Succeeded.is_terminal());
        assert!(StatementState::Failed.is_terminal());
        assert!(StatementState::Canceled.is_terminal());
        assert!(StatementState::Closed.is_terminal());
    }

    #[test]
    fn statement_state_unknown_rejected() {
        assert!("EXPLODED".parse::<StatementState>().is_err());
    }

    #[test]
    fn statement_state_serde_screaming_snake() {
        let json = serde_json::to_string(&StatementState::Succeeded).unwrap();
        assert_eq!(json, "\"SUCCEEDED\"");
    }

    #[test]
    fn run_life_cycle_terminal() {
        assert!(RunLifeCycleState::Terminated.is_terminal());
        assert!(RunLifeCycleState::InternalError.is_terminal());
        assert!(RunLifeCycleState::Skipped.is_terminal());
        assert!(!RunLifeCycleState::Queued.is_terminal());
        assert!(!RunLifeCycleState::Terminating.is_terminal());
    }

    #[test]
    fn run_life_cycle_from_str() {
        assert_eq!(
            "INTERNAL_ERROR".parse::<RunLifeCycleState>().unwrap(),
            RunLifeCycleState::InternalError
        );
        assert_eq!(
            "terminated".parse::<RunLifeCycleState>().unwrap(),
            RunLifeCycleState::Terminated
        );
    }

    #[test]
    fn message_status_terminal() {
        assert!(MessageStatus::Completed.is_terminal());
        assert!(MessageStatus::Failed.is_terminal());
        assert!(MessageStatus::Cancelled.is_terminal());
        assert!(!MessageStatus::Pending.is_terminal());
        assert!(!MessageStatus::ExecutingQuery.is_terminal());
    }

    #[test]
    fn message_status_unknown_rejected() {
        // FILTERING_CONTEXT and friends are intentionally unmodeled
        assert!("FILTERING_CONTEXT".parse::<MessageStatus>().is_err());
    }
}
