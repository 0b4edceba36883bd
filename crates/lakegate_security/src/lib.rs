//! Safety validation for AI-driven SQL execution.
//!
//! Static analysis of SQL text, not runtime enforcement: the gate classifies a
//! statement as read-only-safe or rejected before it is ever submitted to a
//! warehouse. Pure functions throughout; no network, no state.

pub mod sql_guard;

pub use sql_guard::{
    check_sql_safety, sanitize_sql_for_logging, suggest_safe_alternative, validate_read_only,
    SqlRejected, SqlVerdict,
};
