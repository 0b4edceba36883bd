//! Canonical default values shared across the adapter.

/// Seconds between status polls for SQL statements.
pub const SQL_POLL_INTERVAL_SECS: u64 = 1;
/// Maximum seconds to wait for a SQL statement before giving up locally.
pub const SQL_MAX_WAIT_SECS: u64 = 300;

/// Seconds between status polls for job runs.
pub const RUN_POLL_INTERVAL_SECS: u64 = 5;
/// Maximum seconds to wait for a job run to reach the requested state.
pub const RUN_MAX_WAIT_SECS: u64 = 600;

/// Seconds between status polls for Genie messages.
pub const GENIE_POLL_INTERVAL_SECS: u64 = 2;
/// Maximum seconds to wait for a Genie reply.
pub const GENIE_MAX_WAIT_SECS: u64 = 300;

/// Server-side wait hint on statement submission; results for fast queries
/// come back inline on the submit response.
pub const SQL_WAIT_TIMEOUT: &str = "10s";
pub const SQL_RESULT_FORMAT: &str = "JSON_ARRAY";
pub const SQL_DISPOSITION: &str = "INLINE";
/// The INLINE disposition caps result payloads at 16 MiB server-side;
/// requesting more than this is rejected.
pub const SQL_BYTE_LIMIT: u64 = 16_777_216;
pub const SQL_ROW_LIMIT: u64 = 10_000;
/// Tighter row cap for the safety-gated execution path.
pub const SAFE_SQL_ROW_LIMIT: u64 = 1_000;

/// Fallback when a terminal-failure payload carries no failure reason.
pub const UNKNOWN_ERROR_MESSAGE: &str = "Unknown error";
