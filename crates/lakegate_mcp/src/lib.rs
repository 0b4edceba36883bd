//! MCP (Model Context Protocol) server for the Databricks REST API.
//!
//! This crate exposes the client's API families as MCP tools over JSON-RPC
//! 2.0 on stdio, enabling AI assistants to manage SQL warehouses, jobs,
//! notebooks, Unity Catalog, repos, cluster libraries, and Genie
//! conversations.
//!
//! # Architecture
//!
//! ```text
//! AI Assistant (Claude, Cursor, ...)
//!         │  JSON-RPC over stdio
//!         ▼
//! McpServer ── ToolRegistry ── Tool implementations (tools/*)
//!         │                          │
//!         │                          ▼
//!         │                   lakegate_client (HTTP → Databricks)
//!         ▼
//! Response budget, error mapping
//! ```
//!
//! # Design principles
//!
//! 1. **Typed arguments:** every tool deserializes its argument object into
//!    a serde struct up front; malformed input fails with Invalid params
//!    before any network call.
//! 2. **Errors are tool results:** a failing tool returns an `is_error`
//!    result with the message text rather than a protocol-level failure, so
//!    the calling assistant can read and react to it.
//! 3. **Read-only by default for AI-driven SQL:** the `execute_safe_sql`
//!    tool routes through the safety gate in `lakegate_security`.
//! 4. **Bounded output:** serialized results are capped by a response
//!    budget; oversized payloads are replaced with a truncation notice.

pub mod format;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod types;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RequestId};
pub use server::{McpServer, McpServerConfig};
pub use tools::ToolRegistry;
pub use types::{Tool, ToolContext, ToolError, ToolResult};
