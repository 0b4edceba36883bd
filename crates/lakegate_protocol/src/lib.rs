//! Canonical types for the Databricks REST API surface.
//!
//! Status vocabularies, request payloads, and poll-cadence defaults shared by
//! the client and the MCP tool layer. Everything here mirrors the remote API's
//! wire shapes; nothing in this crate performs I/O.

pub mod defaults;
pub mod payloads;
pub mod types;

pub use types::{MessageStatus, RunLifeCycleState, RunResultState, StatementState};
