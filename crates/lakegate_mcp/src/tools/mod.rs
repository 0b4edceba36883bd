//! MCP tool implementations.
//!
//! Each tool wraps one operation from a `lakegate_client` API family with a
//! typed argument struct and a JSON Schema. Tools are registered in the
//! [`ToolRegistry`] and dispatched by name.
//!
//! # Tool categories
//!
//! - **SQL**: execute_sql, execute_sql_and_wait, execute_safe_sql,
//!   get_statement_status, cancel_statement
//! - **Jobs**: list/create/delete/run jobs, run/cancel/inspect runs,
//!   run_notebook, sync_repo_and_run_notebook
//! - **Workspace**: notebooks, files, directories
//! - **Unity Catalog**: catalogs, schemas, tables, lineage
//! - **Repos**: create, update, list, pull
//! - **Libraries**: install, uninstall, cluster status
//! - **Genie**: spaces, conversations, query results

mod registry;

mod catalog;
mod genie;
mod jobs;
mod libraries;
mod repos;
mod sql;
mod workspace;

pub use registry::ToolRegistry;
