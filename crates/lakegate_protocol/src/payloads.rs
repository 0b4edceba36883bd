//! Request payload types for the remote APIs.
//!
//! Field names match the wire format; optional fields are omitted from the
//! serialized body rather than sent as null.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::defaults;

/// Body for POST /api/2.0/sql/statements.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteStatementRequest {
    pub statement: String,
    pub warehouse_id: String,
    pub wait_timeout: String,
    pub format: String,
    pub disposition: String,
    pub row_limit: u64,
    pub byte_limit: u64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

impl ExecuteStatementRequest {
    /// Build a request with the standard inline-disposition settings.
    pub fn new(statement: impl Into<String>, warehouse_id: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            warehouse_id: warehouse_id.into(),
            wait_timeout: defaults::SQL_WAIT_TIMEOUT.to_string(),
            format: defaults::SQL_RESULT_FORMAT.to_string(),
            disposition: defaults::SQL_DISPOSITION.to_string(),
            row_limit: defaults::SQL_ROW_LIMIT,
            byte_limit: defaults::SQL_BYTE_LIMIT,
            catalog: None,
            schema: None,
            parameters: None,
        }
    }
}

/// Notebook task inside a one-time run submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotebookTask {
    pub notebook_path: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_parameters: Option<Value>,
}

/// Task entry for POST /api/2.0/jobs/runs/submit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTask {
    pub task_key: String,
    pub notebook_task: NotebookTask,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_cluster_id: Option<String>,
}

/// Body for POST /api/2.0/jobs/runs/submit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitRunRequest {
    pub tasks: Vec<SubmitTask>,
}

/// Body for POST /api/2.0/jobs/run-now.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunNowRequest {
    pub job_id: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notebook_params: Option<Value>,
}

/// Body for POST /api/2.0/jobs/update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateJobRequest {
    pub job_id: i64,
    pub new_settings: Value,
}

/// Body for the Genie start-conversation and follow-up message endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenieMessageRequest {
    pub content: String,
}

/// Body for POST /api/2.0/workspace/import.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportNotebookRequest {
    pub path: String,
    pub format: String,
    /// Always base64, regardless of what the caller handed in.
    pub content: String,
    pub overwrite: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Body for POST /api/2.0/workspace/delete.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteObjectRequest {
    pub path: String,
    pub recursive: bool,
}

/// Body for POST /api/2.0/repos.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRepoRequest {
    pub url: String,
    pub provider: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Body for PATCH /api/2.0/repos/{id}. Branch and tag are mutually
/// exclusive server-side; the API rejects bodies carrying both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateRepoRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// Body for the library install/uninstall endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibrariesRequest {
    pub cluster_id: String,
    pub libraries: Vec<Value>,
}

/// Body for POST /api/2.1/unity-catalog/catalogs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCatalogRequest {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Body for POST /api/2.1/unity-catalog/schemas.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSchemaRequest {
    pub catalog_name: String,
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn execute_statement_defaults() {
        let req = ExecuteStatementRequest::new("SELECT 1", "abc123def456");
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["wait_timeout"], "10s");
        assert_eq!(body["disposition"], "INLINE");
        assert_eq!(body["byte_limit"], 16_777_216);
        assert!(body.get("catalog").is_none());
        assert!(body.get("parameters").is_none());
    }

    #[test]
    fn submit_run_shape() {
        let req = SubmitRunRequest {
            tasks: vec![SubmitTask {
                task_key: "run_notebook".to_string(),
                notebook_task: NotebookTask {
                    notebook_path: "/Users/me/nb".to_string(),
                    base_parameters: Some(json!({"env": "dev"})),
                },
                existing_cluster_id: None,
            }],
        };
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["tasks"][0]["task_key"], "run_notebook");
        assert_eq!(
            body["tasks"][0]["notebook_task"]["base_parameters"]["env"],
            "dev"
        );
        assert!(body["tasks"][0].get("existing_cluster_id").is_none());
    }

    #[test]
    fn update_repo_omits_empty_fields() {
        let req = UpdateRepoRequest {
            branch: Some("main".to_string()),
            tag: None,
        };
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body, json!({"branch": "main"}));
    }
}
