//! Repos API: clone, branch switching, and pull.

use serde_json::Value;
use tracing::info;

use lakegate_protocol::payloads::{CreateRepoRequest, UpdateRepoRequest};

use crate::error::Result;
use crate::http::ApiClient;

/// Create (clone) a repo in the workspace.
pub async fn create_repo(
    api: &ApiClient,
    url: &str,
    provider: &str,
    branch: Option<String>,
    path: Option<String>,
) -> Result<Value> {
    let request = CreateRepoRequest {
        url: url.to_string(),
        provider: provider.to_string(),
        branch,
        path,
    };
    api.post("/api/2.0/repos", &request).await
}

/// Check out a branch or tag.
pub async fn update_repo(
    api: &ApiClient,
    repo_id: i64,
    branch: Option<String>,
    tag: Option<String>,
) -> Result<Value> {
    let request = UpdateRepoRequest { branch, tag };
    api.patch(&format!("/api/2.0/repos/{}", repo_id), &request)
        .await
}

pub async fn list_repos(api: &ApiClient, path_prefix: Option<String>) -> Result<Value> {
    match path_prefix {
        Some(prefix) => {
            api.get_with_query("/api/2.0/repos", &serde_json::json!({"path_prefix": prefix}))
                .await
        }
        None => api.get("/api/2.0/repos").await,
    }
}

/// Pull the latest commit for the repo's current branch.
pub async fn pull_repo(api: &ApiClient, repo_id: i64) -> Result<Value> {
    info!("Pulling repo {}", repo_id);
    api.post_empty(&format!("/api/2.0/repos/{}/pull", repo_id))
        .await
}
