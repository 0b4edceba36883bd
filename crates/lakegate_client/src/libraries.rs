//! Cluster library management API.

use serde_json::Value;
use tracing::info;

use lakegate_protocol::payloads::LibrariesRequest;

use crate::error::Result;
use crate::http::ApiClient;

pub async fn install(api: &ApiClient, cluster_id: &str, libraries: Vec<Value>) -> Result<Value> {
    info!("Installing libraries on cluster {}", cluster_id);
    let request = LibrariesRequest {
        cluster_id: cluster_id.to_string(),
        libraries,
    };
    api.post("/api/2.0/libraries/install", &request).await
}

pub async fn uninstall(api: &ApiClient, cluster_id: &str, libraries: Vec<Value>) -> Result<Value> {
    info!("Uninstalling libraries on cluster {}", cluster_id);
    let request = LibrariesRequest {
        cluster_id: cluster_id.to_string(),
        libraries,
    };
    api.post("/api/2.0/libraries/uninstall", &request).await
}

pub async fn cluster_status(api: &ApiClient, cluster_id: &str) -> Result<Value> {
    info!("Listing libraries for cluster {}", cluster_id);
    api.get_with_query(
        "/api/2.0/libraries/cluster-status",
        &serde_json::json!({"cluster_id": cluster_id}),
    )
    .await
}
