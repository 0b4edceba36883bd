//! Unity Catalog API.

use serde_json::Value;
use tracing::info;

use lakegate_protocol::payloads::{CreateCatalogRequest, CreateSchemaRequest};

use crate::error::Result;
use crate::http::ApiClient;
use crate::sql::{self, StatementOptions};

pub async fn list_catalogs(api: &ApiClient) -> Result<Value> {
    info!("Listing catalogs");
    api.get("/api/2.1/unity-catalog/catalogs").await
}

pub async fn create_catalog(api: &ApiClient, name: &str, comment: Option<String>) -> Result<Value> {
    let request = CreateCatalogRequest {
        name: name.to_string(),
        comment,
    };
    api.post("/api/2.1/unity-catalog/catalogs", &request).await
}

pub async fn list_schemas(api: &ApiClient, catalog_name: &str) -> Result<Value> {
    api.get_with_query(
        "/api/2.1/unity-catalog/schemas",
        &serde_json::json!({"catalog_name": catalog_name}),
    )
    .await
}

pub async fn create_schema(
    api: &ApiClient,
    catalog_name: &str,
    name: &str,
    comment: Option<String>,
) -> Result<Value> {
    let request = CreateSchemaRequest {
        catalog_name: catalog_name.to_string(),
        name: name.to_string(),
        comment,
    };
    api.post("/api/2.1/unity-catalog/schemas", &request).await
}

pub async fn list_tables(api: &ApiClient, catalog_name: &str, schema_name: &str) -> Result<Value> {
    api.get_with_query(
        "/api/2.1/unity-catalog/tables",
        &serde_json::json!({"catalog_name": catalog_name, "schema_name": schema_name}),
    )
    .await
}

/// Tables are created through the SQL API; Unity Catalog has no direct
/// create-table endpoint for external callers.
pub async fn create_table(api: &ApiClient, warehouse_id: &str, statement: &str) -> Result<Value> {
    let opts = StatementOptions {
        warehouse_id: Some(warehouse_id.to_string()),
        ..Default::default()
    };
    sql::execute_statement(api, statement, &opts).await
}

pub async fn get_table_lineage(api: &ApiClient, full_name: &str) -> Result<Value> {
    api.get(&format!(
        "/api/2.1/unity-catalog/lineage-tracking/table-lineage/{}",
        full_name
    ))
    .await
}
