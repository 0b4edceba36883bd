//! Workspace object API: notebooks, files, and directories.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde_json::Value;
use tracing::{info, warn};

use lakegate_protocol::payloads::{DeleteObjectRequest, ImportNotebookRequest};

use crate::error::{Error, Result};
use crate::http::ApiClient;

/// Import a notebook. Content may arrive raw or already base64-encoded;
/// it always goes over the wire as base64.
pub async fn import_notebook(
    api: &ApiClient,
    path: &str,
    content: &str,
    format: &str,
    language: Option<String>,
    overwrite: bool,
) -> Result<Value> {
    info!("Importing notebook to path: {}", path);

    let content = if is_base64(content) {
        content.to_string()
    } else {
        BASE64.encode(content.as_bytes())
    };

    let request = ImportNotebookRequest {
        path: path.to_string(),
        format: format.to_string(),
        content,
        overwrite,
        language,
    };

    api.post("/api/2.0/workspace/import", &request).await
}

/// Export a notebook. For SOURCE and JUPYTER formats the base64 content is
/// additionally decoded into `decoded_content`, best-effort.
pub async fn export_notebook(api: &ApiClient, path: &str, format: &str) -> Result<Value> {
    info!("Exporting notebook from path: {}", path);

    let mut response = api
        .get_with_query(
            "/api/2.0/workspace/export",
            &serde_json::json!({"path": path, "format": format}),
        )
        .await?;

    if matches!(format, "SOURCE" | "JUPYTER") {
        decorate_exported_notebook(&mut response);
    }

    Ok(response)
}

/// List objects in a workspace directory.
pub async fn list_objects(api: &ApiClient, path: &str) -> Result<Value> {
    info!("Listing notebooks in path: {}", path);
    api.get_with_query("/api/2.0/workspace/list", &serde_json::json!({"path": path}))
        .await
}

/// Delete a notebook or directory.
pub async fn delete_object(api: &ApiClient, path: &str, recursive: bool) -> Result<Value> {
    info!("Deleting path: {}", path);
    let request = DeleteObjectRequest {
        path: path.to_string(),
        recursive,
    };
    api.post("/api/2.0/workspace/delete", &request).await
}

/// Create a directory, including intermediate levels.
pub async fn mkdirs(api: &ApiClient, path: &str) -> Result<Value> {
    info!("Creating directory: {}", path);
    api.post("/api/2.0/workspace/mkdirs", &serde_json::json!({"path": path}))
        .await
}

/// Export any workspace file. For SOURCE format the content is decoded and
/// tagged with a detected content type (text, json, or binary).
pub async fn export_file(api: &ApiClient, path: &str, format: &str) -> Result<Value> {
    info!("Exporting workspace file from path: {}", path);

    let mut response = api
        .get_with_query(
            "/api/2.0/workspace/export",
            &serde_json::json!({"path": path, "format": format}),
        )
        .await?;

    if format == "SOURCE" {
        decorate_exported_file(&mut response);
    }

    Ok(response)
}

/// Fetch metadata for one workspace object without downloading content.
/// The workspace API has no stat endpoint, so this lists the parent
/// directory and picks out the entry.
pub async fn get_object_info(api: &ApiClient, path: &str) -> Result<Value> {
    info!("Getting workspace file info for path: {}", path);

    let directory = match path.rfind('/') {
        Some(0) | None => "/".to_string(),
        Some(idx) => path[..idx].to_string(),
    };

    let response = list_objects(api, &directory).await?;

    if let Some(objects) = response.get("objects").and_then(Value::as_array) {
        for obj in objects {
            if obj.get("path").and_then(Value::as_str) == Some(path) {
                return Ok(obj.clone());
            }
        }
    }

    Err(Error::UnexpectedResponse(format!("File not found: {}", path)))
}

/// Add `decoded_content` next to the base64 `content` when it decodes
/// cleanly; leave the response untouched otherwise.
fn decorate_exported_notebook(response: &mut Value) {
    let Some(content) = response.get("content").and_then(Value::as_str) else {
        return;
    };

    match BASE64.decode(content) {
        Ok(bytes) => match String::from_utf8(bytes) {
            Ok(text) => {
                response["decoded_content"] = Value::String(text);
            }
            Err(e) => warn!("Failed to decode notebook content: {}", e),
        },
        Err(e) => warn!("Failed to decode notebook content: {}", e),
    }
}

/// Decode SOURCE-format file content and classify it. UTF-8 text is checked
/// for JSON; undecodable bytes degrade to a lossy rendering, and content
/// that is not base64 at all is tagged binary.
fn decorate_exported_file(response: &mut Value) {
    let Some(content) = response.get("content").and_then(Value::as_str) else {
        return;
    };

    let bytes = match BASE64.decode(content) {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to decode content with any encoding: {}", e);
            response["content_type"] = Value::String("binary".to_string());
            response["note"] = Value::String("Content could not be decoded as text".to_string());
            return;
        }
    };

    match String::from_utf8(bytes.clone()) {
        Ok(text) => {
            let content_type = if serde_json::from_str::<Value>(&text).is_ok() {
                "json"
            } else {
                "text"
            };
            response["decoded_content"] = Value::String(text);
            response["content_type"] = Value::String(content_type.to_string());
        }
        Err(e) => {
            warn!("Failed to decode file content as UTF-8: {}", e);
            response["decoded_content"] =
                Value::String(String::from_utf8_lossy(&bytes).into_owned());
            response["content_type"] = Value::String("text".to_string());
            response["encoding_warning"] =
                Value::String("Some characters may not display correctly".to_string());
        }
    }
}

/// Does this string already look like a base64 payload? Round-trips the
/// decode so padding and alphabet mismatches both fail.
fn is_base64(content: &str) -> bool {
    match BASE64.decode(content) {
        Ok(decoded) => BASE64.encode(decoded) == content,
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn is_base64_detects_encoded_content() {
        let encoded = BASE64.encode("print('hello')");
        assert!(is_base64(&encoded));
        assert!(!is_base64("print('hello')"));
        assert!(!is_base64("not base64!!"));
    }

    #[test]
    fn exported_notebook_gains_decoded_content() {
        let mut response = json!({"content": BASE64.encode("# Databricks notebook source\nprint(1)")});
        decorate_exported_notebook(&mut response);
        assert_eq!(
            response["decoded_content"],
            "# Databricks notebook source\nprint(1)"
        );
    }

    #[test]
    fn exported_notebook_with_bad_content_left_alone() {
        let mut response = json!({"content": "!!not-base64!!"});
        decorate_exported_notebook(&mut response);
        assert!(response.get("decoded_content").is_none());
    }

    #[test]
    fn exported_file_detects_json() {
        let mut response = json!({"content": BASE64.encode(r#"{"a": 1}"#)});
        decorate_exported_file(&mut response);
        assert_eq!(response["content_type"], "json");
        assert_eq!(response["decoded_content"], r#"{"a": 1}"#);
    }

    #[test]
    fn exported_file_detects_plain_text() {
        let mut response = json!({"content": BASE64.encode("just some notes")});
        decorate_exported_file(&mut response);
        assert_eq!(response["content_type"], "text");
    }

    #[test]
    fn exported_file_handles_non_utf8() {
        let mut response = json!({"content": BASE64.encode([0xff, 0xfe, 0x41])});
        decorate_exported_file(&mut response);
        assert_eq!(response["content_type"], "text");
        assert!(response.get("encoding_warning").is_some());
    }

    #[test]
    fn exported_file_tags_undecodable_as_binary() {
        let mut response = json!({"content": "!!not-base64!!"});
        decorate_exported_file(&mut response);
        assert_eq!(response["content_type"], "binary");
        assert!(response.get("note").is_some());
    }
}
