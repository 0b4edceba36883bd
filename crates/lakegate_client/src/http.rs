//! Bearer-authenticated HTTP wrapper around the remote REST surface.
//!
//! All API modules funnel through [`ApiClient`]; it owns the single
//! `reqwest::Client`, attaches auth, and converts transport failures into
//! [`Error::Http`] with the offending method and URL captured.

use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use crate::config::Config;
use crate::error::{Error, Result};

/// HTTP client bound to one workspace.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    host: String,
    token: String,
    warehouse_id: Option<String>,
}

impl ApiClient {
    pub fn new(config: Config) -> Result<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            host: config.host,
            token: config.token,
            warehouse_id: config.warehouse_id,
        })
    }

    /// Default warehouse from configuration, if any.
    pub fn warehouse_id(&self) -> Option<&str> {
        self.warehouse_id.as_deref()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub async fn get(&self, endpoint: &str) -> Result<Value> {
        self.request(Method::GET, endpoint, None, None::<&Value>)
            .await
    }

    pub async fn get_with_query<Q: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        query: &Q,
    ) -> Result<Value> {
        let query = serde_json::to_value(query).map_err(|e| {
            Error::UnexpectedResponse(format!("Failed to serialize query parameters: {}", e))
        })?;
        self.request(Method::GET, endpoint, Some(query), None::<&Value>)
            .await
    }

    pub async fn post<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Value> {
        self.request(Method::POST, endpoint, None, Some(body)).await
    }

    /// POST with no body (e.g. repo pull).
    pub async fn post_empty(&self, endpoint: &str) -> Result<Value> {
        self.request(Method::POST, endpoint, None, None::<&Value>)
            .await
    }

    pub async fn patch<B: Serialize + ?Sized>(&self, endpoint: &str, body: &B) -> Result<Value> {
        self.request(Method::PATCH, endpoint, None, Some(body))
            .await
    }

    async fn request<B: Serialize + ?Sized>(
        &self,
        method: Method,
        endpoint: &str,
        query: Option<Value>,
        body: Option<&B>,
    ) -> Result<Value> {
        let url = self.api_url(endpoint);

        debug!(
            "API request: {} {} data: {}",
            method,
            url,
            if body.is_some() { "**REDACTED**" } else { "-" }
        );

        let mut request = self
            .http
            .request(method.clone(), url.as_str())
            .bearer_auth(&self.token);

        if let Some(ref query) = query {
            if let Some(map) = query.as_object() {
                let pairs: Vec<(String, String)> = map
                    .iter()
                    .filter(|(_, v)| !v.is_null())
                    .map(|(k, v)| (k.clone(), query_value_to_string(v)))
                    .collect();
                request = request.query(&pairs);
            }
        }

        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            error!("API error: {} {}: {}", method, url, e);
            Error::Http {
                method: method.to_string(),
                url: url.clone(),
                status: e.status().map(|s| s.as_u16()),
                message: e.to_string(),
                body: None,
            }
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| Error::Http {
            method: method.to_string(),
            url: url.clone(),
            status: Some(status.as_u16()),
            message: format!("Failed to read response body: {}", e),
            body: None,
        })?;

        if !status.is_success() {
            return Err(self.status_error(&method, &url, status, text));
        }

        if text.is_empty() {
            return Ok(Value::Object(Default::default()));
        }

        serde_json::from_str(&text).map_err(|e| Error::Http {
            method: method.to_string(),
            url,
            status: Some(status.as_u16()),
            message: format!("Invalid JSON in response body: {}", e),
            body: None,
        })
    }

    fn status_error(&self, method: &Method, url: &str, status: StatusCode, text: String) -> Error {
        let body: Option<Value> = serde_json::from_str(&text).ok();

        let remote_message = body
            .as_ref()
            .and_then(|b| {
                b.get("message")
                    .or_else(|| b.get("error"))
                    .and_then(Value::as_str)
            })
            .map(str::to_string)
            .unwrap_or_else(|| text.clone());

        let message = format!("{} - {}", status, remote_message);
        error!("API error: {} {}: {}", method, url, message);

        Error::Http {
            method: method.to_string(),
            url: url.to_string(),
            status: Some(status.as_u16()),
            message,
            body: body.or_else(|| (!text.is_empty()).then(|| Value::String(text))),
        }
    }

    fn api_url(&self, endpoint: &str) -> String {
        if endpoint.starts_with('/') {
            format!("{}{}", self.host, endpoint)
        } else {
            format!("{}/{}", self.host, endpoint)
        }
    }
}

fn query_value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> ApiClient {
        let config = Config::new("https://example.databricks.net", "dapi123").unwrap();
        ApiClient::new(config).unwrap()
    }

    #[test]
    fn api_url_joins_endpoint() {
        let api = client();
        assert_eq!(
            api.api_url("/api/2.0/sql/statements"),
            "https://example.databricks.net/api/2.0/sql/statements"
        );
        assert_eq!(
            api.api_url("api/2.0/jobs/list"),
            "https://example.databricks.net/api/2.0/jobs/list"
        );
    }

    #[test]
    fn status_error_extracts_remote_message() {
        let api = client();
        let err = api.status_error(
            &Method::POST,
            "https://example.databricks.net/api/2.0/sql/statements",
            StatusCode::FORBIDDEN,
            r#"{"error_code": "PERMISSION_DENIED", "message": "no access to warehouse"}"#
                .to_string(),
        );
        match err {
            Error::Http {
                status,
                message,
                body,
                ..
            } => {
                assert_eq!(status, Some(403));
                assert!(message.contains("no access to warehouse"));
                assert!(body.is_some());
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn status_error_keeps_non_json_body() {
        let api = client();
        let err = api.status_error(
            &Method::GET,
            "https://example.databricks.net/api/2.0/jobs/list",
            StatusCode::BAD_GATEWAY,
            "upstream connect error".to_string(),
        );
        match err {
            Error::Http { message, body, .. } => {
                assert!(message.contains("upstream connect error"));
                assert_eq!(body, Some(Value::String("upstream connect error".into())));
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn query_values_render_flat() {
        assert_eq!(query_value_to_string(&Value::String("abc".into())), "abc");
        assert_eq!(query_value_to_string(&serde_json::json!(42)), "42");
        assert_eq!(query_value_to_string(&serde_json::json!(true)), "true");
    }
}
