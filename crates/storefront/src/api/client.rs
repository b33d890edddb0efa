//! HTTP plumbing shared by all backend resource groups.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::config::BackendConfig;

use super::ApiError;

/// Client for the backend REST API.
///
/// Cheaply cloneable; all storefront services share one instance. Every
/// request carries the configured per-request timeout, so a hung backend
/// call surfaces as a transport error instead of suspending the calling
/// flow indefinitely.
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<ApiClientInner>,
}

struct ApiClientInner {
    client: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new backend API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: &BackendConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(Duration::from_secs(5))
            .build()?;

        Ok(Self {
            inner: Arc::new(ApiClientInner {
                client,
                base_url: config.base_url.as_str().trim_end_matches('/').to_owned(),
            }),
        })
    }

    /// Build the absolute URL for an API path.
    pub(super) fn url(&self, path: &str) -> String {
        format!("{}/{}", self.inner.base_url, path.trim_start_matches('/'))
    }

    /// Start an unauthenticated request.
    pub(super) fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        self.inner.client.request(method, self.url(path))
    }

    /// Start a request with bearer-token authorization.
    pub(super) fn authed(
        &self,
        method: Method,
        path: &str,
        access_token: &str,
    ) -> reqwest::RequestBuilder {
        self.request(method, path).bearer_auth(access_token)
    }

    /// Send a request and decode a JSON response body.
    pub(super) async fn execute<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        // Read the body as text first for better error diagnostics
        let body = response.text().await?;

        check_status(status, &body)?;

        match serde_json::from_str(&body) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    body = %truncate(&body, 500),
                    "failed to decode backend response"
                );
                Err(ApiError::Decode(e))
            }
        }
    }

    /// Send a request, discarding any response body.
    pub(super) async fn execute_empty(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<(), ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        check_status(status, &body)
    }

    /// Send a request and return the raw response bytes (binary downloads).
    pub(super) async fn execute_bytes(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<Vec<u8>, ApiError> {
        let response = builder.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response.bytes().await?.to_vec());
        }

        let body = response.text().await?;
        check_status(status, &body)?;
        // check_status always errors on a non-success status
        Err(ApiError::Status {
            status,
            body: truncate(&body, 200),
        })
    }
}

/// Map a non-success status onto the error taxonomy.
fn check_status(status: StatusCode, body: &str) -> Result<(), ApiError> {
    if status.is_success() {
        return Ok(());
    }

    match status {
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound(extract_message(body))),
        s if s.is_client_error() => Err(ApiError::Validation(extract_message(body))),
        s => {
            tracing::error!(
                status = %s,
                body = %truncate(body, 500),
                "backend returned non-success status"
            );
            Err(ApiError::Status {
                status: s,
                body: truncate(body, 200),
            })
        }
    }
}

/// Pull a human-readable message out of an error body.
///
/// The backend answers with either `{"detail": "..."}` or a field-error map
/// like `{"phone": ["Enter a valid phone number."]}`.
fn extract_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return truncate(body, 200);
    };

    if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
        return detail.to_owned();
    }

    if let Some(object) = value.as_object() {
        let mut messages = Vec::new();
        for (field, errors) in object {
            match errors {
                serde_json::Value::String(message) => {
                    messages.push(format!("{field}: {message}"));
                }
                serde_json::Value::Array(list) => {
                    for message in list.iter().filter_map(|m| m.as_str()) {
                        messages.push(format!("{field}: {message}"));
                    }
                }
                _ => {}
            }
        }
        if !messages.is_empty() {
            return messages.join("; ");
        }
    }

    if let Some(list) = value.as_array() {
        let messages: Vec<_> = list.iter().filter_map(|m| m.as_str()).collect();
        if !messages.is_empty() {
            return messages.join("; ");
        }
    }

    truncate(body, 200)
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_detail_message() {
        assert_eq!(
            extract_message(r#"{"detail": "Order cannot be cancelled"}"#),
            "Order cannot be cancelled"
        );
    }

    #[test]
    fn test_extract_field_errors() {
        let message = extract_message(r#"{"phone": ["Enter a valid phone number."]}"#);
        assert_eq!(message, "phone: Enter a valid phone number.");
    }

    #[test]
    fn test_extract_falls_back_to_body() {
        assert_eq!(extract_message("service unavailable"), "service unavailable");
    }

    #[test]
    fn test_check_status_taxonomy() {
        assert!(check_status(StatusCode::OK, "").is_ok());
        assert!(matches!(
            check_status(StatusCode::UNAUTHORIZED, ""),
            Err(ApiError::Unauthorized)
        ));
        assert!(matches!(
            check_status(StatusCode::NOT_FOUND, r#"{"detail":"gone"}"#),
            Err(ApiError::NotFound(m)) if m == "gone"
        ));
        assert!(matches!(
            check_status(StatusCode::BAD_REQUEST, r#"{"detail":"no stock"}"#),
            Err(ApiError::Validation(m)) if m == "no stock"
        ));
        assert!(matches!(
            check_status(StatusCode::BAD_GATEWAY, "boom"),
            Err(ApiError::Status { .. })
        ));
    }
}
