//! HTTP plumbing shared by the provider clients.

use crate::error::{RewriteError, RewriteResult};
use crate::logging::log_error;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!("song-rewriter/", env!("CARGO_PKG_VERSION"));

pub(crate) fn build_client(
    provider: &'static str,
    timeout: Duration,
) -> RewriteResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| {
            RewriteError::configuration(format!("Failed to build {provider} HTTP client: {e}"))
        })
}

/// JSON content type plus bearer authentication.
pub(crate) fn build_auth_headers(
    provider: &'static str,
    api_key: &str,
) -> RewriteResult<HeaderMap> {
    let mut headers = HeaderMap::new();

    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
            RewriteError::configuration(format!("Invalid {provider} API key format: {e}"))
        })?,
    );

    Ok(headers)
}

/// Map a transport failure from `send()`.
pub(crate) fn send_error(
    provider: &'static str,
    url: &str,
    error: reqwest::Error,
    timeout: Duration,
) -> RewriteError {
    log_error!(
        provider = provider,
        url = %url,
        error = %error,
        "HTTP request failed"
    );
    if error.is_timeout() {
        RewriteError::timeout(timeout.as_secs())
    } else {
        RewriteError::request_failed(
            provider,
            format!("Request failed: {error}"),
            Some(Box::new(error)),
        )
    }
}

/// Handle non-success HTTP responses
pub(crate) async fn handle_error_response(
    provider: &'static str,
    response: reqwest::Response,
) -> RewriteError {
    let status = response.status();
    let headers = response.headers().clone();
    let error_text = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    log_error!(
        provider = provider,
        status = %status,
        error_text = %error_text,
        "API error response"
    );

    match status.as_u16() {
        401 | 403 => {
            let detail = serde_json::from_str::<serde_json::Value>(&error_text)
                .ok()
                .and_then(|body| error_message(&body))
                .unwrap_or_else(|| "Authentication failed".to_string());
            RewriteError::authentication_failed(provider, detail)
        }
        429 => {
            let retry_after_seconds = headers
                .get("retry-after")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(60);

            RewriteError::rate_limit_exceeded(provider, retry_after_seconds)
        }
        _ => RewriteError::request_failed(
            provider,
            format!("API error {status}: {error_text}"),
            None,
        ),
    }
}

/// Pull a human-readable message out of the common error body shapes:
/// `{"error": {"message": ..}}`, `{"error": ".."}` and Genius'
/// `{"meta": {"message": ..}}`.
fn error_message(body: &serde_json::Value) -> Option<String> {
    let error = body.get("error");
    error
        .and_then(|e| e.get("message"))
        .or(error)
        .or_else(|| body.get("meta").and_then(|m| m.get("message")))
        .and_then(|m| m.as_str())
        .map(str::to_string)
}

/// Read a success body as text.
pub(crate) async fn read_text(
    provider: &'static str,
    response: reqwest::Response,
) -> RewriteResult<String> {
    response.text().await.map_err(|e| {
        log_error!(
            provider = provider,
            error = %e,
            "Failed to read response body"
        );
        RewriteError::response_parsing(provider, format!("Failed to read response: {e}"))
    })
}

/// Read and deserialize a success body.
pub(crate) async fn read_json<T: DeserializeOwned>(
    provider: &'static str,
    response: reqwest::Response,
) -> RewriteResult<T> {
    let raw_body = read_text(provider, response).await?;

    serde_json::from_str(&raw_body).map_err(|e| {
        log_error!(
            provider = provider,
            error = %e,
            raw_body = %raw_body,
            "Failed to parse response"
        );
        RewriteError::response_parsing(provider, format!("Invalid response: {e}"))
    })
}
