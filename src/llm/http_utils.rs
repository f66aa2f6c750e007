//! HTTP utilities for AI providers
//!
//! Request/response handling shared by provider implementations.

use crate::llm::LlmError;
use reqwest::Client as HttpClient;
use serde_json::Value;
use std::time::Duration;

/// Maximum length of an error body kept in `LlmError::ApiError`
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Creates an HTTP client with the given request timeout.
#[must_use]
pub fn create_http_client(timeout_secs: u64) -> HttpClient {
    HttpClient::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .unwrap_or_else(|_| HttpClient::new())
}

/// Sends an HTTP POST request with JSON body and returns parsed JSON response.
///
/// # Errors
///
/// Returns `LlmError::NetworkError` on connectivity issues and timeouts,
/// `LlmError::ApiError` on non-success status codes, or `LlmError::JsonError`
/// if parsing fails.
pub async fn send_json_request(
    client: &HttpClient,
    url: &str,
    body: &Value,
    extra_headers: &[(&str, &str)],
) -> Result<Value, LlmError> {
    let mut request = client.post(url).json(body);

    for (key, value) in extra_headers {
        request = request.header(*key, *value);
    }

    // The URL carries the API key, keep it out of error strings
    let response = request
        .send()
        .await
        .map_err(|e| LlmError::NetworkError(e.without_url().to_string()))?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response.text().await.unwrap_or_default();
        return Err(LlmError::ApiError(describe_error_body(status, &error_text)));
    }

    response
        .json()
        .await
        .map_err(|e| LlmError::JsonError(e.without_url().to_string()))
}

/// Builds a short, log-friendly description of a failed response
fn describe_error_body(status: reqwest::StatusCode, body: &str) -> String {
    let trimmed = body.trim_start();
    // Proxies sometimes answer with an HTML page
    let is_html = trimmed.starts_with("<!DOCTYPE")
        || trimmed.starts_with("<html")
        || trimmed.starts_with("<HTML");

    if is_html {
        return format!("{status} (Server returned HTML error page)");
    }

    if body.chars().count() > MAX_ERROR_BODY_CHARS {
        format!(
            "{status} - {}... (truncated)",
            crate::utils::truncate_str(body, MAX_ERROR_BODY_CHARS)
        )
    } else {
        format!("{status} - {body}")
    }
}

/// Extracts text content from a JSON response by navigating a path.
///
/// Numeric segments index into arrays, other segments are object keys.
///
/// # Errors
///
/// Returns `LlmError::ApiError` if the path is invalid or the target is not a string.
pub fn extract_text_content(response: &Value, path: &[&str]) -> Result<String, LlmError> {
    let mut current = response;

    for segment in path {
        if let Ok(index) = segment.parse::<usize>() {
            current = current.get(index).ok_or_else(|| {
                LlmError::ApiError(format!("Invalid path: missing index {index}"))
            })?;
        } else {
            current = current.get(*segment).ok_or_else(|| {
                LlmError::ApiError(format!("Invalid path: missing key {segment}"))
            })?;
        }
    }

    current
        .as_str()
        .map(ToString::to_string)
        .ok_or_else(|| LlmError::ApiError(format!("Expected string at path, got: {current:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_text_content_gemini_path() {
        let response = json!({
            "candidates": [{"content": {"parts": [{"text": "Привет"}]}}]
        });
        let text = extract_text_content(
            &response,
            &["candidates", "0", "content", "parts", "0", "text"],
        );
        assert_eq!(text.ok().as_deref(), Some("Привет"));
    }

    #[test]
    fn test_extract_text_content_missing_candidates() {
        let response = json!({"promptFeedback": {"blockReason": "SAFETY"}});
        let err = extract_text_content(&response, &["candidates", "0", "content"]);
        assert!(matches!(err, Err(LlmError::ApiError(msg)) if msg.contains("candidates")));
    }

    #[test]
    fn test_extract_text_content_non_string_target() {
        let response = json!({"a": [1]});
        assert!(extract_text_content(&response, &["a", "0"]).is_err());
    }

    #[test]
    fn test_describe_error_body_hides_html() {
        let msg = describe_error_body(
            reqwest::StatusCode::BAD_GATEWAY,
            "<html><body>502</body></html>",
        );
        assert!(msg.contains("HTML error page"));
        assert!(!msg.contains("<body>"));
    }

    #[test]
    fn test_describe_error_body_truncates_long_text() {
        let body = "x".repeat(2000);
        let msg = describe_error_body(reqwest::StatusCode::TOO_MANY_REQUESTS, &body);
        assert!(msg.ends_with("(truncated)"));
        assert!(msg.len() < 600);
    }
}
