//! Shared HTTP client and header/status utilities.

use std::sync::OnceLock;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::error::VelaError;

static SHARED_CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// Get (or create) the shared reqwest client.
///
/// Per-call timeouts are applied by the callers; the client-level timeout
/// is a generous backstop.
pub fn shared_client() -> &'static reqwest::Client {
    SHARED_CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .pool_max_idle_per_host(10)
            .build()
            .expect("Failed to build HTTP client")
    })
}

/// Build default headers for a Bearer-token API (Groq).
pub fn bearer_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(&format!("Bearer {api_key}")) {
        headers.insert(AUTHORIZATION, val);
    }
    headers
}

/// Build ElevenLabs-style headers (xi-api-key).
pub fn xi_headers(api_key: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Ok(val) = HeaderValue::from_str(api_key) {
        headers.insert("xi-api-key", val);
    }
    headers
}

/// Map a non-success HTTP status to an error.
pub fn status_to_error(status: u16, body: &str) -> VelaError {
    match status {
        422 => VelaError::ValidationRejected(body.to_string()),
        _ => VelaError::api(status, body),
    }
}

/// Trim a trailing slash so joined paths never double up.
pub fn trim_trailing_slash(url: &str) -> &str {
    url.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_422_becomes_validation_rejected() {
        assert!(matches!(
            status_to_error(422, "field missing"),
            VelaError::ValidationRejected(_)
        ));
        assert!(matches!(status_to_error(500, "boom"), VelaError::Api { status: 500, .. }));
    }

    #[test]
    fn trailing_slash_trimmed() {
        assert_eq!(trim_trailing_slash("http://x/"), "http://x");
        assert_eq!(trim_trailing_slash("http://x"), "http://x");
    }

    #[test]
    fn bearer_headers_include_authorization() {
        let headers = bearer_headers("key");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer key");
    }
}
