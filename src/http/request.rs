//! Request metadata helpers.
//!
//! The request-id layers stamp every inbound request with a UUID before any
//! other processing; everything downstream (gate, handlers, forwarder, logs)
//! reads the same value, so one id correlates a caller's report with every
//! server-side line it produced.

use axum::http::HeaderMap;
use uuid::Uuid;

/// Header carrying the per-request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// The correlation id for a request.
///
/// Falls back to a fresh UUID if the header is somehow absent, so callers
/// always get a usable id.
pub fn correlation_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_reads_existing_header() {
        let mut headers = HeaderMap::new();
        headers.insert(X_REQUEST_ID, HeaderValue::from_static("abc-123"));
        assert_eq!(correlation_id(&headers), "abc-123");
    }

    #[test]
    fn test_generates_fallback() {
        let id = correlation_id(&HeaderMap::new());
        assert!(Uuid::parse_str(&id).is_ok());
    }
}
