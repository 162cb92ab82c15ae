//! Error taxonomy for the proxy.
//!
//! Every failure a caller can observe falls into one of five categories:
//! policy rejections from the security gate, auth rejections for unknown
//! bearer tokens, validation errors for malformed bodies, upstream transport
//! failures, and unexpected internal errors. Each carries a stable machine
//! code and a fixed HTTP status.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Errors surfaced to callers of the proxy.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// A security-gate check failed (transport, origin, signature, rate limit).
    #[error("{message}")]
    Policy {
        /// Stable machine-readable code (e.g. `https_required`).
        code: &'static str,
        /// HTTP status the gate mandates for this rejection.
        status: u16,
        message: String,
    },

    /// Bearer token was missing or never issued.
    #[error("Invalid API key")]
    InvalidKey,

    /// Request body was missing or not valid JSON.
    #[error("Request body must be JSON")]
    InvalidBody,

    /// The upstream call failed at the transport level (connect, timeout).
    #[error("Upstream API error: {0}")]
    Upstream(String),

    /// Anything unexpected. Full detail is logged, never sent to the caller.
    #[error("An unexpected error occurred")]
    Internal(String),
}

impl ProxyError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::Policy { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::FORBIDDEN)
            }
            ProxyError::InvalidKey => StatusCode::UNAUTHORIZED,
            ProxyError::InvalidBody => StatusCode::BAD_REQUEST,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ProxyError::Policy { code, .. } => code,
            ProxyError::InvalidKey => "invalid_api_key",
            ProxyError::InvalidBody => "invalid_request",
            ProxyError::Upstream(_) => "upstream_error",
            ProxyError::Internal(_) => "internal_error",
        }
    }

    /// Attach the correlation id of the failing request.
    pub fn with_request_id(self, request_id: impl Into<String>) -> Rejection {
        Rejection {
            error: self,
            request_id: request_id.into(),
        }
    }
}

/// A [`ProxyError`] paired with the correlation id of the request it failed.
///
/// This is the only error type handlers return; the correlation id ends up
/// in the JSON body so callers can quote it back when reporting problems.
#[derive(Debug)]
pub struct Rejection {
    pub error: ProxyError,
    pub request_id: String,
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        let status = self.error.status();

        // Internal detail stays in the logs; the caller gets a generic line.
        if let ProxyError::Internal(ref detail) = self.error {
            tracing::error!(
                request_id = %self.request_id,
                detail = %detail,
                "Internal error"
            );
        }

        let body = Json(json!({
            "error": {
                "code": self.error.code(),
                "message": self.error.to_string(),
                "request_id": self.request_id,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for proxy request handling.
pub type ProxyResult<T> = Result<T, Rejection>;
