//! Upstream forwarding.
//!
//! Sends transformed payloads to the upstream chat-completion endpoint with
//! the internal credential and relays the response back. Non-streaming
//! responses are relayed verbatim with the upstream's status; streaming
//! responses are bridged chunk-by-chunk with no intermediate buffering, so
//! a slow caller backpressures the upstream read instead of growing memory.

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    http::{header, HeaderValue, Response, StatusCode},
};
use serde_json::Value;

use crate::config::UpstreamConfig;
use crate::error::{ProxyError, Rejection};
use crate::observability::metrics;

/// Response header carrying the resolved provider label.
pub const X_MODEL_PROVIDER: &str = "x-model-provider";

/// Forwards chat payloads to the upstream endpoint.
pub struct ForwardingProxy {
    client: reqwest::Client,
    completions_url: String,
    api_key: String,
    timeout: Duration,
}

impl ForwardingProxy {
    /// Build the forwarder and its shared HTTP client.
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            completions_url: format!(
                "{}/chat/completions",
                config.base_url.trim_end_matches('/')
            ),
            api_key: config.api_key.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Forward a transformed payload and relay the upstream response.
    ///
    /// The caller's token never leaves the process; the upstream sees only
    /// the internal credential. Upstream application errors (non-2xx) are
    /// relayed with the upstream's own status and body — only transport
    /// failures become a proxy-generated 502.
    pub async fn forward(
        &self,
        request_id: &str,
        provider: &str,
        payload: Value,
        wants_stream: bool,
    ) -> Result<Response<Body>, Rejection> {
        let started = Instant::now();

        let response = self
            .client
            .post(&self.completions_url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(request_id = %request_id, error = %e, "Upstream request failed");
                metrics::record_upstream_failure();
                ProxyError::Upstream(e.to_string()).with_request_id(request_id)
            })?;

        let status = response.status();
        metrics::record_upstream_request(status.as_u16(), started);

        if !status.is_success() {
            tracing::warn!(
                request_id = %request_id,
                status = %status,
                "Upstream returned an error status"
            );
        }

        if wants_stream {
            self.relay_stream(request_id, provider, response)
        } else {
            self.relay_buffered(request_id, provider, response).await
        }
    }

    /// Buffer the full upstream response and relay status + body verbatim.
    async fn relay_buffered(
        &self,
        request_id: &str,
        provider: &str,
        response: reqwest::Response,
    ) -> Result<Response<Body>, Rejection> {
        let status = response.status();
        let bytes = response.bytes().await.map_err(|e| {
            tracing::error!(request_id = %request_id, error = %e, "Upstream body read failed");
            ProxyError::Upstream(e.to_string()).with_request_id(request_id)
        })?;

        build_response(
            status,
            HeaderValue::from_static("application/json"),
            request_id,
            provider,
            Body::from(bytes),
        )
    }

    /// Relay the upstream byte stream live, preserving chunk order.
    ///
    /// Each chunk is read from upstream and written to the caller before the
    /// next read, so memory stays bounded by one chunk. Dropping the body on
    /// client hangup cancels the upstream read.
    fn relay_stream(
        &self,
        request_id: &str,
        provider: &str,
        response: reqwest::Response,
    ) -> Result<Response<Body>, Rejection> {
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .cloned()
            .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));

        build_response(
            status,
            content_type,
            request_id,
            provider,
            Body::from_stream(response.bytes_stream()),
        )
    }
}

fn build_response(
    status: StatusCode,
    content_type: HeaderValue,
    request_id: &str,
    provider: &str,
    body: Body,
) -> Result<Response<Body>, Rejection> {
    let mut builder = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, content_type);

    if let Ok(value) = HeaderValue::from_str(request_id) {
        builder = builder.header("x-request-id", value);
    }
    if let Ok(value) = HeaderValue::from_str(provider) {
        builder = builder.header(X_MODEL_PROVIDER, value);
    }

    builder.body(body).map_err(|e| {
        ProxyError::Internal(format!("failed to build relay response: {}", e))
            .with_request_id(request_id)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completions_url_join() {
        let mut config = UpstreamConfig::default();
        config.base_url = "https://api.example.com/v1/".to_string();
        let proxy = ForwardingProxy::new(&config).unwrap();
        assert_eq!(
            proxy.completions_url,
            "https://api.example.com/v1/chat/completions"
        );

        config.base_url = "https://api.example.com/v1".to_string();
        let proxy = ForwardingProxy::new(&config).unwrap();
        assert_eq!(
            proxy.completions_url,
            "https://api.example.com/v1/chat/completions"
        );
    }
}
