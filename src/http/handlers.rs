//! Route handlers.
//!
//! The security gate has already run by the time these execute; handlers
//! only deal with bearer validation, payload validation, and the
//! transform-and-forward pipeline.

use std::time::Instant;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, Response, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::{json, Value};

use crate::error::{ProxyError, ProxyResult};
use crate::http::request::correlation_id;
use crate::http::server::AppState;
use crate::observability::metrics;

/// GET /health — liveness probe. Not authenticated.
pub async fn health() -> impl IntoResponse {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// POST /v1/generate-key — issue a new proxy key.
pub async fn generate_key(State(state): State<AppState>) -> impl IntoResponse {
    let api_key = state.tokens.issue();
    metrics::record_issued_keys(state.tokens.len());

    let mut body = json!({
        "api_key": api_key,
        "message": "Key generated successfully.",
    });
    if let Some(ref endpoint) = state.public_endpoint_url {
        body["endpoint"] = Value::String(endpoint.clone());
    }

    (StatusCode::CREATED, Json(body))
}

/// GET /v1/models — list the client-facing model catalogue.
pub async fn list_models(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ProxyResult<Json<Value>> {
    let request_id = correlation_id(&headers);
    authorize(&state, &headers).map_err(|e| e.with_request_id(&request_id))?;

    let data: Vec<Value> = state
        .models
        .aliases
        .iter()
        .map(|alias| {
            json!({
                "id": alias.alias,
                "object": "model",
                "created": state.models.created,
                "owned_by": state.models.owned_by,
            })
        })
        .collect();

    Ok(Json(json!({ "object": "list", "data": data })))
}

/// POST /v1/chat/completions — transform and forward a chat completion.
pub async fn chat_completions(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> ProxyResult<Response<Body>> {
    let started = Instant::now();
    let request_id = correlation_id(&headers);

    authorize(&state, &headers).map_err(|e| e.with_request_id(&request_id))?;

    let payload: Value = serde_json::from_slice(&body)
        .ok()
        .filter(Value::is_object)
        .ok_or_else(|| ProxyError::InvalidBody.with_request_id(&request_id))?;

    let wants_stream = payload
        .get("stream")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    let provider_header = headers
        .get("x-client-provider")
        .and_then(|v| v.to_str().ok());
    let provider = state.transformer.resolve_provider(&payload, provider_header);

    let model = payload
        .get("model")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    tracing::debug!(
        request_id = %request_id,
        model = %model,
        provider = %provider,
        stream = wants_stream,
        "Forwarding chat completion"
    );

    let payload = state.transformer.transform(payload);
    let response = state
        .forwarder
        .forward(&request_id, &provider, payload, wants_stream)
        .await?;

    metrics::record_request("/v1/chat/completions", response.status().as_u16(), started);
    Ok(response)
}

/// Validate the bearer token on a protected route.
fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), ProxyError> {
    let token = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            v.strip_prefix("Bearer ")
                .or_else(|| v.strip_prefix("bearer "))
        });

    match token {
        Some(token) if state.tokens.validate(token) => Ok(()),
        _ => Err(ProxyError::InvalidKey),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::config::ProxyConfig;
    use crate::keys::TokenStore;
    use crate::proxy::{ForwardingProxy, RequestTransformer};

    fn state() -> AppState {
        let mut config = ProxyConfig::default();
        config.upstream.base_url = "http://127.0.0.1:1".to_string();
        config.upstream.api_key = "sk-internal".to_string();
        AppState {
            tokens: Arc::new(TokenStore::new()),
            transformer: Arc::new(RequestTransformer::new(&config.models)),
            forwarder: Arc::new(ForwardingProxy::new(&config.upstream).unwrap()),
            models: config.models.clone(),
            public_endpoint_url: None,
        }
    }

    fn bearer(token: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "authorization",
            format!("Bearer {}", token).parse().unwrap(),
        );
        headers
    }

    #[test]
    fn test_authorize_accepts_issued_token() {
        let state = state();
        let token = state.tokens.issue();
        assert!(authorize(&state, &bearer(&token)).is_ok());
    }

    #[test]
    fn test_authorize_rejects_unissued_token() {
        let state = state();
        let err = authorize(&state, &bearer("sk-gw-forged")).unwrap_err();
        assert!(matches!(err, ProxyError::InvalidKey));
    }

    #[test]
    fn test_authorize_rejects_missing_header() {
        let state = state();
        let err = authorize(&state, &HeaderMap::new()).unwrap_err();
        assert!(matches!(err, ProxyError::InvalidKey));
    }
}
