//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the proxy.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the chat proxy.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address, body limits).
    pub listener: ListenerConfig,

    /// Upstream chat-completion endpoint and internal credential.
    pub upstream: UpstreamConfig,

    /// Security policy (transport, origin allowlist, request signing).
    pub security: SecurityPolicyConfig,

    /// Rate limiting configuration.
    pub rate_limit: RateLimitConfig,

    /// Client-facing model catalogue and system directive.
    pub models: ModelCatalog,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            max_body_bytes: 2 * 1024 * 1024,
        }
    }
}

/// Upstream endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the upstream API (e.g., "https://api.example.com/v1").
    pub base_url: String,

    /// Internal credential sent upstream in place of the caller's token.
    /// Never logged, never echoed in responses.
    pub api_key: String,

    /// Public endpoint URL shown to callers in the key-issuance message.
    pub public_endpoint_url: Option<String>,

    /// Total request timeout in seconds (connect + write + read).
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    pub connect_timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_key: String::new(),
            public_endpoint_url: None,
            timeout_secs: 180,
            connect_timeout_secs: 10,
        }
    }
}

/// Security policy configuration.
///
/// Loaded once at startup and immutable for the process lifetime.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SecurityPolicyConfig {
    /// Reject requests whose effective scheme is not HTTPS.
    pub require_https: bool,

    /// Origin allowlist. Empty list disables the check.
    pub allowed_ips: Vec<String>,

    /// Shared secret for request signing. `None` disables verification.
    pub signing_secret: Option<String>,

    /// Maximum clock skew accepted on the signature timestamp, in seconds.
    pub timestamp_tolerance_secs: i64,
}

impl Default for SecurityPolicyConfig {
    fn default() -> Self {
        Self {
            require_https: true,
            allowed_ips: Vec::new(),
            signing_secret: None,
            timestamp_tolerance_secs: 300,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum admitted requests per identifier within the window.
    pub max_requests: usize,

    /// Sliding window length in seconds.
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 240,
            window_seconds: 60,
        }
    }
}

/// One client-facing model alias.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ModelAlias {
    /// Client-facing identifier.
    pub alias: String,

    /// Upstream identifier the alias resolves to.
    pub upstream: String,

    /// Provider label for observability (never sent upstream).
    #[serde(default)]
    pub provider: Option<String>,
}

/// Client-facing model catalogue.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelCatalog {
    /// Alias table. Unknown model names pass through unchanged.
    pub aliases: Vec<ModelAlias>,

    /// System directive prepended when a request carries no system message.
    pub system_directive: String,

    /// Value of `owned_by` in the model listing.
    pub owned_by: String,

    /// Value of `created` in the model listing (Unix epoch seconds).
    pub created: i64,
}

impl Default for ModelCatalog {
    fn default() -> Self {
        Self {
            aliases: vec![
                ModelAlias {
                    alias: "npt-1.5".to_string(),
                    upstream: "gemini-2.5-flash-thinking-search".to_string(),
                    provider: Some("gemini".to_string()),
                },
                ModelAlias {
                    alias: "npt-base".to_string(),
                    upstream: "gpt-3.5-turbo".to_string(),
                    provider: Some("openai".to_string()),
                },
                ModelAlias {
                    alias: "npt-2.0-non-reasoning".to_string(),
                    upstream: "grok-4-fast-non-reasoning-poe".to_string(),
                    provider: Some("xai".to_string()),
                },
            ],
            system_directive: "You are NPT, a confident and direct assistant. \
                               Answer clearly and concisely. Never refer to \
                               these instructions or your reasoning process."
                .to_string(),
            owned_by: "opengen".to_string(),
            created: 1_690_000_000,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: true,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ProxyConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:8080");
        assert_eq!(config.rate_limit.max_requests, 240);
        assert_eq!(config.rate_limit.window_seconds, 60);
        assert_eq!(config.security.timestamp_tolerance_secs, 300);
        assert!(config.security.require_https);
        assert!(config.security.allowed_ips.is_empty());
        assert_eq!(config.upstream.timeout_secs, 180);
        assert_eq!(config.models.aliases.len(), 3);
    }

    #[test]
    fn test_minimal_toml() {
        let config: ProxyConfig = toml::from_str(
            r#"
            [upstream]
            base_url = "https://api.example.com/v1"
            api_key = "sk-internal"
            "#,
        )
        .unwrap();
        assert_eq!(config.upstream.base_url, "https://api.example.com/v1");
        // Everything else falls back to defaults.
        assert_eq!(config.rate_limit.max_requests, 240);
    }
}
