//! Configuration validation.
//!
//! Semantic checks that serde cannot express: required upstream fields,
//! value ranges, parseable addresses. Returns all errors, not just the
//! first, so operators can fix a config in one pass.

use url::Url;

use crate::config::schema::ProxyConfig;

/// A single semantic validation failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field (e.g., "upstream.base_url").
    pub field: String,
    /// Human-readable description of the problem.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a loaded configuration.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.upstream.base_url.is_empty() {
        errors.push(ValidationError {
            field: "upstream.base_url".to_string(),
            message: "must be set (UPSTREAM_BASE_URL)".to_string(),
        });
    } else if Url::parse(&config.upstream.base_url).is_err() {
        errors.push(ValidationError {
            field: "upstream.base_url".to_string(),
            message: format!("not a valid URL: {}", config.upstream.base_url),
        });
    }

    if config.upstream.api_key.is_empty() {
        errors.push(ValidationError {
            field: "upstream.api_key".to_string(),
            message: "must be set (UPSTREAM_API_KEY)".to_string(),
        });
    }

    if config.upstream.timeout_secs == 0 {
        errors.push(ValidationError {
            field: "upstream.timeout_secs".to_string(),
            message: "must be greater than zero".to_string(),
        });
    }

    if config.rate_limit.max_requests == 0 {
        errors.push(ValidationError {
            field: "rate_limit.max_requests".to_string(),
            message: "must be greater than zero".to_string(),
        });
    }

    if config.rate_limit.window_seconds == 0 {
        errors.push(ValidationError {
            field: "rate_limit.window_seconds".to_string(),
            message: "must be greater than zero".to_string(),
        });
    }

    if config.listener.bind_address.parse::<std::net::SocketAddr>().is_err() {
        errors.push(ValidationError {
            field: "listener.bind_address".to_string(),
            message: format!("not a valid socket address: {}", config.listener.bind_address),
        });
    }

    if let Some(ref secret) = config.security.signing_secret {
        if secret.is_empty() {
            errors.push(ValidationError {
                field: "security.signing_secret".to_string(),
                message: "must be non-empty when present".to_string(),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> ProxyConfig {
        let mut config = ProxyConfig::default();
        config.upstream.base_url = "https://api.example.com/v1".to_string();
        config.upstream.api_key = "sk-internal-test".to_string();
        config
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate_config(&valid_config()).is_ok());
    }

    #[test]
    fn test_missing_upstream_fields() {
        let config = ProxyConfig::default();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "upstream.base_url"));
        assert!(errors.iter().any(|e| e.field == "upstream.api_key"));
    }

    #[test]
    fn test_zero_window_rejected() {
        let mut config = valid_config();
        config.rate_limit.window_seconds = 0;
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "rate_limit.window_seconds");
    }

    #[test]
    fn test_bad_bind_address() {
        let mut config = valid_config();
        config.listener.bind_address = "not-an-address".to_string();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "listener.bind_address"));
    }

    #[test]
    fn test_empty_signing_secret_rejected() {
        let mut config = valid_config();
        config.security.signing_secret = Some(String::new());
        assert!(validate_config(&config).is_err());
    }
}
