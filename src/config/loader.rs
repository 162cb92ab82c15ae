//! Configuration loading from disk and the environment.
//!
//! A TOML file (optional) provides the base configuration; enumerated
//! environment variables override individual fields, matching how the proxy
//! is configured in container deployments. The merged result is validated
//! before it is accepted into the system.

use std::env;
use std::fs;
use std::path::Path;

use crate::config::schema::ProxyConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Env { var: &'static str, message: String },
    Validation(Vec<ValidationError>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Env { var, message } => write!(f, "Environment error: {}: {}", var, message),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Load configuration: TOML file (if given) overlaid by environment
/// variables, then validated.
pub fn load_config(path: Option<&Path>) -> Result<ProxyConfig, ConfigError> {
    let mut config = match path {
        Some(p) => {
            let content = fs::read_to_string(p).map_err(ConfigError::Io)?;
            toml::from_str(&content).map_err(ConfigError::Parse)?
        }
        None => ProxyConfig::default(),
    };

    apply_env_overrides(&mut config)?;
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Overlay the enumerated environment variables onto a config.
pub fn apply_env_overrides(config: &mut ProxyConfig) -> Result<(), ConfigError> {
    if let Ok(addr) = env::var("PROXY_BIND_ADDRESS") {
        config.listener.bind_address = addr;
    }
    if let Ok(url) = env::var("UPSTREAM_BASE_URL") {
        config.upstream.base_url = url;
    }
    if let Ok(key) = env::var("UPSTREAM_API_KEY") {
        config.upstream.api_key = key;
    }
    if let Ok(url) = env::var("PUBLIC_ENDPOINT_URL") {
        config.upstream.public_endpoint_url = Some(url);
    }
    if let Ok(ips) = env::var("ALLOWED_PROXY_IPS") {
        config.security.allowed_ips = ips
            .split(',')
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(str::to_string)
            .collect();
    }
    if let Ok(secret) = env::var("INTERNAL_SIGNING_SECRET") {
        if !secret.is_empty() {
            config.security.signing_secret = Some(secret);
        }
    }
    if let Ok(raw) = env::var("SIGNATURE_TOLERANCE_SECONDS") {
        config.security.timestamp_tolerance_secs =
            parse_var("SIGNATURE_TOLERANCE_SECONDS", &raw)?;
    }
    if let Ok(raw) = env::var("RATE_LIMIT_MAX_REQUESTS") {
        config.rate_limit.max_requests = parse_var("RATE_LIMIT_MAX_REQUESTS", &raw)?;
    }
    if let Ok(raw) = env::var("RATE_LIMIT_WINDOW_SECONDS") {
        config.rate_limit.window_seconds = parse_var("RATE_LIMIT_WINDOW_SECONDS", &raw)?;
    }
    if let Ok(raw) = env::var("REQUIRE_HTTPS") {
        config.security.require_https = raw.eq_ignore_ascii_case("true");
    }
    if let Ok(raw) = env::var("UPSTREAM_TIMEOUT_SECONDS") {
        config.upstream.timeout_secs = parse_var("UPSTREAM_TIMEOUT_SECONDS", &raw)?;
    }

    Ok(())
}

fn parse_var<T: std::str::FromStr>(var: &'static str, raw: &str) -> Result<T, ConfigError> {
    raw.parse().map_err(|_| ConfigError::Env {
        var,
        message: format!("expected a number, got {:?}", raw),
    })
}
