//! Token store for issued proxy keys.
//!
//! Tokens are opaque bearer values indexed by the string clients send in the
//! `Authorization` header, giving O(1) validation. The store is
//! process-lifetime only: a restart invalidates every issued token and
//! callers must re-issue. Creation time and a validity flag are kept so a
//! future revocation path stays an O(1) flag flip.

use std::time::{SystemTime, UNIX_EPOCH};

use base64::Engine;
use dashmap::DashMap;
use rand::Rng;

/// Prefix on every issued token. Makes keys recognizable in logs and
/// detectable by secret scanners.
const TOKEN_PREFIX: &str = "sk-gw-";

/// Attributes recorded for an issued token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// Issuance time (Unix epoch seconds).
    pub created_at: u64,
    /// Logical validity flag. Always `true` today; revocation would clear it.
    pub valid: bool,
}

/// Concurrent membership set of issued tokens.
#[derive(Default)]
pub struct TokenStore {
    tokens: DashMap<String, IssuedToken>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self {
            tokens: DashMap::new(),
        }
    }

    /// Generate a new token, record it, and return it.
    ///
    /// Format: `sk-gw-<43-char URL-safe base64>` — 32 random bytes, 256 bits
    /// of entropy.
    pub fn issue(&self) -> String {
        let random_bytes: [u8; 32] = rand::thread_rng().gen();
        let token = format!(
            "{}{}",
            TOKEN_PREFIX,
            base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(random_bytes),
        );

        self.tokens.insert(
            token.clone(),
            IssuedToken {
                created_at: unix_now(),
                valid: true,
            },
        );

        tracing::info!(issued = self.tokens.len(), "Issued new proxy key");
        token
    }

    /// Membership test for a candidate bearer value.
    pub fn validate(&self, candidate: &str) -> bool {
        self.tokens
            .get(candidate)
            .map(|entry| entry.valid)
            .unwrap_or(false)
    }

    /// Number of tokens currently issued.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
