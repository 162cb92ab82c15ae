//! Credentialed reverse proxy for a chat-completion API.
//!
//! Issues opaque bearer tokens, enforces transport/origin/signature/rate
//! policy on every inbound request, remaps client-facing model identifiers,
//! injects a system directive, and forwards requests upstream while
//! preserving the upstream's exact byte stream.

pub mod config;
pub mod error;
pub mod http;
pub mod keys;
pub mod lifecycle;
pub mod observability;
pub mod proxy;
pub mod security;

pub use config::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
