//! Observability subsystem.
//!
//! # Design Decisions
//! - Structured logging via `tracing`; the correlation id flows through
//!   every log line a request produces
//! - Metrics are cheap (atomic increments) and exposed for Prometheus
//!   scraping on a separate listener

pub mod metrics;
