//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → gate.rs (transport check → IP allowlist → signature → rate limit)
//!     → Pass to route handlers
//! ```
//!
//! # Design Decisions
//! - Fixed check order; first failure short-circuits the rest
//! - Fail closed: reject on any security check failure
//! - Rejections leave no side effects (no rate-limit admission recorded)
//! - No trust in client input

pub mod gate;
pub mod rate_limit;
pub mod signature;

pub use gate::{security_gate_middleware, GateLayerState, SecurityGate};
pub use rate_limit::RateLimiter;
