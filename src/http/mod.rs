//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware stack, security gate)
//!     → handlers.rs (auth, payload validation, transform + forward)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod server;

pub use request::{correlation_id, X_REQUEST_ID};
pub use server::HttpServer;
