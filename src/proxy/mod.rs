//! Request transformation and upstream forwarding.
//!
//! # Data Flow
//! ```text
//! Validated chat payload
//!     → transform.rs (alias resolution, system directive, provider label)
//!     → forward.rs (credential translation, upstream POST)
//!     → buffered JSON relay, or live byte-stream relay
//! ```

pub mod forward;
pub mod transform;

pub use forward::ForwardingProxy;
pub use transform::RequestTransformer;
