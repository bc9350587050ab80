//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outgoing response:
//!     → headers.rs (CORS headers on every response)
//! ```
//!
//! # Design Decisions
//! - The caller's service key is the only credential; it is never stored,
//!   logged, or echoed back

pub mod headers;

pub use headers::cors_layers;
