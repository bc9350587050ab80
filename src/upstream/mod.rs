//! Upstream access.
//!
//! # Data Flow
//! ```text
//! RequestParams + EndpointDescriptor
//!     → url.rs (operation URL, key verbatim, encoded filters)
//!     → client.rs (single GET, status check, body text)
//!     → xml::extract
//! ```

pub mod client;
pub mod url;

pub use client::UpstreamClient;
pub use self::url::{build_upstream_url, redact_service_key};
