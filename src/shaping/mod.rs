//! Response shaping.
//!
//! # Data Flow
//! ```text
//! raw query map
//!     → params.rs (key check, paging defaults, filters)
//! Extraction + RequestParams
//!     → shaper.rs (records, pagination, summary)
//!     → envelope.rs (serialized with Korean wire keys)
//! ```

pub mod envelope;
pub mod params;
pub mod shaper;

pub use envelope::{ErrorEnvelope, PageEnvelope};
pub use params::RequestParams;
pub use shaper::{shape_page, PLACEHOLDER};
