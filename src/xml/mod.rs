//! Upstream XML handling.
//!
//! # Data Flow
//! ```text
//! response body (text)
//!     → document.rs (streaming parse into scalars + item blocks)
//!     → extractor.rs (resultCode check, totalCount)
//!     → Extraction handed to the response shaper
//! ```

pub mod document;
pub mod extractor;

pub use document::{ItemBlock, XmlDocument};
pub use extractor::{extract, Extraction, SUCCESS_CODE};
