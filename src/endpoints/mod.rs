//! Endpoint catalog.
//!
//! Each government sub-service is a static [`EndpointDescriptor`]; the HTTP
//! layer registers one route per descriptor, all served by the same handler.

pub mod catalog;
pub mod descriptor;

pub use descriptor::{EndpointDescriptor, FieldKind, FieldMapping, FilterParam, SummarySpec};
