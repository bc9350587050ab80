//! Precedent XML-to-JSON proxy library.
//!
//! Serves the industrial-accident precedent service of the Korea Workers'
//! Compensation & Welfare Service as JSON with Korean keys, one route per
//! upstream operation.

pub mod config;
pub mod endpoints;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod shaping;
pub mod upstream;
pub mod xml;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
