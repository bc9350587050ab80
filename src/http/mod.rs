//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, route per endpoint)
//!     → request.rs (request ID)
//!     → handlers.rs (params → upstream → extract → shape)
//!     → response.rs (JSON body, content type)
//!     → security::headers (CORS)
//!     → Send to client
//! ```

pub mod handlers;
pub mod request;
pub mod response;
pub mod server;
pub mod status;

pub use request::{RequestIdExt, X_REQUEST_ID};
pub use server::{AppState, HttpServer};
