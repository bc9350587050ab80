//! Cross-origin response headers.
//!
//! Browser clients call the proxy directly, so every response (success,
//! error, preflight and 404 alike) carries a permissive CORS policy.

use axum::http::{header, HeaderName, HeaderValue};
use tower_http::set_header::SetResponseHeaderLayer;

pub const ALLOW_ORIGIN: &str = "*";
pub const ALLOW_METHODS: &str = "GET, OPTIONS";
pub const ALLOW_HEADERS: &str = "Content-Type";

/// One layer per CORS header, applied outermost in the router.
pub fn cors_layers() -> [SetResponseHeaderLayer<HeaderValue>; 3] {
    [
        overriding(header::ACCESS_CONTROL_ALLOW_ORIGIN, ALLOW_ORIGIN),
        overriding(header::ACCESS_CONTROL_ALLOW_METHODS, ALLOW_METHODS),
        overriding(header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOW_HEADERS),
    ]
}

fn overriding(name: HeaderName, value: &'static str) -> SetResponseHeaderLayer<HeaderValue> {
    SetResponseHeaderLayer::overriding(name, HeaderValue::from_static(value))
}
