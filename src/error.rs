//! Request-level error taxonomy.
//!
//! Every failure a proxied request can hit is one variant of [`ProxyError`].
//! The handler boundary turns it into an error envelope with a stable shape;
//! there is no partial success.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::http::response::json_response;
use crate::shaping::envelope::ErrorEnvelope;

/// Fallback for upstream code/message fields that could not be read.
pub const UNKNOWN: &str = "알 수 없음";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProxyError {
    /// `serviceKey` query parameter absent or empty.
    #[error("ServiceKey가 필요합니다")]
    MissingCredential,

    /// A paging parameter is not a positive integer.
    #[error("잘못된 파라미터 값입니다: {name}={value}")]
    InvalidParameter { name: &'static str, value: String },

    /// Upstream answered with a non-success result code.
    #[error("API 에러 발생")]
    UpstreamApi { code: String, message: String },

    /// Upstream answered with a non-2xx HTTP status.
    #[error("HTTP 오류: {status} {status_text}")]
    UpstreamHttp { status: u16, status_text: String },

    /// The upstream call failed below HTTP (DNS, connect, body read, timeout).
    #[error("{0}")]
    Transport(String),

    /// No proxy route matches the request path.
    #[error("알 수 없는 엔드포인트입니다: {0}")]
    UnknownEndpoint(String),
}

impl ProxyError {
    /// Build a transport error from a reqwest failure.
    ///
    /// The URL is stripped because it carries the caller's service key; the
    /// source chain is flattened so that the root cause (e.g. "Connection
    /// refused") reaches the caller.
    pub fn transport(err: reqwest::Error) -> Self {
        let err = err.without_url();
        let mut message = err.to_string();
        let mut source = std::error::Error::source(&err);
        while let Some(cause) = source {
            let text = cause.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            source = cause.source();
        }
        Self::Transport(message)
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MissingCredential | Self::InvalidParameter { .. } | Self::UpstreamApi { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::UpstreamHttp { .. } | Self::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::UnknownEndpoint(_) => StatusCode::NOT_FOUND,
        }
    }

    /// Stable machine-readable name, used in envelopes, logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential => "MissingCredential",
            Self::InvalidParameter { .. } => "InvalidParameter",
            Self::UpstreamApi { .. } => "UpstreamApiError",
            Self::UpstreamHttp { .. } => "UpstreamHttpError",
            Self::Transport(_) => "TransportError",
            Self::UnknownEndpoint(_) => "UnknownEndpoint",
        }
    }

    pub fn is_server_error(&self) -> bool {
        self.status_code().is_server_error()
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        json_response(self.status_code(), &ErrorEnvelope::from_error(&self))
    }
}
