//! Request handlers.
//!
//! All five proxy routes share [`proxy`]; they differ only in the
//! [`EndpointDescriptor`] captured at registration.

use std::collections::HashMap;
use std::sync::atomic::Ordering;
use std::time::Instant;

use axum::extract::OriginalUri;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};
use url::form_urlencoded;

use crate::endpoints::EndpointDescriptor;
use crate::error::ProxyError;
use crate::observability::metrics;
use crate::shaping::envelope::DebugInfo;
use crate::shaping::params::SERVICE_KEY_PARAMS;
use crate::shaping::{shape_page, ErrorEnvelope, RequestParams};
use crate::xml::extract;

use super::request::RequestIdExt;
use super::response::json_response;
use super::server::AppState;

/// Decode a raw query string. The first occurrence of a name wins.
///
/// The service key is the exception: a non-blank key keeps the caller's
/// percent-encoding, since it is forwarded upstream verbatim.
pub fn parse_query(raw: Option<&str>) -> HashMap<String, String> {
    let raw = raw.unwrap_or_default();
    let mut query = HashMap::new();
    for (name, value) in form_urlencoded::parse(raw.as_bytes()) {
        query.entry(name.into_owned()).or_insert_with(|| value.into_owned());
    }

    for name in SERVICE_KEY_PARAMS {
        let Some(encoded) = raw_value(raw, name) else {
            continue;
        };
        if let Some(value) = query.get_mut(name) {
            if !value.trim().is_empty() {
                *value = encoded.to_string();
            }
        }
    }
    query
}

/// First undecoded value of `name` in a raw query string.
fn raw_value<'q>(raw: &'q str, name: &str) -> Option<&'q str> {
    raw.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        (key == name).then_some(value)
    })
}

/// Serve one proxied GET for `descriptor`.
pub async fn proxy(
    descriptor: &'static EndpointDescriptor,
    state: AppState,
    headers: HeaderMap,
    raw_query: Option<String>,
) -> Response {
    let start = Instant::now();
    let requested_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let request_id = headers.request_id();
    state.request_count.fetch_add(1, Ordering::Relaxed);

    let query = parse_query(raw_query.as_deref());

    let response = match serve(descriptor, &state, &query).await {
        Ok(response) => {
            tracing::info!(
                request_id = %request_id,
                endpoint = descriptor.name,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Request served"
            );
            response
        }
        Err(err) => {
            if err.is_server_error() {
                tracing::error!(
                    request_id = %request_id,
                    endpoint = descriptor.name,
                    kind = err.kind(),
                    error = %err,
                    "Request failed"
                );
            } else {
                tracing::warn!(
                    request_id = %request_id,
                    endpoint = descriptor.name,
                    kind = err.kind(),
                    error = %err,
                    "Request rejected"
                );
            }
            error_response(descriptor, &err, requested_at, &query)
        }
    };

    metrics::record_request(descriptor.name, response.status().as_u16(), start);
    response
}

async fn serve(
    descriptor: &'static EndpointDescriptor,
    state: &AppState,
    query: &HashMap<String, String>,
) -> Result<Response, ProxyError> {
    let params = RequestParams::from_query(descriptor, query)?;

    let inner = state.inner.load_full();
    let body = inner.upstream.fetch(descriptor, &params).await?;
    tracing::debug!(endpoint = descriptor.name, bytes = body.len(), "Upstream body received");

    let extraction = extract(&body, descriptor.item_tag)?;
    let page = shape_page(descriptor, &params, extraction, Utc::now());

    Ok(json_response(StatusCode::OK, &page))
}

fn error_response(
    descriptor: &EndpointDescriptor,
    err: &ProxyError,
    requested_at: String,
    query: &HashMap<String, String>,
) -> Response {
    let mut envelope = ErrorEnvelope::from_error(err);
    if matches!(err, ProxyError::MissingCredential) {
        envelope = envelope.with_usage(descriptor.usage);
    }
    if err.is_server_error() {
        envelope = envelope.with_debug(DebugInfo::from_query(
            requested_at,
            query,
            descriptor.default_rows,
        ));
    }
    json_response(err.status_code(), &envelope)
}

/// CORS preflight; headers come from the router layers.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn not_found(OriginalUri(uri): OriginalUri) -> Response {
    tracing::debug!(path = %uri.path(), "No route matched");
    ProxyError::UnknownEndpoint(uri.path().to_string()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_query_decodes_and_keeps_first() {
        let query = parse_query(Some("kindA=%EA%B8%B0%EA%B0%81&kindA=x&pageNo=&numOfRows=5"));
        assert_eq!(query["kindA"], "기각");
        assert_eq!(query["pageNo"], "");
        assert_eq!(query["numOfRows"], "5");
        assert!(parse_query(None).is_empty());
    }

    #[test]
    fn test_service_key_keeps_caller_encoding() {
        let encoded = parse_query(Some("serviceKey=abc%2Bdef%3D%3D&pageNo=2"));
        assert_eq!(encoded["serviceKey"], "abc%2Bdef%3D%3D");
        assert_eq!(encoded["pageNo"], "2");

        let plain = parse_query(Some("ServiceKey=abc+def==&serviceKey=second"));
        assert_eq!(plain["ServiceKey"], "abc+def==");

        let smuggled = parse_query(Some("serviceKey=K%26numOfRows%3D9999"));
        assert_eq!(smuggled["serviceKey"], "K%26numOfRows%3D9999");
        assert!(!smuggled.contains_key("numOfRows"));
    }

    #[test]
    fn test_blank_service_key_stays_blank() {
        let query = parse_query(Some("serviceKey=%20%20"));
        assert_eq!(query["serviceKey"], "  ");
    }
}
