//! Upstream request URL construction.
//!
//! # Design Decisions
//! - The service key is appended verbatim; data.go.kr issues keys that are
//!   already percent-encoded and re-encoding them breaks authentication
//! - Filter values are form-encoded since they are usually Korean text
//! - Anything logged goes through `redact_service_key` first

use url::form_urlencoded::byte_serialize;

use crate::endpoints::EndpointDescriptor;
use crate::shaping::RequestParams;

/// Name of the key parameter on the upstream side.
pub const UPSTREAM_KEY_PARAM: &str = "ServiceKey";

const REDACTED: &str = "***";

/// `{base}/{operation}?ServiceKey=..&pageNo=..&numOfRows=..[&filters]`
pub fn build_upstream_url(
    base_url: &str,
    descriptor: &EndpointDescriptor,
    params: &RequestParams,
) -> String {
    let mut url = format!(
        "{}/{}?{}={}&pageNo={}&numOfRows={}",
        base_url.trim_end_matches('/'),
        descriptor.operation,
        UPSTREAM_KEY_PARAM,
        params.service_key,
        params.page_no,
        params.num_of_rows,
    );

    for filter in &params.filters {
        if let Some(value) = &filter.value {
            url.push('&');
            url.push_str(filter.param);
            url.push('=');
            url.extend(byte_serialize(value.as_bytes()));
        }
    }

    url
}

/// Replace the key value in `url` so it can be logged.
pub fn redact_service_key(url: &str) -> String {
    let Some((base, query)) = url.split_once('?') else {
        return url.to_string();
    };

    let query: Vec<String> = query
        .split('&')
        .map(|pair| match pair.split_once('=') {
            Some((name, _)) if name.eq_ignore_ascii_case(UPSTREAM_KEY_PARAM) => {
                format!("{name}={REDACTED}")
            }
            _ => pair.to_string(),
        })
        .collect();

    format!("{base}?{}", query.join("&"))
}
