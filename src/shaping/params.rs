//! Inbound query parameters, validated and defaulted per endpoint.

use std::collections::HashMap;

use crate::endpoints::EndpointDescriptor;
use crate::error::ProxyError;

/// Accepted spellings of the service key parameter.
pub const SERVICE_KEY_PARAMS: [&str; 2] = ["serviceKey", "ServiceKey"];

/// A filter the endpoint supports, with the caller's value if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedFilter {
    pub param: &'static str,
    pub label: &'static str,
    pub value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestParams {
    /// As the caller percent-encoded it; forwarded upstream verbatim.
    pub service_key: String,
    pub page_no: u32,
    pub num_of_rows: u32,
    pub filters: Vec<AppliedFilter>,
}

impl RequestParams {
    /// Read the raw query of a request to `descriptor`.
    ///
    /// Empty values count as absent, so `?pageNo=` falls back to the default
    /// just like a missing parameter.
    pub fn from_query(
        descriptor: &EndpointDescriptor,
        query: &HashMap<String, String>,
    ) -> Result<Self, ProxyError> {
        let service_key = SERVICE_KEY_PARAMS
            .iter()
            .find_map(|name| non_empty(query, name))
            .ok_or(ProxyError::MissingCredential)?
            .to_string();

        let page_no = match non_empty(query, "pageNo") {
            Some(raw) => parse_positive("pageNo", raw)?,
            None => 1,
        };
        let num_of_rows = match non_empty(query, "numOfRows") {
            Some(raw) => parse_positive("numOfRows", raw)?,
            None => descriptor.default_rows,
        };

        let filters = descriptor
            .filters
            .iter()
            .map(|f| AppliedFilter {
                param: f.param,
                label: f.label,
                value: non_empty(query, f.param).map(str::to_string),
            })
            .collect();

        Ok(Self {
            service_key,
            page_no,
            num_of_rows,
            filters,
        })
    }
}

fn non_empty<'q>(query: &'q HashMap<String, String>, name: &str) -> Option<&'q str> {
    query
        .get(name)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
}

fn parse_positive(name: &'static str, raw: &str) -> Result<u32, ProxyError> {
    match raw.parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(ProxyError::InvalidParameter {
            name,
            value: raw.to_string(),
        }),
    }
}
