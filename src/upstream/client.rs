//! HTTP client for the government precedent service.
//!
//! # Responsibilities
//! - Issue exactly one GET per proxied request
//! - Map non-2xx statuses and transport failures to [`ProxyError`]
//! - Return the raw body text for XML extraction
//!
//! # Design Decisions
//! - No retries: an upstream failure is reported to the caller as-is
//! - Timeout is opt-in through `[upstream] timeout_secs`

use std::time::{Duration, Instant};

use crate::config::UpstreamConfig;
use crate::endpoints::EndpointDescriptor;
use crate::error::ProxyError;
use crate::observability::metrics;
use crate::shaping::RequestParams;

use super::url::{build_upstream_url, redact_service_key};

#[derive(Debug, Clone)]
pub struct UpstreamClient {
    http: reqwest::Client,
    base_url: String,
}

impl UpstreamClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder().user_agent(config.user_agent.clone());
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            http: builder.build()?,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch one page of `descriptor`'s operation and return the body text.
    pub async fn fetch(
        &self,
        descriptor: &EndpointDescriptor,
        params: &RequestParams,
    ) -> Result<String, ProxyError> {
        let url = build_upstream_url(&self.base_url, descriptor, params);
        let start = Instant::now();

        tracing::debug!(
            operation = descriptor.operation,
            url = %redact_service_key(&url),
            "Calling upstream"
        );

        let result = self.send(&url).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(ProxyError::UpstreamHttp { .. }) => "http_error",
            Err(_) => "transport_error",
        };
        metrics::record_upstream(descriptor.operation, outcome, start);

        if let Err(e) = &result {
            tracing::warn!(
                operation = descriptor.operation,
                error = %e,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Upstream call failed"
            );
        }

        result
    }

    async fn send(&self, url: &str) -> Result<String, ProxyError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(ProxyError::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProxyError::UpstreamHttp {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        response.text().await.map_err(ProxyError::transport)
    }
}
