//! Operational endpoints: liveness and a short status report.

use std::sync::atomic::Ordering;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::endpoints::catalog;

use super::server::AppState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct EndpointSummary {
    pub name: &'static str,
    pub route: &'static str,
    pub operation: &'static str,
}

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub upstream: String,
    pub requests_served: usize,
    pub endpoints: Vec<EndpointSummary>,
}

pub async fn get_health() -> Json<Health> {
    Json(Health { status: "ok" })
}

pub async fn get_status(State(state): State<AppState>) -> Json<SystemStatus> {
    let inner = state.inner.load();
    let endpoints = catalog::all()
        .iter()
        .map(|d| EndpointSummary {
            name: d.name,
            route: d.route,
            operation: d.operation,
        })
        .collect();

    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        upstream: inner.upstream.base_url().to_string(),
        requests_served: state.request_count.load(Ordering::Relaxed),
        endpoints,
    })
}
