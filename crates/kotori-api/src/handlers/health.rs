//! Health check handlers for service monitoring.
//!
//! Provides liveness, readiness, and health endpoints for orchestration
//! systems like Kubernetes. None of them require a signature; they report
//! on the process, not on the channel.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::server::AppState;

/// Health check response structure.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Overall service health status
    pub status: HealthStatus,
    /// Timestamp when health check was performed
    pub timestamp: DateTime<Utc>,
    /// Individual component health checks
    pub checks: HealthChecks,
    /// Service version information
    pub version: String,
}

/// Overall health status enumeration.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    /// All systems operational
    Healthy,
    /// Critical systems failing
    Unhealthy,
}

/// Individual component health check results.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    /// Per-process credential cache state
    pub credential_cache: ComponentHealth,
}

/// Health status for individual components.
#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    /// Component status
    pub status: ComponentStatus,
}

/// Component-level health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentStatus {
    /// Credentials are fetched and cached
    Warm,
    /// No request has needed credentials yet
    Cold,
}

/// Health check endpoint handler.
///
/// A cold credential cache is not a failure; the first signed request warms
/// it. The check exists so operators can tell the two states apart without
/// sending traffic.
#[instrument(name = "health_check", skip(app_state))]
pub async fn health_check(State(app_state): State<AppState>) -> Response {
    let cache_status = if app_state.credentials.is_warm() {
        ComponentStatus::Warm
    } else {
        ComponentStatus::Cold
    };

    let response = HealthResponse {
        status: HealthStatus::Healthy,
        timestamp: Utc::now(),
        checks: HealthChecks { credential_cache: ComponentHealth { status: cache_status } },
        version: env!("CARGO_PKG_VERSION").to_string(),
    };

    debug!(cache = ?response.checks.credential_cache.status, "Health check completed");

    (StatusCode::OK, Json(response)).into_response()
}

/// Readiness check endpoint for Kubernetes probes.
///
/// Similar to health check but focuses on whether the service is ready
/// to accept traffic.
#[instrument(name = "readiness_check", skip(app_state))]
pub async fn readiness_check(State(app_state): State<AppState>) -> Response {
    health_check(State(app_state)).await
}

/// Liveness check endpoint for Kubernetes probes.
///
/// Returns a simple response indicating the service process is alive.
/// This is a minimal check that doesn't test external dependencies,
/// focusing only on whether the HTTP server is responding.
#[instrument(name = "liveness_check")]
pub async fn liveness_check() -> Response {
    debug!("Performing liveness check");

    let response = serde_json::json!({
        "status": "alive",
        "timestamp": Utc::now(),
        "service": "kotori-api"
    });

    (StatusCode::OK, Json(response)).into_response()
}
