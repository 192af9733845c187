//! Health Check Handlers
//!
//! Liveness and readiness probes. Readiness pings the database and reports a
//! snapshot of the in-process real-time state.
//!
//! # Endpoints
//! - `GET /health` - Basic health check
//! - `GET /health/live` - Liveness probe
//! - `GET /health/ready` - Readiness probe, 503 while the database is down

use std::time::{Duration, Instant};

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::startup::AppState;

/// Round trips slower than this mark the database as degraded
const SLOW_DATABASE: Duration = Duration::from_millis(100);

static STARTED: Lazy<(Instant, DateTime<Utc>)> = Lazy::new(|| (Instant::now(), Utc::now()));

/// Pin the start time used for uptime reporting.
pub fn init_server_start() {
    Lazy::force(&STARTED);
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    /// Degraded still takes traffic.
    pub fn status_code(self) -> StatusCode {
        match self {
            HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
}

/// Body of `GET /health/ready`
#[derive(Debug, Serialize)]
pub struct ReadinessReport {
    pub status: HealthStatus,
    pub version: &'static str,
    pub uptime_seconds: u64,
    pub started_at: String,
    pub checks: ReadinessChecks,
}

#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    pub database: DatabaseCheck,
    pub websocket: RealtimeSnapshot,
}

#[derive(Debug, Serialize)]
pub struct DatabaseCheck {
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DatabaseCheck {
    fn reachable(latency: Duration) -> Self {
        Self {
            status: if latency < SLOW_DATABASE {
                HealthStatus::Healthy
            } else {
                HealthStatus::Degraded
            },
            latency_ms: Some(latency.as_millis() as u64),
            message: None,
        }
    }

    fn unreachable(error: impl std::fmt::Display) -> Self {
        Self {
            status: HealthStatus::Unhealthy,
            latency_ms: None,
            message: Some(format!("Database connection failed: {}", error)),
        }
    }
}

/// Counts of the in-process real-time state
#[derive(Debug, Serialize)]
pub struct RealtimeSnapshot {
    pub active_connections: usize,
    pub active_rooms: usize,
    pub online_users: usize,
}

impl RealtimeSnapshot {
    fn capture(state: &AppState) -> Self {
        Self {
            active_connections: state.gateway.session_count(),
            active_rooms: state.hub.rooms().room_count(),
            online_users: state.hub.presence().online_users().len(),
        }
    }
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { status: "alive" })
}

pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let (started, started_at) = *STARTED;

    let database = ping_database(&state).await;
    // Rooms and presence live in memory; only the database can take us out.
    let status = database.status;

    let report = ReadinessReport {
        status,
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: started.elapsed().as_secs(),
        started_at: started_at.to_rfc3339(),
        checks: ReadinessChecks {
            database,
            websocket: RealtimeSnapshot::capture(&state),
        },
    };

    (status.status_code(), Json(report))
}

async fn ping_database(state: &AppState) -> DatabaseCheck {
    let start = Instant::now();
    match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => DatabaseCheck::reachable(start.elapsed()),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness database ping failed");
            DatabaseCheck::unreachable(e)
        }
    }
}
