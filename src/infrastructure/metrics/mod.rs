//! Prometheus Metrics Module
//!
//! Provides application-wide metrics collection using Prometheus.
//!
//! # Metrics Collected
//! - Active WebSocket connection gauge
//! - Rejected handshakes by reason
//! - Relayed messages and persistence failures
//! - Typing indicator broadcasts
//! - Denied room joins

use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Global metrics registry
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

/// Active WebSocket connections gauge
pub static WEBSOCKET_CONNECTIONS_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::with_opts(
        Opts::new(
            "websocket_connections_active",
            "Number of active WebSocket connections",
        )
        .namespace("collab_server"),
    )
    .expect("Failed to create WEBSOCKET_CONNECTIONS_ACTIVE metric")
});

/// Handshakes refused before upgrade
pub static HANDSHAKES_REJECTED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "handshakes_rejected_total",
            "Number of WebSocket handshakes rejected during authentication",
        )
        .namespace("collab_server"),
        &["reason"], // "missing", "expired", "invalid"
    )
    .expect("Failed to create HANDSHAKES_REJECTED_TOTAL metric")
});

/// Chat messages by relay outcome
pub static MESSAGES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("messages_total", "Number of chat messages by relay outcome")
            .namespace("collab_server"),
        &["outcome"], // "relayed", "persistence_failed"
    )
    .expect("Failed to create MESSAGES_TOTAL metric")
});

/// Typing snapshots broadcast to rooms
pub static TYPING_BROADCASTS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new(
            "typing_broadcasts_total",
            "Number of typing indicator snapshots broadcast",
        )
        .namespace("collab_server"),
    )
    .expect("Failed to create TYPING_BROADCASTS_TOTAL metric")
});

/// Room joins refused for lack of project membership
pub static AUTHORIZATION_DENIALS_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::with_opts(
        Opts::new(
            "authorization_denials_total",
            "Number of room joins denied for non-members",
        )
        .namespace("collab_server"),
    )
    .expect("Failed to create AUTHORIZATION_DENIALS_TOTAL metric")
});

/// Register all metrics with the registry
fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(WEBSOCKET_CONNECTIONS_ACTIVE.clone()))
        .expect("Failed to register WEBSOCKET_CONNECTIONS_ACTIVE");
    registry
        .register(Box::new(HANDSHAKES_REJECTED_TOTAL.clone()))
        .expect("Failed to register HANDSHAKES_REJECTED_TOTAL");
    registry
        .register(Box::new(MESSAGES_TOTAL.clone()))
        .expect("Failed to register MESSAGES_TOTAL");
    registry
        .register(Box::new(TYPING_BROADCASTS_TOTAL.clone()))
        .expect("Failed to register TYPING_BROADCASTS_TOTAL");
    registry
        .register(Box::new(AUTHORIZATION_DENIALS_TOTAL.clone()))
        .expect("Failed to register AUTHORIZATION_DENIALS_TOTAL");
}

/// Collect and encode all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return String::new();
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Helper to update WebSocket connection count
pub fn set_websocket_connections(active: usize) {
    WEBSOCKET_CONNECTIONS_ACTIVE.set(active as i64);
}

pub fn record_handshake_rejected(reason: &str) {
    HANDSHAKES_REJECTED_TOTAL.with_label_values(&[reason]).inc();
}

pub fn record_message_relayed() {
    MESSAGES_TOTAL.with_label_values(&["relayed"]).inc();
}

pub fn record_message_persistence_failed() {
    MESSAGES_TOTAL.with_label_values(&["persistence_failed"]).inc();
}

pub fn record_typing_broadcast() {
    TYPING_BROADCASTS_TOTAL.inc();
}

pub fn record_authorization_denied() {
    AUTHORIZATION_DENIALS_TOTAL.inc();
}
