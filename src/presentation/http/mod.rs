//! HTTP Surface
//!
//! Health probes, metrics and the WebSocket upgrade route.

pub mod handlers;
pub mod routes;
