//! Application Startup
//!
//! Application building and server initialization.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::Router;
use sqlx::PgPool;
use tokio::net::TcpListener;

use crate::application::services::{CollabHub, ConnectionAuthenticator, EventSink, HubOptions, Stores};
use crate::config::Settings;
use crate::infrastructure::database;
use crate::infrastructure::repositories::{
    PgActivityLog, PgMessageStore, PgRoomDirectory, PgUserDirectory,
};
use crate::presentation::http::{handlers::health, routes};
use crate::presentation::middleware::{cors, logging};
use crate::presentation::websocket::gateway::Gateway;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub gateway: Arc<Gateway>,
    pub hub: Arc<CollabHub>,
    pub authenticator: ConnectionAuthenticator,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Wire the gateway, the collaboration services and the Postgres
    /// collaborators around an existing pool.
    pub fn new(db: PgPool, settings: Settings) -> Self {
        let stores = Stores {
            directory: Arc::new(PgRoomDirectory::new(db.clone())),
            messages: Arc::new(PgMessageStore::new(db.clone())),
            users: Arc::new(PgUserDirectory::new(db.clone())),
            activity: Arc::new(PgActivityLog::new(db.clone())),
        };
        Self::with_stores(db, stores, settings)
    }

    /// Same as [`AppState::new`] with caller-supplied collaborators.
    pub fn with_stores(db: PgPool, stores: Stores, settings: Settings) -> Self {
        let gateway = Arc::new(Gateway::new(settings.websocket.heartbeat_interval_ms));
        let sink: Arc<dyn EventSink> = gateway.clone();

        let hub = Arc::new(CollabHub::new(
            stores,
            sink,
            HubOptions {
                typing_ttl: settings.collab.typing_ttl(),
                history_limit: settings.collab.history_limit,
            },
        ));

        Self {
            db,
            gateway,
            hub,
            authenticator: ConnectionAuthenticator::new(settings.jwt.clone()),
            settings: Arc::new(settings),
        }
    }
}

/// Build the router with middleware
pub fn build_router(state: AppState) -> Router {
    let cors = cors::create_cors_layer(&state.settings.cors);
    routes::create_router(state)
        .layer(logging::create_trace_layer())
        .layer(cors)
}

/// Application instance
pub struct Application {
    listener: TcpListener,
    router: Router,
}

impl Application {
    /// Build the application from settings
    pub async fn build(settings: Settings) -> Result<Self> {
        health::init_server_start();

        // Create database pool
        let db = database::create_pool(&settings.database).await?;
        tracing::info!("Database connection pool created");

        let addr: SocketAddr = settings.server_addr().parse()?;

        let state = AppState::new(db, settings);
        let router = build_router(state);

        // Bind to address
        let listener = TcpListener::bind(addr).await?;
        tracing::info!("Listening on {}", addr);

        Ok(Self { listener, router })
    }

    /// Run the server until stopped
    pub async fn run_until_stopped(self) -> Result<()> {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
        Ok(())
    }

    /// Get the bound address
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
