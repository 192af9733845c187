//! # Collab Server
//!
//! Entry point: tracing, settings, database pool, then the HTTP/WebSocket
//! listener until Ctrl-C.

use anyhow::Result;
use tracing::info;

use collab_server::config::Settings;
use collab_server::startup::Application;
use collab_server::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();

    let settings = Settings::load()?;
    info!(
        host = %settings.server.host,
        port = settings.server.port,
        environment = %settings.environment,
        typing_ttl_ms = settings.collab.typing_ttl_ms,
        history_limit = settings.collab.history_limit,
        "Configuration loaded"
    );

    let application = Application::build(settings).await?;
    info!(addr = %application.local_addr()?, "Collab server ready");

    application.run_until_stopped().await
}
