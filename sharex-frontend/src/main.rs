use dotenvy::dotenv;
use sharex_core::observability::init_tracing;
use sharex_frontend::config::get_configuration;
use sharex_frontend::services::client_registry::ClientRegistry;
use sharex_frontend::startup::build_router;
use sharex_frontend::AppState;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// How often idle client contexts are swept.
const PURGE_INTERVAL: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let configuration = get_configuration().map_err(|e| {
        eprintln!("Failed to read configuration: {}", e);
        anyhow::anyhow!("Configuration error: {}", e)
    })?;

    init_tracing(
        "sharex-frontend",
        &configuration.telemetry.log_level,
        configuration.telemetry.otlp_endpoint.as_deref(),
    )?;

    sharex_frontend::services::metrics::init_metrics()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics recorder: {}", e))?;

    let registry = Arc::new(ClientRegistry::new(configuration.api.clone()));
    let state = AppState::new(registry.clone(), &configuration.server.public_url);

    let idle_minutes = configuration.server.session_idle_minutes;
    let max_idle = Duration::from_secs(idle_minutes.max(1) as u64 * 60);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(PURGE_INTERVAL);
        loop {
            interval.tick().await;
            registry.purge_idle(max_idle);
        }
    });

    let app = build_router(state, idle_minutes);

    let address = format!(
        "{}:{}",
        configuration.server.host, configuration.server.port
    );
    let listener = tokio::net::TcpListener::bind(&address).await.map_err(|e| {
        tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
        anyhow::anyhow!("Failed to bind to address {}: {}", address, e)
    })?;

    info!(
        api_url = %configuration.api.url,
        public_url = %configuration.server.public_url,
        "Starting sharex-frontend on {}",
        address
    );
    axum::serve(listener, app).await.map_err(|e| {
        tracing::error!("Server error: {}", e);
        anyhow::anyhow!("Server error: {}", e)
    })?;

    Ok(())
}
