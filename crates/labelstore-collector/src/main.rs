//! labelstore collector
//!
//! - Ingest: POST /v1/observe
//! - Export: GET /metrics (top-K applied per metric)
//! - Retention sweeps and periodic resets on tokio timers

use std::net::SocketAddr;

use tracing_subscriber::{fmt, EnvFilter};

use labelstore_collector::{app_state, config, router, scheduler::Scheduler};

const DEFAULT_CONFIG_PATH: &str = "labelstore.yaml";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let path = std::env::args()
        .nth(1)
        .or_else(|| std::env::var("LABELSTORE_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    // strict parse + validate, then register every metric (fail fast)
    let cfg = config::load_from_file(&path)?;
    let listen: SocketAddr = cfg.collector.listen.parse()?;

    let state = app_state::AppState::new(cfg)?;
    let scheduler = Scheduler::start(state.registry());
    let app = router::build_router(state.clone());

    tracing::info!(%listen, metrics = state.registry().len(), timers = scheduler.len(), "labelstore-collector starting");
    let listener = tokio::net::TcpListener::bind(listen).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    scheduler.shutdown();
    tracing::info!("labelstore-collector stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to listen for shutdown signal");
    }
}
