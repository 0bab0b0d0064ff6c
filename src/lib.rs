pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod scheduler;
pub mod services;
pub mod soap;
pub mod state;

pub use config::Config;

use anyhow::Context;
use scheduler::Scheduler;
use state::AppState;
use std::sync::Arc;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    init_tracing(&config.general.log_level);

    match Config::active_path() {
        Some(path) => info!("Loaded config from: {}", path.display()),
        None => info!("No config file found, using defaults"),
    }

    info!("notarr v{} starting...", env!("CARGO_PKG_VERSION"));

    let state = AppState::new(config.clone()).await?;

    let scheduler = if config.scheduler.enabled {
        let scheduler = Arc::new(Scheduler::new(
            state.tokens.clone(),
            config.scheduler.clone(),
        ));
        scheduler.run_once().await?;

        let task = Arc::clone(&scheduler);
        let handle = tokio::spawn(async move {
            if let Err(e) = task.start().await {
                error!("Scheduler error: {}", e);
            }
        });
        Some((scheduler, handle))
    } else {
        None
    };

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    let app = api::router(state).await;

    let server_handle = tokio::spawn(async move {
        info!("Envelope endpoint available at http://{addr}/soap");
        if let Err(e) = axum::serve(listener, app).await {
            error!("Server error: {}", e);
        }
    });

    info!("Running. Press Ctrl+C to stop.");

    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received"),
        Err(e) => error!("Error listening for shutdown: {}", e),
    }

    if let Some((scheduler, mut handle)) = scheduler {
        scheduler.stop().await;
        // The cron loop notices the flag within a second; the interval
        // loop may be mid-wait, so abort it after a grace period.
        let grace = tokio::time::Duration::from_secs(5);
        if tokio::time::timeout(grace, &mut handle).await.is_err() {
            handle.abort();
        }
    }
    server_handle.abort();
    info!("Stopped");

    Ok(())
}

fn init_tracing(log_level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}
