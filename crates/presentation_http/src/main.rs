//! FinSight HTTP Server
//!
//! Main entry point for the HTTP API server.

use std::{sync::Arc, time::Duration};

use application::{PredictionService, UserDirectory};
use infrastructure::{AppConfig, HttpCompletionAdapter};
use presentation_http::{
    handlers::backups::BackupQueue, middleware::spawn_cleanup_task, routes::create_app,
    state::AppState,
};
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config, using defaults: {e}");
        AppConfig::default()
    });

    init_tracing(&config.server.log_format);

    info!(
        host = %config.server.host,
        port = %config.server.port,
        environment = %config.environment,
        model = %config.completion.model,
        "FinSight v{} starting",
        env!("CARGO_PKG_VERSION")
    );

    // Initialize the completion adapter and services
    let adapter = HttpCompletionAdapter::new(config.completion.clone())
        .map_err(|e| anyhow::anyhow!("Failed to initialize completion adapter: {e}"))?;
    let completion: Arc<dyn application::ports::CompletionPort> = Arc::new(adapter);

    let state = AppState {
        prediction_service: Arc::new(PredictionService::new(completion)),
        user_directory: Arc::new(UserDirectory::new()),
        backups: Arc::new(BackupQueue::new()),
        config: Arc::new(config.clone()),
    };

    // Build the application and spawn the bucket sweep
    let (app, rate_limiter) = create_app(state, &config);
    let cleanup_interval = Duration::from_secs(config.security.rate_limit_cleanup_interval_secs);
    let cleanup_handle = spawn_cleanup_task(rate_limiter, cleanup_interval);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{addr}");

    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs.unwrap_or(30));
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    cleanup_handle.abort();
    info!("Server shutdown complete");

    Ok(())
}

/// Initialize the tracing subscriber in the configured format
fn init_tracing(log_format: &str) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "finsight_server=debug,presentation_http=debug,tower_http=info".into());

    if log_format == "json" {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Wait for shutdown signals (SIGINT, SIGTERM)
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C, initiating graceful shutdown");
        }
        () = terminate => {
            info!("Received SIGTERM, initiating graceful shutdown");
        }
    }

    info!("Waiting up to {timeout:?} for connections to close");
    // Connection draining is handled by axum's graceful_shutdown
}
