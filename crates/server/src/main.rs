use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rdfin_core::{
    load_config_from_env, validate_config, DayLedger, FsLedgerStore, FsStrmWriter,
    IngestOrchestrator, LinkResolver, LedgerStore, Materializer, RealDebridResolver,
    SanitizedConfig, StrmWriter,
};
use rdfin_server::{api::create_router, state::AppState};

/// Application version
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let (config, config_path) = load_config_from_env().context("Failed to load configuration")?;
    match &config_path {
        Some(path) => info!("Loaded configuration from {:?}", path),
        None => info!("No configuration file, using defaults and environment"),
    }

    // Validate configuration
    validate_config(&config).context("Configuration validation failed")?;

    // Short hash of the effective (redacted) configuration
    let config_json = serde_json::to_string(&SanitizedConfig::from(&config)).unwrap_or_default();
    let config_hash = format!("{:x}", Sha256::digest(config_json.as_bytes()));
    info!(
        version = VERSION,
        config_hash = &config_hash[..16],
        "Configuration loaded successfully"
    );
    info!("Media root: {:?}", config.library.media_root);
    info!("Log root: {:?}", config.library.log_root);

    // Debrid provider
    let resolver: Arc<dyn LinkResolver> = Arc::new(
        RealDebridResolver::new(&config.debrid).context("Failed to create Real-Debrid client")?,
    );
    info!("Using resolver: {}", resolver.name());

    // Library writer
    let writer: Arc<dyn StrmWriter> = Arc::new(FsStrmWriter::new(&config.library.media_root));

    // Day logs
    let store: Arc<dyn LedgerStore> = Arc::new(FsLedgerStore::new(&config.library.log_root));
    info!("Ledger store initialized");

    let materializer = Arc::new(Materializer::new(
        resolver,
        writer,
        config.debrid.retry.clone(),
    ));
    let ledger = Arc::new(DayLedger::new(store, materializer));
    let orchestrator = Arc::new(IngestOrchestrator::new(ledger, config.ingest.clone()));
    info!(
        "Ingest orchestrator ready (max {} concurrent links)",
        config.ingest.max_concurrent_links
    );

    // Create app state and router
    let addr = SocketAddr::new(config.server.host, config.server.port);
    let state = Arc::new(AppState::new(config, orchestrator));
    let app = create_router(state);

    // Start server
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    // Run server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
