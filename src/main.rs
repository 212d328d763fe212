//! Artify HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use artify::config::Config;
use artify::engine;
use artify::gateway::{AppState, RouterOptions, create_router_with_state};
use artify::records::JsonlRecordStore;
use artify::signing::signer_from_key;
use artify::store::store_from_config;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check().await);
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        storage = %config.storage_path.display(),
        "Artify starting"
    );

    tokio::fs::create_dir_all(&config.storage_path).await?;

    let engine = engine::global::init(&config)?;
    if engine.is_fallback() {
        tracing::warn!("No feature extractor loaded, reports will be marked mock");
    }

    let warm_engine = engine.clone();
    match tokio::task::spawn_blocking(move || warm_engine.warm_up()).await? {
        Ok(Some(count)) => tracing::info!(references = count, "Reference set ready"),
        Ok(None) => {}
        Err(e) => tracing::warn!("Failed to build reference set: {}. Retrying on first request.", e),
    }

    let signer = signer_from_key(config.signer_key.as_deref())?;
    let store = store_from_config(
        config.web3storage_token.as_deref(),
        &config.upload_url,
        &config.content_root(),
    );
    let records = Arc::new(JsonlRecordStore::new(config.records_path()));

    tracing::info!(
        signer = signer.name(),
        content_store = store.name(),
        records = %config.records_path().display(),
        "Output stages configured"
    );

    let state = AppState::new(
        engine,
        signer,
        store,
        records,
        config.storage_path.clone(),
    );

    let app = create_router_with_state(state, &RouterOptions::from_config(&config));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Artify shutdown complete");
    Ok(())
}

async fn run_health_check() -> i32 {
    let port = std::env::var(Config::ENV_PORT)
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8000);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let client = match reqwest::Client::builder()
        .timeout(Duration::from_secs(1))
        .build()
    {
        Ok(client) => client,
        Err(_) => return 1,
    };

    match client.get(&url).send().await {
        Ok(res) if res.status().is_success() => 0,
        _ => 1,
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
