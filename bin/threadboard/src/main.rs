//! # Threadboard Binary
//!
//! The entry point that assembles the application based on compile-time
//! features and runtime settings.

mod logging;

use std::sync::Arc;

use anyhow::Context;
use tb_api::{configure_routes, AppState, RouterOptions};
use tb_config::{Settings, StorageBackend};
use tb_core::traits::ThreadStore;

// Feature-gated imports: each backend is compiled in only when asked for.
#[cfg(feature = "db-memory")]
use tb_db_memory::MemoryThreadStore;

#[cfg(feature = "db-sqlite")]
use tb_db_sqlite::SqliteThreadStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("failed to load settings")?;
    logging::init(&settings.logging);

    // 1. Initialize the configured storage backend
    let store = build_store(&settings).await?;

    // 2. Wrap in AppState (dynamic dispatch over the store port)
    let state = Arc::new(AppState::new(store));

    let static_dir = settings.server.static_dir.clone();
    let options = RouterOptions {
        static_dir: if static_dir.is_dir() {
            Some(static_dir)
        } else {
            tracing::warn!(path = %static_dir.display(), "static dir not found; board pages disabled");
            None
        },
        cors_origins: settings.server.cors_origins.clone(),
    };
    let app = configure_routes(state, &options);

    let addr = settings.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    tracing::info!("Threadboard listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Threadboard stopped");
    Ok(())
}

async fn build_store(settings: &Settings) -> anyhow::Result<Arc<dyn ThreadStore>> {
    match settings.storage.backend {
        #[cfg(feature = "db-sqlite")]
        StorageBackend::Sqlite => {
            use secrecy::ExposeSecret;

            let store = SqliteThreadStore::connect(
                settings.storage.database_url.expose_secret(),
                settings.storage.max_connections,
            )
            .await
            .context("failed to open sqlite store")?;
            Ok(Arc::new(store))
        }
        #[cfg(feature = "db-memory")]
        StorageBackend::Memory => {
            tracing::warn!("using in-memory store; data is lost on shutdown");
            Ok(Arc::new(MemoryThreadStore::new()))
        }
        #[allow(unreachable_patterns)]
        other => anyhow::bail!(
            "storage backend {:?} is not compiled into this binary",
            other
        ),
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for ctrl-c: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("failed to listen for SIGTERM: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
