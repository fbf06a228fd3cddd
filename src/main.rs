//! thingd - Thing CRUD service
//!
//! Binds the HTTP API to a storage backend selected at startup and runs
//! until SIGINT/SIGTERM.

use std::sync::Arc;

use clap::{Parser, ValueEnum};

use thingd::constants::{DOCUMENT_STORE_FILENAME, HTTP_BIND_ADDRESS_DEFAULT};
use thingd::storage::{DocumentBackend, MemoryBackend, PostgresBackend, StorageBackend};

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// CLI
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BackendKind {
    /// In-memory, non-persistent (development only)
    Memory,
    /// Embedded document store in the data directory
    Document,
    /// PostgreSQL via DATABASE_URL
    Postgres,
}

/// Thing CRUD service with pluggable storage backends
#[derive(Parser, Debug)]
#[command(name = "thingd")]
#[command(about = "Thing CRUD service with pluggable storage backends")]
#[command(version)]
struct Cli {
    /// HTTP bind address
    #[arg(short, long, default_value = HTTP_BIND_ADDRESS_DEFAULT)]
    bind: String,

    /// Storage backend
    #[arg(long, value_enum, default_value_t = BackendKind::Document)]
    backend: BackendKind,

    /// Data directory for the document store
    #[arg(long, default_value = "~/.thingd")]
    data_dir: String,

    /// Postgres connection string (postgres backend only)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Apply pending migrations before serving (postgres backend only)
    #[arg(long)]
    migrate: bool,

    /// Enable verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// =============================================================================
// Main
// =============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,tower_http=debug",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .init();

    tracing::info!("thingd v{}", APP_VERSION);

    let store: Arc<dyn StorageBackend> = match cli.backend {
        BackendKind::Memory => {
            tracing::info!("Using in-memory backend (data is not persisted)");
            Arc::new(MemoryBackend::new())
        }
        BackendKind::Document => {
            let data_dir = shellexpand::tilde(&cli.data_dir).to_string();
            let path = std::path::Path::new(&data_dir).join(DOCUMENT_STORE_FILENAME);
            tracing::info!("Using document backend at {}", path.display());
            Arc::new(DocumentBackend::open(path)?)
        }
        BackendKind::Postgres => {
            let url = cli.database_url.ok_or_else(|| {
                anyhow::anyhow!("--database-url or DATABASE_URL is required for the postgres backend")
            })?;
            let backend = PostgresBackend::new(&url).await?;
            if cli.migrate {
                backend.apply_migrations().await?;
            }
            tracing::info!("Using postgres backend");
            Arc::new(backend)
        }
    };

    let addr: std::net::SocketAddr = cli.bind.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    thingd::api::serve(listener, store, shutdown_signal()).await?;
    tracing::info!("Shut down cleanly");

    Ok(())
}

/// Resolves on SIGINT or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("Shutting down...");
}
