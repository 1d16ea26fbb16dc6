use anyhow::{Context, Result};
use clap::Parser;
use rustyrag::{
    api,
    config::{self, ConfigOverrides},
    logging,
    processing::{RagService, loader::clear_staging_dir},
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;

#[derive(Parser)]
#[command(
    name = "rustyrag",
    about = "Upload PDFs and ask questions answered from their contents"
)]
struct Cli {
    /// Port to listen on (overrides SERVER_PORT).
    #[arg(long)]
    port: Option<u16>,
    /// Directory used to stage uploads (overrides STAGING_DIR).
    #[arg(long)]
    staging_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // Reads `.env` first so RUST_LOG and RUSTY_RAG_LOG_FILE can come from it.
    let config = config::init_config(ConfigOverrides {
        server_port: cli.port,
        staging_dir: cli.staging_dir,
    })
    .context("failed to load configuration")?;
    logging::init_tracing();
    tracing::debug!(
        staging_dir = %config.staging_dir.display(),
        server_port = ?config.server_port,
        embedding_provider = ?config.embedding_provider,
        embedding_model = %config.embedding_model,
        generation_provider = ?config.generation_provider,
        generation_model = %config.generation_model,
        chunk_size = config.chunk_size,
        chunk_overlap = config.chunk_overlap,
        "Loaded configuration"
    );

    let service = Arc::new(
        RagService::from_config(&config).context("failed to initialize processing service")?,
    );
    clear_staging_dir(service.staging_dir())
        .await
        .context("failed to prepare staging directory")?;
    let app = api::create_router(service.clone(), api::HttpSettings::from_config(&config));

    let (listener, port) = bind_listener(config.server_port)
        .await
        .context("failed to bind listener")?;
    tracing::info!("Listening on http://0.0.0.0:{}", port);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server terminated unexpectedly")?;

    if let Err(error) = clear_staging_dir(service.staging_dir()).await {
        tracing::warn!(error = %error, "Failed to clear staging directory on shutdown");
    }
    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %error, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

async fn bind_listener(requested: Option<u16>) -> Result<(TcpListener, u16), std::io::Error> {
    use std::net::Ipv4Addr;

    if let Some(port) = requested {
        return TcpListener::bind((Ipv4Addr::UNSPECIFIED, port))
            .await
            .map(|listener| (listener, port));
    }

    const PORT_RANGE: std::ops::RangeInclusive<u16> = 8000..=8099;
    for port in PORT_RANGE {
        match TcpListener::bind((Ipv4Addr::UNSPECIFIED, port)).await {
            Ok(listener) => {
                tracing::debug!(port, "Bound server port");
                return Ok((listener, port));
            }
            Err(err) if err.kind() == std::io::ErrorKind::AddrInUse => {
                tracing::debug!(port, "Port already in use; trying next");
                continue;
            }
            Err(err) => return Err(err),
        }
    }

    Err(std::io::Error::new(
        std::io::ErrorKind::AddrNotAvailable,
        "No available port found in range 8000-8099",
    ))
}
