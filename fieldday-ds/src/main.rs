//! fieldday-ds — team submission data server
//!
//! Runs on the teacher's laptop and receives submissions from the field
//! clients over the local network.

use anyhow::Result;
use clap::Parser;
use fieldday_common::config::ServerConfig;
use fieldday_common::db::init::init_database;
use fieldday_ds::mediafs::MediaStore;
use fieldday_ds::snapshot::SnapshotStore;
use fieldday_ds::{build_router, AppState};
use std::path::PathBuf;
use tracing::info;

#[derive(Debug, Parser)]
#[command(name = "fieldday-ds", about = "Fieldday team submission data server")]
struct Args {
    /// HTTP port to listen on
    #[arg(long, env = "FIELDDAY_PORT")]
    port: Option<u16>,

    /// Data root directory (database, media files, raw snapshots)
    #[arg(long, env = "FIELDDAY_ROOT")]
    data_root: Option<PathBuf>,

    /// Shared secret gating the destructive admin wipe
    #[arg(long, env = "FIELDDAY_ADMIN_SECRET")]
    admin_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting fieldday data server (fieldday-ds) v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();
    let config = ServerConfig::resolve(args.port, args.data_root, args.admin_secret);

    std::fs::create_dir_all(&config.data_root)?;
    std::fs::create_dir_all(config.media_root())?;
    std::fs::create_dir_all(config.snapshot_root())?;

    let db_path = config.database_path();
    info!("Database path: {}", db_path.display());
    let pool = init_database(&db_path).await?;

    if config.admin_secret.is_empty() {
        info!("Admin wipe gate disabled (no admin secret configured)");
    }

    let state = AppState::new(
        pool,
        SnapshotStore::new(config.snapshot_root()),
        MediaStore::new(config.media_root()),
        config.admin_secret.clone(),
    );
    let app = build_router(state);

    // Field clients connect over the local network
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port)).await?;
    info!("fieldday-ds listening on http://0.0.0.0:{}", config.port);
    info!("Health check: http://127.0.0.1:{}/health", config.port);

    axum::serve(listener, app).await?;

    Ok(())
}
