//! Configuration loading and data root resolution

use crate::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default HTTP port when neither CLI, environment, nor config file set one.
pub const DEFAULT_PORT: u16 = 5000;

/// Default data root (database, media files, raw snapshots) relative to the
/// working directory.
pub const DEFAULT_DATA_ROOT: &str = "fieldday_data";

/// Resolved server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub data_root: PathBuf,
    /// Shared secret gating the destructive admin wipe. Empty disables the
    /// gate (development convention).
    pub admin_secret: String,
}

/// Optional on-disk configuration file (`fieldday.toml`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub data_root: Option<PathBuf>,
    pub admin_secret: Option<String>,
}

impl ServerConfig {
    /// Resolve configuration in priority order:
    /// 1. Command-line argument (highest; clap also folds env vars in here)
    /// 2. TOML config file (`FIELDDAY_CONFIG` path or `./fieldday.toml`)
    /// 3. Compiled default
    pub fn resolve(
        cli_port: Option<u16>,
        cli_data_root: Option<PathBuf>,
        cli_admin_secret: Option<String>,
    ) -> ServerConfig {
        let file = load_file_config();

        ServerConfig {
            port: cli_port.or(file.port).unwrap_or(DEFAULT_PORT),
            data_root: cli_data_root
                .or(file.data_root)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_ROOT)),
            admin_secret: cli_admin_secret.or(file.admin_secret).unwrap_or_default(),
        }
    }

    /// Path of the SQLite database under the data root.
    pub fn database_path(&self) -> PathBuf {
        self.data_root.join("fieldday.db")
    }

    /// Root directory for uploaded media files, keyed by team.
    pub fn media_root(&self) -> PathBuf {
        self.data_root.join("media")
    }

    /// Root directory for raw submission snapshots, keyed by team.
    pub fn snapshot_root(&self) -> PathBuf {
        self.data_root.join("students")
    }
}

/// Load the optional TOML config file; a missing file is not an error, a
/// malformed one is logged and ignored.
fn load_file_config() -> FileConfig {
    let path = std::env::var("FIELDDAY_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("fieldday.toml"));

    match read_file_config(&path) {
        Ok(Some(config)) => config,
        Ok(None) => FileConfig::default(),
        Err(e) => {
            warn!("Ignoring unreadable config file {}: {}", path.display(), e);
            FileConfig::default()
        }
    }
}

fn read_file_config(path: &Path) -> Result<Option<FileConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(path)?;
    let config = toml::from_str(&content)
        .map_err(|e| crate::Error::Config(format!("{}: {}", path.display(), e)))?;
    Ok(Some(config))
}
