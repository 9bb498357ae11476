//! Configuration loading
//!
//! Resolution priority, highest first:
//! 1. Command-line argument
//! 2. Environment variable (handled by clap's `env` attribute)
//! 3. TOML config file
//! 4. Compiled default

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Error, Result};

/// Default HTTP/WebSocket listen port
pub const DEFAULT_PORT: u16 = 3004;

/// Runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP/WebSocket listen port
    pub port: u16,
    /// SQLite database file path
    pub database: PathBuf,
    /// Base URL of the external metadata catalog
    pub catalog_base_url: String,
    /// Seconds after which the current item is assumed finished;
    /// 0 disables the timer (clients drive advancement)
    pub auto_advance_secs: u64,
}

/// Optional values read from the TOML config file
#[derive(Debug, Default, Deserialize)]
struct FileConfig {
    port: Option<u16>,
    database: Option<PathBuf>,
    catalog_base_url: Option<String>,
    auto_advance_secs: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database: PathBuf::from("vidsync.db"),
            catalog_base_url: "https://catalog.invalid/api".to_string(),
            auto_advance_secs: 0,
        }
    }
}

impl Config {
    /// Resolve configuration from CLI arguments and an optional file.
    ///
    /// CLI/env values (already merged by clap) win over file values, which
    /// win over defaults.
    pub fn resolve(
        config_file: Option<&Path>,
        port: Option<u16>,
        database: Option<PathBuf>,
        catalog_base_url: Option<String>,
        auto_advance_secs: Option<u64>,
    ) -> Result<Self> {
        let file = match config_file {
            Some(path) => Self::load_file(path)?,
            None => FileConfig::default(),
        };
        let defaults = Config::default();

        Ok(Self {
            port: port.or(file.port).unwrap_or(defaults.port),
            database: database.or(file.database).unwrap_or(defaults.database),
            catalog_base_url: catalog_base_url
                .or(file.catalog_base_url)
                .unwrap_or(defaults.catalog_base_url),
            auto_advance_secs: auto_advance_secs
                .or(file.auto_advance_secs)
                .unwrap_or(defaults.auto_advance_secs),
        })
    }

    fn load_file(path: &Path) -> Result<FileConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("cannot read {}: {e}", path.display())))?;
        let file: FileConfig = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("cannot parse {}: {e}", path.display())))?;
        info!("loaded configuration from {}", path.display());
        Ok(file)
    }

    /// SQLite connection string, creating the file on first open.
    pub fn database_url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.database.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_apply_without_file() {
        let config = Config::resolve(None, None, None, None, None).unwrap();
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.auto_advance_secs, 0);
    }

    #[test]
    fn cli_wins_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 4000\nauto_advance_secs = 240").unwrap();

        let config =
            Config::resolve(Some(file.path()), Some(5000), None, None, None).unwrap();
        assert_eq!(config.port, 5000);
        assert_eq!(config.auto_advance_secs, 240);
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = \"not a number").unwrap();

        let err = Config::resolve(Some(file.path()), None, None, None, None).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
