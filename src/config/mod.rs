mod file_config;

pub use file_config::FileConfig;

use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub db_path: PathBuf,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub reset_schema: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub song_data: PathBuf,
    pub log_data: PathBuf,
    pub reset_schema: bool,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.db_path.clone());
        if db_path.as_os_str().is_empty() {
            bail!("db_path must be specified via --db or in config file");
        }
        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }

        let song_data = file
            .song_data
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.song_data.clone());
        validate_data_dir("song_data", &song_data)?;

        let log_data = file
            .log_data
            .map(PathBuf::from)
            .unwrap_or_else(|| cli.log_data.clone());
        validate_data_dir("log_data", &log_data)?;

        let reset_schema = file.reset_schema.unwrap_or(cli.reset_schema);

        Ok(Self {
            db_path,
            song_data,
            log_data,
            reset_schema,
        })
    }
}

fn validate_data_dir(name: &str, path: &Path) -> Result<()> {
    if !path.exists() {
        bail!("{} directory does not exist: {:?}", name, path);
    }
    if !path.is_dir() {
        bail!("{} is not a directory: {:?}", name, path);
    }
    Ok(())
}
