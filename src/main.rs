use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use songplay_etl::config::{AppConfig, CliConfig, FileConfig};
use songplay_etl::{ingest, IngestReport, SqliteWarehouse};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

/// Loads the song catalog and the user activity logs into the songplays
/// warehouse.
#[derive(Parser, Debug)]
#[clap(version)]
struct CliArgs {
    /// Path to the SQLite warehouse database file, created if missing.
    #[clap(long, default_value = "songplays.db", value_parser = parse_path)]
    pub db: PathBuf,

    /// Root directory of the song catalog files.
    #[clap(long, default_value = "data/song_data", value_parser = parse_path)]
    pub song_data: PathBuf,

    /// Root directory of the event log files.
    #[clap(long, default_value = "data/log_data", value_parser = parse_path)]
    pub log_data: PathBuf,

    /// Path to a TOML config file. Its values override the CLI ones.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Drop and recreate every warehouse table before loading.
    #[clap(long)]
    pub reset: bool,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            db_path: self.db.clone(),
            song_data: self.song_data.clone(),
            log_data: self.log_data.clone(),
            reset_schema: self.reset,
        }
    }
}

fn log_report(stage: &str, report: &IngestReport) {
    info!(
        "{} stage: {}/{} files from {:?}, {} songs, {} artists, {} users, {} time rows, {} songplays ({} unresolved)",
        stage,
        report.files_processed,
        report.files_found,
        report.root,
        report.stats.songs,
        report.stats.artists,
        report.stats.users,
        report.stats.times,
        report.stats.songplays,
        report.stats.unresolved_songplays,
    );
}

fn run(config: &AppConfig) -> Result<()> {
    info!("Opening SQLite warehouse database at {:?}...", config.db_path);
    let mut warehouse = if config.reset_schema {
        SqliteWarehouse::open_reset(&config.db_path)?
    } else {
        SqliteWarehouse::open(&config.db_path)?
    };

    let (catalog, events) = ingest::run(&mut warehouse, &config.song_data, &config.log_data)?;
    log_report("Song data", &catalog);
    log_report("Log data", &events);

    let counts = warehouse.table_counts()?;
    info!(
        "Warehouse now holds {} songplays, {} users, {} songs, {} artists, {} time rows",
        counts.songplays, counts.users, counts.songs, counts.artists, counts.time
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to install the tracing subscriber")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config file {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    if let Err(e) = run(&config) {
        error!("Ingestion failed: {:#}", e);
        return Err(e);
    }
    Ok(())
}
