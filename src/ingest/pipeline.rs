//! Two-stage ingestion driver.
//!
//! Stage 1 loads the song catalog, stage 2 the event logs. Play events are
//! resolved against the catalog, so `ingest_log_data` takes the
//! `CatalogLoaded` receipt that only `ingest_song_data` hands out.
//!
//! Files are loaded one transaction each and committed before the next file
//! starts. A failing file commits the rows written before the failure and
//! stops the stage.

use super::compose::compose_songplays;
use super::extract::{extract_catalog_dimensions, extract_event_dimensions, filter_plays};
use super::records::{read_log_file, read_song_file, DecodeError};
use super::walker::{find_json_files, WalkError};
use crate::warehouse_store::{SqliteLoader, SqliteWarehouse, StoreError, WarehouseStore};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Walk error: {0}")]
    Walk(#[from] WalkError),
}

/// Rows written by one file or one stage.
///
/// Counts are rows the store changed. Songs, artists and time rows skipped
/// on a key conflict are not counted; users are counted on every upsert
/// since a conflict rewrites their level.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadStats {
    pub songs: usize,
    pub artists: usize,
    pub users: usize,
    pub times: usize,
    pub songplays: usize,
    pub unresolved_songplays: usize,
}

impl LoadStats {
    fn add(&mut self, other: &LoadStats) {
        self.songs += other.songs;
        self.artists += other.artists;
        self.users += other.users;
        self.times += other.times;
        self.songplays += other.songplays;
        self.unresolved_songplays += other.unresolved_songplays;
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IngestReport {
    pub root: PathBuf,
    pub files_found: usize,
    pub files_processed: usize,
    pub stats: LoadStats,
}

/// Proof that the song catalog stage ran to completion.
#[derive(Debug)]
pub struct CatalogLoaded {
    report: IngestReport,
}

impl CatalogLoaded {
    pub fn report(&self) -> &IngestReport {
        &self.report
    }
}

/// Loads one song catalog file: songs, then artists.
pub fn process_song_file(
    store: &dyn WarehouseStore,
    path: &Path,
) -> Result<LoadStats, PipelineError> {
    let records = read_song_file(path)?;
    let dims = extract_catalog_dimensions(&records);

    let songs = store.upsert_songs(&dims.songs)?;
    let artists = store.upsert_artists(&dims.artists)?;
    Ok(LoadStats {
        songs,
        artists,
        ..LoadStats::default()
    })
}

/// Loads one event log file: time and users first, then the play facts
/// that reference them.
pub fn process_log_file(
    store: &dyn WarehouseStore,
    path: &Path,
) -> Result<LoadStats, PipelineError> {
    let plays = filter_plays(read_log_file(path)?);
    let dims = extract_event_dimensions(&plays);

    let times = store.upsert_times(&dims.times)?;
    let users = store.upsert_users(&dims.users)?;

    let songplays = compose_songplays(store, &plays)?;
    let unresolved_songplays = songplays.iter().filter(|s| !s.is_resolved()).count();
    let inserted = store.insert_songplays(&songplays)?;

    Ok(LoadStats {
        users,
        times,
        songplays: inserted,
        unresolved_songplays,
        ..LoadStats::default()
    })
}

type FileProcessor = fn(&dyn WarehouseStore, &Path) -> Result<LoadStats, PipelineError>;

fn process_data(
    warehouse: &mut SqliteWarehouse,
    root: &Path,
    process_file: FileProcessor,
) -> Result<IngestReport, PipelineError> {
    let files = find_json_files(root)?;
    let files_found = files.len();
    info!("{} files found in {}", files_found, root.display());

    let mut report = IngestReport {
        root: root.to_path_buf(),
        files_found,
        files_processed: 0,
        stats: LoadStats::default(),
    };

    for (index, file) in files.iter().enumerate() {
        let tx = warehouse.begin()?;
        let result = process_file(&SqliteLoader::new(&tx), file);
        tx.commit().map_err(StoreError::Transaction)?;

        match result {
            Ok(stats) => report.stats.add(&stats),
            Err(e) => {
                error!("Failed to load {}: {}", file.display(), e);
                return Err(e);
            }
        }
        report.files_processed += 1;
        info!("{}/{} files processed.", index + 1, files_found);
    }

    Ok(report)
}

/// Stage 1: loads every song catalog file under `root`.
pub fn ingest_song_data(
    warehouse: &mut SqliteWarehouse,
    root: &Path,
) -> Result<CatalogLoaded, PipelineError> {
    let report = process_data(warehouse, root, process_song_file)?;
    Ok(CatalogLoaded { report })
}

/// Stage 2: loads every event log file under `root`, resolving plays
/// against the catalog loaded in stage 1.
pub fn ingest_log_data(
    warehouse: &mut SqliteWarehouse,
    root: &Path,
    _catalog: &CatalogLoaded,
) -> Result<IngestReport, PipelineError> {
    process_data(warehouse, root, process_log_file)
}

/// Runs both stages in order.
pub fn run(
    warehouse: &mut SqliteWarehouse,
    song_data: &Path,
    log_data: &Path,
) -> Result<(IngestReport, IngestReport), PipelineError> {
    let catalog = ingest_song_data(warehouse, song_data)?;
    let events = ingest_log_data(warehouse, log_data, &catalog)?;
    Ok((catalog.report, events))
}
