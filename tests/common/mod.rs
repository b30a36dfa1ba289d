//! Common test infrastructure
//!
//! This module provides the fixture datasets end-to-end tests load.
//! Tests should only import from this module, not from internal submodules.
//!
//! # Example
//!
//! ```no_run
//! mod common;
//! use common::TestDataset;
//!
//! #[test]
//! fn test_load() {
//!     let dataset = TestDataset::create();
//!     let mut warehouse = dataset.open_warehouse();
//!     dataset.ingest_all(&mut warehouse);
//! }
//! ```

mod constants;
mod fixtures;

use songplay_etl::{ingest_log_data, ingest_song_data, IngestReport, SqliteWarehouse};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// Public API - this is what tests import
pub use constants::*;
#[allow(unused_imports)]
pub use fixtures::{page_record, play_record, song_record, write_json_lines};

/// A song catalog, an event log tree and a warehouse path, all inside one
/// temporary directory.
pub struct TestDataset {
    dir: TempDir,
}

#[allow(dead_code)]
impl TestDataset {
    /// The standard fixture dataset described in `constants`.
    pub fn create() -> Self {
        let dataset = Self::empty();
        fixtures::create_test_song_data(&dataset.song_data());
        fixtures::create_test_log_data(&dataset.log_data());
        dataset
    }

    /// Empty song and log roots.
    pub fn empty() -> Self {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir_all(dir.path().join("song_data")).unwrap();
        std::fs::create_dir_all(dir.path().join("log_data")).unwrap();
        Self { dir }
    }

    pub fn song_data(&self) -> PathBuf {
        self.dir.path().join("song_data")
    }

    pub fn log_data(&self) -> PathBuf {
        self.dir.path().join("log_data")
    }

    pub fn db_path(&self) -> PathBuf {
        self.dir.path().join("songplays.db")
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn open_warehouse(&self) -> SqliteWarehouse {
        SqliteWarehouse::open(self.db_path()).unwrap()
    }

    /// Runs both stages, panicking on failure.
    pub fn ingest_all(&self, warehouse: &mut SqliteWarehouse) -> (IngestReport, IngestReport) {
        let catalog = ingest_song_data(warehouse, &self.song_data()).unwrap();
        let events = ingest_log_data(warehouse, &self.log_data(), &catalog).unwrap();
        (catalog.report().clone(), events)
    }
}
