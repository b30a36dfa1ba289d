//! Songplay ETL Library
//!
//! Loads a song catalog and user activity logs into a star-schema SQLite
//! warehouse. The binary drives it; the modules are exposed for testing.

pub mod config;
pub mod ingest;
pub mod sqlite_persistence;
pub mod warehouse_store;

// Re-export commonly used types for convenience
pub use ingest::{ingest_log_data, ingest_song_data, CatalogLoaded, IngestReport, PipelineError};
pub use warehouse_store::{SqliteWarehouse, TableCounts, WarehouseStore};
