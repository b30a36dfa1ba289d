//! Song catalog and event log ingestion.

mod compose;
mod extract;
mod pipeline;
mod records;
mod walker;

pub use compose::{compose_songplay, compose_songplays};
pub use extract::{
    extract_catalog_dimensions, extract_event_dimensions, filter_plays, CatalogDimensions,
    EventDimensions,
};
pub use pipeline::{
    ingest_log_data, ingest_song_data, process_log_file, process_song_file, run, CatalogLoaded,
    IngestReport, LoadStats, PipelineError,
};
pub use records::{
    read_json_lines, read_log_file, read_song_file, DecodeError, LogRecord, PlayEvent, SongRecord,
};
pub use walker::{find_json_files, WalkError};
