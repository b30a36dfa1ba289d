//! WarehouseStore trait definition.
//!
//! The loading and lookup half of the warehouse: everything a per-file
//! ingestion step needs, independent of how transactions are managed.

use super::models::{ArtistRow, SongIdentity, SongRow, SongplayRow, TimeRow, UserRow};
use rusqlite::ErrorCode;
use thiserror::Error;

/// Errors raised by the relational store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Constraint violation on {table}: {source}")]
    Constraint {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Store error on {table}: {source}")]
    Sqlite {
        table: &'static str,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Transaction error: {0}")]
    Transaction(#[source] rusqlite::Error),
}

impl StoreError {
    pub fn from_sqlite(table: &'static str, source: rusqlite::Error) -> Self {
        if source.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
            StoreError::Constraint { table, source }
        } else {
            StoreError::Sqlite { table, source }
        }
    }

    pub fn is_constraint_violation(&self) -> bool {
        matches!(self, StoreError::Constraint { .. })
    }
}

/// Loader and identity resolver over the warehouse tables.
///
/// Every write takes a batch of rows and returns how many rows the store
/// actually changed, so rows dropped by a conflict policy are not counted.
/// Implementations decide how a batch is executed.
pub trait WarehouseStore {
    /// Inserts songs, keeping the existing row on `song_id` conflicts.
    fn upsert_songs(&self, songs: &[SongRow]) -> Result<usize, StoreError>;

    /// Inserts artists, keeping the existing row on `artist_id` conflicts.
    fn upsert_artists(&self, artists: &[ArtistRow]) -> Result<usize, StoreError>;

    /// Inserts users in order; on `user_id` conflicts the stored level is
    /// overwritten, so the last row for a user wins.
    fn upsert_users(&self, users: &[UserRow]) -> Result<usize, StoreError>;

    /// Inserts time rows, keeping the existing row on `start_time` conflicts.
    fn upsert_times(&self, times: &[TimeRow]) -> Result<usize, StoreError>;

    /// Appends play events. Their time and user rows must already be loaded.
    fn insert_songplays(&self, songplays: &[SongplayRow]) -> Result<usize, StoreError>;

    /// Looks up the song/artist pair matching title, artist name and
    /// duration exactly. Returns the first match by `song_id`, if any.
    fn find_song_identity(
        &self,
        title: &str,
        artist_name: &str,
        duration: f64,
    ) -> Result<Option<SongIdentity>, StoreError>;
}
