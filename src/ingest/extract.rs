//! Dimension projections of decoded records.

use super::records::{LogRecord, PlayEvent, SongRecord};
use crate::warehouse_store::{ArtistRow, SongRow, TimeRow, UserRow};

/// Song and artist rows of one song catalog file, one of each per record.
#[derive(Debug, Default, PartialEq)]
pub struct CatalogDimensions {
    pub songs: Vec<SongRow>,
    pub artists: Vec<ArtistRow>,
}

/// User and time rows of one event log file, one of each per play.
#[derive(Debug, Default, PartialEq)]
pub struct EventDimensions {
    pub users: Vec<UserRow>,
    pub times: Vec<TimeRow>,
}

impl From<&SongRecord> for SongRow {
    fn from(record: &SongRecord) -> Self {
        SongRow {
            song_id: record.song_id.clone(),
            title: record.title.clone(),
            artist_id: record.artist_id.clone(),
            year: record.year,
            duration: record.duration,
        }
    }
}

impl From<&SongRecord> for ArtistRow {
    fn from(record: &SongRecord) -> Self {
        ArtistRow {
            artist_id: record.artist_id.clone(),
            name: record.artist_name.clone(),
            location: record.artist_location.clone(),
            longitude: record.artist_longitude,
            latitude: record.artist_latitude,
        }
    }
}

impl From<&PlayEvent> for UserRow {
    fn from(play: &PlayEvent) -> Self {
        UserRow {
            user_id: play.user_id,
            first_name: play.first_name.clone(),
            last_name: play.last_name.clone(),
            gender: play.gender.clone(),
            level: play.level.clone(),
        }
    }
}

pub fn extract_catalog_dimensions(records: &[SongRecord]) -> CatalogDimensions {
    CatalogDimensions {
        songs: records.iter().map(SongRow::from).collect(),
        artists: records.iter().map(ArtistRow::from).collect(),
    }
}

/// Keeps the `NextSong` records, in file order. Everything else is dropped
/// before any row is derived from it.
pub fn filter_plays(records: Vec<LogRecord>) -> Vec<PlayEvent> {
    records.into_iter().filter_map(LogRecord::into_play).collect()
}

/// Users keep file order so the last play of a user carries the level
/// that ends up stored.
pub fn extract_event_dimensions(plays: &[PlayEvent]) -> EventDimensions {
    EventDimensions {
        users: plays.iter().map(UserRow::from).collect(),
        times: plays
            .iter()
            .map(|play| TimeRow::from_start_time(play.start_time))
            .collect(),
    }
}
