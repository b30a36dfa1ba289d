//! Row models for the songplay warehouse.
//!
//! Each struct maps one-to-one onto a table of the star schema: four
//! dimension tables (songs, artists, users, time) and the songplays fact
//! table.

use chrono::{DateTime, Datelike, NaiveDateTime, Timelike, Utc, Weekday};

/// Text representation of `start_time` columns. UTC, millisecond precision,
/// lexicographic order matches chronological order.
pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

pub fn format_start_time(start_time: &DateTime<Utc>) -> String {
    start_time.format(START_TIME_FORMAT).to_string()
}

pub fn parse_start_time(s: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(s, START_TIME_FORMAT).map(|naive| naive.and_utc())
}

/// What the store does when a row's key is already present.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// First write wins, the incoming row is dropped.
    KeepExisting,
    /// The listed columns are overwritten with the incoming values.
    OverwriteColumns(&'static [&'static str]),
}

impl ConflictPolicy {
    pub fn on_conflict_clause(&self, key: &str) -> String {
        match self {
            ConflictPolicy::KeepExisting => format!("ON CONFLICT({}) DO NOTHING", key),
            ConflictPolicy::OverwriteColumns(columns) => format!(
                "ON CONFLICT({}) DO UPDATE SET {}",
                key,
                columns
                    .iter()
                    .map(|c| format!("{c} = excluded.{c}"))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SongRow {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    pub year: Option<i32>,
    pub duration: f64,
}

impl SongRow {
    pub const CONFLICT_POLICY: ConflictPolicy = ConflictPolicy::KeepExisting;
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArtistRow {
    pub artist_id: String,
    pub name: String,
    pub location: Option<String>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
}

impl ArtistRow {
    pub const CONFLICT_POLICY: ConflictPolicy = ConflictPolicy::KeepExisting;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserRow {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub level: String,
}

impl UserRow {
    /// A user's subscription level changes over time, the latest event wins.
    pub const CONFLICT_POLICY: ConflictPolicy = ConflictPolicy::OverwriteColumns(&["level"]);
}

/// Calendar breakdown of a play's start time (Gregorian, UTC).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeRow {
    pub start_time: DateTime<Utc>,
    pub hour: u32,
    pub day: u32,
    /// ISO-8601 week number.
    pub week: u32,
    pub month: u32,
    pub year: i32,
    pub weekday: Weekday,
}

impl TimeRow {
    pub const CONFLICT_POLICY: ConflictPolicy = ConflictPolicy::KeepExisting;

    pub fn from_start_time(start_time: DateTime<Utc>) -> Self {
        TimeRow {
            start_time,
            hour: start_time.hour(),
            day: start_time.day(),
            week: start_time.iso_week().week(),
            month: start_time.month(),
            year: start_time.year(),
            weekday: start_time.weekday(),
        }
    }

    /// Decomposes a millisecond Unix timestamp, `None` if it is out of
    /// chrono's representable range.
    pub fn from_epoch_millis(millis: i64) -> Option<Self> {
        DateTime::from_timestamp_millis(millis).map(Self::from_start_time)
    }

    pub fn weekday_name(&self) -> &'static str {
        weekday_name(self.weekday)
    }
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

/// The (song_id, artist_id) pair a play event resolves to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SongIdentity {
    pub song_id: String,
    pub artist_id: String,
}

/// One play event. `song_id`/`artist_id` are `None` when the played track
/// has no exact match in the song catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SongplayRow {
    pub start_time: DateTime<Utc>,
    pub user_id: i64,
    pub level: String,
    pub song_id: Option<String>,
    pub artist_id: Option<String>,
    pub session_id: i64,
    pub location: String,
    pub user_agent: String,
}

impl SongplayRow {
    pub fn is_resolved(&self) -> bool {
        self.song_id.is_some() && self.artist_id.is_some()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TableCounts {
    pub users: usize,
    pub songs: usize,
    pub artists: usize,
    pub time: usize,
    pub songplays: usize,
}
