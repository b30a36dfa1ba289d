//! Raw record decoding for newline-delimited JSON files.
//!
//! Song catalog files hold one `SongRecord` per line, event log files one
//! `LogRecord` per line. Records are typed at decode time: a line missing a
//! required field, or carrying a mistyped one, fails the whole file.

use chrono::{DateTime, Utc};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur while decoding a records file.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("Cannot read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid record at {path:?} line {line}: {source}")]
    Json {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// One song of the catalog, as found in song data files.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SongRecord {
    pub song_id: String,
    pub title: String,
    pub artist_id: String,
    #[serde(default)]
    pub year: Option<i32>,
    pub duration: f64,
    pub artist_name: String,
    #[serde(default)]
    pub artist_location: Option<String>,
    #[serde(default)]
    pub artist_longitude: Option<f64>,
    #[serde(default)]
    pub artist_latitude: Option<f64>,
}

/// One line of an event log, tagged by the page the user was on.
///
/// Only `NextSong` lines are plays; every other page is kept as an opaque
/// record since its fields are routinely empty for logged-out traffic.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(tag = "page")]
pub enum LogRecord {
    NextSong(PlayEvent),
    #[serde(other)]
    Other,
}

impl LogRecord {
    pub fn into_play(self) -> Option<PlayEvent> {
        match self {
            LogRecord::NextSong(play) => Some(play),
            LogRecord::Other => None,
        }
    }
}

/// A `NextSong` event: a user started playing a track.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlayEvent {
    #[serde(rename = "ts", deserialize_with = "deserialize_epoch_millis")]
    pub start_time: DateTime<Utc>,
    #[serde(deserialize_with = "deserialize_user_id")]
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub gender: String,
    pub level: String,
    /// Track title.
    pub song: String,
    /// Artist name.
    pub artist: String,
    /// Track duration in seconds.
    pub length: f64,
    pub session_id: i64,
    pub location: String,
    pub user_agent: String,
}

fn deserialize_epoch_millis<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let millis = i64::deserialize(deserializer)?;
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| de::Error::custom(format!("timestamp {} out of range", millis)))
}

/// Logs carry `userId` as a string ("26"), accept integers as well.
fn deserialize_user_id<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawUserId {
        Number(i64),
        Text(String),
    }

    match RawUserId::deserialize(deserializer)? {
        RawUserId::Number(id) => Ok(id),
        RawUserId::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid userId {:?}", text))),
    }
}

/// Decodes every non-blank line of `path` into a `T`, in file order.
pub fn read_json_lines<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, DecodeError> {
    let io_error = |source: std::io::Error| DecodeError::Io {
        path: path.to_path_buf(),
        source,
    };

    let reader = BufReader::new(File::open(path).map_err(io_error)?);
    let mut records = Vec::new();
    for (index, line) in reader.lines().enumerate() {
        let line = line.map_err(io_error)?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| DecodeError::Json {
            path: path.to_path_buf(),
            line: index + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

pub fn read_song_file(path: &Path) -> Result<Vec<SongRecord>, DecodeError> {
    read_json_lines(path)
}

pub fn read_log_file(path: &Path) -> Result<Vec<LogRecord>, DecodeError> {
    read_json_lines(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const SONG_LINE: &str = r#"{"num_songs": 1, "artist_id": "ARD7TVE1187B99BFB1", "artist_latitude": null, "artist_longitude": null, "artist_location": "California - LA", "artist_name": "Casual", "song_id": "SOMZWCG12A8C13C480", "title": "I Didn't Mean To", "duration": 218.93179, "year": 0}"#;

    const NEXT_SONG_LINE: &str = r#"{"artist":"Des'ree","auth":"Logged In","firstName":"Kaylee","gender":"F","itemInSession":1,"lastName":"Summers","length":246.30812,"level":"free","location":"Phoenix-Mesa-Scottsdale, AZ","method":"PUT","page":"NextSong","registration":1540344794796.0,"sessionId":139,"song":"You Gotta Be","status":200,"ts":1541106106796,"userAgent":"Mozilla\/5.0 (Windows NT 6.1; WOW64)","userId":"8"}"#;

    const HOME_LINE: &str = r#"{"artist":null,"auth":"Logged Out","firstName":null,"gender":null,"itemInSession":0,"lastName":null,"length":null,"level":"free","location":null,"method":"GET","page":"Home","registration":null,"sessionId":52,"song":null,"status":200,"ts":1541207073796,"userAgent":null,"userId":""}"#;

    fn write_file(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn decodes_song_record() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "song.json", SONG_LINE);

        let records = read_song_file(&path).unwrap();
        assert_eq!(
            records,
            vec![SongRecord {
                song_id: "SOMZWCG12A8C13C480".to_string(),
                title: "I Didn't Mean To".to_string(),
                artist_id: "ARD7TVE1187B99BFB1".to_string(),
                year: Some(0),
                duration: 218.93179,
                artist_name: "Casual".to_string(),
                artist_location: Some("California - LA".to_string()),
                artist_longitude: None,
                artist_latitude: None,
            }]
        );
    }

    #[test]
    fn decodes_log_records_in_file_order() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "events.json",
            &format!("{HOME_LINE}\n{NEXT_SONG_LINE}\n\n"),
        );

        let records = read_log_file(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0], LogRecord::Other);

        let play = records[1].clone().into_play().unwrap();
        assert_eq!(play.user_id, 8);
        assert_eq!(play.start_time.timestamp_millis(), 1541106106796);
        assert_eq!(play.song, "You Gotta Be");
        assert_eq!(play.artist, "Des'ree");
        assert_eq!(play.length, 246.30812);
        assert_eq!(play.session_id, 139);
        assert_eq!(play.user_agent, "Mozilla/5.0 (Windows NT 6.1; WOW64)");
    }

    #[test]
    fn accepts_numeric_user_id() {
        let line = NEXT_SONG_LINE.replace(r#""userId":"8""#, r#""userId":8"#);
        let record: LogRecord = serde_json::from_str(&line).unwrap();
        assert_eq!(record.into_play().unwrap().user_id, 8);
    }

    #[test]
    fn rejects_empty_user_id_on_play() {
        let line = NEXT_SONG_LINE.replace(r#""userId":"8""#, r#""userId":"""#);
        assert!(serde_json::from_str::<LogRecord>(&line).is_err());
    }

    #[test]
    fn rejects_play_missing_required_field() {
        let line = NEXT_SONG_LINE.replace(r#""length":246.30812,"#, "");
        assert!(serde_json::from_str::<LogRecord>(&line).is_err());
    }

    #[test]
    fn invalid_line_reports_path_and_line() {
        let dir = TempDir::new().unwrap();
        let path = write_file(&dir, "broken.json", &format!("{SONG_LINE}\n{{not json\n"));

        match read_song_file(&path) {
            Err(DecodeError::Json { path: p, line, .. }) => {
                assert_eq!(p, path);
                assert_eq!(line, 2);
            }
            other => panic!("expected a JSON decode error, got {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let result = read_log_file(&dir.path().join("missing.json"));
        assert!(matches!(result, Err(DecodeError::Io { .. })));
    }
}
