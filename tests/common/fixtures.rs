//! Fixture dataset writers
//!
//! Song and log files are written as newline-delimited JSON in the same
//! directory shapes as the real datasets.

use super::constants::*;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

pub fn song_record(
    song_id: &str,
    title: &str,
    artist_id: &str,
    artist_name: &str,
    duration: f64,
) -> Value {
    json!({
        "num_songs": 1,
        "artist_id": artist_id,
        "artist_latitude": null,
        "artist_longitude": null,
        "artist_location": "",
        "artist_name": artist_name,
        "song_id": song_id,
        "title": title,
        "duration": duration,
        "year": 0
    })
}

pub fn play_record(
    user_id: i64,
    level: &str,
    song: &str,
    artist: &str,
    length: f64,
    ts: i64,
) -> Value {
    json!({
        "artist": artist,
        "auth": "Logged In",
        "firstName": format!("First{}", user_id),
        "gender": "F",
        "itemInSession": 0,
        "lastName": format!("Last{}", user_id),
        "length": length,
        "level": level,
        "location": "San Francisco-Oakland-Hayward, CA",
        "method": "PUT",
        "page": "NextSong",
        "registration": 1540919166796.0,
        "sessionId": 100 + user_id,
        "song": song,
        "status": 200,
        "ts": ts,
        "userAgent": "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_9_4)",
        "userId": user_id.to_string()
    })
}

/// A non-play record, with the empty fields logged-out traffic carries.
pub fn page_record(page: &str, user_id: Option<i64>, ts: i64) -> Value {
    json!({
        "artist": null,
        "auth": if user_id.is_some() { "Logged In" } else { "Logged Out" },
        "firstName": null,
        "gender": null,
        "itemInSession": 0,
        "lastName": null,
        "length": null,
        "level": "free",
        "location": null,
        "method": "GET",
        "page": page,
        "registration": null,
        "sessionId": 500,
        "song": null,
        "status": 200,
        "ts": ts,
        "userAgent": null,
        "userId": user_id.map(|id| id.to_string()).unwrap_or_default()
    })
}

/// Writes `records` as one JSON object per line, creating parent
/// directories as needed.
pub fn write_json_lines(path: &Path, records: &[Value]) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    let lines: Vec<String> = records.iter().map(|r| r.to_string()).collect();
    fs::write(path, lines.join("\n") + "\n").unwrap();
}

pub fn create_test_song_data(root: &Path) {
    write_json_lines(
        &root.join("A/A/A/TRAAAAK128F9318786.json"),
        &[song_record(
            SONG_1_ID,
            SONG_1_TITLE,
            ARTIST_1_ID,
            ARTIST_1_NAME,
            SONG_1_DURATION,
        )],
    );
    write_json_lines(
        &root.join("A/A/B/TRAABJL12903CDCF1A.json"),
        &[song_record(
            SONG_2_ID,
            SONG_2_TITLE,
            ARTIST_2_ID,
            ARTIST_2_NAME,
            SONG_2_DURATION,
        )],
    );
    write_json_lines(
        &root.join("A/B/C/TRABCEI128F424C983.json"),
        &[song_record(
            SONG_3_ID,
            SONG_3_TITLE,
            ARTIST_3_ID,
            ARTIST_3_NAME,
            SONG_3_DURATION,
        )],
    );
}

pub fn create_test_log_data(root: &Path) {
    write_json_lines(
        &root.join("2018/11/2018-11-14-events.json"),
        &[
            page_record("Home", Some(BROWSING_USER_ID), HOME_TS),
            play_record(
                UPGRADING_USER_ID,
                "free",
                SONG_1_TITLE,
                ARTIST_1_NAME,
                SONG_1_DURATION,
                PLAY_1_TS,
            ),
            play_record(
                FREE_USER_ID,
                "free",
                "Not In The Catalog",
                "Nobody",
                201.0,
                PLAY_2_TS,
            ),
        ],
    );
    write_json_lines(
        &root.join("2018/11/2018-11-15-events.json"),
        &[
            play_record(
                UPGRADING_USER_ID,
                "paid",
                SONG_2_TITLE,
                ARTIST_2_NAME,
                SONG_2_DURATION,
                PLAY_3_TS,
            ),
            page_record("Logout", Some(UPGRADING_USER_ID), LOGOUT_TS),
            play_record(
                FREE_USER_ID,
                "free",
                SONG_3_TITLE,
                ARTIST_3_NAME,
                SONG_3_DURATION,
                PLAY_4_TS,
            ),
            play_record(
                FREE_USER_ID,
                "free",
                SONG_1_TITLE,
                ARTIST_1_NAME,
                269.0,
                PLAY_5_TS,
            ),
        ],
    );
}
