//! Shared constants for end-to-end tests
//!
//! This module contains all constants used across the test suite.
//! When the fixture dataset changes, update only this file.

// ============================================================================
// Catalog
// ============================================================================

pub const SONG_1_ID: &str = "SOZCTXZ12AB0182364";
pub const SONG_1_TITLE: &str = "Setanta matins";
pub const SONG_1_DURATION: f64 = 269.58322;
pub const ARTIST_1_ID: &str = "AR5KOSW1187FB35FF4";
pub const ARTIST_1_NAME: &str = "Elena";

pub const SONG_2_ID: &str = "SOMZWCG12A8C13C480";
pub const SONG_2_TITLE: &str = "I Didn't Mean To";
pub const SONG_2_DURATION: f64 = 218.93179;
pub const ARTIST_2_ID: &str = "ARD7TVE1187B99BFB1";
pub const ARTIST_2_NAME: &str = "Casual";

pub const SONG_3_ID: &str = "SOUPIRU12A6D4FA1E1";
pub const SONG_3_TITLE: &str = "Der Kleine Dompfaff";
pub const SONG_3_DURATION: f64 = 152.92036;
pub const ARTIST_3_ID: &str = "ARJIE2Y1187B994AB7";
pub const ARTIST_3_NAME: &str = "Line Renaud";

/// Number of song files in the fixture catalog, one song each.
pub const SONG_FILE_COUNT: usize = 3;

// ============================================================================
// Users
// ============================================================================

/// Plays on the free tier first, then on the paid one.
pub const UPGRADING_USER_ID: i64 = 17;

/// Plays on the free tier only.
pub const FREE_USER_ID: i64 = 26;

/// Only ever shows up on non-play pages.
pub const BROWSING_USER_ID: i64 = 99;

// ============================================================================
// Event logs
// ============================================================================

/// Number of event log files in the fixture logs.
pub const LOG_FILE_COUNT: usize = 2;

pub const PLAY_1_TS: i64 = 1542153802796;
pub const PLAY_2_TS: i64 = 1542154000796;
pub const PLAY_3_TS: i64 = 1542242500000;
pub const PLAY_4_TS: i64 = 1542242700000;
pub const PLAY_5_TS: i64 = 1542242900000;
pub const HOME_TS: i64 = 1542153700796;
pub const LOGOUT_TS: i64 = 1542242600000;

/// `NextSong` records across all fixture log files.
pub const PLAY_COUNT: usize = 5;

/// Plays with no exact catalog match: an unknown song and a
/// duration mismatch.
pub const UNRESOLVED_PLAY_COUNT: usize = 2;
