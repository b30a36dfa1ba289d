//! Fact composition: play events joined with their resolved song identity.

use super::records::PlayEvent;
use crate::warehouse_store::{SongIdentity, SongplayRow, StoreError, WarehouseStore};
use tracing::debug;

pub fn compose_songplay(play: &PlayEvent, identity: Option<SongIdentity>) -> SongplayRow {
    let (song_id, artist_id) = match identity {
        Some(SongIdentity { song_id, artist_id }) => (Some(song_id), Some(artist_id)),
        None => (None, None),
    };
    SongplayRow {
        start_time: play.start_time,
        user_id: play.user_id,
        level: play.level.clone(),
        song_id,
        artist_id,
        session_id: play.session_id,
        location: play.location.clone(),
        user_agent: play.user_agent.clone(),
    }
}

/// Resolves every play against the loaded catalog and composes its fact row.
///
/// A play with no matching song keeps null identity columns, it is never
/// dropped.
pub fn compose_songplays(
    store: &dyn WarehouseStore,
    plays: &[PlayEvent],
) -> Result<Vec<SongplayRow>, StoreError> {
    plays
        .iter()
        .map(|play| -> Result<SongplayRow, StoreError> {
            let identity = store.find_song_identity(&play.song, &play.artist, play.length)?;
            if identity.is_none() {
                debug!(
                    "No catalog match for {:?} by {:?} ({}s)",
                    play.song, play.artist, play.length
                );
            }
            Ok(compose_songplay(play, identity))
        })
        .collect()
}
