//! Local cache of the USDB song list

use crate::{song, Result, SongId, UsdbSong};
use std::path::Path;

/// Load the cached song list
///
/// A missing or unreadable cache is not an error: the caller refetches.
pub fn load_cached_songs(path: &Path) -> Option<Vec<UsdbSong>> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            tracing::debug!(path = %path.display(), error = %e, "No cached song list");
            return None;
        }
    };
    match song::songs_from_json(&content) {
        Ok(songs) => {
            tracing::debug!(path = %path.display(), songs = songs.len(), "Loaded cached song list");
            Some(songs)
        }
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Ignoring malformed song list cache");
            None
        }
    }
}

/// Write the song list cache, creating parent directories
pub fn dump_available_songs(songs: &[UsdbSong], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, song::songs_to_json(songs)?)?;
    tracing::info!(path = %path.display(), songs = songs.len(), "Saved song list");
    Ok(())
}

/// Highest id in the list, `SongId::default()` (0) if empty
pub fn max_song_id(songs: &[UsdbSong]) -> SongId {
    songs.iter().map(|s| s.song_id).max().unwrap_or_default()
}

/// Append fetched songs that are newer than everything cached
pub fn merge_new_songs(mut cached: Vec<UsdbSong>, fetched: Vec<UsdbSong>) -> Vec<UsdbSong> {
    let max_id = max_song_id(&cached);
    let before = cached.len();
    cached.extend(fetched.into_iter().filter(|s| s.song_id > max_id));
    tracing::debug!(new = cached.len() - before, "Merged fetched songs");
    cached
}
