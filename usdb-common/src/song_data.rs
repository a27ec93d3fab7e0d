//! Per-row state of the song table
//!
//! Wraps a `UsdbSong` with its download status and a pre-computed fuzzy
//! search string.

use crate::{SongId, UsdbSong};

/// Download state of a song in the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DownloadStatus {
    /// Not part of the batch
    #[default]
    None,
    /// Queued in the batch, not yet requested
    Staged,
    /// Download requested, waiting for a worker
    Pending,
    Downloading,
    Downloaded,
    Failed,
}

impl DownloadStatus {
    pub fn can_be_downloaded(self) -> bool {
        matches!(
            self,
            DownloadStatus::None
                | DownloadStatus::Staged
                | DownloadStatus::Downloaded
                | DownloadStatus::Failed
        )
    }

    pub fn can_be_unstaged(self) -> bool {
        matches!(
            self,
            DownloadStatus::Staged | DownloadStatus::Downloaded | DownloadStatus::Failed
        )
    }
}

impl std::fmt::Display for DownloadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DownloadStatus::None => write!(f, ""),
            DownloadStatus::Staged => write!(f, "Staged"),
            DownloadStatus::Pending => write!(f, "Pending"),
            DownloadStatus::Downloading => write!(f, "Downloading"),
            DownloadStatus::Downloaded => write!(f, "Downloaded"),
            DownloadStatus::Failed => write!(f, "Failed"),
        }
    }
}

/// Why a download did not produce a song
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadErrorReason {
    /// USDB no longer knows the song
    NotFound,
    Failed,
}

/// Outcome reported by the download collaborator for one song
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadResult {
    pub song_id: SongId,
    pub outcome: std::result::Result<UsdbSong, DownloadErrorReason>,
}

impl DownloadResult {
    pub fn success(song: UsdbSong) -> Self {
        Self {
            song_id: song.song_id,
            outcome: Ok(song),
        }
    }

    pub fn failure(song_id: SongId, reason: DownloadErrorReason) -> Self {
        Self {
            song_id,
            outcome: Err(reason),
        }
    }
}

/// A row of the song table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongData {
    pub data: UsdbSong,
    pub status: DownloadStatus,
    pub fuzzy_text: String,
}

impl SongData {
    pub fn from_usdb_song(song: UsdbSong) -> Self {
        let fuzzy_text = fuzz_text(&format!(
            "{} {} {} {}",
            song.artist, song.title, song.language, song.edition
        ));
        Self {
            data: song,
            status: DownloadStatus::None,
            fuzzy_text,
        }
    }

    /// Replace the song data, keeping the status
    pub fn with_data(&self, song: UsdbSong) -> Self {
        Self {
            status: self.status,
            ..Self::from_usdb_song(song)
        }
    }

    /// True if every word of the (already fuzzed) query occurs in this row
    pub fn matches_words(&self, words: &[String]) -> bool {
        words.iter().all(|word| self.fuzzy_text.contains(word.as_str()))
    }
}

/// Normalize text for fuzzy matching
///
/// Lowercases, turns every non-alphanumeric character into a space and
/// collapses whitespace runs.
pub fn fuzz_text(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .flat_map(char::to_lowercase)
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
