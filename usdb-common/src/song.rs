//! Song metadata shown by USDB in its result list
//!
//! `UsdbSong` is the immutable record the filter tree and the song table
//! consume. It round-trips through JSON for the local song list cache.

use crate::{Error, Result, SongId};
use serde::{Deserialize, Serialize};

/// Marker USDB uses for each filled rating star in the result list markup
const RATING_STAR_MARKER: &str = "star.png";

/// Meta data about a song that USDB shows in the result list
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UsdbSong {
    pub song_id: SongId,
    pub artist: String,
    pub title: String,
    pub language: String,
    pub edition: String,
    pub golden_notes: bool,
    /// Number of stars, 0 meaning unrated
    pub rating: u8,
    pub views: u32,
}

/// Raw cell contents of one result list row, as scraped
#[derive(Debug, Clone, Default)]
pub struct UsdbSongHtml<'a> {
    pub song_id: &'a str,
    pub artist: &'a str,
    pub title: &'a str,
    pub language: &'a str,
    pub edition: &'a str,
    /// "Yes" or "No"
    pub golden_notes: &'a str,
    /// Markup of the rating cell, one star image per rating point
    pub rating: &'a str,
    pub views: &'a str,
}

impl UsdbSong {
    /// Build a song from the strings of a scraped result list row
    pub fn from_html(html: UsdbSongHtml<'_>) -> Result<Self> {
        let rating = html.rating.matches(RATING_STAR_MARKER).count();
        let rating = u8::try_from(rating)
            .ok()
            .filter(|r| *r <= 5)
            .ok_or_else(|| Error::InvalidInput(format!("rating out of range: {}", rating)))?;
        let views = html
            .views
            .trim()
            .parse()
            .map_err(|_| Error::InvalidInput(format!("views is not a number: {:?}", html.views)))?;

        Ok(Self {
            song_id: SongId::parse(html.song_id)?,
            artist: html.artist.to_string(),
            title: html.title.to_string(),
            language: html.language.to_string(),
            edition: html.edition.to_string(),
            golden_notes: html.golden_notes == "Yes",
            rating,
            views,
        })
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Encode a list of songs as a JSON array
pub fn songs_to_json(songs: &[UsdbSong]) -> Result<String> {
    Ok(serde_json::to_string(songs)?)
}

/// Decode a JSON array of songs
pub fn songs_from_json(json: &str) -> Result<Vec<UsdbSong>> {
    Ok(serde_json::from_str(json)?)
}
