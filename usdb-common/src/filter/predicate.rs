//! Selectable filter values and their song matching
//!
//! Each `SongMatch` is one variant row of the filter tree: a concrete value
//! of one facet plus the test whether a song carries that value.

use super::FilterKind;
use crate::UsdbSong;
use std::fmt;

/// Star glyph used to render rating levels
pub const STAR: char = '★';

/// Rating level from 0 (unrated) to 5 stars
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RatingLevel(u8);

impl RatingLevel {
    pub const NONE: RatingLevel = RatingLevel(0);

    /// All levels in display order
    pub const ALL: [RatingLevel; 6] = [
        RatingLevel(0),
        RatingLevel(1),
        RatingLevel(2),
        RatingLevel(3),
        RatingLevel(4),
        RatingLevel(5),
    ];

    pub fn new(stars: u8) -> Option<Self> {
        (stars <= 5).then_some(Self(stars))
    }

    pub fn stars(self) -> u8 {
        self.0
    }
}

impl fmt::Display for RatingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 == 0 {
            return write!(f, "None");
        }
        for _ in 0..self.0 {
            write!(f, "{}", STAR)?;
        }
        Ok(())
    }
}

/// Half-open views range `[lo, hi)`; `hi == None` is unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ViewsBucket {
    pub lo: u32,
    pub hi: Option<u32>,
}

impl ViewsBucket {
    /// The fixed buckets offered by the views filter, in display order
    pub const ALL: [ViewsBucket; 6] = [
        ViewsBucket { lo: 0, hi: Some(100) },
        ViewsBucket { lo: 100, hi: Some(200) },
        ViewsBucket { lo: 200, hi: Some(300) },
        ViewsBucket { lo: 300, hi: Some(400) },
        ViewsBucket { lo: 400, hi: Some(500) },
        ViewsBucket { lo: 500, hi: None },
    ];

    pub fn contains(&self, views: u32) -> bool {
        self.lo <= views && self.hi.map_or(true, |hi| views < hi)
    }
}

impl fmt::Display for ViewsBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.hi {
            Some(hi) => write!(f, "{} to {}", self.lo, hi.saturating_sub(1)),
            None => write!(f, "{}+", self.lo),
        }
    }
}

/// A value that can be matched against a song
///
/// String facets compare exactly (case-sensitive, no normalization).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SongMatch {
    Artist(String),
    Title(String),
    Edition(String),
    Language(String),
    GoldenNotes(bool),
    Rating(RatingLevel),
    Views(ViewsBucket),
}

impl SongMatch {
    pub fn matches(&self, song: &UsdbSong) -> bool {
        match self {
            SongMatch::Artist(artist) => *artist == song.artist,
            SongMatch::Title(title) => *title == song.title,
            SongMatch::Edition(edition) => *edition == song.edition,
            SongMatch::Language(language) => *language == song.language,
            SongMatch::GoldenNotes(golden_notes) => *golden_notes == song.golden_notes,
            SongMatch::Rating(level) => level.stars() == song.rating,
            SongMatch::Views(bucket) => bucket.contains(song.views),
        }
    }

    /// The filter this value belongs to
    pub fn kind(&self) -> FilterKind {
        match self {
            SongMatch::Artist(_) => FilterKind::Artist,
            SongMatch::Title(_) => FilterKind::Title,
            SongMatch::Edition(_) => FilterKind::Edition,
            SongMatch::Language(_) => FilterKind::Language,
            SongMatch::GoldenNotes(_) => FilterKind::GoldenNotes,
            SongMatch::Rating(_) => FilterKind::Rating,
            SongMatch::Views(_) => FilterKind::Views,
        }
    }

    pub fn label(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SongMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SongMatch::Artist(value)
            | SongMatch::Title(value)
            | SongMatch::Edition(value)
            | SongMatch::Language(value) => write!(f, "{}", value),
            SongMatch::GoldenNotes(true) => write!(f, "Yes"),
            SongMatch::GoldenNotes(false) => write!(f, "No"),
            SongMatch::Rating(level) => write!(f, "{}", level),
            SongMatch::Views(bucket) => write!(f, "{}", bucket),
        }
    }
}
