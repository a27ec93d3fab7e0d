//! Headers of local UltraStar song files
//!
//! Only the `#KEY:VALUE` block at the top of a `.txt` file is read; the notes
//! that follow it are not parsed.

use std::collections::BTreeMap;
use std::path::Path;

/// Header block of a song file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongTxtHeaders {
    pub artist: String,
    pub title: String,
    /// Every other non-empty header, keyed by its lowercase name
    pub other: BTreeMap<String, String>,
}

impl SongTxtHeaders {
    /// Parse the leading header lines; `None` without both artist and title
    pub fn parse(contents: &str) -> Option<Self> {
        let mut artist = None;
        let mut title = None;
        let mut other = BTreeMap::new();

        for line in contents.lines() {
            let Some(header) = line.strip_prefix('#') else {
                break;
            };
            let Some((name, value)) = header.split_once(':') else {
                tracing::debug!(header, "Header without value");
                continue;
            };
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match name.trim().to_lowercase().as_str() {
                "artist" => artist = Some(value.to_string()),
                "title" => title = Some(value.to_string()),
                name => {
                    other.insert(name.to_string(), value.to_string());
                }
            }
        }

        Some(Self {
            artist: artist?,
            title: title?,
            other,
        })
    }

    /// Read and parse a file, tolerating a BOM and non-UTF-8 legacy files
    pub fn read(path: &Path) -> Option<Self> {
        let bytes = match std::fs::read(path) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to read song file");
                return None;
            }
        };
        Self::parse(&decode(&bytes))
    }

    /// `Artist - Title`, as used in log messages
    pub fn artist_title(&self) -> String {
        format!("{} - {}", self.artist, self.title)
    }
}

/// UTF-8 (with or without BOM), falling back to Latin-1 byte by byte
fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => bytes.iter().map(|b| char::from(*b)).collect(),
    }
}
