//! Bounded song identifiers as handed out by USDB

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Exclusive upper bound of valid song ids
pub const MAX_SONG_ID: u32 = 100_000;

/// Id of a song on USDB
///
/// Always within `0..100_000`. `Display` yields the canonical zero-padded
/// five-digit form used in file names and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct SongId(u32);

impl SongId {
    /// Create a song id, failing if the value is out of range
    pub fn new(value: i64) -> Result<Self> {
        if (0..MAX_SONG_ID as i64).contains(&value) {
            Ok(Self(value as u32))
        } else {
            Err(Error::SongIdOutOfRange(value))
        }
    }

    /// Parse a song id from its decimal form (leading zeros allowed)
    pub fn parse(value: &str) -> Result<Self> {
        let parsed: i64 = value
            .trim()
            .parse()
            .map_err(|_| Error::InvalidInput(format!("not a song id: {:?}", value)))?;
        Self::new(parsed)
    }

    pub fn try_parse(value: &str) -> Option<Self> {
        Self::parse(value).ok()
    }

    pub fn value(self) -> u32 {
        self.0
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:05}", self.0)
    }
}

impl TryFrom<i64> for SongId {
    type Error = Error;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SongId> for u32 {
    fn from(id: SongId) -> u32 {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_is_zero_padded() {
        assert_eq!(SongId::new(123).unwrap().to_string(), "00123");
        assert_eq!(SongId::new(0).unwrap().to_string(), "00000");
        assert_eq!(SongId::new(99_999).unwrap().to_string(), "99999");
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(matches!(SongId::new(100_000), Err(Error::SongIdOutOfRange(100_000))));
        assert!(matches!(SongId::new(-1), Err(Error::SongIdOutOfRange(-1))));
    }

    #[test]
    fn test_parse_accepts_padded_form() {
        assert_eq!(SongId::parse("00042").unwrap(), SongId::new(42).unwrap());
        assert_eq!(SongId::parse(" 7 ").unwrap().value(), 7);
    }

    #[test]
    fn test_try_parse_rejects_garbage() {
        assert!(SongId::try_parse("abc").is_none());
        assert!(SongId::try_parse("123456").is_none());
        assert!(SongId::try_parse("").is_none());
    }

    #[test]
    fn test_serializes_as_plain_integer() {
        let id = SongId::new(26152).unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "26152");
        let back: SongId = serde_json::from_str("26152").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn test_deserialize_validates_range() {
        assert!(serde_json::from_str::<SongId>("100000").is_err());
        assert!(serde_json::from_str::<SongId>("-5").is_err());
    }
}
