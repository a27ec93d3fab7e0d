//! Dynamic variant lists for the collection-derived filters

use super::FilterKind;
use crate::{Error, Result, UsdbSong};
use std::collections::{BTreeMap, BTreeSet};

/// Ordered variant values per dynamic filter kind
///
/// Kinds without an entry get no variants. The lists are handed to
/// `FilterTree::build` as-is, so they must not contain duplicates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicVariants {
    values: BTreeMap<FilterKind, Vec<String>>,
}

impl DynamicVariants {
    pub fn new() -> Self {
        Self::default()
    }

    /// Distinct values of every dynamic facet in `songs`, sorted
    pub fn from_songs<'a>(songs: impl IntoIterator<Item = &'a UsdbSong>) -> Self {
        let mut distinct: BTreeMap<FilterKind, BTreeSet<&'a str>> = BTreeMap::new();
        for song in songs {
            for kind in FilterKind::ALL {
                if let Some(value) = kind.song_value(song) {
                    distinct.entry(kind).or_default().insert(value);
                }
            }
        }

        let values = distinct
            .into_iter()
            .map(|(kind, set)| (kind, set.into_iter().map(str::to_string).collect()))
            .collect();
        Self { values }
    }

    /// Set the values of one dynamic kind, replacing previous ones
    pub fn set(&mut self, kind: FilterKind, values: Vec<String>) -> Result<()> {
        if !kind.is_dynamic() {
            return Err(Error::InvalidInput(format!(
                "{} has a fixed variant list",
                kind
            )));
        }
        self.values.insert(kind, values);
        Ok(())
    }

    /// Builder form of [`DynamicVariants::set`]
    pub fn with(mut self, kind: FilterKind, values: impl IntoIterator<Item = impl Into<String>>) -> Result<Self> {
        self.set(kind, values.into_iter().map(Into::into).collect())?;
        Ok(self)
    }

    pub fn values(&self, kind: FilterKind) -> &[String] {
        self.values.get(&kind).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SongId;

    fn song(id: i64, artist: &str, language: &str) -> UsdbSong {
        UsdbSong {
            song_id: SongId::new(id).unwrap(),
            artist: artist.to_string(),
            title: format!("Title {}", id),
            language: language.to_string(),
            edition: String::new(),
            golden_notes: false,
            rating: 0,
            views: 0,
        }
    }

    #[test]
    fn test_from_songs_sorted_and_distinct() {
        let songs = vec![
            song(1, "Queen", "English"),
            song(2, "ABBA", "English"),
            song(3, "Queen", "German"),
        ];
        let variants = DynamicVariants::from_songs(&songs);

        assert_eq!(variants.values(FilterKind::Artist), ["ABBA", "Queen"]);
        assert_eq!(variants.values(FilterKind::Language), ["English", "German"]);
        assert_eq!(variants.values(FilterKind::Title).len(), 3);
        assert_eq!(variants.values(FilterKind::Edition), [""]);
        assert!(variants.values(FilterKind::Rating).is_empty());
    }

    #[test]
    fn test_set_rejects_static_kind() {
        let mut variants = DynamicVariants::new();
        assert!(matches!(
            variants.set(FilterKind::Views, vec!["1".to_string()]),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn test_with_keeps_caller_order() {
        let variants = DynamicVariants::new()
            .with(FilterKind::Artist, ["Zed", "Alpha"])
            .unwrap();
        assert_eq!(variants.values(FilterKind::Artist), ["Zed", "Alpha"]);
    }
}
