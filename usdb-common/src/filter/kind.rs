//! Catalog of filter kinds shown in the filter tree

use super::{RatingLevel, SongMatch, ViewsBucket};
use crate::UsdbSong;

/// Kinds of filters in the tree
///
/// Artist, title, edition and language take their variants from the loaded
/// song collection; the others have a fixed variant list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FilterKind {
    Artist,
    Title,
    Edition,
    Language,
    GoldenNotes,
    Rating,
    Views,
}

impl FilterKind {
    /// All kinds in catalog (display) order
    pub const ALL: [FilterKind; 7] = [
        FilterKind::Artist,
        FilterKind::Title,
        FilterKind::Edition,
        FilterKind::Language,
        FilterKind::GoldenNotes,
        FilterKind::Rating,
        FilterKind::Views,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            FilterKind::Artist => "Artist",
            FilterKind::Title => "Title",
            FilterKind::Edition => "Edition",
            FilterKind::Language => "Language",
            FilterKind::GoldenNotes => "Golden Notes",
            FilterKind::Rating => "Rating",
            FilterKind::Views => "Views",
        }
    }

    /// True if the variants come from the song collection
    pub fn is_dynamic(&self) -> bool {
        matches!(
            self,
            FilterKind::Artist | FilterKind::Title | FilterKind::Edition | FilterKind::Language
        )
    }

    /// Fixed variants of this kind, in display order
    ///
    /// Empty for dynamic kinds; their variants are supplied by the caller.
    pub fn static_variants(&self) -> Vec<SongMatch> {
        match self {
            FilterKind::Artist | FilterKind::Title | FilterKind::Edition | FilterKind::Language => {
                Vec::new()
            }
            FilterKind::GoldenNotes => vec![SongMatch::GoldenNotes(false), SongMatch::GoldenNotes(true)],
            FilterKind::Rating => RatingLevel::ALL.iter().copied().map(SongMatch::Rating).collect(),
            FilterKind::Views => ViewsBucket::ALL.iter().copied().map(SongMatch::Views).collect(),
        }
    }

    /// Wrap an observed value as a variant of this dynamic kind
    ///
    /// # Panics
    /// If called on a static kind.
    pub fn variant_for_value(&self, value: impl Into<String>) -> SongMatch {
        let value = value.into();
        match self {
            FilterKind::Artist => SongMatch::Artist(value),
            FilterKind::Title => SongMatch::Title(value),
            FilterKind::Edition => SongMatch::Edition(value),
            FilterKind::Language => SongMatch::Language(value),
            FilterKind::GoldenNotes | FilterKind::Rating | FilterKind::Views => {
                unreachable!("{} has no dynamic variants", self)
            }
        }
    }

    /// The song field a dynamic kind is derived from, `None` for static kinds
    pub fn song_value<'a>(&self, song: &'a UsdbSong) -> Option<&'a str> {
        match self {
            FilterKind::Artist => Some(&song.artist),
            FilterKind::Title => Some(&song.title),
            FilterKind::Edition => Some(&song.edition),
            FilterKind::Language => Some(&song.language),
            FilterKind::GoldenNotes | FilterKind::Rating | FilterKind::Views => None,
        }
    }

    /// Parse a kind from its label or snake_case name (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(&[' ', '-'][..], "_").as_str() {
            "artist" => Some(FilterKind::Artist),
            "title" => Some(FilterKind::Title),
            "edition" => Some(FilterKind::Edition),
            "language" => Some(FilterKind::Language),
            "golden_notes" | "goldennotes" => Some(FilterKind::GoldenNotes),
            "rating" => Some(FilterKind::Rating),
            "views" => Some(FilterKind::Views),
            _ => None,
        }
    }
}

impl std::fmt::Display for FilterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        let labels: Vec<_> = FilterKind::ALL.iter().map(|k| k.label()).collect();
        assert_eq!(
            labels,
            vec!["Artist", "Title", "Edition", "Language", "Golden Notes", "Rating", "Views"]
        );
    }

    #[test]
    fn test_dynamic_kinds_have_no_static_variants() {
        for kind in FilterKind::ALL {
            assert_eq!(kind.is_dynamic(), kind.static_variants().is_empty(), "{}", kind);
        }
    }

    #[test]
    fn test_static_variant_order() {
        let golden: Vec<_> = FilterKind::GoldenNotes
            .static_variants()
            .iter()
            .map(SongMatch::label)
            .collect();
        assert_eq!(golden, vec!["No", "Yes"]);

        let rating: Vec<_> = FilterKind::Rating.static_variants().iter().map(SongMatch::label).collect();
        assert_eq!(rating, vec!["None", "★", "★★", "★★★", "★★★★", "★★★★★"]);

        let views: Vec<_> = FilterKind::Views.static_variants().iter().map(SongMatch::label).collect();
        assert_eq!(
            views,
            vec!["0 to 99", "100 to 199", "200 to 299", "300 to 399", "400 to 499", "500+"]
        );
    }

    #[test]
    fn test_static_variants_belong_to_their_kind() {
        for kind in FilterKind::ALL {
            assert!(kind.static_variants().iter().all(|v| v.kind() == kind));
        }
    }

    #[test]
    fn test_variant_for_value() {
        assert_eq!(
            FilterKind::Language.variant_for_value("German"),
            SongMatch::Language("German".to_string())
        );
    }

    #[test]
    #[should_panic(expected = "has no dynamic variants")]
    fn test_variant_for_value_on_static_kind_panics() {
        FilterKind::Rating.variant_for_value("5");
    }

    #[test]
    fn test_from_str_accepts_labels_and_names() {
        assert_eq!(FilterKind::from_str("Golden Notes"), Some(FilterKind::GoldenNotes));
        assert_eq!(FilterKind::from_str("golden_notes"), Some(FilterKind::GoldenNotes));
        assert_eq!(FilterKind::from_str("VIEWS"), Some(FilterKind::Views));
        assert_eq!(FilterKind::from_str("status"), None);
    }
}
