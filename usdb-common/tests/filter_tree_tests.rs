//! Integration tests for the filter tree driving the song table
//!
//! Exercises the flow of the desktop front end: load the cached song list,
//! derive dynamic filter variants, toggle checkboxes and re-filter the list
//! view.

use tempfile::TempDir;
use usdb_common::filter::{DynamicVariants, FilterKind, FilterTree};
use usdb_common::song_list::{dump_available_songs, load_cached_songs};
use usdb_common::{SongData, SongId, SongTable, UsdbSong};

fn song(id: i64, artist: &str, title: &str, language: &str, rating: u8, views: u32) -> UsdbSong {
    UsdbSong {
        song_id: SongId::new(id).unwrap(),
        artist: artist.to_string(),
        title: title.to_string(),
        language: language.to_string(),
        edition: String::new(),
        golden_notes: id % 2 == 0,
        rating,
        views,
    }
}

fn collection() -> Vec<UsdbSong> {
    vec![
        song(1, "A", "X", "English", 5, 50),
        song(2, "B", "Y", "German", 0, 600),
        song(3, "A", "Z", "German", 2, 150),
    ]
}

fn load_table(songs: &[UsdbSong]) -> (SongTable, FilterTree) {
    let mut table = SongTable::new();
    table.set_data(songs.iter().cloned().map(SongData::from_usdb_song).collect());
    let tree = FilterTree::build(&DynamicVariants::from_songs(songs)).unwrap();
    (table, tree)
}

#[test]
fn test_rating_variant_narrows_list_then_restores() {
    let songs = collection();
    let (table, mut tree) = load_table(&songs);
    let five_stars = tree.find_variant(FilterKind::Rating, "★★★★★").unwrap();

    tree.toggle(five_stars);
    assert_eq!(table.list_rows(&tree), vec![0]);

    tree.toggle(five_stars);
    assert_eq!(table.list_rows(&tree), vec![0, 1, 2]);
}

#[test]
fn test_filters_combine_with_and() {
    let songs = collection();
    let (table, mut tree) = load_table(&songs);

    tree.toggle(tree.find_variant(FilterKind::Language, "German").unwrap());
    assert_eq!(table.list_rows(&tree), vec![1, 2]);

    tree.toggle(tree.find_variant(FilterKind::Artist, "A").unwrap());
    assert_eq!(table.list_rows(&tree), vec![2]);

    tree.toggle(tree.find_variant(FilterKind::Views, "100 to 199").unwrap());
    assert_eq!(table.list_rows(&tree), vec![2]);

    // switching the views variant replaces the previous one
    tree.toggle(tree.find_variant(FilterKind::Views, "500+").unwrap());
    assert!(table.list_rows(&tree).is_empty());

    tree.toggle(tree.filter_node(FilterKind::Views));
    assert_eq!(table.list_rows(&tree), vec![2]);
}

#[test]
fn test_rebuild_from_cached_song_list() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("available_songs.json");
    dump_available_songs(&collection(), &path).unwrap();

    let songs = load_cached_songs(&path).unwrap();
    let (table, tree) = load_table(&songs);

    let artists: Vec<String> = tree
        .node(tree.filter_node(FilterKind::Artist))
        .children()
        .iter()
        .map(|id| tree.node(*id).label())
        .collect();
    assert_eq!(artists, vec!["A", "B"]);
    assert_eq!(table.row_counts(&tree), (3, 0));
}

#[test]
fn test_staged_songs_stay_in_batch_regardless_of_filters() {
    let songs = collection();
    let (mut table, mut tree) = load_table(&songs);
    table.stage_song_ids(&[SongId::new(2).unwrap()]);

    tree.toggle(tree.find_variant(FilterKind::GoldenNotes, "No").unwrap());
    assert_eq!(table.list_rows(&tree), vec![0, 2]);
    assert_eq!(table.batch_rows(), vec![1]);
}
