//! Song table controller
//!
//! Holds the table rows and coordinates the list view (filtered by the
//! filter tree and a free-text search), the batch view (every row with a
//! download status), the list selection, batch staging and the download
//! start/finish signals reported by the download collaborator.

use crate::filter::FilterTree;
use crate::song_data::{fuzz_text, DownloadErrorReason, DownloadResult, DownloadStatus, SongData};
use crate::song_txt::SongTxtHeaders;
use crate::{SongId, UsdbSong};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use walkdir::WalkDir;

/// Progress counter of running downloads
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Progress {
    running: usize,
    finished: usize,
}

impl Progress {
    /// Add `count` downloads; a finished previous run is forgotten first
    pub fn start(&mut self, count: usize) {
        if self.running == self.finished {
            self.running = 0;
            self.finished = 0;
        }
        self.running += count;
    }

    pub fn finish(&mut self, count: usize) {
        self.finished += count;
    }

    pub fn running(&self) -> usize {
        self.running
    }

    pub fn finished(&self) -> usize {
        self.finished
    }

    /// Text shown next to the progress bar, e.g. `3/10`
    pub fn label(&self) -> String {
        format!("{}/{}", self.finished, self.running)
    }

    /// Progress bar value in percent
    pub fn percent(&self) -> u32 {
        ((self.finished + 1) as f64 / (self.running + 1) as f64 * 100.0) as u32
    }
}

/// Rows of the song table and the state around them
#[derive(Debug, Default)]
pub struct SongTable {
    songs: Vec<SongData>,
    rows: HashMap<SongId, usize>,
    text_filter: Vec<String>,
    selection: BTreeSet<usize>,
    progress: Progress,
}

impl SongTable {
    pub fn new() -> Self {
        Self::default()
    }

    // data model

    /// Replace all rows; clears the selection
    pub fn set_data(&mut self, songs: Vec<SongData>) {
        self.songs = songs;
        self.selection.clear();
        self.reindex();
        tracing::info!(songs = self.songs.len(), "Song table loaded");
    }

    fn reindex(&mut self) {
        self.rows = self
            .songs
            .iter()
            .enumerate()
            .map(|(row, song)| (song.data.song_id, row))
            .collect();
    }

    pub fn songs(&self) -> &[SongData] {
        &self.songs
    }

    pub fn row_count(&self) -> usize {
        self.songs.len()
    }

    pub fn row_for_id(&self, song_id: SongId) -> Option<usize> {
        self.rows.get(&song_id).copied()
    }

    pub fn get(&self, song_id: SongId) -> Option<&SongData> {
        self.row_for_id(song_id).map(|row| &self.songs[row])
    }

    pub fn ids_for_rows(&self, rows: impl IntoIterator<Item = usize>) -> Vec<SongId> {
        rows.into_iter()
            .filter_map(|row| self.songs.get(row))
            .map(|song| song.data.song_id)
            .collect()
    }

    /// Replace the data of a known song and mark it downloaded
    ///
    /// Returns false if the id is not in the table.
    pub fn update_item(&mut self, song: UsdbSong) -> bool {
        let Some(row) = self.row_for_id(song.song_id) else {
            return false;
        };
        let mut updated = self.songs[row].with_data(song);
        updated.status = DownloadStatus::Downloaded;
        self.songs[row] = updated;
        true
    }

    /// Remove a row; later rows shift up and the selection follows them
    pub fn remove_row(&mut self, row: usize) -> Option<SongData> {
        if row >= self.songs.len() {
            return None;
        }
        let removed = self.songs.remove(row);
        self.selection = self
            .selection
            .iter()
            .filter(|r| **r != row)
            .map(|r| if *r > row { r - 1 } else { *r })
            .collect();
        self.reindex();
        Some(removed)
    }

    // sort and filter model

    /// Set the free-text search; every word must occur in a row
    pub fn set_text_filter(&mut self, text: &str) {
        self.text_filter = fuzz_text(text)
            .split_whitespace()
            .map(str::to_string)
            .collect();
    }

    /// Rows shown in the list view
    pub fn list_rows(&self, tree: &FilterTree) -> Vec<usize> {
        self.songs
            .iter()
            .enumerate()
            .filter(|(_, song)| tree.accepts(&song.data) && song.matches_words(&self.text_filter))
            .map(|(row, _)| row)
            .collect()
    }

    /// Rows shown in the batch view
    pub fn batch_rows(&self) -> Vec<usize> {
        self.songs
            .iter()
            .enumerate()
            .filter(|(_, song)| song.status != DownloadStatus::None)
            .map(|(row, _)| row)
            .collect()
    }

    pub fn batch_ids(&self) -> Vec<SongId> {
        self.ids_for_rows(self.batch_rows())
    }

    /// Row counts of the list and batch views
    pub fn row_counts(&self, tree: &FilterTree) -> (usize, usize) {
        (self.list_rows(tree).len(), self.batch_rows().len())
    }

    // selection model

    /// Replace the selection; rows out of range are ignored
    pub fn select_rows(&mut self, rows: impl IntoIterator<Item = usize>) {
        let count = self.songs.len();
        self.selection = rows.into_iter().filter(|row| *row < count).collect();
    }

    pub fn selected_rows(&self) -> Vec<usize> {
        self.selection.iter().copied().collect()
    }

    pub fn selected_row_count(&self) -> usize {
        self.selection.len()
    }

    pub fn set_selection_to_song_ids(&mut self, song_ids: &[SongId]) {
        let rows: Vec<usize> = song_ids.iter().filter_map(|id| self.row_for_id(*id)).collect();
        self.select_rows(rows);
    }

    /// The first selected song, if any
    pub fn current_song(&self) -> Option<&SongData> {
        self.selection.iter().next().map(|row| &self.songs[*row])
    }

    // batch staging

    fn process_rows(
        &mut self,
        rows: impl IntoIterator<Item = usize>,
        mut processor: impl FnMut(&mut SongData) -> bool,
    ) -> usize {
        let mut changed = 0;
        for row in rows {
            if let Some(song) = self.songs.get_mut(row) {
                if processor(song) {
                    changed += 1;
                }
            }
        }
        changed
    }

    /// Stage rows that are not in the batch yet; returns how many changed
    pub fn stage_rows(&mut self, rows: impl IntoIterator<Item = usize>) -> usize {
        self.process_rows(rows, |song| {
            if song.status == DownloadStatus::None {
                song.status = DownloadStatus::Staged;
                true
            } else {
                false
            }
        })
    }

    pub fn stage_selection(&mut self) -> usize {
        self.stage_rows(self.selected_rows())
    }

    /// Stage the given songs; unknown ids are skipped
    pub fn stage_song_ids(&mut self, song_ids: &[SongId]) -> usize {
        let rows: Vec<usize> = song_ids.iter().filter_map(|id| self.row_for_id(*id)).collect();
        let staged = self.stage_rows(rows);
        tracing::info!(staged, requested = song_ids.len(), "Added songs to batch");
        staged
    }

    /// Stage every song that has a local `.txt` file below `directory`
    ///
    /// Files are matched on fuzzed artist and title, so one file may stage
    /// several rows. Returns how many rows were newly staged.
    pub fn stage_local_songs(&mut self, directory: &Path) -> usize {
        let mut song_map: HashMap<(String, String), Vec<usize>> = HashMap::new();
        for (row, song) in self.songs.iter().enumerate() {
            song_map
                .entry(fuzzy_key(&song.data.artist, &song.data.title))
                .or_default()
                .push(row);
        }

        let mut matched_rows = BTreeSet::new();
        for entry in WalkDir::new(directory).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("Error accessing entry: {}", e);
                    continue;
                }
            };
            let path = entry.path();
            if !entry.file_type().is_file() || path.extension().map_or(true, |ext| ext != "txt") {
                continue;
            }
            let Some(headers) = SongTxtHeaders::read(path) else {
                continue;
            };
            match song_map.get(&fuzzy_key(&headers.artist, &headers.title)) {
                Some(rows) => {
                    tracing::info!(song = %headers.artist_title(), matches = rows.len(), "Matched local song");
                    matched_rows.extend(rows.iter().copied());
                }
                None => tracing::warn!(song = %headers.artist_title(), "No matches for local song"),
            }
        }

        let staged = self.stage_rows(matched_rows.iter().copied());
        tracing::info!(matched = matched_rows.len(), staged, "Added local songs to batch");
        staged
    }

    pub fn unstage_rows(&mut self, rows: impl IntoIterator<Item = usize>) -> usize {
        self.process_rows(rows, |song| {
            if song.status.can_be_unstaged() {
                song.status = DownloadStatus::None;
                true
            } else {
                false
            }
        })
    }

    /// Remove every unstageable row from the batch
    pub fn clear_batch(&mut self) -> usize {
        self.unstage_rows(self.batch_rows())
    }

    // downloads

    /// Mark downloadable rows pending and return their ids for the downloader
    pub fn download_rows(&mut self, rows: impl IntoIterator<Item = usize>) -> Vec<SongId> {
        let mut to_download = Vec::new();
        self.process_rows(rows, |song| {
            if song.status.can_be_downloaded() {
                song.status = DownloadStatus::Pending;
                to_download.push(song.data.song_id);
                true
            } else {
                false
            }
        });
        if !to_download.is_empty() {
            self.progress.start(to_download.len());
            tracing::info!(count = to_download.len(), "Starting downloads");
        }
        to_download
    }

    pub fn download_selection(&mut self) -> Vec<SongId> {
        self.download_rows(self.selected_rows())
    }

    pub fn download_batch(&mut self) -> Vec<SongId> {
        self.download_rows(self.batch_rows())
    }

    pub fn on_download_started(&mut self, song_id: SongId) {
        match self.row_for_id(song_id) {
            Some(row) => self.songs[row].status = DownloadStatus::Downloading,
            None => {
                tracing::error!(song_id = %song_id, "Unknown id. Ignoring download start signal.")
            }
        }
    }

    pub fn on_download_finished(&mut self, result: DownloadResult) {
        self.progress.finish(1);
        let song_id = result.song_id;
        match result.outcome {
            Ok(song) => {
                if self.update_item(song) {
                    tracing::info!(song_id = %song_id, "All done!");
                } else {
                    tracing::error!(song_id = %song_id, "Unknown id. Ignoring download finish signal.");
                }
            }
            Err(reason) => {
                let Some(row) = self.row_for_id(song_id) else {
                    tracing::error!(song_id = %song_id, "Unknown id. Ignoring download finish signal.");
                    return;
                };
                match reason {
                    DownloadErrorReason::NotFound => {
                        self.remove_row(row);
                        tracing::info!(song_id = %song_id, "Removed song from local database.");
                    }
                    DownloadErrorReason::Failed => {
                        self.songs[row].status = DownloadStatus::Failed;
                        tracing::warn!(song_id = %song_id, "Download failed");
                    }
                }
            }
        }
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }
}

fn fuzzy_key(artist: &str, title: &str) -> (String, String) {
    (fuzz_text(artist), fuzz_text(title))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterKind;

    fn song(id: i64, artist: &str, title: &str, rating: u8) -> UsdbSong {
        UsdbSong {
            song_id: SongId::new(id).unwrap(),
            artist: artist.to_string(),
            title: title.to_string(),
            language: "English".to_string(),
            edition: String::new(),
            golden_notes: false,
            rating,
            views: 10,
        }
    }

    fn table() -> SongTable {
        let mut table = SongTable::new();
        table.set_data(
            vec![
                song(10, "Queen", "Bohemian Rhapsody", 5),
                song(20, "ABBA", "Waterloo", 3),
                song(30, "Queen", "Radio Ga Ga", 0),
            ]
            .into_iter()
            .map(SongData::from_usdb_song)
            .collect(),
        );
        table
    }

    fn id(value: i64) -> SongId {
        SongId::new(value).unwrap()
    }

    #[test]
    fn test_progress_resets_when_idle() {
        let mut progress = Progress::default();
        progress.start(2);
        progress.finish(2);
        assert_eq!(progress.label(), "2/2");
        progress.start(3);
        assert_eq!(progress.label(), "0/3");
        assert_eq!(progress.percent(), 25);
    }

    #[test]
    fn test_progress_accumulates_while_running() {
        let mut progress = Progress::default();
        progress.start(2);
        progress.finish(1);
        progress.start(2);
        assert_eq!(progress.running(), 4);
        assert_eq!(progress.finished(), 1);
    }

    #[test]
    fn test_row_lookup() {
        let table = table();
        assert_eq!(table.row_for_id(id(20)), Some(1));
        assert_eq!(table.get(id(30)).unwrap().data.title, "Radio Ga Ga");
        assert!(table.get(id(99)).is_none());
        assert_eq!(table.ids_for_rows([2, 0, 7]), vec![id(30), id(10)]);
    }

    #[test]
    fn test_list_rows_follow_tree_and_text() {
        let mut table = table();
        let mut tree = FilterTree::new();
        assert_eq!(table.list_rows(&tree), vec![0, 1, 2]);

        table.set_text_filter("queen");
        assert_eq!(table.list_rows(&tree), vec![0, 2]);

        tree.toggle(tree.find_variant(FilterKind::Rating, "None").unwrap());
        assert_eq!(table.list_rows(&tree), vec![2]);

        table.set_text_filter("  RADIO,  ga ");
        assert_eq!(table.list_rows(&tree), vec![2]);
        table.set_text_filter("waterloo");
        assert!(table.list_rows(&tree).is_empty());
    }

    #[test]
    fn test_stage_and_unstage() {
        let mut table = table();
        table.select_rows([0, 2, 42]);
        assert_eq!(table.selected_row_count(), 2);
        assert_eq!(table.stage_selection(), 2);
        assert_eq!(table.batch_ids(), vec![id(10), id(30)]);

        // already staged rows are left alone
        assert_eq!(table.stage_rows([0, 1]), 1);
        assert_eq!(table.unstage_rows([1]), 1);
        assert_eq!(table.clear_batch(), 2);
        assert!(table.batch_rows().is_empty());
    }

    #[test]
    fn test_stage_song_ids_skips_unknown() {
        let mut table = table();
        assert_eq!(table.stage_song_ids(&[id(20), id(77)]), 1);
        assert_eq!(table.get(id(20)).unwrap().status, DownloadStatus::Staged);
    }

    #[test]
    fn test_selection_by_song_ids() {
        let mut table = table();
        table.set_selection_to_song_ids(&[id(30), id(20), id(5)]);
        assert_eq!(table.selected_rows(), vec![1, 2]);
        assert_eq!(table.current_song().unwrap().data.song_id, id(20));
    }

    #[test]
    fn test_download_lifecycle() {
        let mut table = table();
        table.stage_song_ids(&[id(10), id(20), id(30)]);
        let requested = table.download_batch();
        assert_eq!(requested, vec![id(10), id(20), id(30)]);
        assert_eq!(table.progress().label(), "0/3");

        // pending songs are not requested twice
        assert!(table.download_batch().is_empty());

        table.on_download_started(id(10));
        assert_eq!(table.get(id(10)).unwrap().status, DownloadStatus::Downloading);

        let mut downloaded = song(10, "Queen", "Bohemian Rhapsody", 5);
        downloaded.views = 11;
        table.on_download_finished(DownloadResult::success(downloaded));
        let row = table.get(id(10)).unwrap();
        assert_eq!(row.status, DownloadStatus::Downloaded);
        assert_eq!(row.data.views, 11);

        table.on_download_finished(DownloadResult::failure(id(20), DownloadErrorReason::Failed));
        assert_eq!(table.get(id(20)).unwrap().status, DownloadStatus::Failed);

        table.on_download_finished(DownloadResult::failure(id(30), DownloadErrorReason::NotFound));
        assert!(table.get(id(30)).is_none());
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.progress().label(), "3/3");
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let mut table = table();
        table.on_download_started(id(99));
        table.on_download_finished(DownloadResult::failure(id(99), DownloadErrorReason::Failed));
        assert!(table.songs().iter().all(|s| s.status == DownloadStatus::None));
    }

    #[test]
    fn test_remove_row_shifts_selection() {
        let mut table = table();
        table.select_rows([0, 1, 2]);
        table.remove_row(1);
        assert_eq!(table.selected_rows(), vec![0, 1]);
        assert_eq!(table.row_for_id(id(30)), Some(1));
        assert!(table.remove_row(5).is_none());
    }

    #[test]
    fn test_download_selection_skips_running() {
        let mut table = table();
        table.select_rows([0]);
        assert_eq!(table.download_selection(), vec![id(10)]);
        table.on_download_started(id(10));
        assert!(table.download_selection().is_empty());
    }

    #[test]
    fn test_stage_local_songs_matches_fuzzy_artist_title() {
        let dir = tempfile::TempDir::new().unwrap();
        let nested = dir.path().join("Queen - Bohemian Rhapsody");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(
            nested.join("song.txt"),
            "#ARTIST:QUEEN\n#TITLE:Bohemian  Rhapsody!\n#BPM:200\n: 0 1 2 Is\nE\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("unknown.txt"), "#ARTIST:Nobody\n#TITLE:Nothing\n").unwrap();
        std::fs::write(dir.path().join("notes.md"), "#ARTIST:ABBA\n#TITLE:Waterloo\n").unwrap();

        let mut table = table();
        table.stage_rows([2]);
        assert_eq!(table.stage_local_songs(dir.path()), 1);
        assert_eq!(table.batch_ids(), vec![id(10), id(30)]);
        assert_eq!(table.get(id(20)).unwrap().status, DownloadStatus::None);
    }

    #[test]
    fn test_stage_local_songs_counts_only_new_rows() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(dir.path().join("a.txt"), "#ARTIST:ABBA\n#TITLE:Waterloo\n").unwrap();

        let mut table = table();
        table.stage_song_ids(&[id(20)]);
        assert_eq!(table.stage_local_songs(dir.path()), 0);
        assert_eq!(table.batch_ids(), vec![id(20)]);
    }
}
