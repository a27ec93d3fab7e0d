//! Subcommand implementations

use crate::args::FilterArg;
use anyhow::{anyhow, bail, Context, Result};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use usdb_common::config::{write_toml_config, CompiledDefaults, ResolvedConfig, TomlConfig};
use usdb_common::exchange::{import_usdb_id_files, write_usdb_id_file};
use usdb_common::filter::{DynamicVariants, FilterTree};
use usdb_common::song_list::load_cached_songs;
use usdb_common::{SongData, SongTable, UsdbSong};

fn load_songs(config: &ResolvedConfig) -> Result<Vec<UsdbSong>> {
    load_cached_songs(&config.song_list)
        .ok_or_else(|| anyhow!("No usable song list at {}", config.song_list.display()))
}

fn load_table(songs: Vec<UsdbSong>) -> SongTable {
    let mut table = SongTable::new();
    table.set_data(songs.into_iter().map(SongData::from_usdb_song).collect());
    table
}

/// Build the tree for `songs` and check the requested variants
fn build_tree(songs: &[UsdbSong], filters: &[FilterArg]) -> Result<FilterTree> {
    let mut tree = FilterTree::build(&DynamicVariants::from_songs(songs))?;
    for filter in filters {
        let Some(variant) = tree.find_variant(filter.kind, &filter.label) else {
            let available: Vec<String> = tree
                .node(tree.filter_node(filter.kind))
                .children()
                .iter()
                .take(20)
                .map(|id| tree.node(*id).label())
                .collect();
            bail!(
                "{} has no variant {:?} (available: {})",
                filter.kind,
                filter.label,
                available.join(", ")
            );
        };
        // Toggling an already checked variant would clear it again
        if !tree.node(variant).checked() {
            tree.toggle(variant);
        }
    }
    Ok(tree)
}

pub fn list(config: &ResolvedConfig, filters: &[FilterArg], search: Option<&str>) -> Result<()> {
    let songs = load_songs(config)?;
    let tree = build_tree(&songs, filters)?;

    let mut table = load_table(songs);
    if let Some(text) = search {
        table.set_text_filter(text);
    }

    let rows = table.list_rows(&tree);
    for row in &rows {
        println!("{}", render_song_row(&table.songs()[*row]));
    }
    tracing::info!(shown = rows.len(), total = table.row_count(), "Listed songs");
    Ok(())
}

pub fn tree(config: &ResolvedConfig, filters: &[FilterArg]) -> Result<()> {
    let songs = load_songs(config)?;
    let tree = build_tree(&songs, filters)?;
    print!("{}", render_tree(&tree));
    Ok(())
}

/// Stage imported ids and local songs; an import error stages nothing
fn stage_batch(table: &mut SongTable, imports: &[PathBuf], local: Option<&Path>) -> Result<()> {
    if !imports.is_empty() {
        let ids = import_usdb_id_files(imports)?;
        let unavailable: Vec<String> = ids
            .iter()
            .filter(|id| table.get(**id).is_none())
            .map(ToString::to_string)
            .collect();
        if !unavailable.is_empty() {
            tracing::warn!(ids = %unavailable.join(", "), "USDB ids not in the song list");
        }
        table.stage_song_ids(&ids);
    }
    if let Some(directory) = local {
        table.stage_local_songs(directory);
    }
    Ok(())
}

pub fn batch(
    config: &ResolvedConfig,
    imports: &[PathBuf],
    local: Option<&Path>,
    export: Option<&Path>,
) -> Result<()> {
    let mut table = load_table(load_songs(config)?);
    stage_batch(&mut table, imports, local)?;

    for row in table.batch_rows() {
        println!("{}", render_song_row(&table.songs()[row]));
    }

    if let Some(path) = export {
        let ids = table.batch_ids();
        if ids.is_empty() {
            tracing::info!("Skipping export: no songs in batch");
        } else {
            write_usdb_id_file(path, &ids)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("Wrote {} ids to {}", ids.len(), path.display());
        }
    }
    Ok(())
}

pub fn init_config(path: &Path, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let defaults = CompiledDefaults::for_current_platform();
    let config = TomlConfig {
        song_dir: Some(defaults.song_dir),
        song_list: Some(defaults.song_list),
        logging: Default::default(),
    };
    write_toml_config(&config, path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn render_song_row(song: &SongData) -> String {
    let data = &song.data;
    let mut line = format!(
        "{}  {} - {}  [{}]",
        data.song_id, data.artist, data.title, data.language
    );
    if !data.edition.is_empty() {
        let _ = write!(line, " ({})", data.edition);
    }
    let _ = write!(line, "  rating {}  views {}", data.rating, data.views);
    if data.golden_notes {
        line.push_str("  golden");
    }
    line
}

fn render_tree(tree: &FilterTree) -> String {
    let checkbox = |checkable: bool, checked: bool| match (checkable, checked) {
        (false, _) => "   ",
        (true, false) => "[ ]",
        (true, true) => "[x]",
    };

    let mut out = String::new();
    for filter in tree.filters() {
        let _ = writeln!(
            out,
            "{} {}",
            checkbox(filter.checkable(), filter.checked()),
            filter.label()
        );
        for child in filter.children() {
            let variant = tree.node(*child);
            let _ = writeln!(
                out,
                "    {} {}",
                checkbox(variant.checkable(), variant.checked()),
                variant.label()
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use usdb_common::{FilterKind, SongId};

    fn song(id: i64, artist: &str, rating: u8) -> UsdbSong {
        UsdbSong {
            song_id: SongId::new(id).unwrap(),
            artist: artist.to_string(),
            title: "Song".to_string(),
            language: "English".to_string(),
            edition: String::new(),
            golden_notes: false,
            rating,
            views: 10,
        }
    }

    fn arg(kind: FilterKind, label: &str) -> FilterArg {
        FilterArg {
            kind,
            label: label.to_string(),
        }
    }

    #[test]
    fn test_build_tree_checks_variants() {
        let songs = vec![song(1, "A", 5), song(2, "B", 0)];
        let tree = build_tree(&songs, &[arg(FilterKind::Artist, "B")]).unwrap();
        assert!(!tree.accepts(&songs[0]));
        assert!(tree.accepts(&songs[1]));
    }

    #[test]
    fn test_build_tree_repeated_filter_stays_checked() {
        let songs = vec![song(1, "A", 5)];
        let filters = [arg(FilterKind::Rating, "★★★★★"), arg(FilterKind::Rating, "★★★★★")];
        let tree = build_tree(&songs, &filters).unwrap();
        assert_eq!(tree.checked_variants().len(), 1);
    }

    #[test]
    fn test_build_tree_unknown_label() {
        let songs = vec![song(1, "A", 5)];
        let err = build_tree(&songs, &[arg(FilterKind::Artist, "Nobody")]).unwrap_err();
        assert!(err.to_string().contains("available: A"));
    }

    #[test]
    fn test_render_tree_marks_checked() {
        let songs = vec![song(1, "A", 5)];
        let tree = build_tree(&songs, &[arg(FilterKind::GoldenNotes, "Yes")]).unwrap();
        let out = render_tree(&tree);
        assert!(out.contains("[x] Golden Notes\n"));
        assert!(out.contains("    [x] Yes\n"));
        assert!(out.contains("    [ ] No\n"));
        assert!(out.contains("    Rating\n"));
    }

    #[test]
    fn test_render_song_row() {
        let mut data = SongData::from_usdb_song(song(42, "Queen", 3));
        data.data.golden_notes = true;
        assert_eq!(
            render_song_row(&data),
            "00042  Queen - Song  [English]  rating 3  views 10  golden"
        );
    }

    #[test]
    fn test_stage_batch_from_files_and_local_songs() {
        let dir = tempfile::TempDir::new().unwrap();
        let ids_file = dir.path().join("ids.usdb_ids");
        std::fs::write(&ids_file, "2\n99").unwrap();
        let local = dir.path().join("songs");
        std::fs::create_dir_all(&local).unwrap();
        std::fs::write(local.join("a.txt"), "#ARTIST:a\n#TITLE:song\n").unwrap();

        let mut table = load_table(vec![song(1, "A", 5), song(2, "B", 0), song(3, "C", 1)]);
        stage_batch(&mut table, &[ids_file], Some(&local)).unwrap();
        assert_eq!(
            table.batch_ids(),
            vec![SongId::new(1).unwrap(), SongId::new(2).unwrap()]
        );
    }

    #[test]
    fn test_stage_batch_stages_nothing_on_import_error() {
        let dir = tempfile::TempDir::new().unwrap();
        let good = dir.path().join("good.usdb_ids");
        std::fs::write(&good, "1").unwrap();
        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "{}").unwrap();

        let mut table = load_table(vec![song(1, "A", 5)]);
        let err = stage_batch(&mut table, &[good, bad], None).unwrap_err();
        assert!(err.to_string().contains("does not contain a JSON array"));
        assert!(table.batch_ids().is_empty());
    }
}
