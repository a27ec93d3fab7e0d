//! Command-line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use usdb_common::FilterKind;

#[derive(Debug, Parser)]
#[command(name = "usdb-cli", version, about = "Browse the cached USDB song list")]
pub struct Cli {
    /// Song list cache file (overrides config and USDB_SYNCER_SONG_LIST)
    #[arg(long, global = true)]
    pub song_list: Option<PathBuf>,

    /// Config file (overrides USDB_SYNCER_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the songs accepted by the filters
    List {
        /// Check a filter variant, e.g. `rating=★★★` or `language=German`
        #[arg(long = "filter", value_name = "KIND=LABEL", value_parser = parse_filter)]
        filters: Vec<FilterArg>,

        /// Free-text search over artist, title, language and edition
        #[arg(long)]
        search: Option<String>,
    },
    /// Print the filter tree with its check state
    Tree {
        #[arg(long = "filter", value_name = "KIND=LABEL", value_parser = parse_filter)]
        filters: Vec<FilterArg>,
    },
    /// Stage songs into the download batch and print it
    Batch {
        /// File of USDB ids to stage (.json, .usdb_ids, .url, .desktop or .webloc)
        #[arg(long = "import", value_name = "FILE")]
        imports: Vec<PathBuf>,

        /// Stage songs with a local .txt file below this directory
        #[arg(long, value_name = "DIR")]
        local: Option<PathBuf>,

        /// Write the ids of the batch to a .usdb_ids file
        #[arg(long, value_name = "FILE")]
        export: Option<PathBuf>,
    },
    /// Write a config file with the default settings
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// One `--filter KIND=LABEL` argument
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterArg {
    pub kind: FilterKind,
    pub label: String,
}

fn parse_filter(s: &str) -> Result<FilterArg, String> {
    let (kind, label) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KIND=LABEL, got {:?}", s))?;
    let kind = FilterKind::from_str(kind.trim()).ok_or_else(|| {
        let kinds: Vec<_> = FilterKind::ALL.iter().map(|k| k.label()).collect();
        format!("unknown filter {:?}, expected one of: {}", kind, kinds.join(", "))
    })?;
    Ok(FilterArg {
        kind,
        label: label.to_string(),
    })
}
