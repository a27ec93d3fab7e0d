//! usdb-cli - Browse the cached USDB song list from the terminal
//!
//! Loads the song list cache, builds the filter tree from it and prints the
//! songs (or the tree itself) for a set of checked filter variants. The
//! `batch` command stages songs from USDB id files or a local song folder.

use anyhow::Result;
use clap::Parser;
use std::sync::Mutex;
use tracing::{info, warn};
use usdb_common::config::ConfigResolver;

mod args;
mod commands;

use args::{Cli, Command};

/// Level from the config file; `None` if the name is not a tracing level
fn configured_level(name: &str) -> Option<tracing::Level> {
    name.trim().parse().ok()
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let resolved = ConfigResolver::new()
        .with_config_file(cli.config.clone())
        .with_song_list_arg(cli.song_list.clone())
        .resolve();

    // Initialize tracing subscriber; RUST_LOG, when set, replaces the configured level
    let level = configured_level(&resolved.logging.level);
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(level.unwrap_or(tracing::Level::INFO).to_string())
    });
    match &resolved.logging.file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let file = std::fs::OpenOptions::new().create(true).append(true).open(path)?;
            tracing_subscriber::fmt()
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .with_env_filter(env_filter)
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(env_filter)
                .init();
        }
    }

    if level.is_none() {
        warn!(
            level = %resolved.logging.level,
            "Unknown logging level in config, using info"
        );
    }

    info!(
        "Starting usdb-cli v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );
    info!("Song list: {}", resolved.song_list.display());

    match cli.command {
        Command::List { filters, search } => commands::list(&resolved, &filters, search.as_deref()),
        Command::Tree { filters } => commands::tree(&resolved, &filters),
        Command::Batch {
            imports,
            local,
            export,
        } => commands::batch(&resolved, &imports, local.as_deref(), export.as_deref()),
        Command::InitConfig { force } => {
            let path = ConfigResolver::new().with_config_file(cli.config).config_file_path();
            commands::init_config(&path, force)
        }
    }
}
