//! Common error types for the USDB syncer

use crate::exchange::UsdbIdFileError;
use crate::filter::FilterKind;
use std::path::PathBuf;
use thiserror::Error;

/// Common result type for USDB syncer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across the USDB syncer crates
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding error (wraps serde_json::Error)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error (wraps toml::de::Error)
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or malformed scraped value
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Song id outside of the range USDB hands out
    #[error("Song id out of range: {0}")]
    SongIdOutOfRange(i64),

    /// A dynamic variant list handed to the filter tree contained a value twice
    #[error("Duplicate variant '{value}' for filter {filter}")]
    DuplicateVariant { filter: FilterKind, value: String },

    /// A file of USDB ids could not be imported
    #[error("Failed importing {}: {source}", .path.display())]
    UsdbIdFile {
        path: PathBuf,
        #[source]
        source: UsdbIdFileError,
    },
}
