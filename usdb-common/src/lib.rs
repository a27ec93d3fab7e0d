//! # USDB Syncer Common Library
//!
//! Shared code for the USDB syncer front ends including:
//! - Song metadata and its JSON codec
//! - The filter tree used to narrow the song table
//! - The song table controller (views, batch, download signals)
//! - The song list cache
//! - Import and export of USDB id lists
//! - Reading headers of local song files
//! - Configuration loading

pub mod config;
pub mod error;
pub mod exchange;
pub mod filter;
pub mod song;
pub mod song_data;
pub mod song_id;
pub mod song_list;
pub mod song_txt;
pub mod table;

pub use error::{Error, Result};
pub use filter::{FilterKind, FilterTree};
pub use song::UsdbSong;
pub use song_data::{DownloadStatus, SongData};
pub use song_id::SongId;
pub use table::SongTable;
