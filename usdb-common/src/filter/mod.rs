//! Filter tree for narrowing the song table by facet
//!
//! - `predicate`: selectable values and their song matching
//! - `kind`: catalog of filter kinds and their static variants
//! - `variants`: dynamic variant lists derived from the song collection
//! - `tree`: the checkbox tree and song acceptance query

mod kind;
mod predicate;
mod tree;
mod variants;

pub use kind::FilterKind;
pub use predicate::{RatingLevel, SongMatch, ViewsBucket, STAR};
pub use tree::{FilterSnapshot, FilterTree, NodeId, NodeView};
pub use variants::DynamicVariants;
