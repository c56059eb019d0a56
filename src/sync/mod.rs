//! Sync writer: idempotent materialization of download targets.
//!
//! The on-disk tree is the only record of what has been downloaded. A target
//! lands at `<base>/<term>/<course>/<file>`, with term and course reduced to
//! alphanumerics by [`sanitize_segment`]. An existing file at that path is
//! never fetched or rewritten again.

mod error;
mod sanitize;
mod writer;

pub use error::SyncError;
pub use sanitize::sanitize_segment;
pub use writer::{
    WriteResult, clear_partial_files, destination_dir, destination_path, materialize,
};
