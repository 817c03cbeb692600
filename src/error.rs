//! Error type shared by the indexing pipeline.

use thiserror::Error;

/// Failures that abort an indexing run.
///
/// Per-file parse and read failures are handled locally and never surface
/// here; what does surface is anything that would leave the metadata store
/// or the output artifacts inconsistent.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("metadata store error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
