//! Error types for the LSEQ document.

use crate::ident::Path;
use thiserror::Error;

/// Errors that can occur in document operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LseqError {
    #[error("Invalid index: {index} (length: {length})")]
    IndexOutOfBounds { index: usize, length: usize },

    #[error("Path not found: {0:?}")]
    PathNotFound(Path),

    #[error("Empty path cannot denote an element")]
    EmptyPath,

    /// The allocator's divergence search exhausted without finding room.
    ///
    /// This means the two input paths were not actually neighboring
    /// elements — a caller precondition was violated.  It is not a
    /// recoverable runtime condition; abort the edit rather than retry.
    #[error("Allocation neighbors are not adjacent")]
    NotAdjacent,
}

pub type Result<T> = std::result::Result<T, LseqError>;
