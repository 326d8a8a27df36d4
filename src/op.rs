//! Replicable operations.
//!
//! Every local edit produces an [`LseqOp`] for the transport layer to
//! broadcast; applying the same op on any replica via [`Lseq::apply`]
//! converges all replicas that have seen the same set of ops.  The
//! shapes are serde-serializable; the wire format itself is the
//! transport layer's concern.
//!
//! [`Lseq::apply`]: crate::lseq::Lseq::apply

use crate::ident::Path;
use serde::{Deserialize, Serialize};

/// A replicated edit: the path that addresses the element, plus the
/// payload for insertions.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LseqOp {
    /// Insert `ch` at the element slot addressed by `path`.
    Insert { path: Path, ch: char },
    /// Remove the element addressed by `path`.
    ///
    /// Must only be broadcast after the corresponding insert has been
    /// observed; causal delivery is the transport layer's obligation.
    Remove { path: Path },
}

impl LseqOp {
    /// The path this operation addresses.
    pub fn path(&self) -> &Path {
        match self {
            LseqOp::Insert { path, .. } => path,
            LseqOp::Remove { path } => path,
        }
    }
}
