//! # mdcs-lseq
//!
//! LSEQ sequence CRDT for collaborative text editing.
//!
//! This crate provides:
//! - A replicated character sequence ([`Lseq`]) that converges across
//!   replicas without coordination
//! - Dense identifier allocation with the LSEQ boundary+/boundary−
//!   strategy, so concurrent inserts at one position never run out of
//!   room
//! - Tombstoning that keeps every ever-allocated path valid
//! - Serde-serializable operation shapes ([`LseqOp`]) for any transport
//!
//! ## Example
//!
//! ```rust
//! use mdcs_lseq::Lseq;
//!
//! let mut alice = Lseq::new(1, 10);
//! let mut bob = Lseq::new(2, 10);
//!
//! // Alice edits locally and broadcasts the resulting ops
//! let op_h = alice.insert(0, 'h').unwrap();
//! let op_i = alice.insert(1, 'i').unwrap();
//!
//! // Bob applies them in any order for inserts at distinct paths
//! bob.apply(&op_i).unwrap();
//! bob.apply(&op_h).unwrap();
//!
//! assert_eq!(alice.render(), "hi");
//! assert_eq!(alice, bob);
//! ```

mod alloc;
pub mod error;
pub mod ident;
pub mod lseq;
pub mod node;
pub mod op;

pub use error::{LseqError, Result};
pub use ident::{Ident, Path, MAX_COUNTER, MAX_POS, MAX_SITE};
pub use lseq::{Chars, Lseq};
pub use node::{NodeView, TreeNode};
pub use op::LseqOp;
