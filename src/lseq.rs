//! The LSEQ document: a replicated sequence of characters.
//!
//! Each replica owns an independent [`Lseq`] identified by a unique
//! site id.  Local edits go through [`insert`](Lseq::insert) and
//! [`remove`](Lseq::remove), which return the [`LseqOp`] to broadcast;
//! remote edits come in through [`apply`](Lseq::apply) (or the
//! per-kind `apply_insert` / `apply_remove`).  Replicas that have
//! applied the same set of ops render the same text, regardless of the
//! order concurrent insertions arrived in.
//!
//! The document is single-threaded: every mutation takes `&mut self`,
//! so one document is one critical section by construction.

use crate::alloc::Allocator;
use crate::error::{LseqError, Result};
use crate::ident::{Ident, Path};
use crate::node::{NodeView, TreeNode};
use crate::op::LseqOp;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

/// A replicated character sequence (LSEQ CRDT).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lseq {
    /// This replica's site id, fixed for the document's lifetime.
    site: u64,
    /// Local logical clock, bumped once per local insertion.
    counter: u64,
    /// Jitter bound for the allocator's boundary placement.
    step: u64,
    /// The allocation tree; the document owns it exclusively.
    root: TreeNode,
    /// RNG driving allocation jitter.
    #[serde(skip, default = "entropy_rng")]
    rng: StdRng,
}

fn entropy_rng() -> StdRng {
    StdRng::from_entropy()
}

impl Lseq {
    /// Create an empty document for `site`, with allocation jitter
    /// bounded by `step`.
    pub fn new(site: u64, step: u64) -> Self {
        Self::with_rng(site, step, entropy_rng())
    }

    /// Like [`new`](Self::new) but with a deterministic RNG seed.
    pub fn with_seed(site: u64, step: u64, seed: u64) -> Self {
        Self::with_rng(site, step, StdRng::seed_from_u64(seed))
    }

    fn with_rng(site: u64, step: u64, rng: StdRng) -> Self {
        let mut root = TreeNode::root();
        root.insert_child(Ident::min(), TreeNode::sentinel());
        root.insert_child(Ident::max(), TreeNode::sentinel());

        Self {
            site,
            counter: 0,
            step,
            root,
            rng,
        }
    }

    /// This replica's site id.
    pub fn site(&self) -> u64 {
        self.site
    }

    /// The configured jitter bound.
    pub fn step(&self) -> u64 {
        self.step
    }

    /// Number of visible elements.
    pub fn len(&self) -> usize {
        self.root.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Find the node at sentinel-inclusive `index`.
    ///
    /// Index 0 is the MIN sentinel, visible elements occupy
    /// `1..=len()`, and `len() + 1` is the MAX sentinel.  Tombstones
    /// never shift these indexes.
    pub fn get_by_index(&self, index: usize) -> Result<NodeView<'_>> {
        let length = self.len();

        if index == 0 {
            return self.get_by_path(&[Ident::min()]);
        }
        if index == length + 1 {
            return self.get_by_path(&[Ident::max()]);
        }
        if index > length {
            return Err(LseqError::IndexOutOfBounds { index, length });
        }

        self.root
            .find_by_index(index - 1, Path::new())
            .map_err(|_| LseqError::IndexOutOfBounds { index, length })
    }

    /// Resolve `path` to its node.
    pub fn get_by_path(&self, path: &[Ident]) -> Result<NodeView<'_>> {
        let node = self
            .root
            .find_by_path(path)
            .ok_or_else(|| LseqError::PathNotFound(path.to_vec()))?;

        Ok(NodeView {
            node,
            path: path.to_vec(),
        })
    }

    /// Insert `ch` so it becomes the visible element at `index`.
    ///
    /// Valid indexes are `0..=len()`.  Returns the operation to
    /// broadcast to other replicas.
    pub fn insert(&mut self, index: usize, ch: char) -> Result<LseqOp> {
        // the two lookups bound the new element's slot: the node at the
        // sentinel-inclusive index and its successor
        let p = self.get_by_index(index)?.path;
        let q = self.get_by_index(index + 1)?.path;

        self.counter += 1;
        let path = Allocator {
            site: self.site,
            counter: self.counter,
            step: self.step,
            rng: &mut self.rng,
        }
        .alloc(&p, &q)?;

        self.apply_insert(&path, ch)?;
        Ok(LseqOp::Insert { path, ch })
    }

    /// Remove the visible element at `index` (valid: `0..len()`).
    ///
    /// Returns the operation to broadcast to other replicas.
    pub fn remove(&mut self, index: usize) -> Result<LseqOp> {
        let length = self.len();
        if index >= length {
            return Err(LseqError::IndexOutOfBounds { index, length });
        }

        // visible element `index` sits at sentinel-inclusive `index + 1`
        let path = self.get_by_index(index + 1)?.path;
        self.apply_remove(&path)?;
        Ok(LseqOp::Remove { path })
    }

    /// Apply a replicated insertion: graft a new element at `path`.
    ///
    /// The transport layer must deduplicate; reapplying the same path
    /// with a different payload overwrites.
    pub fn apply_insert(&mut self, path: &[Ident], ch: char) -> Result<()> {
        let (last, parent_path) = path.split_last().ok_or(LseqError::EmptyPath)?;

        let parent = self
            .root
            .find_by_path_mut(parent_path)
            .ok_or_else(|| LseqError::PathNotFound(parent_path.to_vec()))?;

        parent.insert_child(*last, TreeNode::element(ch));
        Ok(())
    }

    /// Apply a replicated removal: tombstone or prune the node at
    /// `path`.  The corresponding insertion must already have been
    /// applied (causal delivery is the transport layer's obligation).
    pub fn apply_remove(&mut self, path: &[Ident]) -> Result<()> {
        let (last, parent_path) = path.split_last().ok_or(LseqError::EmptyPath)?;

        let parent = self
            .root
            .find_by_path_mut(parent_path)
            .ok_or_else(|| LseqError::PathNotFound(parent_path.to_vec()))?;

        parent.remove_child(last);
        Ok(())
    }

    /// Apply a replicated operation from another replica.
    pub fn apply(&mut self, op: &LseqOp) -> Result<()> {
        match op {
            LseqOp::Insert { path, ch } => self.apply_insert(path, *ch),
            LseqOp::Remove { path } => self.apply_remove(path),
        }
    }

    /// The visible text.
    pub fn render(&self) -> String {
        self.root.render()
    }

    /// Iterate over the visible characters in order.
    pub fn chars(&self) -> Chars<'_> {
        Chars {
            stack: vec![&self.root],
        }
    }

    /// The visible character at `index`, if any.
    pub fn char_at(&self, index: usize) -> Option<char> {
        self.chars().nth(index)
    }

    /// An indented diagram of the allocation tree, for diagnostics.
    pub fn dump_tree(&self) -> String {
        let mut out = String::new();
        self.root.dump_into(&Ident::min(), 0, &mut out);
        out
    }
}

impl std::fmt::Display for Lseq {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

/// Two documents are equal when they render the same text.
impl PartialEq for Lseq {
    fn eq(&self, other: &Self) -> bool {
        self.render() == other.render()
    }
}

impl Eq for Lseq {}

/// Iterator over a document's visible characters (pre-order walk).
pub struct Chars<'a> {
    stack: Vec<&'a TreeNode>,
}

impl<'a> Iterator for Chars<'a> {
    type Item = char;

    fn next(&mut self) -> Option<char> {
        while let Some(node) = self.stack.pop() {
            let children: Vec<_> = node.children_in_order().collect();
            for child in children.into_iter().rev() {
                self.stack.push(child);
            }

            if let Some(ch) = node.payload() {
                return Some(ch);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_remove_scenario() {
        let mut doc = Lseq::with_seed(1, 10, 7);
        assert_eq!(doc.len(), 0);

        doc.insert(0, 'h').unwrap();
        doc.insert(1, 'i').unwrap();
        assert_eq!(doc.render(), "hi");
        assert_eq!(doc.len(), 2);

        doc.remove(0).unwrap();
        assert_eq!(doc.render(), "i");
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_insert_in_middle() {
        let mut doc = Lseq::with_seed(1, 10, 7);
        doc.insert(0, 'h').unwrap();
        doc.insert(1, 'o').unwrap();
        doc.insert(1, 'e').unwrap();
        doc.insert(2, 'l').unwrap();
        doc.insert(3, 'l').unwrap();

        assert_eq!(doc.render(), "hello");
    }

    #[test]
    fn test_boundary_sentinels() {
        let mut doc = Lseq::with_seed(1, 10, 7);
        doc.insert(0, 'a').unwrap();

        let low = doc.get_by_index(0).unwrap();
        assert_eq!(low.path, vec![Ident::min()]);
        assert!(!low.node.is_element());

        let high = doc.get_by_index(doc.len() + 1).unwrap();
        assert_eq!(high.path, vec![Ident::max()]);
        assert!(!high.node.is_element());
    }

    #[test]
    fn test_index_out_of_range() {
        let mut doc = Lseq::with_seed(1, 10, 7);

        assert_eq!(
            doc.get_by_index(2).unwrap_err(),
            LseqError::IndexOutOfBounds {
                index: 2,
                length: 0
            }
        );
        assert!(doc.insert(1, 'x').is_err());
        assert!(doc.remove(0).is_err());
    }

    #[test]
    fn test_remove_never_touches_sentinels() {
        let mut doc = Lseq::with_seed(1, 10, 7);
        doc.insert(0, 'a').unwrap();

        // index len() is past the last element, not the MAX sentinel
        assert_eq!(
            doc.remove(1),
            Err(LseqError::IndexOutOfBounds {
                index: 1,
                length: 1
            })
        );
        assert_eq!(doc.len(), 1);
        assert!(doc.get_by_path(&[Ident::max()]).is_ok());
    }

    #[test]
    fn test_insert_returns_broadcastable_op() {
        let mut doc = Lseq::with_seed(1, 10, 7);
        let op = doc.insert(0, 'z').unwrap();

        match &op {
            LseqOp::Insert { path, ch } => {
                assert_eq!(*ch, 'z');
                assert_eq!(
                    doc.get_by_path(path).unwrap().node.payload(),
                    Some('z')
                );
            }
            other => panic!("expected insert op, got {other:?}"),
        }
    }

    #[test]
    fn test_apply_insert_round_trip() {
        let mut source = Lseq::with_seed(1, 10, 7);
        let mut sink = Lseq::with_seed(2, 10, 8);

        let op = source.insert(0, 'q').unwrap();
        sink.apply(&op).unwrap();

        assert_eq!(sink.render(), "q");
        assert_eq!(
            sink.get_by_path(op.path()).unwrap().node.payload(),
            Some('q')
        );
    }

    #[test]
    fn test_empty_path_is_rejected() {
        let mut doc = Lseq::with_seed(1, 10, 7);

        assert_eq!(doc.apply_insert(&[], 'x'), Err(LseqError::EmptyPath));
        assert_eq!(doc.apply_remove(&[]), Err(LseqError::EmptyPath));
    }

    #[test]
    fn test_apply_with_missing_parent_fails() {
        let mut doc = Lseq::with_seed(1, 10, 7);
        let orphan = vec![Ident::new(100, 2, 1), Ident::new(5, 2, 2)];

        assert_eq!(
            doc.apply_insert(&orphan, 'x'),
            Err(LseqError::PathNotFound(vec![Ident::new(100, 2, 1)]))
        );
        assert_eq!(
            doc.apply_remove(&orphan),
            Err(LseqError::PathNotFound(vec![Ident::new(100, 2, 1)]))
        );
    }

    #[test]
    fn test_chars_iteration() {
        let mut doc = Lseq::with_seed(1, 10, 7);
        for (i, ch) in "abc".chars().enumerate() {
            doc.insert(i, ch).unwrap();
        }

        assert_eq!(doc.chars().collect::<String>(), "abc");
        assert_eq!(doc.char_at(1), Some('b'));
        assert_eq!(doc.char_at(3), None);
    }

    #[test]
    fn test_display_matches_render() {
        let mut doc = Lseq::with_seed(1, 10, 7);
        doc.insert(0, 'x').unwrap();

        assert_eq!(doc.to_string(), doc.render());
    }

    #[test]
    fn test_dump_tree_shows_structure() {
        let mut doc = Lseq::with_seed(1, 10, 7);
        doc.insert(0, 'a').unwrap();

        let dump = doc.dump_tree();
        assert!(dump.starts_with("root\n"));
        assert!(dump.contains('a'));
    }
}
