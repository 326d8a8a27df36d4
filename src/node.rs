//! The allocation tree: blind nodes and path-qualified views.
//!
//! A [`TreeNode`] is "blind" — it does not know the path that reaches it
//! from the root.  Paths are recomputed during traversal and returned in
//! transient [`NodeView`]s, never stored inside the tree, so the tree
//! stays a plain owning structure with no back-edges.

use crate::ident::{Ident, Path};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Write;

/// A node of the allocation tree.
///
/// The payload is optional: structural nodes (root, the two sentinels)
/// and tombstoned elements carry none.  Children live in a map keyed by
/// identifier, with a separate `order` list of the keys kept in
/// ascending identifier order (the map's own iteration order is
/// arbitrary).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// The element payload, or `None` for structural/tombstoned nodes.
    ch: Option<char>,
    /// Exactly one node in the tree is the root; it never holds a payload.
    is_root: bool,
    /// Children keyed by identifier.
    children: HashMap<Ident, TreeNode>,
    /// The children's keys in ascending identifier order.
    order: Vec<Ident>,
}

/// A transient pairing of a tree node with the path that locates it.
///
/// Views borrow from the document and must not outlive a mutation.
#[derive(Debug)]
pub struct NodeView<'a> {
    pub node: &'a TreeNode,
    pub path: Path,
}

impl TreeNode {
    /// Create the tree root.  Never carries a payload.
    pub fn root() -> Self {
        Self {
            ch: None,
            is_root: true,
            children: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Create a live element node holding `ch`.
    pub fn element(ch: char) -> Self {
        Self {
            ch: Some(ch),
            is_root: false,
            children: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Create a payload-less boundary node (the MIN/MAX sentinels).
    pub fn sentinel() -> Self {
        Self {
            ch: None,
            is_root: false,
            children: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// A live sequence element: not the root and payload present.
    pub fn is_element(&self) -> bool {
        !self.is_root && self.ch.is_some()
    }

    /// The element payload, if this node is a live element.
    pub fn payload(&self) -> Option<char> {
        if self.is_root {
            None
        } else {
            self.ch
        }
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    /// Number of live elements in this subtree, this node included.
    pub fn len(&self) -> usize {
        let mut count = usize::from(self.is_element());
        for child in self.children.values() {
            count += child.len();
        }
        count
    }

    /// True when the subtree holds no live element.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Insert `node` under the key `id`, keeping `order` sorted.
    ///
    /// An existing child under the same key is overwritten; the
    /// allocator guarantees generated identifiers never collide.
    pub fn insert_child(&mut self, id: Ident, node: TreeNode) {
        if self.children.insert(id, node).is_some() {
            return; // key already present in `order`
        }

        let at = self
            .order
            .iter()
            .position(|key| id < *key)
            .unwrap_or(self.order.len());
        self.order.insert(at, id);
    }

    /// Remove the child keyed `id`; no-op if absent.
    ///
    /// A child that still has children of its own is only tombstoned
    /// (payload cleared), so that paths through it stay valid forever.
    /// A childless child is removed from both the map and `order`.
    pub fn remove_child(&mut self, id: &Ident) {
        let Some(child) = self.children.get_mut(id) else {
            return;
        };

        if child.has_children() {
            child.ch = None;
            return;
        }

        self.children.remove(id);
        self.order.retain(|key| key != id);
    }

    /// Find the `index`-th live element (0-based) in this subtree, in
    /// render order.
    ///
    /// Only live elements consume index units; tombstones and
    /// structural nodes are traversed but not counted, so indexes stay
    /// stable across removals.  `Err` carries the index remaining after
    /// this subtree has been consumed, so the caller can continue with
    /// the next sibling.
    pub fn find_by_index(&self, mut index: usize, prefix: Path) -> Result<NodeView<'_>, usize> {
        if self.is_element() {
            if index == 0 {
                return Ok(NodeView {
                    node: self,
                    path: prefix,
                });
            }
            index -= 1;
        }

        for id in &self.order {
            let Some(child) = self.children.get(id) else {
                continue;
            };

            let mut child_path = prefix.clone();
            child_path.push(*id);

            match child.find_by_index(index, child_path) {
                Ok(view) => return Ok(view),
                Err(remaining) => index = remaining,
            }
        }

        Err(index)
    }

    /// Descend along `path`; `None` if any component is absent.
    pub fn find_by_path(&self, path: &[Ident]) -> Option<&TreeNode> {
        match path.split_first() {
            None => Some(self),
            Some((head, rest)) => self.children.get(head)?.find_by_path(rest),
        }
    }

    /// Mutable variant of [`find_by_path`](Self::find_by_path).
    pub fn find_by_path_mut(&mut self, path: &[Ident]) -> Option<&mut TreeNode> {
        match path.split_first() {
            None => Some(self),
            Some((head, rest)) => self.children.get_mut(head)?.find_by_path_mut(rest),
        }
    }

    /// The children in ascending key order.
    pub fn children_in_order(&self) -> impl Iterator<Item = &TreeNode> + '_ {
        self.order.iter().filter_map(|id| self.children.get(id))
    }

    /// Append this subtree's visible text to `out`: own payload first,
    /// then each child in ascending key order.  This flattening defines
    /// the sequence as observed by users.
    pub fn render_into(&self, out: &mut String) {
        if let Some(ch) = self.payload() {
            out.push(ch);
        }

        for id in &self.order {
            if let Some(child) = self.children.get(id) {
                child.render_into(out);
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    /// Append an indented diagram of this subtree to `out`, for
    /// diagnostics.  Tombstones and sentinels print as `·`.
    pub(crate) fn dump_into(&self, id: &Ident, depth: usize, out: &mut String) {
        for _ in 0..depth {
            out.push_str("  ");
        }

        if self.is_root {
            out.push_str("root\n");
        } else {
            let payload = self.payload().unwrap_or('·');
            let _ = writeln!(out, "({}, {}, {}) {}", id.pos, id.site, id.counter, payload);
        }

        for child_id in &self.order {
            if let Some(child) = self.children.get(child_id) {
                child.dump_into(child_id, depth + 1, out);
            }
        }
    }
}
