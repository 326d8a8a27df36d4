//! Tree-edge identifiers and paths.
//!
//! An [`Ident`] keys one edge of the allocation tree.  The total order
//! over identifiers — lexicographic on (pos, site, counter) — is what
//! induces the total order over sequence elements, so two replicas that
//! compare the same identifiers always agree on element order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Largest position usable at any tree level.
pub const MAX_POS: u64 = i32::MAX as u64;

/// Largest site (replica) identifier.
pub const MAX_SITE: u64 = 32_767;

/// Largest per-site counter value, used only by the [`Ident::max`] sentinel.
pub const MAX_COUNTER: u64 = u64::MAX;

/// Identifier for one edge of the allocation tree.
///
/// The (site, counter) pair makes identifiers globally unique: sites are
/// unique per replica and each replica bumps its counter once per local
/// insertion.  The position carries the actual ordering weight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ident {
    /// Position within the level's numeric range.
    pub pos: u64,
    /// The site (replica) that allocated this identifier.
    pub site: u64,
    /// The allocating site's local counter at allocation time.
    pub counter: u64,
}

impl Ident {
    pub fn new(pos: u64, site: u64, counter: u64) -> Self {
        Self { pos, site, counter }
    }

    /// The smallest possible identifier, keying the low sentinel child.
    pub fn min() -> Self {
        Self::new(0, 0, 0)
    }

    /// The largest possible identifier, keying the high sentinel child.
    ///
    /// Depth-independent: every level shares the same positional range.
    pub fn max() -> Self {
        Self::new(MAX_POS, MAX_SITE, MAX_COUNTER)
    }
}

impl PartialOrd for Ident {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ident {
    fn cmp(&self, other: &Self) -> Ordering {
        // Lexicographic: position decides, site and counter tie-break
        self.pos
            .cmp(&other.pos)
            .then_with(|| self.site.cmp(&other.site))
            .then_with(|| self.counter.cmp(&other.counter))
    }
}

/// A root-to-node sequence of identifiers: the globally comparable
/// address of an element.  Lexicographic path order is element order.
pub type Path = Vec<Ident>;
