//! Identifier allocation between two neighboring paths.
//!
//! Given the paths of two sequence-adjacent nodes, the allocator
//! manufactures a fresh path that sorts strictly between them.  It
//! walks the two paths depth by depth until they diverge, then either
//! claims numeric room at that depth or descends one level deeper,
//! where a full positional range is available again — so the identifier
//! space never exhausts, at the cost of one extra path component.
//!
//! Placement within a numeric gap alternates its anchor between the low
//! and high boundary by depth parity (the LSEQ boundary+/boundary−
//! strategy).  Anchoring every depth to the same end would let
//! sustained insertion at one end of the document grow paths without
//! bound.

use crate::error::{LseqError, Result};
use crate::ident::{Ident, Path, MAX_POS};
use rand::rngs::StdRng;
use rand::Rng;

/// One allocation's worth of document state: the local site, the
/// counter value reserved for this allocation, the configured jitter
/// bound, and the document's RNG.
pub(crate) struct Allocator<'a> {
    pub site: u64,
    pub counter: u64,
    pub step: u64,
    pub rng: &'a mut StdRng,
}

impl Allocator<'_> {
    /// Compute a path strictly between `p` and `q`.
    ///
    /// Callers guarantee `p < q` and that no live element's path lies
    /// strictly between them.  If the divergence search exhausts both
    /// paths, that guarantee was broken and [`LseqError::NotAdjacent`]
    /// is returned.
    pub fn alloc(&mut self, p: &[Ident], q: &[Ident]) -> Result<Path> {
        for depth in 0..p.len().max(q.len()) {
            let pc = component(p, depth, Ident::min());
            let qc = component(q, depth, Ident::max());
            let gap = pc.pos.abs_diff(qc.pos);

            if gap == 0 && pc.site == qc.site {
                // identical identifiers at this depth, diverge deeper
                continue;
            }

            if gap == 0 {
                if pc.site < self.site && self.site < qc.site {
                    // no positional room, but the local site id sorts
                    // between the neighbors' site ids
                    return Ok(rebase(p, depth, Ident::new(pc.pos, self.site, self.counter)));
                }
                return Ok(self.child_of(p));
            }

            if gap == 1 {
                // the positions are adjacent integers; the site id can
                // still slot the new identifier after pc or before qc
                if pc.site < self.site {
                    return Ok(rebase(p, depth, Ident::new(pc.pos, self.site, self.counter)));
                }
                if self.site < qc.site {
                    return Ok(rebase(p, depth, Ident::new(qc.pos, self.site, self.counter)));
                }
                return Ok(self.child_of(p));
            }

            // true numeric room between pc.pos and qc.pos
            let id = self.ident_between(pc.pos, qc.pos, depth + 1);
            return Ok(rebase(p, depth, id));
        }

        // p and q agree down to the shorter's length: they were never
        // adjacent, a caller precondition is broken
        Err(LseqError::NotAdjacent)
    }

    /// Descend below `p`, placing the new component in the full
    /// positional range of the deeper level.
    fn child_of(&mut self, p: &[Ident]) -> Path {
        let mut path: Path = p.to_vec();
        path.push(self.ident_between(0, MAX_POS, path.len() + 1));
        path
    }

    /// Pick a position strictly inside `(lo, hi)` for a component at
    /// 1-based `depth`, claiming at most `step` of the gap.  Odd depths
    /// anchor to the low boundary, even depths to the high one.
    fn ident_between(&mut self, lo: u64, hi: u64, depth: usize) -> Ident {
        let span = self.step.min(hi - lo - 1).max(1);
        let jitter = self.rng.gen_range(1..=span);

        let pos = if depth % 2 == 1 {
            lo + jitter
        } else {
            hi - jitter
        };

        Ident::new(pos, self.site, self.counter)
    }
}

/// The path component at `depth`, or the given bound once the path is
/// exhausted.
fn component(path: &[Ident], depth: usize, bound: Ident) -> Ident {
    path.get(depth).copied().unwrap_or(bound)
}

/// Truncate `p` to `depth` components and append `id` as the new final
/// component.
fn rebase(p: &[Ident], depth: usize, id: Ident) -> Path {
    let mut path: Path = p[..depth.min(p.len())].to_vec();
    path.push(id);
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn alloc_with(site: u64, step: u64, p: &[Ident], q: &[Ident]) -> Result<Path> {
        let mut rng = StdRng::seed_from_u64(42);
        Allocator {
            site,
            counter: 7,
            step,
            rng: &mut rng,
        }
        .alloc(p, q)
    }

    #[test]
    fn test_first_allocation_anchors_low() {
        let path = alloc_with(1, 10, &[Ident::min()], &[Ident::max()]).unwrap();

        assert_eq!(path.len(), 1);
        assert!(path[0].pos >= 1 && path[0].pos <= 10);
        assert_eq!(path[0].site, 1);
        assert_eq!(path[0].counter, 7);
    }

    #[test]
    fn test_numeric_room_stays_strictly_inside() {
        let p = vec![Ident::new(10, 1, 1)];
        let q = vec![Ident::new(20, 1, 2)];

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let path = Allocator {
                site: 3,
                counter: 1,
                step: 100,
                rng: &mut rng,
            }
            .alloc(&p, &q)
            .unwrap();

            assert!(path[0].pos > 10 && path[0].pos < 20);
        }
    }

    #[test]
    fn test_equal_positions_slot_by_site() {
        let p = vec![Ident::new(5, 1, 1)];
        let q = vec![Ident::new(5, 9, 1)];

        let path = alloc_with(4, 10, &p, &q).unwrap();
        assert_eq!(path, vec![Ident::new(5, 4, 7)]);
    }

    #[test]
    fn test_equal_positions_without_site_room_go_deeper() {
        let p = vec![Ident::new(5, 3, 1)];
        let q = vec![Ident::new(5, 4, 1)];

        // site 9 does not sort between sites 3 and 4
        let path = alloc_with(9, 10, &p, &q).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path[0], p[0]);
        assert_eq!(path[1].site, 9);
    }

    #[test]
    fn test_adjacent_positions_slot_after_p() {
        let p = vec![Ident::new(5, 1, 1)];
        let q = vec![Ident::new(6, 9, 1)];

        let path = alloc_with(4, 10, &p, &q).unwrap();
        assert_eq!(path, vec![Ident::new(5, 4, 7)]);
        assert!(p < path && path < q);
    }

    #[test]
    fn test_adjacent_positions_slot_before_q() {
        let p = vec![Ident::new(5, 3, 1)];
        let q = vec![Ident::new(6, 2, 1)];

        let path = alloc_with(1, 10, &p, &q).unwrap();
        assert_eq!(path, vec![Ident::new(6, 1, 7)]);
        assert!(p < path && path < q);
    }

    #[test]
    fn test_adjacent_positions_without_site_room_go_deeper() {
        let p = vec![Ident::new(5, 3, 1)];
        let q = vec![Ident::new(6, 1, 1)];

        let path = alloc_with(2, 10, &p, &q).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path[0], p[0]);
        assert!(p < path && path < q);
    }

    #[test]
    fn test_second_level_anchors_high() {
        let p = vec![Ident::new(5, 3, 1)];
        let q = vec![Ident::new(5, 4, 1)];

        let path = alloc_with(9, 10, &p, &q).unwrap();
        // depth 2 is boundary−: anchored to the top of the fresh range
        assert!(path[1].pos >= MAX_POS - 10);
    }

    #[test]
    fn test_divergence_at_deeper_level() {
        let shared = Ident::new(5, 1, 1);
        let p = vec![shared, Ident::new(10, 1, 2)];
        let q = vec![shared, Ident::new(40, 2, 1)];

        let path = alloc_with(3, 10, &p, &q).unwrap();
        assert_eq!(path.len(), 2);
        assert_eq!(path[0], shared);
        assert!(path[1].pos < 40 && path[1].pos > 10);
    }

    #[test]
    fn test_identical_paths_are_not_adjacent() {
        let p = vec![Ident::new(5, 1, 1)];

        assert_eq!(alloc_with(2, 10, &p, &p), Err(LseqError::NotAdjacent));
    }
}
