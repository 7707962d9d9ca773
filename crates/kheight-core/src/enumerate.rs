//! Enumeration of k-heights on a vertex set.
//!
//! [`KHeights`] walks `{0..k}^n` in lexicographic product order and yields
//! exactly the tuples satisfying every edge constraint `|x[u] - x[v]| <= 1`.
//! Positions are assigned left to right and an edge is checked as soon as
//! both of its endpoints carry a label, so invalid prefixes are pruned
//! without changing the set or the order of the results.

use smallvec::{smallvec, SmallVec};

use crate::height::{within_one, Height, Labeling};

/// Lazy iterator over all k-heights of `n` vertices under an edge set.
///
/// Deterministic: two iterators built from the same parameters yield the same
/// sequence.
#[derive(Debug, Clone)]
pub struct KHeights {
    k: Height,
    /// For each position, the earlier positions it shares an edge with.
    earlier: Vec<SmallVec<[usize; 4]>>,
    current: Labeling,
    started: bool,
    exhausted: bool,
}

impl KHeights {
    /// Creates the iterator for labels in `0..=k` on vertices `0..n`.
    ///
    /// # Panics
    /// Panics if an edge references an index `>= n`. Callers validate edge
    /// lists through [`Topology`](crate::topology::Topology) first.
    pub fn new(k: Height, n: usize, edges: &[(usize, usize)]) -> Self {
        let mut earlier: Vec<SmallVec<[usize; 4]>> = vec![SmallVec::new(); n];
        for &(u, v) in edges {
            assert!(u < n && v < n, "edge ({}, {}) out of range for {} vertices", u, v, n);
            if u == v {
                continue;
            }
            let (lo, hi) = if u < v { (u, v) } else { (v, u) };
            if !earlier[hi].contains(&lo) {
                earlier[hi].push(lo);
            }
        }

        KHeights {
            k,
            earlier,
            current: smallvec![0; n],
            started: false,
            exhausted: false,
        }
    }

    fn len(&self) -> usize {
        self.current.len()
    }

    /// Whether the label at `pos` agrees with every earlier neighbor.
    fn fits(&self, pos: usize) -> bool {
        let h = self.current[pos];
        self.earlier[pos]
            .iter()
            .all(|&u| within_one(self.current[u], h))
    }

    /// Advances to the next candidate label at `pos`, backing up over
    /// positions whose labels are exhausted. Returns `false` once the whole
    /// product has been walked.
    fn bump(&mut self, pos: &mut usize) -> bool {
        loop {
            if self.current[*pos] < self.k {
                self.current[*pos] += 1;
                return true;
            }
            if *pos == 0 {
                return false;
            }
            self.current[*pos] = 0;
            *pos -= 1;
        }
    }
}

impl Iterator for KHeights {
    type Item = Labeling;

    fn next(&mut self) -> Option<Labeling> {
        if self.exhausted {
            return None;
        }

        let n = self.len();
        let mut pos = if self.started {
            if n == 0 {
                self.exhausted = true;
                return None;
            }
            let mut pos = n - 1;
            if !self.bump(&mut pos) {
                self.exhausted = true;
                return None;
            }
            pos
        } else {
            self.started = true;
            if n == 0 {
                // The empty product has exactly one element.
                return Some(Labeling::new());
            }
            0
        };

        loop {
            if self.fits(pos) {
                if pos + 1 == n {
                    return Some(self.current.clone());
                }
                pos += 1;
                self.current[pos] = 0;
            } else if !self.bump(&mut pos) {
                self.exhausted = true;
                return None;
            }
        }
    }
}

/// Collects every k-height of `n` vertices under `edges`, in lexicographic order.
pub fn enumerate(k: Height, n: usize, edges: &[(usize, usize)]) -> Vec<Labeling> {
    KHeights::new(k, n, edges).collect()
}

/// Edges of a path on `n` vertices: `(0, 1), (1, 2), ...`.
pub fn path_edges(n: usize) -> Vec<(usize, usize)> {
    (1..n).map(|i| (i - 1, i)).collect()
}
