//! Block divergence: the largest expected-weight increase over all cover
//! relations at one boundary vertex.
//!
//! A boundary constraint `c` is augmentable at `v` when `c[v] < k` and no
//! boundary neighbor `u` of `v` has `c[v] - c[u] == 1`. Its cover relation is
//! `(c, c')` with `c'` equal to `c` except `c'[v] = c[v] + 1`. Both sides are
//! handed to an [`ExpectationEngine`]; relations where either side is
//! unsatisfiable are skipped.
//!
//! The maximum is a fold with an associative, commutative combiner, so the
//! scan runs on rayon workers by default and the result does not depend on
//! traversal order. Ties on the value go to the lexicographically smallest
//! lower constraint, which keeps the reported maximizer deterministic too.
//! A sequential traversal with an optional seeded shuffle and periodic
//! progress logging is available for previewing long scans, and a target
//! lower bound can stop either traversal early.

use std::sync::atomic::{AtomicBool, Ordering};

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::block::BlockModel;
use crate::error::BlockError;
use crate::expectation::{ConditionalExpectation, ExpectationEngine};
use crate::height::{Height, Labeling};
use crate::id::BoundaryVertex;
use crate::topology::BoundaryGraph;

/// How boundary constraints are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Traversal {
    /// Spread over rayon workers; partial maxima are combined at the end.
    #[default]
    Parallel,
    /// One constraint at a time on the calling thread.
    Sequential {
        /// Visit constraints in a ChaCha8 permutation seeded with this value.
        shuffle_seed: Option<u64>,
        /// Log the best value found so far every this many constraints.
        progress_every: Option<usize>,
    },
}

/// Options for a divergence scan.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DivergenceOptions {
    pub traversal: Traversal,
    /// Stop once a cover relation with a difference above this value is found.
    /// The reported value is then only a lower bound.
    pub target: Option<f64>,
}

/// Result of a divergence scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Divergence {
    /// The augmentation vertex.
    pub vertex: BoundaryVertex,
    /// The block divergence (or a lower bound if `target_reached`).
    pub value: f64,
    /// Lower side of a cover relation attaining `value`.
    pub maximizer: Labeling,
    /// Boundary constraints visited.
    pub scanned: u64,
    /// Cover relations with both sides satisfiable.
    pub evaluated: u64,
    /// Cover relations skipped because a side had no admissible filling.
    pub skipped: u64,
    /// The scan stopped early because `target` was exceeded.
    pub target_reached: bool,
}

/// Augmentability test and cover-relation construction for one vertex.
#[derive(Debug, Clone)]
struct Augmentation {
    k: Height,
    vertex: usize,
    neighbors: Vec<usize>,
}

impl Augmentation {
    fn new(boundary: &BoundaryGraph, vertex: BoundaryVertex) -> Self {
        Augmentation {
            k: boundary.k(),
            vertex: vertex.index(),
            neighbors: boundary.neighbors(vertex).into_iter().map(BoundaryVertex::index).collect(),
        }
    }

    /// The upper side of the cover relation starting at `lower`, if `lower`
    /// is augmentable.
    fn raise(&self, lower: &[Height]) -> Option<Labeling> {
        let h = lower[self.vertex];
        if h >= self.k {
            return None;
        }
        // A neighbor one below would end up two below.
        if self.neighbors.iter().any(|&u| h.checked_sub(lower[u]) == Some(1)) {
            return None;
        }
        let mut upper = Labeling::from_slice(lower);
        upper[self.vertex] = h + 1;
        Some(upper)
    }
}

/// What one boundary constraint contributed to the scan.
enum Step {
    NotAugmentable,
    Skipped,
    Difference(f64),
}

fn step<E: ExpectationEngine>(augmentation: &Augmentation, engine: &E, lower: &[Height]) -> Step {
    let Some(upper) = augmentation.raise(lower) else {
        return Step::NotAugmentable;
    };
    let Some(below) = engine.evaluate(lower).mean() else {
        return Step::Skipped;
    };
    match engine.evaluate(&upper).mean() {
        Some(above) => Step::Difference(above - below),
        None => Step::Skipped,
    }
}

/// Partial result of a scan; combined with [`Scan::merge`].
#[derive(Debug, Clone, Default)]
struct Scan {
    best: Option<(f64, Labeling)>,
    scanned: u64,
    evaluated: u64,
    skipped: u64,
}

impl Scan {
    fn record(&mut self, lower: &[Height], step: Step) {
        self.scanned += 1;
        match step {
            Step::NotAugmentable => {}
            Step::Skipped => self.skipped += 1,
            Step::Difference(diff) => {
                self.evaluated += 1;
                // Only strict increases count; the floor is zero.
                if diff > 0.0 && self.improves(diff, lower) {
                    self.best = Some((diff, Labeling::from_slice(lower)));
                }
            }
        }
    }

    fn improves(&self, diff: f64, lower: &[Height]) -> bool {
        match &self.best {
            None => true,
            Some((value, maximizer)) => {
                diff > *value || (diff == *value && lower < maximizer.as_slice())
            }
        }
    }

    fn best_value(&self) -> f64 {
        self.best.as_ref().map_or(0.0, |(value, _)| *value)
    }

    fn merge(mut self, other: Scan) -> Scan {
        self.scanned += other.scanned;
        self.evaluated += other.evaluated;
        self.skipped += other.skipped;
        if let Some((value, maximizer)) = other.best {
            if self.improves(value, &maximizer) {
                self.best = Some((value, maximizer));
            }
        }
        self
    }
}

/// Block divergence of `model` at `vertex`, evaluated by `engine`, scanning
/// every boundary constraint in parallel.
pub fn block_divergence<E: ExpectationEngine>(
    model: &BlockModel,
    vertex: BoundaryVertex,
    engine: &E,
) -> Result<Divergence, BlockError> {
    block_divergence_with(model, vertex, engine, &DivergenceOptions::default())
}

/// [`block_divergence`] with explicit traversal options.
pub fn block_divergence_with<E: ExpectationEngine>(
    model: &BlockModel,
    vertex: BoundaryVertex,
    engine: &E,
    options: &DivergenceOptions,
) -> Result<Divergence, BlockError> {
    boundary_divergence(
        model.boundary(),
        vertex,
        model.boundary_constraints().iter(),
        engine,
        options,
    )
}

impl BlockModel {
    /// Block divergence at `vertex` with the brute-force engine.
    pub fn block_divergence(
        &self,
        vertex: BoundaryVertex,
        options: &DivergenceOptions,
    ) -> Result<Divergence, BlockError> {
        block_divergence_with(self, vertex, &ConditionalExpectation::new(self), options)
    }
}

/// Block divergence at `vertex` over an arbitrary stream of boundary
/// constraints of `boundary`.
///
/// Returns [`BlockError::AugmentationVertexOutOfRange`] if `vertex` is not on
/// the boundary, [`BlockError::InvalidConstraint`] if `engine` expects a
/// different boundary size, and [`BlockError::DegenerateAugmentation`] if no
/// cover relation yields a positive difference.
pub fn boundary_divergence<I, C, E>(
    boundary: &BoundaryGraph,
    vertex: BoundaryVertex,
    constraints: I,
    engine: &E,
    options: &DivergenceOptions,
) -> Result<Divergence, BlockError>
where
    I: Iterator<Item = C> + Send,
    C: AsRef<[Height]> + Send,
    E: ExpectationEngine,
{
    if !boundary.contains(vertex) {
        return Err(BlockError::AugmentationVertexOutOfRange {
            vertex,
            bound: boundary.vertex_count() as u32,
        });
    }
    if engine.boundary_len() != boundary.vertex_count() {
        return Err(BlockError::InvalidConstraint {
            reason: format!(
                "engine expects {} boundary labels, boundary has {} vertices",
                engine.boundary_len(),
                boundary.vertex_count()
            ),
        });
    }

    let augmentation = Augmentation::new(boundary, vertex);
    let (scan, target_reached) = match options.traversal {
        Traversal::Parallel => scan_parallel(&augmentation, constraints, engine, options.target),
        Traversal::Sequential {
            shuffle_seed,
            progress_every,
        } => scan_sequential(
            &augmentation,
            constraints,
            engine,
            options.target,
            shuffle_seed,
            progress_every,
        ),
    };

    tracing::debug!(
        vertex = %vertex,
        scanned = scan.scanned,
        evaluated = scan.evaluated,
        skipped = scan.skipped,
        best = scan.best_value(),
        target_reached,
        "divergence scan finished"
    );

    match scan.best {
        Some((value, maximizer)) => Ok(Divergence {
            vertex,
            value,
            maximizer,
            scanned: scan.scanned,
            evaluated: scan.evaluated,
            skipped: scan.skipped,
            target_reached,
        }),
        None => Err(BlockError::DegenerateAugmentation { vertex }),
    }
}

fn exceeds(target: Option<f64>, value: f64) -> bool {
    target.is_some_and(|t| value > t)
}

fn scan_parallel<I, C, E>(
    augmentation: &Augmentation,
    constraints: I,
    engine: &E,
    target: Option<f64>,
) -> (Scan, bool)
where
    I: Iterator<Item = C> + Send,
    C: AsRef<[Height]> + Send,
    E: ExpectationEngine,
{
    let stop = AtomicBool::new(false);
    // `take_any_while` also stops the bridge from pulling further constraints.
    let scan = constraints
        .par_bridge()
        .take_any_while(|_| !stop.load(Ordering::Relaxed))
        .fold(Scan::default, |mut scan, lower| {
            let lower = lower.as_ref();
            scan.record(lower, step(augmentation, engine, lower));
            if exceeds(target, scan.best_value()) {
                stop.store(true, Ordering::Relaxed);
            }
            scan
        })
        .reduce(Scan::default, Scan::merge);
    (scan, stop.into_inner())
}

fn scan_sequential<I, C, E>(
    augmentation: &Augmentation,
    constraints: I,
    engine: &E,
    target: Option<f64>,
    shuffle_seed: Option<u64>,
    progress_every: Option<usize>,
) -> (Scan, bool)
where
    I: Iterator<Item = C>,
    C: AsRef<[Height]>,
    E: ExpectationEngine,
{
    let mut scan = Scan::default();
    let progress_every = progress_every.filter(|&n| n > 0);

    let target_reached = match shuffle_seed {
        Some(seed) => {
            let mut items: Vec<C> = constraints.collect();
            items.shuffle(&mut ChaCha8Rng::seed_from_u64(seed));
            let total = items.len();
            visit(&mut scan, augmentation, items.into_iter(), engine, target, progress_every, Some(total))
        }
        None => visit(&mut scan, augmentation, constraints, engine, target, progress_every, None),
    };

    (scan, target_reached)
}

/// Feeds `constraints` into `scan` in order. Returns whether `target` was exceeded.
fn visit<I, C, E>(
    scan: &mut Scan,
    augmentation: &Augmentation,
    constraints: I,
    engine: &E,
    target: Option<f64>,
    progress_every: Option<usize>,
    total: Option<usize>,
) -> bool
where
    I: Iterator<Item = C>,
    C: AsRef<[Height]>,
    E: ExpectationEngine,
{
    for (r, lower) in constraints.enumerate() {
        if progress_every.is_some_and(|every| r % every == 0) {
            tracing::info!(
                processed = r,
                total = ?total,
                best = scan.best_value(),
                "scanning boundary constraints"
            );
        }
        let lower = lower.as_ref();
        scan.record(lower, step(augmentation, engine, lower));
        if exceeds(target, scan.best_value()) {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::BlockVertex;
    use crate::topology::Topology;
    use std::sync::atomic::AtomicUsize;

    fn pendant(k: Height) -> BlockModel {
        BlockModel::new(Topology {
            k,
            number_vertices: 1,
            edges: vec![],
            number_boundary_vertices: 1,
            boundary_edges: vec![],
            block_boundary_edges: vec![(BlockVertex(0), BoundaryVertex(0))],
        })
        .unwrap()
    }

    #[test]
    fn pendant_vertex_divergence_is_one_half() {
        let model = pendant(2);
        let divergence = model
            .block_divergence(BoundaryVertex(0), &DivergenceOptions::default())
            .unwrap();
        assert_eq!(divergence.value, 0.5);
        // 0 -> 1 and 1 -> 2 tie; the smaller lower side wins.
        assert_eq!(divergence.maximizer.as_slice(), &[0]);
        assert_eq!(divergence.scanned, 3);
        assert_eq!(divergence.evaluated, 2);
        assert_eq!(divergence.skipped, 0);
        assert!(!divergence.target_reached);
    }

    #[test]
    fn zero_difference_is_degenerate() {
        // With k = 1 the boundary cannot exclude any filling.
        let model = pendant(1);
        assert_eq!(
            model.block_divergence(BoundaryVertex(0), &DivergenceOptions::default()),
            Err(BlockError::DegenerateAugmentation {
                vertex: BoundaryVertex(0)
            })
        );
    }

    #[test]
    fn vertex_outside_boundary_is_rejected() {
        let model = pendant(2);
        assert!(matches!(
            model.block_divergence(BoundaryVertex(1), &DivergenceOptions::default()),
            Err(BlockError::AugmentationVertexOutOfRange { bound: 1, .. })
        ));
    }

    #[test]
    fn raise_respects_k_and_higher_neighbors() {
        let boundary = BoundaryGraph::new(
            2,
            2,
            &[(BoundaryVertex(0), BoundaryVertex(1))],
        )
        .unwrap();
        let augmentation = Augmentation::new(&boundary, BoundaryVertex(0));
        assert_eq!(augmentation.raise(&[0, 0]).unwrap().as_slice(), &[1, 0]);
        assert_eq!(augmentation.raise(&[0, 1]).unwrap().as_slice(), &[1, 1]);
        assert!(augmentation.raise(&[1, 0]).is_none());
        assert!(augmentation.raise(&[2, 2]).is_none());
    }

    #[test]
    fn traversals_agree() {
        let model = BlockModel::new(Topology {
            k: 3,
            number_vertices: 4,
            edges: vec![
                (BlockVertex(0), BlockVertex(1)),
                (BlockVertex(1), BlockVertex(2)),
                (BlockVertex(2), BlockVertex(3)),
                (BlockVertex(3), BlockVertex(0)),
            ],
            number_boundary_vertices: 4,
            boundary_edges: vec![],
            block_boundary_edges: (0..4).map(|i| (BlockVertex(i), BoundaryVertex(i))).collect(),
        })
        .unwrap();

        let parallel = model
            .block_divergence(BoundaryVertex(0), &DivergenceOptions::default())
            .unwrap();
        for traversal in [
            Traversal::Sequential {
                shuffle_seed: None,
                progress_every: None,
            },
            Traversal::Sequential {
                shuffle_seed: Some(7),
                progress_every: Some(50),
            },
        ] {
            let options = DivergenceOptions {
                traversal,
                target: None,
            };
            let sequential = model.block_divergence(BoundaryVertex(0), &options).unwrap();
            assert_eq!(sequential, parallel);
        }
    }

    #[test]
    fn target_stops_the_scan_early() {
        let model = pendant(2);
        let options = DivergenceOptions {
            traversal: Traversal::Sequential {
                shuffle_seed: None,
                progress_every: None,
            },
            target: Some(0.25),
        };
        let divergence = model.block_divergence(BoundaryVertex(0), &options).unwrap();
        assert!(divergence.target_reached);
        assert_eq!(divergence.value, 0.5);
        assert_eq!(divergence.scanned, 1);
    }

    #[test]
    fn parallel_target_stops_pulling_constraints() {
        // Boundary vertices 1..8 are isolated from the block, so the stream is long.
        let model = BlockModel::new(Topology {
            k: 2,
            number_vertices: 1,
            edges: vec![],
            number_boundary_vertices: 8,
            boundary_edges: vec![],
            block_boundary_edges: vec![(BlockVertex(0), BoundaryVertex(0))],
        })
        .unwrap();
        let total = model.boundary_constraints().len();
        assert_eq!(total, 6561);

        let pulled = AtomicUsize::new(0);
        let constraints = model.boundary_constraints().iter().inspect(|_| {
            pulled.fetch_add(1, Ordering::Relaxed);
        });
        let options = DivergenceOptions {
            traversal: Traversal::Parallel,
            target: Some(0.25),
        };
        let engine = ConditionalExpectation::new(&model);
        let divergence =
            boundary_divergence(model.boundary(), BoundaryVertex(0), constraints, &engine, &options)
                .unwrap();

        assert!(divergence.target_reached);
        assert_eq!(divergence.value, 0.5);
        let pulled = pulled.into_inner();
        assert!(pulled < total / 2, "pulled {} of {}", pulled, total);
        assert!(divergence.scanned as usize <= pulled);
    }

    #[test]
    fn options_serde_roundtrip() {
        let options = DivergenceOptions {
            traversal: Traversal::Sequential {
                shuffle_seed: Some(3),
                progress_every: None,
            },
            target: Some(1.5),
        };
        let json = serde_json::to_string(&options).unwrap();
        let back: DivergenceOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }
}
