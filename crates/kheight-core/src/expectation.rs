//! Conditional expected weight of a block filling.
//!
//! An [`ExpectationEngine`] maps a boundary constraint to an [`Expectation`]:
//! either the number and total weight of admissible fillings, or
//! `Unsatisfiable` when no filling fits. Unsatisfiable constraints are
//! frequent and callers skip them, so they are values rather than errors.
//!
//! [`ConditionalExpectation`] is the brute-force engine: a scan over the
//! block's fillings. It works for any small block and is the reference the
//! strip dynamic program is checked against.

use rayon::prelude::*;

use crate::block::BlockModel;
use crate::error::{check_constraint, BlockError};
use crate::height::{weight, Height};

/// Number and total weight of a set of fillings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Accumulator {
    pub count: u128,
    pub weight: u128,
}

impl Accumulator {
    /// The accumulator of a single filling of the given weight.
    pub fn single(weight: u64) -> Self {
        Accumulator {
            count: 1,
            weight: u128::from(weight),
        }
    }

    /// Combines two disjoint sets of fillings.
    pub fn merge(self, other: Accumulator) -> Accumulator {
        Accumulator {
            count: self.count + other.count,
            weight: self.weight + other.weight,
        }
    }
}

/// Outcome of conditioning a block on one boundary constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expectation {
    /// At least one filling is admissible.
    Admissible(Accumulator),
    /// No filling is admissible.
    Unsatisfiable,
}

impl Expectation {
    /// Classifies an accumulator by whether it saw any filling.
    pub fn from_accumulator(acc: Accumulator) -> Self {
        if acc.count == 0 {
            Expectation::Unsatisfiable
        } else {
            Expectation::Admissible(acc)
        }
    }

    /// Mean weight of the admissible fillings, if there are any.
    pub fn mean(&self) -> Option<f64> {
        match self {
            Expectation::Admissible(acc) => Some(acc.weight as f64 / acc.count as f64),
            Expectation::Unsatisfiable => None,
        }
    }

    /// Converts to the error-returning contract used by `expected_weight`.
    pub fn into_result(self, constraint: &[Height]) -> Result<f64, BlockError> {
        self.mean().ok_or_else(|| BlockError::NoAdmissibleFilling {
            constraint: constraint.to_vec(),
        })
    }
}

/// Evaluates the conditional expected weight of a block.
///
/// Implementations are shared across rayon workers, so they must be `Sync`.
/// The constraint passed to [`evaluate`](ExpectationEngine::evaluate) is a
/// full boundary labeling, already checked for length and range.
pub trait ExpectationEngine: Sync {
    /// Number of boundary vertices the engine expects in a constraint.
    fn boundary_len(&self) -> usize;

    /// Conditions the block on `constraint`.
    fn evaluate(&self, constraint: &[Height]) -> Expectation;
}

/// Brute-force engine: scans every filling of a [`BlockModel`].
#[derive(Debug, Clone, Copy)]
pub struct ConditionalExpectation<'a> {
    model: &'a BlockModel,
}

/// Fillings per rayon task; smaller blocks are scanned on one thread.
const MIN_FILLINGS_PER_TASK: usize = 4096;

impl<'a> ConditionalExpectation<'a> {
    pub fn new(model: &'a BlockModel) -> Self {
        ConditionalExpectation { model }
    }

    pub fn model(&self) -> &'a BlockModel {
        self.model
    }
}

impl ExpectationEngine for ConditionalExpectation<'_> {
    fn boundary_len(&self) -> usize {
        self.model.number_boundary_vertices()
    }

    fn evaluate(&self, constraint: &[Height]) -> Expectation {
        let model = self.model;
        let acc = model
            .fillings()
            .par_iter()
            .with_min_len(MIN_FILLINGS_PER_TASK)
            .filter(|filling| model.is_admissible(filling, constraint))
            .fold(Accumulator::default, |acc, filling| {
                acc.merge(Accumulator::single(weight(filling)))
            })
            .reduce(Accumulator::default, Accumulator::merge);
        Expectation::from_accumulator(acc)
    }
}

/// Mean weight of the fillings of `model` admissible for `constraint`.
///
/// Returns [`BlockError::NoAdmissibleFilling`] if there are none, and
/// [`BlockError::InvalidConstraint`] if `constraint` is not a labeling of the
/// model's boundary in `0..=k`.
pub fn expected_weight(model: &BlockModel, constraint: &[Height]) -> Result<f64, BlockError> {
    check_constraint(constraint, model.number_boundary_vertices(), model.k())?;
    ConditionalExpectation::new(model)
        .evaluate(constraint)
        .into_result(constraint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::{BlockVertex, BoundaryVertex};
    use crate::topology::Topology;

    fn model(topology: Topology) -> BlockModel {
        BlockModel::new(topology).unwrap()
    }

    #[test]
    fn unconstrained_edge_averages_all_fillings() {
        let model = model(Topology {
            k: 1,
            number_vertices: 2,
            edges: vec![(BlockVertex(0), BlockVertex(1))],
            number_boundary_vertices: 1,
            boundary_edges: vec![],
            block_boundary_edges: vec![],
        });
        // (0+1+1+2)/4
        assert_eq!(expected_weight(&model, &[0]).unwrap(), 1.0);
        assert_eq!(expected_weight(&model, &[1]).unwrap(), 1.0);
    }

    #[test]
    fn conflicting_boundary_has_no_admissible_filling() {
        // Both boundary vertices touch block vertex 0 but sit three apart.
        let model = model(Topology {
            k: 3,
            number_vertices: 1,
            edges: vec![],
            number_boundary_vertices: 2,
            boundary_edges: vec![],
            block_boundary_edges: vec![
                (BlockVertex(0), BoundaryVertex(0)),
                (BlockVertex(0), BoundaryVertex(1)),
            ],
        });
        assert_eq!(
            expected_weight(&model, &[0, 3]),
            Err(BlockError::NoAdmissibleFilling {
                constraint: vec![0, 3]
            })
        );
        // 1 and 2 are both within one of 1 and 2.
        assert_eq!(expected_weight(&model, &[1, 2]).unwrap(), 1.5);
    }

    #[test]
    fn filling_at_zero_never_meets_a_boundary_at_k() {
        for k in 2..=5 {
            let pinned = model(Topology {
                k,
                number_vertices: 1,
                edges: vec![],
                number_boundary_vertices: 2,
                boundary_edges: vec![],
                block_boundary_edges: vec![
                    (BlockVertex(0), BoundaryVertex(0)),
                    (BlockVertex(0), BoundaryVertex(1)),
                ],
            });
            assert!(!pinned.is_admissible(&[0], &[k, 0]));

            // Boundary 1 at zero keeps filling(0) in {0, 1}.
            let result = expected_weight(&pinned, &[k, 0]);
            if k == 2 {
                assert_eq!(result, Ok(1.0));
            } else {
                assert_eq!(
                    result,
                    Err(BlockError::NoAdmissibleFilling {
                        constraint: vec![k, 0]
                    })
                );
            }
        }
    }

    #[test]
    fn single_vertex_follows_its_boundary() {
        let model = model(Topology {
            k: 2,
            number_vertices: 1,
            edges: vec![],
            number_boundary_vertices: 1,
            boundary_edges: vec![],
            block_boundary_edges: vec![(BlockVertex(0), BoundaryVertex(0))],
        });
        let engine = ConditionalExpectation::new(&model);
        assert_eq!(engine.evaluate(&[0]).mean(), Some(0.5));
        assert_eq!(engine.evaluate(&[1]).mean(), Some(1.0));
        assert_eq!(engine.evaluate(&[2]).mean(), Some(1.5));
        assert_eq!(
            engine.evaluate(&[1]),
            Expectation::Admissible(Accumulator { count: 3, weight: 3 })
        );
    }

    #[test]
    fn malformed_constraint_is_rejected() {
        let model = model(Topology {
            k: 1,
            number_vertices: 1,
            edges: vec![],
            number_boundary_vertices: 2,
            boundary_edges: vec![],
            block_boundary_edges: vec![],
        });
        assert!(matches!(
            expected_weight(&model, &[0]),
            Err(BlockError::InvalidConstraint { .. })
        ));
        assert!(matches!(
            expected_weight(&model, &[0, 2]),
            Err(BlockError::InvalidConstraint { .. })
        ));
    }

    #[test]
    fn unsatisfiable_has_no_mean() {
        assert_eq!(Expectation::from_accumulator(Accumulator::default()), Expectation::Unsatisfiable);
        assert_eq!(Expectation::Unsatisfiable.mean(), None);
    }
}
