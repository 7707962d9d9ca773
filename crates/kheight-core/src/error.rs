//! Error types for kheight-core.
//!
//! Uses `thiserror` for structured, matchable variants. Topology and
//! degeneracy failures are fatal for the case at hand; an unsatisfiable
//! boundary constraint is normally reported as
//! [`Expectation::Unsatisfiable`](crate::expectation::Expectation) and only
//! becomes [`BlockError::NoAdmissibleFilling`] through the `expected_weight`
//! convenience functions.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::height::Height;
use crate::id::BoundaryVertex;

/// Which edge list of a topology an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EdgeList {
    /// Edges between block vertices.
    Internal,
    /// Edges between boundary vertices.
    Boundary,
    /// Edges from a block vertex to a boundary vertex.
    BlockBoundary,
}

impl fmt::Display for EdgeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EdgeList::Internal => write!(f, "internal"),
            EdgeList::Boundary => write!(f, "boundary"),
            EdgeList::BlockBoundary => write!(f, "block-boundary"),
        }
    }
}

/// Errors produced by the block divergence engine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BlockError {
    /// An edge references a vertex outside its declared range.
    #[error("invalid topology: {list} edge #{position} references vertex {index}, but only {bound} exist")]
    InvalidTopology {
        list: EdgeList,
        position: usize,
        index: u32,
        bound: u32,
    },

    /// No filling of the block is admissible for the given boundary constraint.
    #[error("no admissible filling for boundary constraint {constraint:?}")]
    NoAdmissibleFilling { constraint: Vec<Height> },

    /// No cover relation at the vertex produced a positive expected-weight increase.
    #[error("augmentation at boundary vertex {vertex} does not increase the expected weight")]
    DegenerateAugmentation { vertex: BoundaryVertex },

    /// The augmentation vertex is not a boundary vertex of the block.
    #[error("augmentation vertex {vertex} out of range: block has {bound} boundary vertices")]
    AugmentationVertexOutOfRange { vertex: BoundaryVertex, bound: u32 },

    /// A boundary constraint has the wrong length or a label above k.
    #[error("invalid boundary constraint: {reason}")]
    InvalidConstraint { reason: String },

    /// A rectangular grid layout has no rows or no columns.
    #[error("invalid grid layout: {reason}")]
    InvalidLayout { reason: String },
}

/// Checks that `constraint` is a labeling of `expected` vertices in `0..=k`.
pub(crate) fn check_constraint(
    constraint: &[Height],
    expected: usize,
    k: Height,
) -> Result<(), BlockError> {
    if constraint.len() != expected {
        return Err(BlockError::InvalidConstraint {
            reason: format!(
                "expected {} labels, got {}",
                expected,
                constraint.len()
            ),
        });
    }
    if let Some(&label) = constraint.iter().find(|&&h| h > k) {
        return Err(BlockError::InvalidConstraint {
            reason: format!("label {} exceeds k = {}", label, k),
        });
    }
    Ok(())
}
