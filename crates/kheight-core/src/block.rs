//! [`BlockModel`]: an immutable block with its fillings and boundary constraints.
//!
//! Both sets are derived once, at construction, and never change afterwards.
//! Their sizes are the diagnostics a case report prints next to the result.

use crate::enumerate::enumerate;
use crate::error::BlockError;
use crate::height::{within_one, Height, Labeling};
use crate::id::BoundaryVertex;
use crate::topology::{BoundaryGraph, Topology};

/// A validated block together with every filling and every boundary constraint.
#[derive(Debug, Clone)]
pub struct BlockModel {
    topology: Topology,
    boundary: BoundaryGraph,
    /// Block-boundary edges as (block position, boundary position).
    block_boundary: Vec<(usize, usize)>,
    fillings: Vec<Labeling>,
    boundary_constraints: Vec<Labeling>,
}

impl BlockModel {
    /// Validates `topology` and enumerates its fillings and boundary constraints.
    ///
    /// Returns [`BlockError::InvalidTopology`] if any edge is out of range.
    pub fn new(topology: Topology) -> Result<Self, BlockError> {
        topology.validate()?;

        let boundary = topology.boundary_graph()?;
        let fillings = enumerate(
            topology.k,
            topology.number_vertices as usize,
            &topology.internal_index_edges(),
        );
        let boundary_constraints: Vec<Labeling> = boundary.constraints().collect();
        let block_boundary = topology.block_boundary_index_edges();

        tracing::debug!(
            k = topology.k,
            fillings = fillings.len(),
            boundary_constraints = boundary_constraints.len(),
            "built block model"
        );

        Ok(BlockModel {
            topology,
            boundary,
            block_boundary,
            fillings,
            boundary_constraints,
        })
    }

    /// Labels range over `0..=k`.
    pub fn k(&self) -> Height {
        self.topology.k
    }

    /// The topology this model was built from.
    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    /// The boundary graph.
    pub fn boundary(&self) -> &BoundaryGraph {
        &self.boundary
    }

    /// All fillings of the block, in lexicographic order.
    pub fn fillings(&self) -> &[Labeling] {
        &self.fillings
    }

    /// All boundary constraints, in lexicographic order.
    pub fn boundary_constraints(&self) -> &[Labeling] {
        &self.boundary_constraints
    }

    /// Number of boundary vertices.
    pub fn number_boundary_vertices(&self) -> usize {
        self.topology.number_boundary_vertices as usize
    }

    /// Whether `vertex` is a boundary vertex of this block.
    pub fn has_boundary_vertex(&self, vertex: BoundaryVertex) -> bool {
        self.boundary.contains(vertex)
    }

    /// Whether `filling` agrees with `constraint` across every block-boundary edge.
    pub fn is_admissible(&self, filling: &[Height], constraint: &[Height]) -> bool {
        self.block_boundary
            .iter()
            .all(|&(b, d)| within_one(filling[b], constraint[d]))
    }
}
