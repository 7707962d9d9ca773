//! Block topology: the three edge lists describing a block and its boundary.
//!
//! [`Topology`] is the plain description a case generator hands to the
//! engine (it is serde-serializable so blocks can be read from JSON).
//! [`Topology::validate`] checks every edge against its index space before
//! anything is enumerated. [`BoundaryGraph`] is the boundary half of a
//! topology as a petgraph `UnGraph`, used for neighbor queries during
//! augmentation and as the source of boundary constraints.

use petgraph::graph::{NodeIndex, UnGraph};
use serde::{Deserialize, Serialize};

use crate::enumerate::KHeights;
use crate::error::{BlockError, EdgeList};
use crate::height::Height;
use crate::id::{BlockVertex, BoundaryVertex};

/// A block, its boundary, and the edges between them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topology {
    /// Labels range over `0..=k`.
    pub k: Height,
    /// Block vertices are `0..number_vertices`.
    pub number_vertices: u32,
    /// Edges between block vertices.
    pub edges: Vec<(BlockVertex, BlockVertex)>,
    /// Boundary vertices are `0..number_boundary_vertices`.
    pub number_boundary_vertices: u32,
    /// Edges between boundary vertices.
    pub boundary_edges: Vec<(BoundaryVertex, BoundaryVertex)>,
    /// Edges from a block vertex to a boundary vertex.
    pub block_boundary_edges: Vec<(BlockVertex, BoundaryVertex)>,
}

impl Topology {
    /// Checks that every edge endpoint lies in its declared range.
    ///
    /// Returns [`BlockError::InvalidTopology`] for the first offending edge.
    pub fn validate(&self) -> Result<(), BlockError> {
        let nv = self.number_vertices;
        let nb = self.number_boundary_vertices;

        for (position, &(u, v)) in self.edges.iter().enumerate() {
            check_index(EdgeList::Internal, position, u.0, nv)?;
            check_index(EdgeList::Internal, position, v.0, nv)?;
        }
        for (position, &(u, v)) in self.boundary_edges.iter().enumerate() {
            check_index(EdgeList::Boundary, position, u.0, nb)?;
            check_index(EdgeList::Boundary, position, v.0, nb)?;
        }
        for (position, &(b, d)) in self.block_boundary_edges.iter().enumerate() {
            check_index(EdgeList::BlockBoundary, position, b.0, nv)?;
            check_index(EdgeList::BlockBoundary, position, d.0, nb)?;
        }
        Ok(())
    }

    /// Internal edges as plain positions.
    pub fn internal_index_edges(&self) -> Vec<(usize, usize)> {
        self.edges.iter().map(|&(u, v)| (u.index(), v.index())).collect()
    }

    /// Block-boundary edges as plain positions (block, boundary).
    pub fn block_boundary_index_edges(&self) -> Vec<(usize, usize)> {
        self.block_boundary_edges
            .iter()
            .map(|&(b, d)| (b.index(), d.index()))
            .collect()
    }

    /// Builds the boundary graph. The topology must already be validated.
    pub fn boundary_graph(&self) -> Result<BoundaryGraph, BlockError> {
        BoundaryGraph::new(self.k, self.number_boundary_vertices, &self.boundary_edges)
    }
}

fn check_index(list: EdgeList, position: usize, index: u32, bound: u32) -> Result<(), BlockError> {
    if index >= bound {
        return Err(BlockError::InvalidTopology {
            list,
            position,
            index,
            bound,
        });
    }
    Ok(())
}

/// The boundary of a block as an undirected graph.
///
/// Node indices coincide with [`BoundaryVertex`] ids.
#[derive(Debug, Clone)]
pub struct BoundaryGraph {
    k: Height,
    graph: UnGraph<(), (), u32>,
}

impl BoundaryGraph {
    /// Creates the graph on vertices `0..number_vertices`.
    ///
    /// Returns [`BlockError::InvalidTopology`] if an edge is out of range.
    pub fn new(
        k: Height,
        number_vertices: u32,
        edges: &[(BoundaryVertex, BoundaryVertex)],
    ) -> Result<Self, BlockError> {
        let mut graph = UnGraph::<(), (), u32>::with_capacity(number_vertices as usize, edges.len());
        for _ in 0..number_vertices {
            graph.add_node(());
        }
        for (position, &(u, v)) in edges.iter().enumerate() {
            check_index(EdgeList::Boundary, position, u.0, number_vertices)?;
            check_index(EdgeList::Boundary, position, v.0, number_vertices)?;
            graph.add_edge(u.into(), v.into(), ());
        }
        Ok(BoundaryGraph { k, graph })
    }

    /// Labels range over `0..=k`.
    pub fn k(&self) -> Height {
        self.k
    }

    /// Number of boundary vertices.
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Whether `vertex` belongs to this boundary.
    pub fn contains(&self, vertex: BoundaryVertex) -> bool {
        vertex.index() < self.vertex_count()
    }

    /// Distinct neighbors of `vertex`, in ascending order. Self-loops are ignored.
    pub fn neighbors(&self, vertex: BoundaryVertex) -> Vec<BoundaryVertex> {
        let idx: NodeIndex<u32> = vertex.into();
        let mut out: Vec<BoundaryVertex> = self
            .graph
            .neighbors(idx)
            .filter(|&n| n != idx)
            .map(BoundaryVertex::from)
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Boundary edges as plain positions.
    pub fn index_edges(&self) -> Vec<(usize, usize)> {
        self.graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(a, b)| (a.index(), b.index()))
            .collect()
    }

    /// Lazily enumerates all boundary constraints, in lexicographic order.
    pub fn constraints(&self) -> KHeights {
        KHeights::new(self.k, self.vertex_count(), &self.index_edges())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle_with_pendant() -> Topology {
        Topology {
            k: 2,
            number_vertices: 3,
            edges: vec![
                (BlockVertex(0), BlockVertex(1)),
                (BlockVertex(1), BlockVertex(2)),
                (BlockVertex(2), BlockVertex(0)),
            ],
            number_boundary_vertices: 2,
            boundary_edges: vec![(BoundaryVertex(0), BoundaryVertex(1))],
            block_boundary_edges: vec![
                (BlockVertex(0), BoundaryVertex(0)),
                (BlockVertex(2), BoundaryVertex(1)),
            ],
        }
    }

    #[test]
    fn valid_topology_passes() {
        assert!(triangle_with_pendant().validate().is_ok());
    }

    #[test]
    fn internal_edge_out_of_range_is_rejected() {
        let mut topology = triangle_with_pendant();
        topology.edges.push((BlockVertex(1), BlockVertex(3)));
        assert_eq!(
            topology.validate(),
            Err(BlockError::InvalidTopology {
                list: EdgeList::Internal,
                position: 3,
                index: 3,
                bound: 3,
            })
        );
    }

    #[test]
    fn block_boundary_edge_checks_both_spaces() {
        let mut topology = triangle_with_pendant();
        topology.block_boundary_edges = vec![(BlockVertex(1), BoundaryVertex(2))];
        assert!(matches!(
            topology.validate(),
            Err(BlockError::InvalidTopology {
                list: EdgeList::BlockBoundary,
                index: 2,
                bound: 2,
                ..
            })
        ));

        topology.block_boundary_edges = vec![(BlockVertex(5), BoundaryVertex(0))];
        assert!(matches!(
            topology.validate(),
            Err(BlockError::InvalidTopology {
                list: EdgeList::BlockBoundary,
                index: 5,
                bound: 3,
                ..
            })
        ));
    }

    #[test]
    fn boundary_neighbors_are_deduplicated() {
        let graph = BoundaryGraph::new(
            2,
            4,
            &[
                (BoundaryVertex(0), BoundaryVertex(1)),
                (BoundaryVertex(1), BoundaryVertex(0)),
                (BoundaryVertex(0), BoundaryVertex(3)),
                (BoundaryVertex(0), BoundaryVertex(0)),
            ],
        )
        .unwrap();
        assert_eq!(
            graph.neighbors(BoundaryVertex(0)),
            vec![BoundaryVertex(1), BoundaryVertex(3)]
        );
        assert!(graph.neighbors(BoundaryVertex(2)).is_empty());
        assert!(graph.contains(BoundaryVertex(3)));
        assert!(!graph.contains(BoundaryVertex(4)));
    }

    #[test]
    fn boundary_constraints_respect_boundary_edges() {
        let graph = triangle_with_pendant().boundary_graph().unwrap();
        // Pairs over {0,1,2} with difference at most one.
        assert_eq!(graph.constraints().count(), 7);
    }

    #[test]
    fn topology_json_roundtrip() {
        let topology = triangle_with_pendant();
        let json = serde_json::to_string(&topology).unwrap();
        let back: Topology = serde_json::from_str(&json).unwrap();
        assert_eq!(back, topology);
    }
}
