//! Vertex id newtypes for the two index spaces of a block.
//!
//! Block-internal vertices and boundary vertices are numbered independently,
//! both from zero. The only relation crossing the two spaces is a
//! block-boundary edge, so the ids are distinct newtypes over `u32`: a
//! `BlockVertex` cannot be used where a `BoundaryVertex` is expected.

use std::fmt;

use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// A vertex inside the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockVertex(pub u32);

/// A vertex on the boundary of the block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BoundaryVertex(pub u32);

impl BlockVertex {
    /// Position of this vertex in a filling.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl BoundaryVertex {
    /// Position of this vertex in a boundary constraint.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for BlockVertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for BoundaryVertex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// The boundary graph is a petgraph `UnGraph` whose node indices coincide with
// boundary vertex ids.

impl From<NodeIndex<u32>> for BoundaryVertex {
    fn from(idx: NodeIndex<u32>) -> Self {
        BoundaryVertex(idx.index() as u32)
    }
}

impl From<BoundaryVertex> for NodeIndex<u32> {
    fn from(id: BoundaryVertex) -> Self {
        NodeIndex::new(id.0 as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundary_vertex_to_node_index_roundtrip() {
        let idx = NodeIndex::<u32>::new(11);
        let vertex = BoundaryVertex::from(idx);
        assert_eq!(vertex.0, 11);

        let back: NodeIndex<u32> = vertex.into();
        assert_eq!(back.index(), 11);
    }

    #[test]
    fn display_prints_inner_value() {
        assert_eq!(format!("{}", BlockVertex(7)), "7");
        assert_eq!(format!("{}", BoundaryVertex(3)), "3");
    }

    #[test]
    fn serde_is_transparent() {
        let edge = (BlockVertex(2), BoundaryVertex(5));
        let json = serde_json::to_string(&edge).unwrap();
        assert_eq!(json, "[2,5]");
        let back: (BlockVertex, BoundaryVertex) = serde_json::from_str(&json).unwrap();
        assert_eq!(back, edge);
    }
}
