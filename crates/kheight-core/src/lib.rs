//! Block divergence of k-heights.
//!
//! A k-height labels every vertex of a graph with an integer in `0..=k` so
//! that adjacent vertices differ by at most one. For a block (a small
//! subgraph together with its boundary) this crate computes the expected
//! total weight of a uniformly random filling under a fixed boundary
//! constraint, and the block divergence: the largest increase of that
//! expectation caused by raising one boundary vertex by one.
//!
//! # Modules
//!
//! - [`enumerate`] -- lexicographic enumeration of k-heights
//! - [`topology`] -- validated block/boundary edge sets and the boundary graph
//! - [`block`] -- [`BlockModel`]: a topology with its fillings and boundary constraints
//! - [`expectation`] -- the [`ExpectationEngine`] seam and the brute-force engine
//! - [`strip`] -- row-by-row dynamic program for rectangular grid blocks
//! - [`divergence`] -- maximisation over cover relations

pub mod block;
pub mod divergence;
pub mod enumerate;
pub mod error;
pub mod expectation;
pub mod height;
pub mod id;
pub mod strip;
pub mod topology;

pub use block::BlockModel;
pub use divergence::{
    block_divergence, block_divergence_with, boundary_divergence, Divergence,
    DivergenceOptions, Traversal,
};
pub use enumerate::{enumerate, KHeights};
pub use error::{BlockError, EdgeList};
pub use expectation::{
    expected_weight, Accumulator, ConditionalExpectation, Expectation, ExpectationEngine,
};
pub use height::{Height, Labeling};
pub use id::{BlockVertex, BoundaryVertex};
pub use strip::{GridBlock, GridLayout, Side, StripDpEngine};
pub use topology::{BoundaryGraph, Topology};
