//! Proof cases for block divergence of k-heights.
//!
//! Each [`Family`] describes a set of blocks from the mixing-time proofs:
//! cycles and paths from 3-regular planar graphs, a hexagon of the hexagonal
//! grid, and a square block of the rectangular grid. [`families`] builds the
//! concrete [`Case`]s for a given k, [`runner`] evaluates them through
//! `kheight-core`, and [`report`] renders the results in the published
//! semicolon-delimited format.

pub mod case;
pub mod error;
pub mod families;
pub mod report;
pub mod runner;

pub use case::{Case, Family, Workload};
pub use error::CaseError;
pub use report::CaseRecord;
pub use runner::{run_case, sweep};
