//! Case descriptions: which block to evaluate and where to augment it.

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use kheight_core::{BoundaryVertex, GridLayout, Height, Topology};
use serde::{Deserialize, Serialize};

use crate::error::CaseError;

/// A family of proof cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Family {
    /// Type 1.X.1: a cycle of X vertices, each with its own boundary vertex.
    Cycle,
    /// Type 1.X.1Y: a cycle where vertices 1 and Y share a boundary vertex.
    CycleShared,
    /// Type 1.L.XYZ: a cycle where vertices X, Y and Z share a boundary vertex.
    CycleTriple,
    /// Type 2.X: a path of eight vertices, augmented at boundary vertex X.
    Path,
    /// Type 2.XY: a path where vertices X and Y share the augmented boundary vertex.
    PathShared,
    /// Type 2.XYZ: a path where vertices X, Y and Z share the augmented boundary vertex.
    PathTriple,
    /// A single hexagon of the hexagonal grid.
    Hexagon,
    /// A 4x4 block of the rectangular grid, evaluated with the strip dynamic program.
    Grid,
}

impl Family {
    pub const ALL: [Family; 8] = [
        Family::Cycle,
        Family::CycleShared,
        Family::CycleTriple,
        Family::Path,
        Family::PathShared,
        Family::PathTriple,
        Family::Hexagon,
        Family::Grid,
    ];

    /// The families making up the 3-regular planar graph proof, in report order.
    pub const THREE_REGULAR: [Family; 6] = [
        Family::Cycle,
        Family::CycleShared,
        Family::CycleTriple,
        Family::Path,
        Family::PathShared,
        Family::PathTriple,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Family::Cycle => "cycle",
            Family::CycleShared => "cycle-shared",
            Family::CycleTriple => "cycle-triple",
            Family::Path => "path",
            Family::PathShared => "path-shared",
            Family::PathTriple => "path-triple",
            Family::Hexagon => "hexagon",
            Family::Grid => "grid",
        }
    }

    /// Whether records of this family use the semicolon report format.
    pub fn is_three_regular(self) -> bool {
        Family::THREE_REGULAR.contains(&self)
    }

    /// The values of k the proof needs for this family.
    pub fn proof_k_range(self) -> RangeInclusive<Height> {
        match self {
            Family::Hexagon => 2..=6,
            _ => 2..=3,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Family {
    type Err = CaseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Family::ALL
            .into_iter()
            .find(|family| family.name() == s)
            .ok_or_else(|| CaseError::UnknownFamily {
                name: s.to_string(),
            })
    }
}

/// What the engine evaluates for a case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Workload {
    /// A generic block, evaluated by brute force.
    Block {
        topology: Topology,
        augmentation_vertex: BoundaryVertex,
    },
    /// A grid block, evaluated by the strip dynamic program. The result is the
    /// maximum over the listed augmentation vertices.
    Grid {
        layout: GridLayout,
        augmentation_vertices: Vec<BoundaryVertex>,
    },
}

/// One proof case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Case {
    pub k: Height,
    pub family: Family,
    /// Label used in reports, e.g. `Type 1.5.13`.
    pub label: String,
    pub workload: Workload,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn family_names_roundtrip() {
        for family in Family::ALL {
            assert_eq!(family.name().parse::<Family>().unwrap(), family);
        }
    }

    #[test]
    fn unknown_family_is_an_error() {
        assert!(matches!(
            "torus".parse::<Family>(),
            Err(CaseError::UnknownFamily { .. })
        ));
    }

    #[test]
    fn family_serde_uses_kebab_case() {
        let json = serde_json::to_string(&Family::CycleShared).unwrap();
        assert_eq!(json, "\"cycle-shared\"");
    }

    #[test]
    fn hexagon_needs_larger_k() {
        assert_eq!(Family::Hexagon.proof_k_range(), 2..=6);
        assert_eq!(Family::Path.proof_k_range(), 2..=3);
        assert!(!Family::Grid.is_three_regular());
    }
}
