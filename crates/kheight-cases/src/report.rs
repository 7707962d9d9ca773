//! Report records for proof cases.
//!
//! The 3-regular families are reported as one semicolon-delimited line per
//! case, matching the published output byte for byte: lists and tuples are
//! rendered the way Python prints them and floats use Python's `repr`.
//! The hexagon and grid cases print their published one-line summaries.

use std::fmt;

use kheight_core::{BoundaryVertex, Height, Labeling, Topology};
use serde::{Deserialize, Serialize};

use crate::case::Family;

/// Column description line for the 3-regular report.
pub const THREE_REGULAR_HEADER: &str = "k; case; number of internally valid fillings; \
number of valid boundary constraints; result (block divergence); input number_vertices; \
input edges; input number_boundary_vertices; input boundary_edges; input block_boundary_edges";

/// The outcome of one case, paired with the metadata needed to reproduce it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseRecord {
    pub k: Height,
    pub family: Family,
    pub label: String,
    /// Block divergence (a lower bound if `target_reached`).
    pub value: f64,
    /// Augmentation vertex attaining `value`.
    pub augmentation_vertex: BoundaryVertex,
    /// Lower side of a maximizing cover relation.
    pub maximizer: Labeling,
    /// Number of fillings; `None` when the block was never enumerated.
    pub fillings: Option<usize>,
    /// Number of valid boundary constraints; `None` when they are streamed.
    pub boundary_constraints: Option<usize>,
    /// Boundary constraints actually visited by the divergence scan.
    pub scanned: u64,
    /// The scan stopped early at a target, so `value` is only a lower bound.
    pub target_reached: bool,
    pub topology: Topology,
}

impl CaseRecord {
    /// The report line for this record.
    ///
    /// A value from a scan stopped at its target is a lower bound and is
    /// rendered as `>=value`, so it can't pass for a published result.
    pub fn render(&self) -> String {
        let value = if self.target_reached {
            format!(">={}", python_float(self.value))
        } else {
            python_float(self.value)
        };
        match self.family {
            Family::Hexagon => format!("Block divergence for k={} : {}", self.k, value),
            Family::Grid => format!("BLOCK DIVERGENCE IN CASE k = {}: {}", self.k, value),
            _ => {
                let t = &self.topology;
                format!(
                    "{}; {}; {}; {}; {}; {}; {}; {}; {}; {}",
                    self.k,
                    self.label,
                    count_column(self.fillings),
                    count_column(self.boundary_constraints),
                    value,
                    t.number_vertices,
                    python_pairs(&t.edges),
                    t.number_boundary_vertices,
                    python_pairs(&t.boundary_edges),
                    python_pairs(&t.block_boundary_edges),
                )
            }
        }
    }
}

impl fmt::Display for CaseRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

fn count_column(count: Option<usize>) -> String {
    count.map_or_else(|| "-".to_string(), |n| n.to_string())
}

/// Renders a list of pairs as Python prints a list of tuples: `[(0, 1), (1, 2)]`.
pub fn python_pairs<A: fmt::Display, B: fmt::Display>(pairs: &[(A, B)]) -> String {
    let items: Vec<String> = pairs.iter().map(|(a, b)| format!("({}, {})", a, b)).collect();
    format!("[{}]", items.join(", "))
}

/// Renders a float as Python's `repr` does.
///
/// Both languages print the shortest digits that round-trip; Python adds a
/// trailing `.0` to integral values and switches to exponent notation below
/// `1e-4` and from `1e16` on, with a signed two-digit exponent.
pub fn python_float(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    let magnitude = value.abs();
    if magnitude != 0.0 && !(1e-4..1e16).contains(&magnitude) {
        let formatted = format!("{:e}", value);
        if let Some((mantissa, exponent)) = formatted.split_once('e') {
            if let Ok(exponent) = exponent.parse::<i32>() {
                let sign = if exponent < 0 { '-' } else { '+' };
                return format!("{}e{}{:02}", mantissa, sign, exponent.abs());
            }
        }
        return formatted;
    }

    let formatted = format!("{}", value);
    if formatted.contains('.') {
        formatted
    } else {
        format!("{}.0", formatted)
    }
}
