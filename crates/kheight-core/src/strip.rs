//! Strip dynamic program for rectangular grid blocks.
//!
//! A grid block is `rows` rows of `width` cells. Row 0 faces the front side
//! of the boundary, row `rows - 1` faces the back side, and the first and
//! last cell of each row face the left and right sides. A *strip* is a valid
//! k-height on one row (a path of `width` vertices).
//!
//! Instead of materialising every filling, the engine sweeps the rows from
//! front to back. Each generation maps the last completed row to the number
//! and total weight of the partial fillings ending in it. Generation `i + 1`
//! is built fresh from generation `i`, which is only read, by pulling every
//! compatible predecessor into each candidate strip. Cost is
//! `rows * |strips|^2` instead of exponential in `rows * width`.
//!
//! # Boundary ordering
//!
//! A grid boundary constraint is one flat labeling laid out side by side:
//!
//! | side  | positions                       | order within side |
//! |-------|---------------------------------|-------------------|
//! | front | `0 .. width`                    | left to right     |
//! | back  | `width .. 2*width`              | left to right     |
//! | left  | `2*width .. 2*width + rows`     | front to back     |
//! | right | `2*width + rows .. 2*(w + r)`   | front to back     |
//!
//! [`GridLayout::boundary_vertex`] and [`GridLayout::sides`] are the only
//! places that know this layout.

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::divergence::{boundary_divergence, Divergence, DivergenceOptions};
use crate::enumerate::{enumerate, path_edges};
use crate::error::{check_constraint, BlockError};
use crate::expectation::{Accumulator, Expectation, ExpectationEngine};
use crate::height::{weight, within_one, Height, Labeling};
use crate::id::{BlockVertex, BoundaryVertex};
use crate::topology::{BoundaryGraph, Topology};

/// One side of a rectangular block's boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    Front,
    Back,
    Left,
    Right,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::Front, Side::Back, Side::Left, Side::Right];
}

/// Shape of a rectangular grid block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGridLayout")]
pub struct GridLayout {
    rows: u32,
    width: u32,
}

/// Wire form of [`GridLayout`], checked by [`GridLayout::new`] on the way in.
#[derive(Deserialize)]
struct RawGridLayout {
    rows: u32,
    width: u32,
}

impl TryFrom<RawGridLayout> for GridLayout {
    type Error = BlockError;

    fn try_from(raw: RawGridLayout) -> Result<Self, Self::Error> {
        GridLayout::new(raw.rows, raw.width)
    }
}

/// A grid boundary constraint split into its four sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSides<'a> {
    /// Left to right.
    pub front: &'a [Height],
    /// Left to right.
    pub back: &'a [Height],
    /// Front to back.
    pub left: &'a [Height],
    /// Front to back.
    pub right: &'a [Height],
}

impl GridLayout {
    /// Returns [`BlockError::InvalidLayout`] if either dimension is zero.
    pub fn new(rows: u32, width: u32) -> Result<Self, BlockError> {
        if rows == 0 || width == 0 {
            return Err(BlockError::InvalidLayout {
                reason: format!("grid must have at least one row and column, got {}x{}", rows, width),
            });
        }
        Ok(GridLayout { rows, width })
    }

    pub fn rows(&self) -> usize {
        self.rows as usize
    }

    pub fn width(&self) -> usize {
        self.width as usize
    }

    /// Number of vertices on `side`.
    pub fn side_len(&self, side: Side) -> usize {
        match side {
            Side::Front | Side::Back => self.width(),
            Side::Left | Side::Right => self.rows(),
        }
    }

    fn side_start(&self, side: Side) -> usize {
        let w = self.width();
        match side {
            Side::Front => 0,
            Side::Back => w,
            Side::Left => 2 * w,
            Side::Right => 2 * w + self.rows(),
        }
    }

    pub fn number_vertices(&self) -> usize {
        self.rows() * self.width()
    }

    pub fn number_boundary_vertices(&self) -> usize {
        2 * (self.rows() + self.width())
    }

    /// The block vertex in `row` (counted from the front) and `col` (from the left).
    pub fn cell(&self, row: usize, col: usize) -> BlockVertex {
        BlockVertex((row * self.width() + col) as u32)
    }

    /// The boundary vertex at `position` along `side`.
    ///
    /// Positions run left to right on the front and back, front to back on
    /// the left and right.
    ///
    /// # Panics
    /// Panics if `position` is not below `side_len(side)`.
    pub fn boundary_vertex(&self, side: Side, position: usize) -> BoundaryVertex {
        assert!(
            position < self.side_len(side),
            "position {} out of range for {:?} side of length {}",
            position,
            side,
            self.side_len(side)
        );
        BoundaryVertex((self.side_start(side) + position) as u32)
    }

    /// Splits a flat boundary constraint into its sides.
    ///
    /// `constraint` must have `number_boundary_vertices()` labels.
    pub fn sides<'c>(&self, constraint: &'c [Height]) -> GridSides<'c> {
        let slice = |side: Side| {
            let start = self.side_start(side);
            &constraint[start..start + self.side_len(side)]
        };
        GridSides {
            front: slice(Side::Front),
            back: slice(Side::Back),
            left: slice(Side::Left),
            right: slice(Side::Right),
        }
    }

    /// Whether boundary vertices two steps apart around each corner differ by
    /// at most two. Constraints failing this have no admissible filling.
    pub fn corners_compatible(&self, constraint: &[Height]) -> bool {
        let s = self.sides(constraint);
        let (w, r) = (self.width() - 1, self.rows() - 1);
        [
            (s.front[0], s.left[0]),
            (s.front[w], s.right[0]),
            (s.back[0], s.left[r]),
            (s.back[w], s.right[r]),
        ]
        .iter()
        .all(|&(a, b)| a.abs_diff(b) <= 2)
    }

    /// The grid as a generic block topology, for the brute-force engine.
    pub fn topology(&self, k: Height) -> Topology {
        let (rows, width) = (self.rows(), self.width());

        let mut edges = Vec::new();
        for row in 0..rows {
            for col in 0..width {
                if col + 1 < width {
                    edges.push((self.cell(row, col), self.cell(row, col + 1)));
                }
                if row + 1 < rows {
                    edges.push((self.cell(row, col), self.cell(row + 1, col)));
                }
            }
        }

        let mut boundary_edges = Vec::new();
        for side in Side::ALL {
            for i in 1..self.side_len(side) {
                boundary_edges.push((self.boundary_vertex(side, i - 1), self.boundary_vertex(side, i)));
            }
        }

        let mut block_boundary_edges = Vec::new();
        for col in 0..width {
            block_boundary_edges.push((self.cell(0, col), self.boundary_vertex(Side::Front, col)));
            block_boundary_edges.push((self.cell(rows - 1, col), self.boundary_vertex(Side::Back, col)));
        }
        for row in 0..rows {
            block_boundary_edges.push((self.cell(row, 0), self.boundary_vertex(Side::Left, row)));
            block_boundary_edges.push((self.cell(row, width - 1), self.boundary_vertex(Side::Right, row)));
        }

        Topology {
            k,
            number_vertices: self.number_vertices() as u32,
            edges,
            number_boundary_vertices: self.number_boundary_vertices() as u32,
            boundary_edges,
            block_boundary_edges,
        }
    }
}

/// Dynamic-programming engine for a [`GridLayout`].
#[derive(Debug, Clone)]
pub struct StripDpEngine {
    layout: GridLayout,
    k: Height,
    strips: Vec<Labeling>,
}

impl StripDpEngine {
    /// Enumerates the k-strips of the layout's width.
    pub fn new(k: Height, layout: GridLayout) -> Self {
        let width = layout.width();
        let strips = enumerate(k, width, &path_edges(width));
        tracing::debug!(k, width, strips = strips.len(), "enumerated strips");
        StripDpEngine { layout, k, strips }
    }

    pub fn layout(&self) -> GridLayout {
        self.layout
    }

    pub fn k(&self) -> Height {
        self.k
    }

    /// All valid row labelings, in lexicographic order.
    pub fn strips(&self) -> &[Labeling] {
        &self.strips
    }
}

impl ExpectationEngine for StripDpEngine {
    fn boundary_len(&self) -> usize {
        self.layout.number_boundary_vertices()
    }

    fn evaluate(&self, constraint: &[Height]) -> Expectation {
        Expectation::from_accumulator(sweep(&self.strips, &self.layout.sides(constraint)))
    }
}

/// Expected weight of a grid filling given the four boundary sides.
///
/// The number of rows is `left.len()` and the width is `front.len()`;
/// `strips` must be the k-strips of that width. Returns
/// [`BlockError::NoAdmissibleFilling`] if no filling fits the boundary.
pub fn expected_weight(
    strips: &[Labeling],
    front: &[Height],
    left: &[Height],
    right: &[Height],
    back: &[Height],
) -> Result<f64, BlockError> {
    let (rows, width) = (left.len(), front.len());
    if rows == 0 || width == 0 {
        return Err(BlockError::InvalidLayout {
            reason: format!("grid must have at least one row and column, got {}x{}", rows, width),
        });
    }
    if right.len() != rows || back.len() != width {
        return Err(BlockError::InvalidConstraint {
            reason: format!(
                "sides disagree on shape: front {}, back {}, left {}, right {}",
                width,
                back.len(),
                rows,
                right.len()
            ),
        });
    }
    if let Some(strip) = strips.iter().find(|s| s.len() != width) {
        return Err(BlockError::InvalidLayout {
            reason: format!("strip of length {} in a grid of width {}", strip.len(), width),
        });
    }

    let sides = GridSides {
        front,
        back,
        left,
        right,
    };
    Expectation::from_accumulator(sweep(strips, &sides)).into_result(&[front, back, left, right].concat())
}

/// Runs the row sweep and returns count and weight of all complete fillings.
fn sweep(strips: &[Labeling], sides: &GridSides<'_>) -> Accumulator {
    let rows = sides.left.len();

    // Before the first row the front side plays the part of the last row,
    // extended by exactly one empty partial filling.
    let mut generation: IndexMap<Labeling, Accumulator> = IndexMap::new();
    generation.insert(Labeling::from_slice(sides.front), Accumulator { count: 1, weight: 0 });

    for row in 0..rows {
        generation = next_generation(strips, &generation, sides, row, row + 1 == rows);
        if generation.is_empty() {
            break;
        }
    }

    generation
        .values()
        .fold(Accumulator::default(), |total, &acc| total.merge(acc))
}

/// Builds the generation for `row` from the previous one.
fn next_generation(
    strips: &[Labeling],
    previous: &IndexMap<Labeling, Accumulator>,
    sides: &GridSides<'_>,
    row: usize,
    last: bool,
) -> IndexMap<Labeling, Accumulator> {
    let (left, right) = (sides.left[row], sides.right[row]);

    let entries: Vec<(Labeling, Accumulator)> = strips
        .par_iter()
        .filter(|strip| {
            within_one(strip[0], left)
                && within_one(strip[strip.len() - 1], right)
                && (!last || aligned(strip, sides.back))
        })
        .filter_map(|strip| {
            let row_weight = u128::from(weight(strip));
            let acc = previous
                .iter()
                .filter(|(prev, _)| aligned(strip, prev))
                .fold(Accumulator::default(), |acc, (_, prev)| {
                    acc.merge(Accumulator {
                        count: prev.count,
                        weight: prev.weight + prev.count * row_weight,
                    })
                });
            (acc.count > 0).then(|| (strip.clone(), acc))
        })
        .collect();

    entries.into_iter().collect()
}

/// Whether two rows of equal width agree position by position.
fn aligned(a: &[Height], b: &[Height]) -> bool {
    a.iter().zip(b).all(|(&x, &y)| within_one(x, y))
}

/// A rectangular grid block evaluated with the strip dynamic program.
///
/// Boundary constraints are streamed from the boundary graph rather than
/// stored, since a 4x4 grid already has tens of millions of them.
#[derive(Debug, Clone)]
pub struct GridBlock {
    boundary: BoundaryGraph,
    engine: StripDpEngine,
}

impl GridBlock {
    pub fn new(k: Height, layout: GridLayout) -> Result<Self, BlockError> {
        let boundary = layout.topology(k).boundary_graph()?;
        Ok(GridBlock {
            boundary,
            engine: StripDpEngine::new(k, layout),
        })
    }

    pub fn layout(&self) -> GridLayout {
        self.engine.layout()
    }

    pub fn engine(&self) -> &StripDpEngine {
        &self.engine
    }

    pub fn boundary(&self) -> &BoundaryGraph {
        &self.boundary
    }

    /// Expected weight under one flat boundary constraint.
    pub fn expected_weight(&self, constraint: &[Height]) -> Result<f64, BlockError> {
        check_constraint(constraint, self.engine.boundary_len(), self.engine.k())?;
        self.engine.evaluate(constraint).into_result(constraint)
    }

    /// Block divergence at `vertex`, scanning every corner-compatible
    /// boundary constraint.
    pub fn block_divergence(
        &self,
        vertex: BoundaryVertex,
        options: &DivergenceOptions,
    ) -> Result<Divergence, BlockError> {
        let layout = self.layout();
        let constraints = self
            .boundary
            .constraints()
            .filter(move |c| layout.corners_compatible(c));
        boundary_divergence(&self.boundary, vertex, constraints, &self.engine, options)
    }
}
