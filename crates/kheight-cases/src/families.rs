//! Block topologies for every proof case family.
//!
//! Block vertices of cycles and paths are numbered along the cycle or path
//! from zero. Boundary vertices are numbered in the order their block
//! neighbors first appear, with shared boundary vertices taking the lowest
//! index. None of these families has edges between boundary vertices.

use kheight_core::{BlockVertex, BoundaryVertex, GridLayout, Height, Side, Topology};

use crate::case::{Case, Family, Workload};

/// Every case of `family` for labels in `0..=k`, in report order.
pub fn cases(family: Family, k: Height) -> Vec<Case> {
    match family {
        Family::Cycle => cycle(k),
        Family::CycleShared => cycle_shared(k),
        Family::CycleTriple => cycle_triple(k),
        Family::Path => path(k),
        Family::PathShared => path_shared(k),
        Family::PathTriple => path_triple(k),
        Family::Hexagon => vec![hexagon(k)],
        Family::Grid => vec![grid(k)],
    }
}

fn b(i: usize) -> BlockVertex {
    BlockVertex(i as u32)
}

fn d(i: usize) -> BoundaryVertex {
    BoundaryVertex(i as u32)
}

fn cycle_edges(n: usize) -> Vec<(BlockVertex, BlockVertex)> {
    let mut edges: Vec<_> = (0..n - 1).map(|i| (b(i), b(i + 1))).collect();
    edges.push((b(n - 1), b(0)));
    edges
}

fn path_edges(n: usize) -> Vec<(BlockVertex, BlockVertex)> {
    (0..n - 1).map(|i| (b(i), b(i + 1))).collect()
}

#[allow(clippy::too_many_arguments)]
fn block_case(
    k: Height,
    family: Family,
    label: String,
    number_vertices: usize,
    edges: Vec<(BlockVertex, BlockVertex)>,
    number_boundary_vertices: usize,
    block_boundary_edges: Vec<(BlockVertex, BoundaryVertex)>,
    augmentation_vertex: usize,
) -> Case {
    Case {
        k,
        family,
        label,
        workload: Workload::Block {
            topology: Topology {
                k,
                number_vertices: number_vertices as u32,
                edges,
                number_boundary_vertices: number_boundary_vertices as u32,
                boundary_edges: Vec::new(),
                block_boundary_edges,
            },
            augmentation_vertex: d(augmentation_vertex),
        },
    }
}

/// Type 1.X.1 for 3 <= X <= 10.
pub fn cycle(k: Height) -> Vec<Case> {
    (3..=10)
        .map(|x| {
            block_case(
                k,
                Family::Cycle,
                format!("Type 1.{}.1", x),
                x,
                cycle_edges(x),
                x,
                (0..x).map(|i| (b(i), d(i))).collect(),
                0,
            )
        })
        .collect()
}

/// Type 1.X.1Y for 3 <= X <= 10 and 2 <= Y <= X/2 + 1: cycle vertices 0 and
/// Y - 1 share boundary vertex 0.
pub fn cycle_shared(k: Height) -> Vec<Case> {
    let mut out = Vec::new();
    for x in 3..=10 {
        for y in 2..=x / 2 + 1 {
            let mut bbe = vec![(b(0), d(0)), (b(y - 1), d(0))];
            bbe.extend((1..y - 1).map(|i| (b(i), d(i))));
            bbe.extend((y..x).map(|i| (b(i), d(i - 1))));
            out.push(block_case(
                k,
                Family::CycleShared,
                format!("Type 1.{}.1{}", x, y),
                x,
                cycle_edges(x),
                x - 1,
                bbe,
                0,
            ));
        }
    }
    out
}

/// Type 1.L.XYZ for X = 1 < Y < Z <= L <= 10 with
/// (Y - X) <= (Z - Y) <= (L + 1 - Z): cycle vertices X - 1, Y - 1 and Z - 1
/// share boundary vertex 0.
pub fn cycle_triple(k: Height) -> Vec<Case> {
    let x = 1;
    let mut out = Vec::new();
    for l in 3..=10 {
        for y in 2..=l / 2 + 1 {
            for z in y + 1..=l {
                if y - x > z - y || z - y > l + 1 - z {
                    continue;
                }
                let mut bbe = vec![(b(x - 1), d(0)), (b(y - 1), d(0)), (b(z - 1), d(0))];
                bbe.extend((x..y - 1).map(|i| (b(i), d(i))));
                bbe.extend((y..z - 1).map(|i| (b(i), d(i - 1))));
                bbe.extend((z..l).map(|i| (b(i), d(i - 2))));
                out.push(block_case(
                    k,
                    Family::CycleTriple,
                    format!("Type 1.{}.{}{}{}", l, x, y, z),
                    l,
                    cycle_edges(l),
                    l - 2,
                    bbe,
                    0,
                ));
            }
        }
    }
    out
}

const PATH_LEN: usize = 8;

/// Type 2.X for 1 <= X <= 4: a path of eight vertices whose inner boundary
/// vertices 1..=8 sit between consecutive path vertices, augmented at X.
pub fn path(k: Height) -> Vec<Case> {
    let mut bbe = vec![(b(0), d(0)), (b(PATH_LEN - 1), d(PATH_LEN + 1))];
    bbe.extend((1..=PATH_LEN).map(|i| (b(i - 1), d(i))));
    (1..=4)
        .map(|x| {
            block_case(
                k,
                Family::Path,
                format!("Type 2.{}", x),
                PATH_LEN,
                path_edges(PATH_LEN),
                PATH_LEN + 2,
                bbe.clone(),
                x,
            )
        })
        .collect()
}

/// Type 2.XY for 1 <= X < Y <= 8 with X - 1 <= 8 - Y: path vertices X - 1
/// and Y - 1 share the augmented boundary vertex X.
pub fn path_shared(k: Height) -> Vec<Case> {
    let mut out = Vec::new();
    for x in 1..=4 {
        for y in x + 1..=PATH_LEN {
            if PATH_LEN - y < x - 1 {
                continue;
            }
            let mut bbe = vec![
                (b(0), d(0)),
                (b(PATH_LEN - 1), d(PATH_LEN)),
                (b(x - 1), d(x)),
                (b(y - 1), d(x)),
            ];
            bbe.extend((0..x - 1).map(|i| (b(i), d(i + 1))));
            bbe.extend((x..y - 1).map(|i| (b(i), d(i + 1))));
            bbe.extend((y..PATH_LEN).map(|i| (b(i), d(i))));
            out.push(block_case(
                k,
                Family::PathShared,
                format!("Type 2.{}{}", x, y),
                PATH_LEN,
                path_edges(PATH_LEN),
                PATH_LEN + 1,
                bbe,
                x,
            ));
        }
    }
    out
}

/// Type 2.XYZ for 1 <= X < Y < Z <= 8 with X - 1 <= 8 - Z: path vertices
/// X - 1, Y - 1 and Z - 1 share the augmented boundary vertex X.
pub fn path_triple(k: Height) -> Vec<Case> {
    let mut out = Vec::new();
    for x in 1..=4 {
        for y in x + 1..PATH_LEN {
            for z in y + 1..=PATH_LEN {
                if PATH_LEN - z < x - 1 {
                    continue;
                }
                let mut bbe = vec![
                    (b(0), d(0)),
                    (b(PATH_LEN - 1), d(PATH_LEN - 1)),
                    (b(x - 1), d(x)),
                    (b(y - 1), d(x)),
                    (b(z - 1), d(x)),
                ];
                bbe.extend((0..x - 1).map(|i| (b(i), d(i + 1))));
                bbe.extend((x..y - 1).map(|i| (b(i), d(i + 1))));
                bbe.extend((y..z - 1).map(|i| (b(i), d(i))));
                bbe.extend((z..PATH_LEN).map(|i| (b(i), d(i - 1))));
                out.push(block_case(
                    k,
                    Family::PathTriple,
                    format!("Type 2.{}{}{}", x, y, z),
                    PATH_LEN,
                    path_edges(PATH_LEN),
                    PATH_LEN,
                    bbe,
                    x,
                ));
            }
        }
    }
    out
}

/// A hexagon whose six vertices each have one boundary neighbor. By symmetry
/// only boundary vertex 0 is augmented.
pub fn hexagon(k: Height) -> Case {
    block_case(
        k,
        Family::Hexagon,
        "Hexagon".to_string(),
        6,
        cycle_edges(6),
        6,
        (0..6).map(|i| (b(i), d(i))).collect(),
        0,
    )
}

/// The 4x4 square block of the rectangular grid. By symmetry only the first
/// two front vertices are augmented.
pub fn grid(k: Height) -> Case {
    let layout = GridLayout::new(4, 4).expect("4x4 is a valid grid layout");
    Case {
        k,
        family: Family::Grid,
        label: "Grid 4x4".to_string(),
        workload: Workload::Grid {
            layout,
            augmentation_vertices: vec![
                layout.boundary_vertex(Side::Front, 0),
                layout.boundary_vertex(Side::Front, 1),
            ],
        },
    }
}
