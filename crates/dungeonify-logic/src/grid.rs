//! Grid projection: normalized pixel loops onto integer grid squares.
//!
//! Besides quantizing, projection canonicalizes each loop: it starts at the
//! lexicographically smallest node (min x, then min y) and walks the left
//! side downwards first. Because that node is a top-left corner of an
//! orthogonal loop, its two edges are one vertical and one horizontal, so
//! "first edge vertical" fixes the winding.

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::geometry::{dedup_cyclic, grid_edges, GridEdge, GridNode};
use crate::normalize::NormalizedStructure;

/// A footprint on the grid, canonical start and winding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridStructure {
    pub nodes: Vec<GridNode>,
    pub speciality: bool,
}

impl GridStructure {
    pub fn edges(&self) -> impl Iterator<Item = GridEdge> + '_ {
        grid_edges(&self.nodes)
    }

    /// Perimeter length in grid units.
    pub fn perimeter(&self) -> i32 {
        self.edges().map(|e| e.len()).sum()
    }
}

/// Index of the lexicographic (x, then y) minimum. Ties keep the first.
pub fn start_index(nodes: &[GridNode]) -> usize {
    let mut best = 0;
    for (i, n) in nodes.iter().enumerate().skip(1) {
        let b = nodes[best];
        if (n.x, n.y) < (b.x, b.y) {
            best = i;
        }
    }
    best
}

/// Quantize, rotate to the canonical start node and fix the winding.
pub fn project(
    structure: &NormalizedStructure,
    pitch: f64,
) -> Result<GridStructure, GeometryError> {
    let quantized: Vec<GridNode> = structure
        .nodes
        .iter()
        .map(|n| {
            GridNode::new(
                ((n.x + structure.offset.x) / pitch).round_ties_even() as i32,
                ((n.y + structure.offset.y) / pitch).round_ties_even() as i32,
            )
        })
        .collect();

    let mut nodes = dedup_cyclic(&quantized);
    if nodes.len() < 4 {
        return Err(GeometryError::DegenerateStructure(format!(
            "{} grid nodes after projection, need at least 4",
            nodes.len()
        )));
    }

    let start = start_index(&nodes);
    nodes.rotate_left(start);
    if nodes[0].y == nodes[1].y {
        nodes[1..].reverse();
    }

    Ok(GridStructure {
        nodes,
        speciality: structure.speciality,
    })
}
