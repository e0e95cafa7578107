//! Footprint normalization: raw map polygon to an axis-aligned loop.
//!
//! # Stages
//!
//! 1. **Deduplicate** consecutive equal nodes (wrap edge included).
//! 2. **Chain-rotate**: each node is rotated about the previous *corrected*
//!    node onto that node's dominant axis, then snapped to the grid pitch.
//!    The correction is local, so error never exceeds one pitch per edge.
//! 3. **Reduce** nodes that sit on a straight line with both neighbours.
//! 4. **Translate** the loop so its minimum x and y are 0.
//! 5. **Fill gaps** left by rounding with one synthetic corner per diagonal
//!    edge; the seam (last → first) continues the entering edge's axis.
//!
//! The result satisfies: every edge is axis-aligned, every coordinate is a
//! non-negative multiple of the pitch, min x = min y = 0.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::GeometryError;
use crate::geometry::{dedup_cyclic, round_to_pitch, PixelNode};

/// An axis-aligned footprint in structure-local pixel space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedStructure {
    /// Open loop, min x = min y = 0.
    pub nodes: Vec<PixelNode>,
    /// Where the loop's origin sits on the map (never negative).
    pub offset: PixelNode,
    pub speciality: bool,
}

/// Run every normalization stage over a framed footprint.
pub fn normalize(
    framed: &[PixelNode],
    speciality: bool,
    pitch: f64,
) -> Result<NormalizedStructure, GeometryError> {
    let nodes = dedup_cyclic(framed);
    if nodes.len() < 3 {
        return Err(GeometryError::DegenerateStructure(format!(
            "{} distinct nodes, need at least 3",
            nodes.len()
        )));
    }

    let nodes = chain_rotate(&nodes, pitch)?;
    let nodes = reduce_collinear(&nodes)?;
    let (nodes, shift) = translate_to_origin(&nodes);
    let nodes = fill_gaps(&nodes)?;
    // seam cleanup in fill_gaps may drop the extreme node
    let (nodes, reshift) = translate_to_origin(&nodes);

    let offset = PixelNode::new(
        (shift.x + reshift.x).max(0.0),
        (shift.y + reshift.y).max(0.0),
    );
    debug!(
        "normalized {} raw nodes into {} (offset {:.0},{:.0})",
        framed.len(),
        nodes.len(),
        offset.x,
        offset.y
    );

    Ok(NormalizedStructure {
        nodes,
        offset,
        speciality,
    })
}

fn snap(node: PixelNode, pitch: f64) -> PixelNode {
    PixelNode::new(round_to_pitch(node.x, pitch), round_to_pitch(node.y, pitch))
}

/// Rotate `point` counter-clockwise about `origin` by `angle` radians.
pub fn rotate_about(origin: PixelNode, point: PixelNode, angle: f64) -> PixelNode {
    let (sin, cos) = angle.sin_cos();
    let dx = point.x - origin.x;
    let dy = point.y - origin.y;
    PixelNode::new(
        origin.x + cos * dx - sin * dy,
        origin.y + sin * dx + cos * dy,
    )
}

/// Signed angle (radians) that turns the vector `from → to` onto its dominant axis.
///
/// Ties between |dx| and |dy| resolve to the vertical axis.
pub fn axis_correction_angle(from: PixelNode, to: PixelNode) -> Result<f64, GeometryError> {
    let vx = from.x - to.x;
    let vy = from.y - to.y;
    let len = vx.hypot(vy);
    if len == 0.0 || !len.is_finite() {
        return Err(GeometryError::DegenerateStructure(format!(
            "zero-length edge at ({:.1}, {:.1})",
            from.x, from.y
        )));
    }
    let (tx, ty) = if vx.abs() > vy.abs() {
        (vx.signum(), 0.0)
    } else {
        (0.0, vy.signum())
    };
    let (ux, uy) = (vx / len, vy / len);
    let cross = ux * ty - uy * tx;
    let dot = ux * tx + uy * ty;
    Ok(cross.atan2(dot))
}

/// Stage 2: incremental per-edge rotation onto the grid axes.
pub fn chain_rotate(nodes: &[PixelNode], pitch: f64) -> Result<Vec<PixelNode>, GeometryError> {
    let Some(&first) = nodes.first() else {
        return Ok(Vec::new());
    };
    let mut previous = snap(first, pitch);
    let mut out = Vec::with_capacity(nodes.len());
    out.push(previous);

    for &next in &nodes[1..] {
        let angle = axis_correction_angle(previous, next)?;
        let corrected = snap(rotate_about(previous, next, angle), pitch);
        out.push(corrected);
        previous = corrected;
    }
    Ok(out)
}

fn collinear(a: PixelNode, b: PixelNode, c: PixelNode) -> bool {
    (a.x == b.x && b.x == c.x) || (a.y == b.y && b.y == c.y)
}

/// Stage 3: drop rounding duplicates and nodes that add no shape information.
pub fn reduce_collinear(nodes: &[PixelNode]) -> Result<Vec<PixelNode>, GeometryError> {
    let mut nodes = dedup_cyclic(nodes);
    loop {
        let n = nodes.len();
        if n < 3 {
            break;
        }
        let redundant = (0..n).find(|&i| {
            collinear(nodes[(i + n - 1) % n], nodes[i], nodes[(i + 1) % n])
        });
        match redundant {
            Some(i) => {
                nodes.remove(i);
                nodes = dedup_cyclic(&nodes);
            }
            None => break,
        }
    }
    if nodes.len() < 3 {
        return Err(GeometryError::DegenerateStructure(format!(
            "collapsed to {} nodes after collinearity reduction",
            nodes.len()
        )));
    }
    Ok(nodes)
}

/// Stage 4: shift so min x and min y are 0. Returns the loop and the amount subtracted.
pub fn translate_to_origin(nodes: &[PixelNode]) -> (Vec<PixelNode>, PixelNode) {
    let min_x = nodes.iter().map(|n| n.x).fold(f64::INFINITY, f64::min);
    let min_y = nodes.iter().map(|n| n.y).fold(f64::INFINITY, f64::min);
    if !min_x.is_finite() || !min_y.is_finite() {
        return (nodes.to_vec(), PixelNode::default());
    }
    let moved = nodes
        .iter()
        .map(|n| PixelNode::new(n.x - min_x, n.y - min_y))
        .collect();
    (moved, PixelNode::new(min_x, min_y))
}

fn diagonal(a: PixelNode, b: PixelNode) -> bool {
    a.x != b.x && a.y != b.y
}

/// Stage 5: split every diagonal edge into two orthogonal ones.
pub fn fill_gaps(nodes: &[PixelNode]) -> Result<Vec<PixelNode>, GeometryError> {
    let n = nodes.len();
    let mut out = Vec::with_capacity(n + 2);
    for i in 0..n.saturating_sub(1) {
        let (a, b) = (nodes[i], nodes[i + 1]);
        out.push(a);
        if diagonal(a, b) {
            out.push(PixelNode::new(a.x, b.y));
        }
    }
    if let (Some(&last), Some(&first)) = (nodes.last(), nodes.first()) {
        out.push(last);
        if diagonal(last, first) {
            let entering_horizontal = out.len() >= 2 && out[out.len() - 2].y == last.y;
            let corner = if entering_horizontal {
                PixelNode::new(first.x, last.y)
            } else {
                PixelNode::new(last.x, first.y)
            };
            out.push(corner);
        }
    }

    // the seam corner may leave a straight or backtracking run behind
    let out = reduce_collinear(&out)?;
    if out.len() < 4 {
        return Err(GeometryError::DegenerateStructure(format!(
            "{} nodes after gap fill, need at least 4",
            out.len()
        )));
    }
    Ok(out)
}
