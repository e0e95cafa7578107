//! Nodes, edges and loop helpers shared by every stage.
//!
//! Two coordinate spaces are used: continuous pixel space ([`PixelNode`],
//! produced by framing and normalization) and integer grid space
//! ([`GridNode`], produced by projection). Loops are stored open (the
//! closing node is never repeated) and edges are derived cyclically.

use serde::{Deserialize, Serialize};

use crate::config::InchesPerPixel;

/// A point in continuous pixel space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PixelNode {
    pub x: f64,
    pub y: f64,
}

impl PixelNode {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// A point on the integer grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct GridNode {
    pub x: i32,
    pub y: i32,
}

impl GridNode {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn manhattan(&self, other: &GridNode) -> i32 {
        (other.x - self.x).abs() + (other.y - self.y).abs()
    }

    pub fn offset(&self, by: i32) -> GridNode {
        GridNode::new(self.x + by, self.y + by)
    }
}

/// Axis an edge runs along.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

/// An axis-aligned edge between two grid nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridEdge {
    pub start: GridNode,
    pub end: GridNode,
}

impl GridEdge {
    pub fn new(start: GridNode, end: GridNode) -> Self {
        Self { start, end }
    }

    /// Orientation of the edge, or `None` for a zero-length or diagonal edge.
    pub fn orientation(&self) -> Option<Orientation> {
        let dx = self.end.x - self.start.x;
        let dy = self.end.y - self.start.y;
        match (dx != 0, dy != 0) {
            (true, false) => Some(Orientation::Horizontal),
            (false, true) => Some(Orientation::Vertical),
            _ => None,
        }
    }

    /// Unit step (+1/-1) along the edge's axis.
    pub fn step(&self) -> i32 {
        let d = (self.end.x - self.start.x) + (self.end.y - self.start.y);
        if d < 0 {
            -1
        } else {
            1
        }
    }

    /// Length in grid units (Manhattan, equal to Euclidean for axis-aligned edges).
    pub fn len(&self) -> i32 {
        self.start.manhattan(&self.end)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Every grid node on the edge, start inclusive, end exclusive.
    pub fn rasterize(&self) -> Vec<GridNode> {
        let step = self.step();
        match self.orientation() {
            Some(Orientation::Horizontal) => (0..self.len())
                .map(|k| GridNode::new(self.start.x + k * step, self.start.y))
                .collect(),
            Some(Orientation::Vertical) => (0..self.len())
                .map(|k| GridNode::new(self.start.x, self.start.y + k * step))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Length in real-world inches using the map's per-pixel scale.
    pub fn inches(&self, scale: &InchesPerPixel) -> f64 {
        let h = f64::from(self.end.x - self.start.x) * scale.horizontal;
        let v = f64::from(self.end.y - self.start.y) * scale.vertical;
        (h * h + v * v).sqrt()
    }
}

/// Cyclic edges of an open grid loop.
pub fn grid_edges(nodes: &[GridNode]) -> impl Iterator<Item = GridEdge> + '_ {
    let n = nodes.len();
    (0..n).map(move |i| GridEdge::new(nodes[i], nodes[(i + 1) % n]))
}

/// Every boundary node of an open grid loop, in traversal order.
pub fn boundary_nodes(nodes: &[GridNode]) -> Vec<GridNode> {
    grid_edges(nodes).flat_map(|e| e.rasterize()).collect()
}

/// Absolute polygon area via the shoelace formula.
pub fn shoelace_area<T: Copy>(nodes: &[T], xy: impl Fn(T) -> (f64, f64)) -> f64 {
    let n = nodes.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let (x0, y0) = xy(nodes[i]);
        let (x1, y1) = xy(nodes[(i + 1) % n]);
        sum += x0 * y1 - x1 * y0;
    }
    (sum * 0.5).abs()
}

pub fn grid_area(nodes: &[GridNode]) -> f64 {
    shoelace_area(nodes, |n| (f64::from(n.x), f64::from(n.y)))
}

pub fn pixel_area(nodes: &[PixelNode]) -> f64 {
    shoelace_area(nodes, |n| (n.x, n.y))
}

/// Drop every node equal to its successor, including across the wrap edge.
pub fn dedup_cyclic<T: PartialEq + Copy>(nodes: &[T]) -> Vec<T> {
    let n = nodes.len();
    let mut out: Vec<T> = Vec::with_capacity(n);
    for i in 0..n {
        if nodes[i] != nodes[(i + 1) % n] {
            out.push(nodes[i]);
        }
    }
    // a loop of identical nodes collapses to nothing above
    if out.is_empty() && n > 0 {
        out.push(nodes[0]);
    }
    out
}

/// Inclusive bounding box `(min, max)` of a grid loop.
pub fn grid_bounds(nodes: &[GridNode]) -> Option<(GridNode, GridNode)> {
    let first = nodes.first()?;
    let mut min = *first;
    let mut max = *first;
    for n in nodes {
        min.x = min.x.min(n.x);
        min.y = min.y.min(n.y);
        max.x = max.x.max(n.x);
        max.y = max.y.max(n.y);
    }
    Some((min, max))
}

/// Round `value` to the nearest multiple of `pitch`.
pub fn round_to_pitch(value: f64, pitch: f64) -> f64 {
    (value / pitch).round_ties_even() * pitch
}

/// Round `value` up to the next multiple of `pitch`.
pub fn round_up_to_pitch(value: f64, pitch: f64) -> f64 {
    (value / pitch).ceil() * pitch
}

#[cfg(test)]
mod tests {
    use super::*;

    fn g(x: i32, y: i32) -> GridNode {
        GridNode::new(x, y)
    }

    #[test]
    fn test_edge_rasterize_excludes_end() {
        let e = GridEdge::new(g(4, 4), g(4, 0));
        assert_eq!(e.rasterize(), vec![g(4, 4), g(4, 3), g(4, 2), g(4, 1)]);
        assert_eq!(e.step(), -1);
        assert_eq!(e.orientation(), Some(Orientation::Vertical));
    }

    #[test]
    fn test_diagonal_edge_has_no_orientation() {
        let e = GridEdge::new(g(0, 0), g(2, 3));
        assert_eq!(e.orientation(), None);
        assert!(e.rasterize().is_empty());
    }

    #[test]
    fn test_boundary_nodes_cover_perimeter_once() {
        let square = [g(0, 0), g(0, 4), g(4, 4), g(4, 0)];
        let all = boundary_nodes(&square);
        assert_eq!(all.len(), 16);
        assert!(all.contains(&g(4, 2)));
        assert!(!all.contains(&g(2, 2)));
    }

    #[test]
    fn test_shoelace_square() {
        let square = [g(0, 0), g(0, 4), g(4, 4), g(4, 0)];
        assert!((grid_area(&square) - 16.0).abs() < 1e-9);
        let px = [
            PixelNode::new(0.0, 0.0),
            PixelNode::new(3.0, 0.0),
            PixelNode::new(3.0, 2.0),
        ];
        assert!((pixel_area(&px) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_dedup_cyclic_checks_wrap() {
        let nodes = [g(0, 0), g(0, 0), g(1, 0), g(1, 1), g(0, 0)];
        assert_eq!(dedup_cyclic(&nodes), vec![g(0, 0), g(1, 0), g(1, 1)]);
    }

    #[test]
    fn test_inches_uses_scale_per_axis() {
        let scale = InchesPerPixel::new(2.0, 0.5);
        let h = GridEdge::new(g(0, 0), g(3, 0));
        let v = GridEdge::new(g(0, 0), g(0, 3));
        assert!((h.inches(&scale) - 6.0).abs() < 1e-9);
        assert!((v.inches(&scale) - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_round_to_pitch() {
        assert!((round_to_pitch(14.0, 6.0) - 12.0).abs() < 1e-9);
        assert!((round_to_pitch(16.0, 6.0) - 18.0).abs() < 1e-9);
        assert!((round_up_to_pitch(13.0, 6.0) - 18.0).abs() < 1e-9);
    }

    #[test]
    fn test_round_to_pitch_half_goes_to_even() {
        assert_eq!(round_to_pitch(15.0, 6.0), 12.0);
        assert_eq!(round_to_pitch(3.0, 6.0), 0.0);
        assert_eq!(round_to_pitch(9.0, 6.0), 12.0);
    }
}
