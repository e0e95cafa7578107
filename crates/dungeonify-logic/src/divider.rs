//! Space division: one interior wall per structure.
//!
//! The wall leaves the midpoint of the longest boundary edge (measured in
//! real-world inches), runs perpendicular into the footprint and stops at the
//! first boundary node it meets. The footprint is then cut into two rooms
//! along that wall. Rooms are reported but not divided further.

use std::cmp::Ordering;
use std::collections::HashSet;

use log::debug;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::assets::WallAssets;
use crate::config::{GenerationConfig, InchesPerPixel};
use crate::error::{GeometryError, Result};
use crate::features::{place_features, EdgeRun, PlacerOptions};
use crate::geometry::{boundary_nodes, grid_area, grid_bounds, GridEdge, GridNode, Orientation};
use crate::grid::GridStructure;

/// The interior wall and the two rooms it creates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InteriorWall {
    pub start: GridNode,
    pub end: GridNode,
    #[serde(skip)]
    pub run: EdgeRun,
    pub room1: Vec<GridNode>,
    pub room2: Vec<GridNode>,
}

impl InteriorWall {
    pub fn edge(&self) -> GridEdge {
        GridEdge::new(self.start, self.end)
    }

    /// Wall length in grid units.
    pub fn length(&self) -> i32 {
        self.edge().len()
    }
}

/// Index of the longest edge in inches. Ties keep the earliest edge.
pub fn longest_edge(nodes: &[GridNode], scale: &InchesPerPixel) -> Option<usize> {
    let n = nodes.len();
    let mut best: Option<(usize, f64)> = None;
    for i in 0..n {
        let d = GridEdge::new(nodes[i], nodes[(i + 1) % n]).inches(scale);
        match best {
            Some((_, longest)) if d <= longest => {}
            _ => best = Some((i, d)),
        }
    }
    best.map(|(i, _)| i)
}

/// Wall start on `edge` and the unit step of the scan away from it.
fn wall_origin(edge: GridEdge) -> Result<(GridNode, GridNode)> {
    let (a, b) = (edge.start, edge.end);
    match edge.orientation() {
        Some(Orientation::Vertical) => {
            let dx = if a.y < b.y { 1 } else { -1 };
            Ok((GridNode::new(a.x, (a.y + b.y).div_euclid(2)), GridNode::new(dx, 0)))
        }
        Some(Orientation::Horizontal) => {
            let dy = if a.x < b.x { -1 } else { 1 };
            Ok((GridNode::new((a.x + b.x).div_euclid(2), a.y), GridNode::new(0, dy)))
        }
        None => Err(GeometryError::DegenerateStructure(format!(
            "longest edge ({}, {}) -> ({}, {}) is not axis-aligned",
            a.x, a.y, b.x, b.y
        ))
        .into()),
    }
}

/// Walk from `start` along `step` until a boundary node is met, staying
/// inside the bounding box.
fn scan_for_boundary(
    start: GridNode,
    step: GridNode,
    boundary: &HashSet<GridNode>,
    bounds: (GridNode, GridNode),
) -> Option<GridNode> {
    let (min, max) = bounds;
    let inside = |n: GridNode| n.x >= min.x && n.x <= max.x && n.y >= min.y && n.y <= max.y;
    let mut cursor = GridNode::new(start.x + step.x, start.y + step.y);
    while inside(cursor) {
        if boundary.contains(&cursor) {
            return Some(cursor);
        }
        cursor = GridNode::new(cursor.x + step.x, cursor.y + step.y);
    }
    None
}

/// Index of the first edge whose rasterization contains `node`.
fn edge_containing(nodes: &[GridNode], node: GridNode) -> Option<usize> {
    let n = nodes.len();
    (0..n).find(|&i| {
        GridEdge::new(nodes[i], nodes[(i + 1) % n])
            .rasterize()
            .contains(&node)
    })
}

fn dedup_consecutive(mut nodes: Vec<GridNode>) -> Vec<GridNode> {
    nodes.dedup();
    while nodes.len() > 1 && nodes.first() == nodes.last() {
        nodes.pop();
    }
    nodes
}

/// Cut the loop at edges `i` (holding `start`) and `j` (holding `end`).
pub fn partition(
    nodes: &[GridNode],
    i: usize,
    j: usize,
    start: GridNode,
    end: GridNode,
) -> (Vec<GridNode>, Vec<GridNode>) {
    let (p, q) = if i <= j { (i, j) } else { (j, i) };
    // the endpoint lying on edge p comes first
    let start_first = match i.cmp(&j) {
        Ordering::Less => true,
        Ordering::Greater => false,
        Ordering::Equal => start.manhattan(&nodes[p]) < end.manhattan(&nodes[p]),
    };
    let (first, second) = if start_first {
        (start, end)
    } else {
        (end, start)
    };

    let mut room1: Vec<GridNode> = nodes[..=p].to_vec();
    room1.push(first);
    room1.push(second);
    room1.extend_from_slice(&nodes[q + 1..]);

    let mut room2 = vec![first];
    room2.extend_from_slice(&nodes[p + 1..=q]);
    room2.push(second);

    (dedup_consecutive(room1), dedup_consecutive(room2))
}

/// Place the interior wall of `structure`, or `None` when it is too small.
pub fn divide<R: Rng>(
    structure: &GridStructure,
    scale: &InchesPerPixel,
    config: &GenerationConfig,
    assets: &WallAssets,
    rng: &mut R,
) -> Result<Option<InteriorWall>> {
    let nodes = &structure.nodes;
    let area = grid_area(nodes);
    if area <= config.min_area {
        debug!("area {:.1} at or below {:.1}, no interior wall", area, config.min_area);
        return Ok(None);
    }

    let (i, bounds) = match (longest_edge(nodes, scale), grid_bounds(nodes)) {
        (Some(i), Some(bounds)) => (i, bounds),
        _ => {
            return Err(GeometryError::DegenerateStructure("empty grid loop".into()).into());
        }
    };
    let longest = GridEdge::new(nodes[i], nodes[(i + 1) % nodes.len()]);
    let (start, step) = wall_origin(longest)?;

    let boundary: HashSet<GridNode> = boundary_nodes(nodes).into_iter().collect();
    let end = scan_for_boundary(start, step, &boundary, bounds)
        .ok_or(GeometryError::NoMatchingWall { start })?;
    let j = edge_containing(nodes, end).ok_or(GeometryError::NoMatchingWall { start })?;

    let (room1, room2) = partition(nodes, i, j, start, end);

    let options = PlacerOptions {
        door: true,
        windows: false,
        window_chance: config.window_chance,
    };
    let run = place_features(GridEdge::new(start, end), &options, assets, rng)?;
    debug!(
        "interior wall ({}, {}) -> ({}, {}), rooms of {} and {} nodes",
        start.x,
        start.y,
        end.x,
        end.y,
        room1.len(),
        room2.len()
    );

    Ok(Some(InteriorWall {
        start,
        end,
        run,
        room1,
        room2,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DungeonifyError;
    use crate::features::Feature;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn g(x: i32, y: i32) -> GridNode {
        GridNode::new(x, y)
    }

    fn structure(points: &[(i32, i32)]) -> GridStructure {
        GridStructure {
            nodes: points.iter().map(|&(x, y)| g(x, y)).collect(),
            speciality: false,
        }
    }

    fn interior_assets() -> WallAssets {
        WallAssets {
            wall: "wall/interior".into(),
            door: "door/single".into(),
            window: None,
            sill: None,
        }
    }

    fn small_threshold() -> GenerationConfig {
        GenerationConfig {
            min_area: 10.0,
            ..GenerationConfig::default()
        }
    }

    const UNIT: InchesPerPixel = InchesPerPixel {
        horizontal: 1.0,
        vertical: 1.0,
    };

    #[test]
    fn test_square_split() {
        let s = structure(&[(0, 0), (0, 4), (4, 4), (4, 0)]);
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let wall = divide(&s, &UNIT, &small_threshold(), &interior_assets(), &mut rng)
                .unwrap()
                .unwrap();
            assert_eq!(wall.start, g(0, 2));
            assert_eq!(wall.end, g(4, 2));
            let doors = wall.run.features.iter().filter(|f| matches!(f, Feature::Door(_))).count();
            let windows = wall
                .run
                .features
                .iter()
                .filter(|f| matches!(f, Feature::Window(_)))
                .count();
            assert_eq!(doors, 1);
            assert_eq!(windows, 0);
            assert_eq!(wall.room1, vec![g(0, 0), g(0, 2), g(4, 2), g(4, 0)]);
            assert_eq!(wall.room2, vec![g(0, 2), g(0, 4), g(4, 4), g(4, 2)]);
        }
    }

    #[test]
    fn test_small_structure_has_no_wall() {
        let s = structure(&[(0, 0), (0, 4), (4, 4), (4, 0)]);
        let mut rng = StdRng::seed_from_u64(42);
        let cfg = GenerationConfig::default();
        assert!(divide(&s, &UNIT, &cfg, &interior_assets(), &mut rng)
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_longest_edge_tie_keeps_first() {
        let square = [g(0, 0), g(0, 4), g(4, 4), g(4, 0)];
        assert_eq!(longest_edge(&square, &UNIT), Some(0));
        // wide pixels make the horizontal edges longer
        let wide = InchesPerPixel::new(2.0, 0.5);
        assert_eq!(longest_edge(&square, &wide), Some(1));
    }

    #[test]
    fn test_horizontal_longest_edge_scans_up() {
        let s = structure(&[(0, 0), (0, 4), (8, 4), (8, 0)]);
        let mut rng = StdRng::seed_from_u64(42);
        let wall = divide(&s, &UNIT, &small_threshold(), &interior_assets(), &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(wall.start, g(4, 4));
        assert_eq!(wall.end, g(4, 0));
        assert_eq!(wall.length(), 4);
    }

    #[test]
    fn test_l_shape_partition() {
        // longest edge is the left side, the wall runs right at y=4
        let s = structure(&[(0, 0), (0, 8), (6, 8), (6, 4), (3, 4), (3, 0)]);
        let mut rng = StdRng::seed_from_u64(1);
        let wall = divide(&s, &UNIT, &small_threshold(), &interior_assets(), &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(wall.start, g(0, 4));
        assert_eq!(wall.end, g(3, 4));
        assert_eq!(wall.room2, vec![g(0, 4), g(0, 8), g(6, 8), g(6, 4), g(3, 4)]);
        assert_eq!(wall.room1, vec![g(0, 0), g(0, 4), g(3, 4), g(3, 0)]);
    }

    #[test]
    fn test_partition_orders_by_edge() {
        // wall starts on the closing edge and ends on edge 1
        let square = [g(0, 0), g(0, 4), g(4, 4), g(4, 0)];
        let (room1, room2) = partition(&square, 3, 1, g(2, 0), g(2, 4));
        assert_eq!(room1, vec![g(0, 0), g(0, 4), g(2, 4), g(2, 0)]);
        assert_eq!(room2, vec![g(2, 4), g(4, 4), g(4, 0), g(2, 0)]);

        let (room1, room2) = partition(&square, 1, 3, g(2, 4), g(2, 0));
        assert_eq!(room1, vec![g(0, 0), g(0, 4), g(2, 4), g(2, 0)]);
        assert_eq!(room2, vec![g(2, 4), g(4, 4), g(4, 0), g(2, 0)]);
    }

    #[test]
    fn test_no_matching_wall() {
        // the closing edge is diagonal, so the scan never meets the boundary
        let s = structure(&[(0, 0), (0, 30), (10, 30), (10, 28)]);
        let mut rng = StdRng::seed_from_u64(42);
        let err = divide(&s, &UNIT, &small_threshold(), &interior_assets(), &mut rng).unwrap_err();
        match err {
            DungeonifyError::Geometry(GeometryError::NoMatchingWall { start }) => {
                assert_eq!(start, g(0, 15));
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
