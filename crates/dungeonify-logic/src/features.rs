//! Wall features: walls, doors and windows placed along grid edges.
//!
//! A feature is a change point: `Window@(3,0)` followed by `Wall@(5,0)`
//! means the wall is glazed from x=3 to x=5. The placer walks an edge one
//! grid unit at a time and only emits a record when the type changes, so a
//! run is always `Wall@start … Wall@end`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::assets::WallAssets;
use crate::error::{AssetError, GeometryError, Result};
use crate::geometry::{GridEdge, GridNode, Orientation};

/// One feature record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "node")]
pub enum Feature {
    Wall(GridNode),
    Door(GridNode),
    Window(GridNode),
    /// Separates a structure's interior run from its exterior runs.
    Exterior,
}

impl Feature {
    pub fn node(&self) -> Option<GridNode> {
        match *self {
            Feature::Wall(n) | Feature::Door(n) | Feature::Window(n) => Some(n),
            Feature::Exterior => None,
        }
    }

    pub fn is_wall(&self) -> bool {
        matches!(self, Feature::Wall(_))
    }

    pub fn is_portal(&self) -> bool {
        matches!(self, Feature::Door(_) | Feature::Window(_))
    }

    fn same_kind(&self, other: &Feature) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// A structure's ordered features: interior run, `Exterior`, exterior runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureList(pub Vec<Feature>);

impl FeatureList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_slice(&self) -> &[Feature] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn push(&mut self, feature: Feature) {
        self.0.push(feature);
    }

    /// Append an edge run, dropping its leading wall if the list already ends there.
    pub fn extend_run(&mut self, run: &[Feature]) {
        let skip = match (self.0.last(), run.first()) {
            (Some(last), Some(first)) if last == first && first.is_wall() => 1,
            _ => 0,
        };
        self.0.extend_from_slice(&run[skip..]);
    }

    /// Features before the `Exterior` sentinel.
    pub fn interior(&self) -> &[Feature] {
        match self.0.iter().position(|f| *f == Feature::Exterior) {
            Some(i) => &self.0[..i],
            None => &[],
        }
    }

    /// Features after the `Exterior` sentinel.
    pub fn exterior(&self) -> &[Feature] {
        match self.0.iter().position(|f| *f == Feature::Exterior) {
            Some(i) => &self.0[i + 1..],
            None => &self.0,
        }
    }

    pub fn count_doors(&self) -> usize {
        self.0.iter().filter(|f| matches!(f, Feature::Door(_))).count()
    }

    pub fn count_windows(&self) -> usize {
        self.0.iter().filter(|f| matches!(f, Feature::Window(_))).count()
    }
}

/// A drawable tile for the rendering collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilePlacement {
    pub cell: GridNode,
    pub asset: String,
    pub rotation_degrees: u16,
}

/// Output of one placer walk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EdgeRun {
    pub features: Vec<Feature>,
    pub tiles: Vec<TilePlacement>,
}

/// Switches for one placer walk.
#[derive(Debug, Clone, Copy)]
pub struct PlacerOptions {
    pub door: bool,
    pub windows: bool,
    pub window_chance: f64,
}

#[derive(Clone, Copy, PartialEq)]
enum Slot {
    Wall,
    Door,
    Window,
}

/// Walk `edge` and place features along it.
///
/// Endpoints are always wall. With `door` set and an edge of at least three
/// units, exactly one interior position becomes a door. With `windows` set,
/// every other interior position not next to the door rolls `window_chance`.
pub fn place_features<R: Rng>(
    edge: GridEdge,
    options: &PlacerOptions,
    assets: &WallAssets,
    rng: &mut R,
) -> Result<EdgeRun> {
    let orientation = edge.orientation().ok_or_else(|| {
        GeometryError::DegenerateStructure(format!(
            "edge ({}, {}) -> ({}, {}) is not axis-aligned",
            edge.start.x, edge.start.y, edge.end.x, edge.end.y
        ))
    })?;
    let window_assets = if options.windows {
        let missing = |category: &str| AssetError::NotFound {
            category: category.to_string(),
        };
        Some((
            assets.window.clone().ok_or_else(|| missing("windows"))?,
            assets.sill.clone().ok_or_else(|| missing("sills"))?,
        ))
    } else {
        None
    };

    let len = edge.len();
    let step = edge.step();
    let at = |k: i32| match orientation {
        Orientation::Horizontal => GridNode::new(edge.start.x + k * step, edge.start.y),
        Orientation::Vertical => GridNode::new(edge.start.x, edge.start.y + k * step),
    };
    // wall art is drawn vertically; everything else horizontally
    let (wall_rotation, opening_rotation) = match orientation {
        Orientation::Horizontal => (90, 0),
        Orientation::Vertical => (0, 90),
    };

    let chance = if options.window_chance.is_nan() {
        0.0
    } else {
        options.window_chance.clamp(0.0, 1.0)
    };
    let door = if options.door && len >= 3 {
        Some(rng.gen_range(1..=len - 2))
    } else {
        None
    };

    let mut run = EdgeRun::default();
    run.features.push(Feature::Wall(edge.start));
    let mut last = Slot::Wall;

    for k in 0..len {
        let cell = at(k);
        let endpoint = k == 0 || k == len - 1;
        let slot = if endpoint {
            Slot::Wall
        } else if door == Some(k) {
            Slot::Door
        } else {
            let near_door = door.is_some_and(|d| (k - d).abs() <= 1);
            if window_assets.is_some() && rng.gen_bool(chance) && !near_door {
                Slot::Window
            } else {
                Slot::Wall
            }
        };

        match slot {
            Slot::Door => {
                run.features.push(Feature::Door(cell));
                run.tiles.push(TilePlacement {
                    cell,
                    asset: assets.door.clone(),
                    rotation_degrees: opening_rotation,
                });
            }
            Slot::Window => {
                if last != Slot::Window {
                    run.features.push(Feature::Window(cell));
                }
                if let Some((window, sill)) = &window_assets {
                    run.tiles.push(TilePlacement {
                        cell,
                        asset: sill.clone(),
                        rotation_degrees: opening_rotation,
                    });
                    run.tiles.push(TilePlacement {
                        cell,
                        asset: window.clone(),
                        rotation_degrees: opening_rotation,
                    });
                }
            }
            Slot::Wall => {
                if last != Slot::Wall {
                    run.features.push(Feature::Wall(cell));
                }
                run.tiles.push(TilePlacement {
                    cell,
                    asset: assets.wall.clone(),
                    rotation_degrees: wall_rotation,
                });
            }
        }
        last = slot;
    }

    if run.features.last() != Some(&Feature::Wall(edge.end)) {
        run.features.push(Feature::Wall(edge.end));
    }
    Ok(run)
}

/// True when no two neighbouring records share a type, except a wall
/// followed by a terminating wall on a different node.
pub fn is_coalesced(features: &[Feature]) -> bool {
    features.windows(2).all(|pair| {
        let (a, b) = (pair[0], pair[1]);
        if a == Feature::Exterior || b == Feature::Exterior || !a.same_kind(&b) {
            return true;
        }
        match (a, b) {
            (Feature::Wall(x), Feature::Wall(y)) => x != y,
            _ => false,
        }
    })
}
