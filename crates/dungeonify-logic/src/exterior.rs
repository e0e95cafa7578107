//! Exterior walls: one door per structure, windows everywhere else.

use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::assets::StructureAssets;
use crate::config::GenerationConfig;
use crate::divider::InteriorWall;
use crate::error::Result;
use crate::features::{place_features, Feature, FeatureList, PlacerOptions, TilePlacement};
use crate::grid::GridStructure;

/// Everything the wall stages produce for one structure.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureFeatures {
    pub features: FeatureList,
    pub tiles: Vec<TilePlacement>,
    /// Index of the exterior edge carrying the door, if any edge was long enough.
    pub door_edge: Option<usize>,
}

/// Indices of the edges long enough to host the exterior door.
pub fn door_candidates(structure: &GridStructure, min_len: i32) -> Vec<usize> {
    structure
        .edges()
        .enumerate()
        .filter(|(_, e)| e.len() >= min_len)
        .map(|(i, _)| i)
        .collect()
}

/// Assemble the structure's feature list: interior run, `Exterior`, then
/// every boundary edge in loop order.
pub fn build_features<R: Rng>(
    structure: &GridStructure,
    interior: Option<&InteriorWall>,
    config: &GenerationConfig,
    assets: &StructureAssets,
    rng: &mut R,
) -> Result<StructureFeatures> {
    let mut out = StructureFeatures::default();
    if let Some(wall) = interior {
        out.features.extend_run(&wall.run.features);
        out.tiles.extend(wall.run.tiles.iter().cloned());
    }
    out.features.push(Feature::Exterior);

    let candidates = door_candidates(structure, config.door_min_edge);
    out.door_edge = candidates.choose(rng).copied();
    if out.door_edge.is_none() {
        debug!(
            "no exterior edge of at least {} squares, structure gets no door",
            config.door_min_edge
        );
    }

    for (i, edge) in structure.edges().enumerate() {
        let options = PlacerOptions {
            door: out.door_edge == Some(i),
            windows: true,
            window_chance: config.window_chance,
        };
        let run = place_features(edge, &options, &assets.exterior, rng)?;
        out.features.extend_run(&run.features);
        out.tiles.extend(run.tiles);
    }
    Ok(out)
}
