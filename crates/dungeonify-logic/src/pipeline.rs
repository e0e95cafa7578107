//! Pipeline driver: raw footprints to floor plans, plan and document.
//!
//! Framing runs once over the whole map. Every later stage runs per
//! structure with its own generator seeded from the run seed and the
//! structure's index, so a structure's output does not depend on which
//! other structures were processed or skipped.

use std::path::Path;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use crate::assets::{AssetCatalog, StructureAssets};
use crate::config::{FailurePolicy, GenerationConfig};
use crate::divider::{divide, InteriorWall};
use crate::error::Result;
use crate::exterior::build_features;
use crate::features::{FeatureList, TilePlacement};
use crate::frame::{MapFrame, MapInput, RawStructure};
use crate::geometry::{pixel_area, GridNode};
use crate::grid::{project, GridStructure};
use crate::normalize::normalize;
use crate::render::{CompositeRenderer, RenderPlan, StructurePlan};
use crate::vtt::{build_document, write_document, Document};

/// One structure after every stage.
#[derive(Debug, Clone, Serialize)]
pub struct FloorPlan {
    pub index: usize,
    pub grid: GridStructure,
    pub interior: Option<InteriorWall>,
    pub features: FeatureList,
    #[serde(skip)]
    pub tiles: Vec<TilePlacement>,
    pub door_edge: Option<usize>,
    pub assets: StructureAssets,
    /// Footprint area in zoomed map pixels, before and after normalization.
    pub raw_area: f64,
    pub normalized_area: f64,
}

/// The result of one run.
#[derive(Debug, Clone)]
pub struct Generation {
    pub frame: MapFrame,
    pub floor_plans: Vec<FloorPlan>,
    pub roads: Vec<Vec<GridNode>>,
    pub exterior_floor: String,
    /// Indices of structures left out under [`FailurePolicy::Skip`].
    pub skipped: Vec<usize>,
}

/// Run every stage for one structure.
pub fn process_structure(
    index: usize,
    raw: &RawStructure,
    frame: &MapFrame,
    config: &GenerationConfig,
    catalog: &AssetCatalog,
) -> Result<FloorPlan> {
    let mut rng = StdRng::seed_from_u64(config.structure_seed(index));
    let pitch = frame.pixels_per_grid;

    let framed = frame.frame_structure(raw);
    let normalized = normalize(&framed, raw.speciality, pitch)?;
    let grid = project(&normalized, pitch)?;

    let assets = catalog.select(grid.speciality, &mut rng)?;
    let interior = divide(
        &grid,
        &frame.inches_per_pixel,
        config,
        &assets.interior,
        &mut rng,
    )?;
    let walls = build_features(&grid, interior.as_ref(), config, &assets, &mut rng)?;
    debug!(
        "structure #{}: {} grid nodes, {} feature records",
        index,
        grid.nodes.len(),
        walls.features.len()
    );

    Ok(FloorPlan {
        index,
        raw_area: pixel_area(&framed),
        normalized_area: pixel_area(&normalized.nodes),
        grid,
        interior,
        features: walls.features,
        tiles: walls.tiles,
        door_edge: walls.door_edge,
        assets,
    })
}

/// Frame the map and process every structure.
pub fn generate(
    input: &MapInput,
    config: &GenerationConfig,
    catalog: &AssetCatalog,
) -> Result<Generation> {
    let frame = MapFrame::fit(input, config)?;
    info!(
        "map {}x{} squares at {} px per square, {} structures",
        frame.width_squares,
        frame.height_squares,
        frame.pixels_per_grid,
        input.structures.len()
    );

    let mut floor_plans = Vec::with_capacity(input.structures.len());
    let mut skipped = Vec::new();
    for (index, raw) in input.structures.iter().enumerate() {
        match process_structure(index, raw, &frame, config, catalog) {
            Ok(plan) => floor_plans.push(plan),
            Err(e) => {
                let e = e.in_structure(index);
                match config.failure_policy {
                    FailurePolicy::Abort => return Err(e),
                    FailurePolicy::Skip => {
                        warn!("skipping {}", e);
                        skipped.push(index);
                    }
                }
            }
        }
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let exterior_floor = catalog.exterior_floor(&mut rng)?;
    let roads = frame.project_roads(&input.roads);

    let doors: usize = floor_plans.iter().map(|p| p.features.count_doors()).sum();
    let windows: usize = floor_plans.iter().map(|p| p.features.count_windows()).sum();
    info!(
        "generated {} floor plans ({} skipped): {} doors, {} windows",
        floor_plans.len(),
        skipped.len(),
        doors,
        windows
    );

    Ok(Generation {
        frame,
        floor_plans,
        roads,
        exterior_floor,
        skipped,
    })
}

impl Generation {
    /// Drawing instructions matching exactly what the document will contain.
    pub fn render_plan(&self, config: &GenerationConfig) -> RenderPlan {
        RenderPlan {
            width_squares: self.frame.width_squares,
            height_squares: self.frame.height_squares,
            pixels_per_grid: config.asset_size,
            exterior_floor: self.exterior_floor.clone(),
            roads: self.roads.clone(),
            structures: self
                .floor_plans
                .iter()
                .map(|p| StructurePlan {
                    index: p.index,
                    floor: p.assets.floor.clone(),
                    outline: p.grid.nodes.clone(),
                    pillar: p.assets.pillar.clone(),
                    pillar_cells: p.grid.nodes.clone(),
                    tiles: p.tiles.clone(),
                })
                .collect(),
        }
    }

    pub fn document(&self, config: &GenerationConfig, image: &[u8]) -> Document {
        build_document(
            self.floor_plans.iter().map(|p| &p.features),
            &self.frame,
            config,
            image,
        )
    }

    /// Render the plan, build the document and write it to `path`.
    pub fn export(
        &self,
        config: &GenerationConfig,
        renderer: &dyn CompositeRenderer,
        path: &Path,
    ) -> Result<Document> {
        let image = renderer.render(&self.render_plan(config))?;
        let doc = self.document(config, &image);
        write_document(&doc, path)?;
        info!(
            "exported {} walls and {} portals",
            doc.line_of_sight.len(),
            doc.portals.len()
        );
        Ok(doc)
    }
}
