//! Render plan: what the compositing collaborator is asked to draw.
//!
//! The plan carries exactly the grid cells and tile placements the exporter
//! serializes, so the embedded image can never disagree with the walls and
//! portals in the document.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::features::TilePlacement;
use crate::geometry::GridNode;

/// Drawing instructions for one structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructurePlan {
    /// Index of the structure in the ingested input.
    pub index: usize,
    pub floor: String,
    pub outline: Vec<GridNode>,
    pub pillar: String,
    /// Corner cells that get a pillar.
    pub pillar_cells: Vec<GridNode>,
    pub tiles: Vec<TilePlacement>,
}

/// Drawing instructions for the whole map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderPlan {
    pub width_squares: i32,
    pub height_squares: i32,
    /// Pixel size of one asset tile.
    pub pixels_per_grid: u32,
    pub exterior_floor: String,
    pub roads: Vec<Vec<GridNode>>,
    pub structures: Vec<StructurePlan>,
}

impl RenderPlan {
    pub fn image_size(&self) -> (u32, u32) {
        let side = |squares: i32| squares.max(0) as u32 * self.pixels_per_grid;
        (side(self.width_squares), side(self.height_squares))
    }

    pub fn tile_count(&self) -> usize {
        self.structures.iter().map(|s| s.tiles.len()).sum()
    }
}

/// Produces the composite PNG for a plan.
pub trait CompositeRenderer {
    fn render(&self, plan: &RenderPlan) -> Result<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Blank;

    impl CompositeRenderer for Blank {
        fn render(&self, plan: &RenderPlan) -> Result<Vec<u8>> {
            let (w, h) = plan.image_size();
            Ok(vec![0; (w * h) as usize])
        }
    }

    fn plan() -> RenderPlan {
        RenderPlan {
            width_squares: 3,
            height_squares: 2,
            pixels_per_grid: 4,
            exterior_floor: "floor/exterior".into(),
            roads: vec![],
            structures: vec![StructurePlan {
                index: 0,
                floor: "floor/interior".into(),
                outline: vec![GridNode::new(0, 0), GridNode::new(0, 1)],
                pillar: "pillar/wood".into(),
                pillar_cells: vec![GridNode::new(0, 0)],
                tiles: vec![TilePlacement {
                    cell: GridNode::new(0, 0),
                    asset: "wall/exterior".into(),
                    rotation_degrees: 0,
                }],
            }],
        }
    }

    #[test]
    fn test_image_size_in_pixels() {
        assert_eq!(plan().image_size(), (12, 8));
        assert_eq!(plan().tile_count(), 1);
    }

    #[test]
    fn test_renderer_receives_plan() {
        let bytes = Blank.render(&plan()).unwrap();
        assert_eq!(bytes.len(), 96);
    }

    #[test]
    fn test_plan_json_shape() {
        let json = serde_json::to_value(plan()).unwrap();
        assert_eq!(json["pixels_per_grid"], 4);
        assert_eq!(json["structures"][0]["tiles"][0]["asset"], "wall/exterior");
    }
}
