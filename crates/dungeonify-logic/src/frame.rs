//! Map framing: the one computation shared by every structure.
//!
//! The ingestion collaborator hands over raw pixel-space footprints, road
//! polylines and a per-pixel inch scale. `MapFrame::fit` finds the bounding
//! box of all footprints, derives the grid pitch and image size, and moves
//! every node into zoomed map space with the box's corner at the origin.
//! After this point structures no longer depend on each other.

use serde::{Deserialize, Serialize};

use crate::config::{GenerationConfig, InchesPerPixel};
use crate::error::GeometryError;
use crate::geometry::{round_up_to_pitch, GridNode, PixelNode};

/// One building footprint as delivered by map ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawStructure {
    pub nodes: Vec<PixelNode>,
    #[serde(default)]
    pub speciality: bool,
}

impl RawStructure {
    pub fn new(nodes: Vec<PixelNode>, speciality: bool) -> Self {
        Self { nodes, speciality }
    }

    /// The footprint as an open loop: a closing node equal to the first is dropped.
    pub fn open_loop(&self) -> Vec<PixelNode> {
        let mut nodes = self.nodes.clone();
        if nodes.len() > 1 && nodes.first() == nodes.last() {
            nodes.pop();
        }
        nodes
    }
}

/// Everything map ingestion produces for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapInput {
    pub structures: Vec<RawStructure>,
    #[serde(default)]
    pub roads: Vec<Vec<PixelNode>>,
    pub inches_per_pixel: InchesPerPixel,
}

/// Shared map geometry: pitch, image size and the transform into map space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapFrame {
    pub min: PixelNode,
    pub zoom: f64,
    /// Pixels per grid square; the pitch every node is quantized to.
    pub pixels_per_grid: f64,
    pub border_pixels: f64,
    pub image_width: f64,
    pub image_height: f64,
    pub total_inches_width: f64,
    pub total_inches_height: f64,
    pub width_squares: i32,
    pub height_squares: i32,
    pub inches_per_pixel: InchesPerPixel,
}

impl MapFrame {
    /// Fit a frame around every structure of `input`.
    pub fn fit(input: &MapInput, config: &GenerationConfig) -> Result<Self, GeometryError> {
        let scale = input.inches_per_pixel;
        scale.validate()?;

        let pixels_per_grid = (config.zoom / scale.horizontal).round_ties_even();
        if !pixels_per_grid.is_finite() || pixels_per_grid < 1.0 {
            return Err(GeometryError::InvalidScale {
                horizontal: scale.horizontal,
                vertical: scale.vertical,
            });
        }

        let mut min = PixelNode::new(f64::MAX, f64::MAX);
        let mut max = PixelNode::new(f64::MIN, f64::MIN);
        for node in input.structures.iter().flat_map(|s| s.nodes.iter()) {
            min.x = min.x.min(node.x);
            min.y = min.y.min(node.y);
            max.x = max.x.max(node.x);
            max.y = max.y.max(node.y);
        }
        if min.x > max.x {
            min = PixelNode::default();
            max = PixelNode::default();
        }

        let border_pixels = f64::from(config.border_squares) * pixels_per_grid;
        let image_width = round_up_to_pitch(
            (max.x - min.x).trunc() * config.zoom + 2.0 * border_pixels,
            pixels_per_grid,
        );
        let image_height = round_up_to_pitch(
            (max.y - min.y).trunc() * config.zoom + 2.0 * border_pixels,
            pixels_per_grid,
        );

        Ok(Self {
            min,
            zoom: config.zoom,
            pixels_per_grid,
            border_pixels,
            image_width,
            image_height,
            total_inches_width: scale.horizontal * image_width,
            total_inches_height: scale.vertical * image_height,
            width_squares: (image_width / pixels_per_grid).round_ties_even() as i32,
            height_squares: (image_height / pixels_per_grid).round_ties_even() as i32,
            inches_per_pixel: scale,
        })
    }

    /// Move a raw node into zoomed map space.
    pub fn to_map(&self, node: PixelNode) -> PixelNode {
        PixelNode::new(
            (node.x - self.min.x) * self.zoom,
            (node.y - self.min.y) * self.zoom,
        )
    }

    /// Quantize a map-space node onto the grid.
    pub fn to_grid(&self, node: PixelNode) -> GridNode {
        GridNode::new(
            (node.x / self.pixels_per_grid).round_ties_even() as i32,
            (node.y / self.pixels_per_grid).round_ties_even() as i32,
        )
    }

    /// A structure's open loop in map space.
    pub fn frame_structure(&self, raw: &RawStructure) -> Vec<PixelNode> {
        raw.open_loop().into_iter().map(|n| self.to_map(n)).collect()
    }

    /// Roads are not processed further; they are only projected for rendering.
    pub fn project_roads(&self, roads: &[Vec<PixelNode>]) -> Vec<Vec<GridNode>> {
        roads
            .iter()
            .map(|road| road.iter().map(|&n| self.to_grid(self.to_map(n))).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(scale: f64) -> MapInput {
        MapInput {
            structures: vec![RawStructure::new(
                vec![
                    PixelNode::new(10.0, 20.0),
                    PixelNode::new(30.0, 20.0),
                    PixelNode::new(30.0, 40.0),
                    PixelNode::new(10.0, 40.0),
                    PixelNode::new(10.0, 20.0),
                ],
                false,
            )],
            roads: vec![vec![PixelNode::new(10.0, 20.0), PixelNode::new(20.0, 20.0)]],
            inches_per_pixel: InchesPerPixel::new(scale, scale),
        }
    }

    #[test]
    fn test_open_loop_strips_closing_node() {
        let inp = input(0.5);
        assert_eq!(inp.structures[0].open_loop().len(), 4);
    }

    #[test]
    fn test_fit_frame_properties() {
        let cfg = GenerationConfig::default();
        let frame = MapFrame::fit(&input(0.5), &cfg).unwrap();
        // zoom 3 / 0.5 inches per pixel
        assert!((frame.pixels_per_grid - 6.0).abs() < 1e-9);
        assert!((frame.border_pixels - 12.0).abs() < 1e-9);
        // 20 * 3 + 24 = 84, already a multiple of 6
        assert!((frame.image_width - 84.0).abs() < 1e-9);
        assert_eq!(frame.width_squares, 14);
        assert!((frame.total_inches_width - 42.0).abs() < 1e-9);
    }

    #[test]
    fn test_to_map_moves_corner_to_origin() {
        let cfg = GenerationConfig::default();
        let inp = input(0.5);
        let frame = MapFrame::fit(&inp, &cfg).unwrap();
        let framed = frame.frame_structure(&inp.structures[0]);
        assert_eq!(framed[0], PixelNode::new(0.0, 0.0));
        assert_eq!(framed[2], PixelNode::new(60.0, 60.0));
        let roads = frame.project_roads(&inp.roads);
        assert_eq!(roads[0], vec![GridNode::new(0, 0), GridNode::new(5, 0)]);
    }

    #[test]
    fn test_road_half_squares_round_to_even() {
        let frame = MapFrame::fit(&input(0.5), &GenerationConfig::default()).unwrap();
        // 1 and 3 px past the corner are half and one and a half squares
        let road = vec![PixelNode::new(11.0, 21.0), PixelNode::new(13.0, 23.0)];
        let roads = frame.project_roads(&[road]);
        assert_eq!(roads[0], vec![GridNode::new(0, 0), GridNode::new(2, 2)]);
    }

    #[test]
    fn test_invalid_scale_rejected() {
        let cfg = GenerationConfig::default();
        assert!(MapFrame::fit(&input(-1.0), &cfg).is_err());
        // pitch would round to zero
        assert!(MapFrame::fit(&input(100.0), &cfg).is_err());
    }
}
