//! Universal VTT (`.dd2vtt`) export.
//!
//! Each structure's feature list is read as consecutive record pairs. A pair
//! starting on a wall becomes a line-of-sight segment; a pair starting on a
//! door or window becomes a portal spanning the two records. Pairs touching
//! the `Exterior` sentinel or collapsing to a point are skipped.

use std::fs;
use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::config::GenerationConfig;
use crate::error::ExportError;
use crate::features::{Feature, FeatureList};
use crate::frame::MapFrame;
use crate::geometry::GridNode;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VttPoint {
    pub x: i32,
    pub y: i32,
}

impl VttPoint {
    fn from_node(node: GridNode, offset: i32) -> Self {
        let n = node.offset(offset);
        Self { x: n.x, y: n.y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapSize {
    pub x: i64,
    pub y: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub map_origin: VttPoint,
    pub map_size: MapSize,
    pub pixels_per_grid: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Portal {
    pub position: VttPoint,
    pub bounds: [VttPoint; 2],
    pub rotation: f64,
    /// Doors are closed, windows open.
    pub closed: bool,
    pub freestanding: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Environment {
    pub baked_lighting: bool,
    pub ambient_light: String,
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            baked_lighting: true,
            ambient_light: "ffffffff".into(),
        }
    }
}

/// The whole battlemap document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub format: f64,
    pub resolution: Resolution,
    pub line_of_sight: Vec<[VttPoint; 2]>,
    pub portals: Vec<Portal>,
    pub environment: Environment,
    pub lights: Vec<serde_json::Value>,
    /// Base64 PNG, no line breaks.
    pub image: String,
}

/// Segments and portals of one structure, plus the counts the metrics need.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StructureRecords {
    pub line_of_sight: Vec<[VttPoint; 2]>,
    pub portals: Vec<Portal>,
    pub doors: usize,
    pub windows: usize,
}

/// Convert one feature list into exported records.
pub fn structure_records(features: &FeatureList, offset: i32, rotation: f64) -> StructureRecords {
    let mut out = StructureRecords::default();
    for pair in features.as_slice().windows(2) {
        let (current, next) = (pair[0], pair[1]);
        let (Some(a), Some(b)) = (current.node(), next.node()) else {
            continue;
        };
        if a == b {
            continue;
        }
        let bounds = [VttPoint::from_node(a, offset), VttPoint::from_node(b, offset)];
        match current {
            Feature::Wall(_) => out.line_of_sight.push(bounds),
            Feature::Door(_) | Feature::Window(_) => {
                let closed = matches!(current, Feature::Door(_));
                if closed {
                    out.doors += 1;
                } else {
                    out.windows += 1;
                }
                out.portals.push(Portal {
                    position: bounds[0],
                    bounds,
                    rotation,
                    closed,
                    freestanding: false,
                });
            }
            Feature::Exterior => {}
        }
    }
    out
}

/// Compose the document from every structure's feature list.
pub fn build_document<'a>(
    lists: impl IntoIterator<Item = &'a FeatureList>,
    frame: &MapFrame,
    config: &GenerationConfig,
    image: &[u8],
) -> Document {
    let offset = config.export_offset();
    let mut line_of_sight = Vec::new();
    let mut portals = Vec::new();
    for list in lists {
        let records = structure_records(list, offset, config.portal_rotation);
        line_of_sight.extend(records.line_of_sight);
        portals.extend(records.portals);
    }

    Document {
        format: config.format_version,
        resolution: Resolution {
            map_origin: VttPoint::default(),
            map_size: MapSize {
                x: (frame.total_inches_width / config.inches_per_map_unit) as i64,
                y: (frame.total_inches_height / config.inches_per_map_unit) as i64,
            },
            pixels_per_grid: config.asset_size,
        },
        line_of_sight,
        portals,
        environment: Environment::default(),
        lights: Vec::new(),
        image: STANDARD.encode(image),
    }
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "Battlemap.dd2vtt".into());
    name.push(".tmp");
    path.with_file_name(name)
}

fn io_error(path: &Path, source: std::io::Error) -> ExportError {
    ExportError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Serialize `doc` and replace `path` with it.
pub fn write_document(doc: &Document, path: &Path) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(doc)?;
    let tmp = temp_sibling(path);
    fs::write(&tmp, json).map_err(|source| io_error(&tmp, source))?;
    if let Err(source) = fs::rename(&tmp, path) {
        if let Err(e) = fs::remove_file(&tmp) {
            log::warn!("could not remove {}: {}", tmp.display(), e);
        }
        return Err(io_error(path, source));
    }
    log::info!("wrote {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InchesPerPixel;
    use crate::frame::{MapInput, RawStructure};
    use crate::geometry::PixelNode;

    fn g(x: i32, y: i32) -> GridNode {
        GridNode::new(x, y)
    }

    fn sample_list() -> FeatureList {
        FeatureList(vec![
            Feature::Wall(g(0, 2)),
            Feature::Door(g(2, 2)),
            Feature::Wall(g(3, 2)),
            Feature::Wall(g(4, 2)),
            Feature::Exterior,
            Feature::Wall(g(0, 0)),
            Feature::Window(g(0, 1)),
            Feature::Wall(g(0, 3)),
            Feature::Wall(g(0, 4)),
            Feature::Wall(g(4, 4)),
            Feature::Wall(g(4, 0)),
            Feature::Wall(g(0, 0)),
        ])
    }

    fn frame() -> MapFrame {
        let input = MapInput {
            structures: vec![RawStructure::new(
                vec![
                    PixelNode::new(0.0, 0.0),
                    PixelNode::new(0.0, 8.0),
                    PixelNode::new(8.0, 8.0),
                    PixelNode::new(8.0, 0.0),
                ],
                false,
            )],
            roads: vec![],
            inches_per_pixel: InchesPerPixel::new(0.5, 0.5),
        };
        MapFrame::fit(&input, &GenerationConfig::default()).unwrap()
    }

    #[test]
    fn test_records_offset_and_portals() {
        let records = structure_records(&sample_list(), 1, -1.570796);
        assert_eq!(records.doors, 1);
        assert_eq!(records.windows, 1);
        assert_eq!(records.portals.len(), 2);
        let door = records.portals[0];
        assert!(door.closed);
        assert_eq!(door.position, VttPoint { x: 3, y: 3 });
        assert_eq!(door.bounds[1], VttPoint { x: 4, y: 3 });
        assert!(!records.portals[1].closed);
        assert!(!door.freestanding);
        // exterior sentinel pairs are skipped
        assert!(!records
            .line_of_sight
            .iter()
            .any(|s| s[0] == VttPoint { x: 5, y: 3 } && s[1] == VttPoint { x: 1, y: 1 }));
    }

    #[test]
    fn test_segment_lengths_cover_walls() {
        let records = structure_records(&sample_list(), 0, 0.0);
        let len = |s: &[VttPoint; 2]| (s[1].x - s[0].x).abs() + (s[1].y - s[0].y).abs();
        let total: i32 = records.line_of_sight.iter().map(len).sum::<i32>()
            + records.portals.iter().map(|p| len(&p.bounds)).sum::<i32>();
        // perimeter 16 plus interior wall 4
        assert_eq!(total, 20);
    }

    #[test]
    fn test_document_shape() {
        let cfg = GenerationConfig::default();
        let doc = build_document([&sample_list()], &frame(), &cfg, b"png\nbytes");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["format"], 0.3);
        assert_eq!(json["resolution"]["map_origin"]["x"], 0);
        assert_eq!(json["resolution"]["pixels_per_grid"], 200);
        assert_eq!(json["environment"]["ambient_light"], "ffffffff");
        assert_eq!(json["lights"].as_array().unwrap().len(), 0);
        assert!(!doc.image.contains('\n'));
        // 8 px * zoom 3 + 2 * 12 border = 48 px, * 0.5 in / 3
        assert_eq!(doc.resolution.map_size.x, 8);
    }

    #[test]
    fn test_write_document_replaces_file() {
        let dir = std::env::temp_dir().join(format!("dungeonify-vtt-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("Battlemap.dd2vtt");
        fs::write(&path, "stale").unwrap();

        let cfg = GenerationConfig::default();
        let doc = build_document([&sample_list()], &frame(), &cfg, b"");
        write_document(&doc, &path).unwrap();

        let back: Document = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(back, doc);
        assert!(!temp_sibling(&path).exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_failed_rename_removes_temp_file() {
        let dir = std::env::temp_dir().join(format!("dungeonify-vtt-busy-{}", std::process::id()));
        // a non-empty directory at the target makes the rename fail
        let path = dir.join("Battlemap.dd2vtt");
        fs::create_dir_all(path.join("occupied")).unwrap();

        let cfg = GenerationConfig::default();
        let doc = build_document([&sample_list()], &frame(), &cfg, b"");
        let err = write_document(&doc, &path).unwrap_err();
        assert!(matches!(err, ExportError::Io { .. }));
        assert!(!temp_sibling(&path).exists());
        fs::remove_dir_all(&dir).unwrap();
    }
}
