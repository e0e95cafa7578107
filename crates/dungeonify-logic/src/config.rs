//! Generation configuration: tunables for every pipeline stage.
//!
//! `GenerationConfig` is plain serde data with defaults matching the
//! reference battlemap output, so a config file only needs the fields it
//! overrides.

use serde::{Deserialize, Serialize};

use crate::error::GeometryError;

/// Real-world inches covered by one pixel of the ingested map.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InchesPerPixel {
    pub horizontal: f64,
    pub vertical: f64,
}

impl InchesPerPixel {
    pub fn new(horizontal: f64, vertical: f64) -> Self {
        Self {
            horizontal,
            vertical,
        }
    }

    /// Reject scales that would make distance or pitch computations undefined.
    pub fn validate(&self) -> Result<(), GeometryError> {
        let ok = |v: f64| v.is_finite() && v > 0.0;
        if ok(self.horizontal) && ok(self.vertical) {
            Ok(())
        } else {
            Err(GeometryError::InvalidScale {
                horizontal: self.horizontal,
                vertical: self.vertical,
            })
        }
    }
}

/// What the driver does when one structure fails a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The first failing structure aborts the whole run.
    #[default]
    Abort,
    /// The failing structure is logged and left out of the document.
    Skip,
}

/// Tunables for the footprint → floor plan → document pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// Run seed. Each structure derives its own generator from it.
    pub seed: u64,
    /// Zoom factor applied to ingested pixel coordinates.
    pub zoom: f64,
    /// Blank grid squares around the map.
    pub border_squares: i32,
    /// Structures with a grid area at or below this get no interior wall.
    pub min_area: f64,
    /// Minimum grid length of an exterior edge that may host the door.
    pub door_min_edge: i32,
    /// Chance that an eligible wall position becomes a window.
    pub window_chance: f64,
    /// Asset tile size in pixels; exported as `pixels_per_grid`.
    pub asset_size: u32,
    /// Total map inches are divided by this to get `map_size`.
    pub inches_per_map_unit: f64,
    /// Fixed portal rotation in radians.
    pub portal_rotation: f64,
    /// Document `format` version.
    pub format_version: f64,
    pub failure_policy: FailurePolicy,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            zoom: 3.0,
            border_squares: 2,
            min_area: 50.0,
            door_min_edge: 3,
            window_chance: 2.0 / 7.0,
            asset_size: 200,
            inches_per_map_unit: 3.0,
            portal_rotation: -1.570796,
            format_version: 0.3,
            failure_policy: FailurePolicy::Abort,
        }
    }
}

impl GenerationConfig {
    /// Grid offset applied to every exported coordinate.
    pub fn export_offset(&self) -> i32 {
        self.border_squares / 2
    }

    /// Seed for the structure at `index`, independent of processing order.
    pub fn structure_seed(&self, index: usize) -> u64 {
        derive_seed(self.seed, index)
    }
}

/// Mix a run seed and a structure index into a per-structure seed.
pub fn derive_seed(run_seed: u64, index: usize) -> u64 {
    // splitmix64 finalizer
    let mut z = run_seed.wrapping_add((index as u64 + 1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}
