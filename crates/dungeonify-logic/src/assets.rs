//! Asset-selection context.
//!
//! Each structure draws its own decoration set from the catalog: interior
//! runs use an interior wall and a door, exterior runs add a window and a
//! sill. Speciality structures (places of worship in the source data) draw
//! from a separate set. The selection is passed explicitly into the feature
//! placer, so no structure ever sees another's choice.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::AssetError;

/// Named asset lists for one decoration style.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetSet {
    pub exterior_walls: Vec<String>,
    pub interior_walls: Vec<String>,
    pub doors: Vec<String>,
    pub windows: Vec<String>,
    pub sills: Vec<String>,
    pub pillars: Vec<String>,
    pub floors: Vec<String>,
}

fn names(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Every asset the renderer can be asked for.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetCatalog {
    pub generic: AssetSet,
    pub speciality: AssetSet,
    pub exterior_floors: Vec<String>,
}

impl Default for AssetCatalog {
    fn default() -> Self {
        Self {
            generic: AssetSet {
                exterior_walls: names(&["wall/exterior"]),
                interior_walls: names(&["wall/interior"]),
                doors: names(&["door/single"]),
                windows: names(&["window"]),
                sills: names(&["sill"]),
                pillars: names(&["pillar/wood"]),
                floors: names(&["floor/interior"]),
            },
            // speciality interiors reuse the speciality wall
            speciality: AssetSet {
                exterior_walls: names(&["wall/special"]),
                interior_walls: names(&["wall/special"]),
                doors: names(&["door/single/special"]),
                windows: names(&["window/special"]),
                sills: names(&["sill/special"]),
                pillars: names(&["pillar/special"]),
                floors: names(&["floor/special"]),
            },
            exterior_floors: names(&["floor/exterior"]),
        }
    }
}

/// Assets for one wall run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WallAssets {
    pub wall: String,
    pub door: String,
    pub window: Option<String>,
    pub sill: Option<String>,
}

/// The full decoration choice for one structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureAssets {
    pub interior: WallAssets,
    pub exterior: WallAssets,
    pub pillar: String,
    pub floor: String,
}

fn pick<R: Rng>(list: &[String], category: &str, rng: &mut R) -> Result<String, AssetError> {
    list.choose(rng).cloned().ok_or_else(|| AssetError::NotFound {
        category: category.to_string(),
    })
}

impl AssetCatalog {
    pub fn set(&self, speciality: bool) -> &AssetSet {
        if speciality {
            &self.speciality
        } else {
            &self.generic
        }
    }

    /// Draw one structure's decoration set.
    pub fn select<R: Rng>(
        &self,
        speciality: bool,
        rng: &mut R,
    ) -> Result<StructureAssets, AssetError> {
        let set = self.set(speciality);
        let interior = WallAssets {
            wall: pick(&set.interior_walls, "interior_walls", rng)?,
            door: pick(&set.doors, "doors", rng)?,
            window: None,
            sill: None,
        };
        let exterior = WallAssets {
            wall: pick(&set.exterior_walls, "exterior_walls", rng)?,
            door: pick(&set.doors, "doors", rng)?,
            sill: Some(pick(&set.sills, "sills", rng)?),
            window: Some(pick(&set.windows, "windows", rng)?),
        };
        Ok(StructureAssets {
            interior,
            exterior,
            pillar: pick(&set.pillars, "pillars", rng)?,
            floor: pick(&set.floors, "floors", rng)?,
        })
    }

    /// Ground texture for everything outside structures.
    pub fn exterior_floor<R: Rng>(&self, rng: &mut R) -> Result<String, AssetError> {
        pick(&self.exterior_floors, "exterior_floors", rng)
    }
}
