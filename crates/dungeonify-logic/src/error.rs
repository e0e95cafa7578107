//! Error types for the Dungeonify pipeline.
//!
//! Every stage returns a typed error instead of panicking. A structure that
//! fails any stage contributes nothing to the exported document; whether the
//! rest of the run continues is decided by [`FailurePolicy`](crate::config::FailurePolicy).

use thiserror::Error;

use crate::geometry::GridNode;

/// Top-level error type for the Dungeonify pipeline.
#[derive(Debug, Error)]
pub enum DungeonifyError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error(transparent)]
    Export(#[from] ExportError),

    #[error("structure #{index}: {source}")]
    Structure {
        index: usize,
        #[source]
        source: Box<DungeonifyError>,
    },
}

/// Errors raised while normalizing, projecting or dividing a footprint.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeometryError {
    /// The perpendicular scan from the longest edge never met the boundary.
    #[error("no matching wall for interior wall starting at ({}, {})", start.x, start.y)]
    NoMatchingWall { start: GridNode },

    #[error("degenerate structure: {0}")]
    DegenerateStructure(String),

    #[error("invalid scale: {horizontal} x {vertical} inches per pixel")]
    InvalidScale { horizontal: f64, vertical: f64 },
}

/// Errors related to the asset-selection context and rendering collaborator.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AssetError {
    #[error("no asset found for '{category}'")]
    NotFound { category: String },
}

/// Errors raised while writing the battlemap document.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("i/o error writing '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("document serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

impl DungeonifyError {
    /// Tag an error with the index of the structure it came from.
    pub fn in_structure(self, index: usize) -> Self {
        Self::Structure {
            index,
            source: Box::new(self),
        }
    }
}

/// Convenience type alias for results using [`DungeonifyError`].
pub type Result<T> = std::result::Result<T, DungeonifyError>;
