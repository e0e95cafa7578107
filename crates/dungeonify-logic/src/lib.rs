//! Footprint-to-battlemap pipeline for Dungeonify.
//!
//! Building footprints from map ingestion go in; grid floor plans with an
//! interior wall, doors and windows come out, serialized as a Universal VTT
//! (`.dd2vtt`) document. Everything here is plain data in, plain data out:
//! the only I/O is the exporter's single artifact write.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`assets`] | Asset catalog and per-structure decoration selection |
//! | [`config`] | Generation tunables, failure policy, per-structure seeds |
//! | [`divider`] | Longest-edge interior wall and the two resulting rooms |
//! | [`error`] | Geometry, asset and export error types |
//! | [`exterior`] | Exterior door edge choice and full feature-list assembly |
//! | [`features`] | Wall/door/window placement along a grid edge |
//! | [`frame`] | Shared bounding box, grid pitch and image size |
//! | [`geometry`] | Pixel and grid nodes, edges, area, loop helpers |
//! | [`grid`] | Projection onto the grid with canonical start and winding |
//! | [`metrics`] | Area-change report and discovery metric |
//! | [`normalize`] | Axis snapping, collinearity reduction, gap filling |
//! | [`pipeline`] | Per-structure driver, render plan and export entry points |
//! | [`render`] | Render plan handed to the compositing collaborator |
//! | [`vtt`] | `.dd2vtt` document types, segments, portals, atomic write |

pub mod assets;
pub mod config;
pub mod divider;
pub mod error;
pub mod exterior;
pub mod features;
pub mod frame;
pub mod geometry;
pub mod grid;
pub mod metrics;
pub mod normalize;
pub mod pipeline;
pub mod render;
pub mod vtt;

pub use error::{DungeonifyError, Result};
