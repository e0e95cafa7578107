//! Evaluation metrics for a finished run.
//!
//! - **Area report**: how much each footprint's area changed through
//!   normalization (zoomed map pixels).
//! - **Discovery metric**: how much a structure invites exploration, from
//!   its doors, windows and wall segments, scaled by how built-up the map is.

use serde::Serialize;

use crate::config::GenerationConfig;
use crate::pipeline::Generation;
use crate::vtt::structure_records;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AreaReport {
    pub before: Vec<f64>,
    pub after: Vec<f64>,
    pub differences: Vec<f64>,
    pub mean_difference: f64,
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn area_report(generation: &Generation) -> AreaReport {
    let before: Vec<f64> = generation.floor_plans.iter().map(|p| p.raw_area).collect();
    let after: Vec<f64> = generation
        .floor_plans
        .iter()
        .map(|p| p.normalized_area)
        .collect();
    let differences: Vec<f64> = before
        .iter()
        .zip(&after)
        .map(|(b, a)| (b - a).abs())
        .collect();
    AreaReport {
        mean_difference: mean(&differences).unwrap_or(0.0),
        before,
        after,
        differences,
    }
}

/// Built-up share of the map: structure area over open area.
pub fn interior_ratio(generation: &Generation) -> f64 {
    let interior: f64 = generation
        .floor_plans
        .iter()
        .map(|p| p.normalized_area)
        .sum();
    let exterior = generation.frame.image_width * generation.frame.image_height - interior;
    if exterior > 0.0 {
        interior / exterior
    } else {
        0.0
    }
}

/// Per-structure discovery metric, in floor-plan order.
pub fn discovery_metrics(generation: &Generation, config: &GenerationConfig) -> Vec<f64> {
    let base = interior_ratio(generation);
    generation
        .floor_plans
        .iter()
        .map(|plan| {
            let records = structure_records(&plan.features, 0, config.portal_rotation);
            let (doors, windows) = (records.doors as f64, records.windows as f64);
            let walls = records.line_of_sight.len() as f64;
            let denominator = walls + windows + doors;
            if denominator == 0.0 {
                return 0.0;
            }
            (windows * doors + plan.features.len() as f64) / denominator * base
        })
        .collect()
}
