#![forbid(unsafe_code)]

//! Headless layout, interaction model and SVG output for dendro-heatmaps.
//!
//! The browser canvas is replaced by three pieces:
//! - a serializable layout model ([`model`]) of positioned primitives
//! - an SVG writer ([`svg`]) for that model
//! - an explicit interaction state machine ([`interaction`])

pub mod boxplot;
pub mod colors;
pub mod config;
pub mod dendrogram;
pub mod heatmap;
pub mod interaction;
pub mod layout;
pub mod model;
pub mod scale;
pub mod svg;
pub mod text;
pub mod tooltip;
pub mod transition;

use crate::text::{DeterministicTextMeasurer, TextMeasurer};
use std::sync::Arc;

pub use config::{DendroHeatmapConfig, LegendPosition};
pub use dendrogram::{Dendrogram, Orientation};
pub use heatmap::Heatmap;
pub use layout::{DendroHeatmap, DendroHeatmapOptions, RenderOptions};
pub use model::DendroHeatmapLayout;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] dendromap_core::Error),
    #[error("Color theme not found: {name}")]
    UnknownColorScheme { name: String },
    #[error("invalid layout model: {message}")]
    InvalidModel { message: String },
    #[error("expression lookup failed for {gencode_id}: {message}")]
    Expression { gencode_id: String, message: String },
    #[error("layout JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct LayoutOptions {
    pub text_measurer: Arc<dyn TextMeasurer + Send + Sync>,
    /// Rotation applied to the heatmap's column labels.
    pub label_rotation_degrees: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            text_measurer: Arc::new(DeterministicTextMeasurer::default()),
            label_rotation_degrees: 30.0,
        }
    }
}

/// One-shot pipeline: parsed input in, positioned layout out.
pub fn layout_parsed(
    parsed: &dendromap_core::ParsedDendroHeatmap,
    heatmap_options: DendroHeatmapOptions,
    config: DendroHeatmapConfig,
    render_options: RenderOptions,
    options: &LayoutOptions,
) -> Result<DendroHeatmapLayout> {
    let mut chart = DendroHeatmap::from_parsed(parsed, heatmap_options, config)?;
    chart.render_with(render_options, options)
}
