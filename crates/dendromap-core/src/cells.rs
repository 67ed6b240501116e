use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use serde::{Deserialize, Serialize};

/// One `(x, y)` entry of the heatmap matrix.
///
/// `value` is what gets colored (typically `log10(original + 1)`); `original_value` is kept for
/// tooltips. `unit` is only read from the first cell, as the legend title.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatmapCell {
    pub x: String,
    pub y: String,
    pub value: f64,
    #[serde(rename = "originalValue")]
    pub original_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl HeatmapCell {
    pub fn new(x: impl Into<String>, y: impl Into<String>, value: f64, original_value: f64) -> Self {
        Self {
            x: x.into(),
            y: y.into(),
            value,
            original_value,
            unit: None,
        }
    }

    /// Builds a cell whose rendered value is `log10(original + 1)`.
    pub fn log_transformed(x: impl Into<String>, y: impl Into<String>, original_value: f64) -> Self {
        Self::new(x, y, (original_value + 1.0).log10(), original_value)
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }
}

/// Distinct values of one axis, in first-seen order.
pub fn first_seen_labels<'a>(
    cells: &'a [HeatmapCell],
    key: impl Fn(&'a HeatmapCell) -> &'a str,
) -> Vec<String> {
    let seen: IndexSet<&str, FxBuildHasher> = cells.iter().map(key).collect();
    seen.into_iter().map(str::to_string).collect()
}
