use crate::config::{Margin, Panels};
use crate::dendrogram::Orientation;
use dendromap_core::NodeId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DendrogramNodeLayout {
    pub id: NodeId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub is_leaf: bool,
    pub branch_length: f64,
}

/// Hover target of an internal node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeMarkerLayout {
    pub node: NodeId,
    pub cx: f64,
    pub cy: f64,
    pub r: f64,
    pub fill: String,
    pub leaves: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisTick {
    pub value: f64,
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AxisLayout {
    /// The axis line; ticks are placed along it at `position`.
    pub line: LineSegment,
    pub ticks: Vec<AxisTick>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DendrogramLayout {
    pub orientation: Orientation,
    pub width: f64,
    pub height: f64,
    pub visible: bool,
    pub max_branch_length: f64,
    pub bandwidth: f64,
    /// Leaf names in drawing order; this is the band scale's domain.
    pub category_domain: Vec<String>,
    #[serde(default)]
    pub nodes: Vec<DendrogramNodeLayout>,
    #[serde(default)]
    pub branches: Vec<LineSegment>,
    #[serde(default)]
    pub arms: Vec<LineSegment>,
    #[serde(default)]
    pub markers: Vec<NodeMarkerLayout>,
    #[serde(default)]
    pub axis: Option<AxisLayout>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapLabelLayout {
    pub index: usize,
    pub text: String,
    pub x: f64,
    pub y: f64,
    /// Degrees; only column labels are rotated.
    pub rotate: f64,
    pub class: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapCellLayout {
    /// Position of the source cell in the heatmap data.
    pub index: usize,
    pub x_label: String,
    pub y_label: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub rx: f64,
    pub ry: f64,
    pub class: String,
    pub row: String,
    pub col: String,
    pub value: f64,
    #[serde(rename = "originalValue")]
    pub original_value: f64,
    pub initial_fill: String,
    pub fill: String,
    pub transition_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapLayout {
    pub width: f64,
    pub height: f64,
    pub x_list: Vec<String>,
    pub y_list: Vec<String>,
    pub x_labels: Vec<HeatmapLabelLayout>,
    pub y_labels: Vec<HeatmapLabelLayout>,
    pub cells: Vec<HeatmapCellLayout>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegendSwatchLayout {
    pub value: f64,
    pub label: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub fill: String,
    pub label_x: f64,
    pub label_y: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegendLayout {
    pub x: f64,
    pub y: f64,
    pub title: String,
    pub title_x: f64,
    pub title_y: f64,
    pub swatches: Vec<LegendSwatchLayout>,
}

/// Where a heatmap axis order came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ListSource {
    Tree,
    Sorted,
    FirstSeen,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DendroHeatmapLayout {
    pub id: String,
    pub width: f64,
    pub height: f64,
    pub margin: Margin,
    pub panels: Panels,
    pub column_order: ListSource,
    pub row_order: ListSource,
    #[serde(default)]
    pub column_tree: Option<DendrogramLayout>,
    #[serde(default)]
    pub row_tree: Option<DendrogramLayout>,
    pub heatmap: HeatmapLayout,
    pub legend: LegendLayout,
}

impl DendroHeatmapLayout {
    pub fn cell_at(&self, x_label: &str, y_label: &str) -> Option<&HeatmapCellLayout> {
        self.heatmap
            .cells
            .iter()
            .find(|c| c.x_label == x_label && c.y_label == y_label)
    }
}
