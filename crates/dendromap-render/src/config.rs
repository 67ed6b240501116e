//! Panel geometry of the dendro-heatmap surface.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Gap kept between each dendrogram panel and the heatmap.
const PANEL_ADJUST: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Margin {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Margin {
    fn default() -> Self {
        Self {
            top: 50.0,
            right: 250.0,
            bottom: 170.0,
            left: 10.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellSize {
    /// Unset means the width is derived from the panel width.
    #[serde(default)]
    pub w: Option<f64>,
    pub h: f64,
}

impl Default for CellSize {
    fn default() -> Self {
        Self { w: None, h: 12.0 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DendroHeatmapConfig {
    pub id: String,
    /// Total surface width in pixels.
    pub width: f64,
    /// Zero when there is no row dendrogram.
    pub left_panel_width: f64,
    /// Zero when there is no column dendrogram.
    pub top_panel_height: f64,
    pub margin: Margin,
    pub cell: CellSize,
    pub legend_cell_width: f64,
    pub legend_cell_height: f64,
}

impl Default for DendroHeatmapConfig {
    fn default() -> Self {
        Self {
            id: "chart".to_string(),
            width: 1200.0,
            left_panel_width: 100.0,
            top_panel_height: 60.0,
            margin: Margin::default(),
            cell: CellSize::default(),
            legend_cell_width: 60.0,
            legend_cell_height: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl Panel {
    fn new(id: &str, x: f64, y: f64, w: f64, h: f64) -> Self {
        Self {
            id: id.to_string(),
            x,
            y,
            w,
            h,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panels {
    pub top: Panel,
    pub left: Panel,
    pub main: Panel,
    pub legend: Panel,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegendPosition {
    Top,
    #[default]
    Bottom,
}

impl FromStr for LegendPosition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            other => Err(format!("unknown legend position: {other}")),
        }
    }
}

/// Panels plus the surface height once the row count is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SurfaceGeometry {
    pub width: f64,
    pub height: f64,
    pub panels: Panels,
}

impl DendroHeatmapConfig {
    /// Panels before any data is known; left and main heights are zero.
    pub fn panels(&self) -> Panels {
        let m = &self.margin;
        let top_w = self.width - (m.left + self.left_panel_width + m.right);
        Panels {
            top: Panel::new(
                "topTree",
                m.left + self.left_panel_width,
                m.top,
                top_w,
                self.top_panel_height - PANEL_ADJUST,
            ),
            left: Panel::new(
                "leftTree",
                m.left,
                m.top + self.top_panel_height,
                self.left_panel_width - PANEL_ADJUST,
                0.0,
            ),
            main: Panel::new(
                "heatmap",
                m.left + self.left_panel_width,
                m.top + self.top_panel_height,
                top_w,
                0.0,
            ),
            legend: Panel::new(
                "legend",
                m.left + self.left_panel_width,
                0.0,
                top_w,
                m.top / 2.0,
            ),
        }
    }

    /// Height of the surface before the data-dependent rows are added.
    pub fn initial_height(&self) -> f64 {
        let panels = self.panels();
        self.margin.top + panels.top.h + panels.legend.h + self.margin.bottom
    }

    /// Sizes the left and main panels for `rows` heatmap rows and places the legend.
    /// A fixed `cell.w` also sizes the column panels for `columns` columns.
    ///
    /// Computed from the config every time, so repeated renders do not accumulate height.
    pub fn geometry(
        &self,
        rows: usize,
        columns: usize,
        legend_position: LegendPosition,
    ) -> SurfaceGeometry {
        let mut panels = self.panels();
        let rows_h = self.cell.h * rows as f64;
        panels.left.h = if rows_h < 20.0 { 20.0 } else { rows_h };
        panels.main.h = panels.left.h;
        if let Some(w) = self.cell.w {
            panels.main.w = w * columns as f64;
            panels.top.w = panels.main.w;
            panels.legend.w = panels.main.w;
        }
        if legend_position == LegendPosition::Bottom {
            panels.legend.y += panels.main.h + panels.main.x + 50.0;
        }
        SurfaceGeometry {
            width: self.width,
            height: self.initial_height() + panels.left.h,
            panels,
        }
    }
}
