//! Colored matrix of heatmap cells with axis labels and a quantile color legend.

use crate::colors::{color_scale, color_scheme, to_precision};
use crate::model::{
    HeatmapCellLayout, HeatmapLabelLayout, HeatmapLayout, LegendLayout, LegendSwatchLayout,
};
use crate::scale::{BandScale, QuantileScale};
use crate::{Error, Result};
use dendromap_core::HeatmapCell;
use dendromap_core::cells::first_seen_labels;

pub const BAND_PADDING: f64 = 0.05;
pub const CELL_TRANSITION_MS: u64 = 2000;
const COLUMN_LABEL_OFFSET: f64 = 17.0;
const ROW_LABEL_GAP: f64 = 5.0;
const ROW_LABEL_BASELINE: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub w: f64,
    pub h: f64,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            w: 1000.0,
            h: 600.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LegendCell {
    pub w: f64,
    pub h: f64,
}

#[derive(Debug, Clone)]
pub struct Heatmap {
    cells: Vec<HeatmapCell>,
    use_log: bool,
    color_scheme: String,
    palette: &'static [&'static str],
    corner_radius: f64,
    x_list: Option<Vec<String>>,
    y_list: Option<Vec<String>>,
    x_scale: Option<BandScale>,
    y_scale: Option<BandScale>,
    color_scale: Option<QuantileScale<String>>,
}

impl Heatmap {
    /// Fails immediately when `color_scheme` names no known palette.
    pub fn new(
        cells: Vec<HeatmapCell>,
        use_log: bool,
        color_scheme_name: &str,
        corner_radius: f64,
    ) -> Result<Self> {
        let palette = color_scheme(color_scheme_name)?;
        Ok(Self {
            cells,
            use_log,
            color_scheme: color_scheme_name.to_string(),
            palette,
            corner_radius,
            x_list: None,
            y_list: None,
            x_scale: None,
            y_scale: None,
            color_scale: None,
        })
    }

    pub fn cells(&self) -> &[HeatmapCell] {
        &self.cells
    }

    pub fn use_log(&self) -> bool {
        self.use_log
    }

    pub fn color_scheme(&self) -> &str {
        &self.color_scheme
    }

    pub fn palette(&self) -> &'static [&'static str] {
        self.palette
    }

    pub fn x_list(&self) -> Option<&[String]> {
        self.x_list.as_deref()
    }

    pub fn y_list(&self) -> Option<&[String]> {
        self.y_list.as_deref()
    }

    pub fn x_scale(&self) -> Option<&BandScale> {
        self.x_scale.as_ref()
    }

    pub fn y_scale(&self) -> Option<&BandScale> {
        self.y_scale.as_ref()
    }

    /// Distinct column labels in first-seen order.
    pub fn derived_x_list(&self) -> Vec<String> {
        first_seen_labels(&self.cells, |c| c.x.as_str())
    }

    /// Distinct row labels in first-seen order.
    pub fn derived_y_list(&self) -> Vec<String> {
        first_seen_labels(&self.cells, |c| c.y.as_str())
    }

    /// Uses `explicit` verbatim, or the first-seen column labels.
    pub fn set_x_list(&mut self, width: f64, explicit: Option<Vec<String>>) {
        let list = explicit.unwrap_or_else(|| self.derived_x_list());
        self.x_scale = Some(BandScale::new(list.iter().cloned(), [0.0, width], BAND_PADDING));
        self.x_list = Some(list);
    }

    /// Uses `explicit` verbatim, or the first-seen row labels.
    pub fn set_y_list(&mut self, height: f64, explicit: Option<Vec<String>>) {
        let list = explicit.unwrap_or_else(|| self.derived_y_list());
        self.y_scale = Some(BandScale::new(list.iter().cloned(), [0.0, height], BAND_PADDING));
        self.y_list = Some(list);
    }

    /// Built on first use from the current cell values.
    pub fn color_scale(&mut self) -> &QuantileScale<String> {
        let cells = &self.cells;
        let palette = self.palette;
        self.color_scale
            .get_or_insert_with(|| color_scale(cells.iter().map(|c| c.value), palette))
    }

    pub fn redraw(
        &mut self,
        dims: Dimensions,
        x_list: Option<Vec<String>>,
        y_list: Option<Vec<String>>,
        angle: f64,
    ) -> Result<HeatmapLayout> {
        self.set_x_list(dims.w, x_list);
        self.set_y_list(dims.h, y_list);
        self.draw(dims, angle)
    }

    pub fn draw(&mut self, dims: Dimensions, angle: f64) -> Result<HeatmapLayout> {
        if self.x_list.is_none() {
            self.set_x_list(dims.w, None);
        }
        if self.y_list.is_none() {
            self.set_y_list(dims.h, None);
        }
        self.color_scale();

        let (Some(xs), Some(ys), Some(colors), Some(x_list), Some(y_list)) = (
            self.x_scale.as_ref(),
            self.y_scale.as_ref(),
            self.color_scale.as_ref(),
            self.x_list.as_ref(),
            self.y_list.as_ref(),
        ) else {
            return Err(Error::InvalidModel {
                message: "heatmap scales were not initialized".to_string(),
            });
        };

        let x_bw = xs.bandwidth();
        let y_bw = ys.bandwidth();
        let bottom = ys.range()[1];
        let right = xs.range()[1];

        let x_labels = x_list
            .iter()
            .enumerate()
            .filter_map(|(i, label)| {
                Some(HeatmapLabelLayout {
                    index: i,
                    text: label.clone(),
                    x: xs.apply(label)? + x_bw / 2.0 + 1.0,
                    y: bottom + COLUMN_LABEL_OFFSET,
                    rotate: angle,
                    class: format!("xLabel normal x{i}"),
                })
            })
            .collect();

        let y_labels = y_list
            .iter()
            .enumerate()
            .filter_map(|(i, label)| {
                Some(HeatmapLabelLayout {
                    index: i,
                    text: label.clone(),
                    x: right + ROW_LABEL_GAP,
                    y: ys.apply(label)? + ROW_LABEL_BASELINE,
                    rotate: 0.0,
                    class: format!("yLabel normal y{i}"),
                })
            })
            .collect();

        let initial_fill = self.palette.first().copied().unwrap_or("#000000");
        let mut skipped = 0usize;
        let mut cells = Vec::with_capacity(self.cells.len());
        for (index, cell) in self.cells.iter().enumerate() {
            let (Some(xi), Some(yi)) = (xs.index_of(&cell.x), ys.index_of(&cell.y)) else {
                skipped += 1;
                continue;
            };
            let (Some(x), Some(y)) = (xs.apply(&cell.x), ys.apply(&cell.y)) else {
                skipped += 1;
                continue;
            };
            let fill = colors
                .apply(cell.value)
                .cloned()
                .unwrap_or_else(|| initial_fill.to_string());
            cells.push(HeatmapCellLayout {
                index,
                x_label: cell.x.clone(),
                y_label: cell.y.clone(),
                x,
                y,
                width: x_bw,
                height: y_bw,
                rx: self.corner_radius,
                ry: self.corner_radius,
                class: "cell expressmap-bordered".to_string(),
                row: format!("x{xi}"),
                col: format!("y{yi}"),
                value: cell.value,
                original_value: cell.original_value,
                initial_fill: initial_fill.to_string(),
                fill,
                transition_ms: CELL_TRANSITION_MS,
            });
        }

        if skipped > 0 {
            tracing::debug!(skipped, "heatmap cells outside the label lists were not drawn");
        }

        Ok(HeatmapLayout {
            width: dims.w,
            height: dims.h,
            x_list: x_list.clone(),
            y_list: y_list.clone(),
            x_labels,
            y_labels,
            cells,
        })
    }

    /// Legend title: the first cell's unit, or `"Value"`.
    pub fn legend_title(&self) -> String {
        self.cells
            .first()
            .and_then(|c| c.unit.clone())
            .unwrap_or_else(|| "Value".to_string())
    }

    /// Legend label of a color breakpoint, back-transformed when the data is log-scaled.
    pub fn legend_label(&self, breakpoint: f64) -> String {
        if self.use_log {
            to_precision(10f64.powf(breakpoint) - 1.0, 2)
        } else {
            to_precision(breakpoint, 2)
        }
    }

    /// One swatch per color bucket, starting at 0 then each quantile breakpoint.
    pub fn color_legend(&mut self, x: f64, y: f64, cell: LegendCell) -> LegendLayout {
        let breakpoints: Vec<f64> = std::iter::once(0.0)
            .chain(self.color_scale().quantiles().iter().copied())
            .collect();

        let swatches = breakpoints
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let fill = self
                    .color_scale
                    .as_ref()
                    .and_then(|s| s.apply(value))
                    .cloned()
                    .unwrap_or_else(|| self.palette.first().copied().unwrap_or("#000000").into());
                LegendSwatchLayout {
                    value,
                    label: self.legend_label(value),
                    x: cell.w * i as f64,
                    y: 5.0,
                    width: cell.w,
                    height: cell.h,
                    fill,
                    label_x: cell.w * i as f64,
                    label_y: 0.0,
                }
            })
            .collect();

        LegendLayout {
            x,
            y,
            title: self.legend_title(),
            title_x: -10.0,
            title_y: cell.h,
            swatches,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells() -> Vec<HeatmapCell> {
        vec![
            HeatmapCell::new("Lung", "g1", 0.5, 2.16).with_unit("TPM"),
            HeatmapCell::new("Liver", "g1", 1.2, 14.8),
            HeatmapCell::new("Lung", "g2", 2.0, 99.0),
            HeatmapCell::new("Liver", "g2", 2.9, 793.0),
        ]
    }

    #[test]
    fn unknown_scheme_fails_fast() {
        let err = Heatmap::new(cells(), true, "nope", 2.0).unwrap_err();
        assert!(matches!(err, Error::UnknownColorScheme { .. }));
    }

    #[test]
    fn lists_default_to_first_seen() {
        let mut h = Heatmap::new(cells(), true, "YlGnBu", 2.0).unwrap();
        let layout = h.draw(Dimensions { w: 200.0, h: 40.0 }, 30.0).unwrap();
        assert_eq!(layout.x_list, vec!["Lung", "Liver"]);
        assert_eq!(layout.y_list, vec!["g1", "g2"]);
        assert_eq!(layout.cells.len(), 4);
    }

    #[test]
    fn cells_carry_label_markers_and_fills() {
        let mut h = Heatmap::new(cells(), true, "gnbu", 3.0).unwrap();
        let layout = h
            .redraw(
                Dimensions { w: 200.0, h: 40.0 },
                Some(vec!["Liver".into(), "Lung".into()]),
                None,
                30.0,
            )
            .unwrap();
        let lung_g2 = layout.cells.iter().find(|c| c.x_label == "Lung" && c.y_label == "g2").unwrap();
        assert_eq!(lung_g2.row, "x1");
        assert_eq!(lung_g2.col, "y1");
        assert_eq!(lung_g2.rx, 3.0);
        assert_eq!(lung_g2.class, "cell expressmap-bordered");
        assert_eq!(lung_g2.initial_fill, "#fffffe");
        assert_eq!(lung_g2.transition_ms, 2000);
        assert_eq!(lung_g2.original_value, 99.0);
    }

    #[test]
    fn label_positions() {
        let mut h = Heatmap::new(cells(), true, "YlGnBu", 2.0).unwrap();
        let layout = h.draw(Dimensions { w: 200.0, h: 40.0 }, 45.0).unwrap();
        let xs = h.x_scale().unwrap();
        let first = &layout.x_labels[0];
        assert_eq!(first.class, "xLabel normal x0");
        assert_eq!(first.x, xs.apply("Lung").unwrap() + xs.bandwidth() / 2.0 + 1.0);
        assert_eq!(first.y, 40.0 + 17.0);
        assert_eq!(first.rotate, 45.0);

        let row = &layout.y_labels[1];
        assert_eq!(row.class, "yLabel normal y1");
        assert_eq!(row.x, 205.0);
        assert_eq!(row.y, h.y_scale().unwrap().apply("g2").unwrap() + 10.0);
    }

    #[test]
    fn cells_missing_from_lists_are_skipped() {
        let mut h = Heatmap::new(cells(), true, "YlGnBu", 2.0).unwrap();
        let layout = h
            .redraw(Dimensions::default(), Some(vec!["Lung".into()]), None, 30.0)
            .unwrap();
        assert_eq!(layout.cells.len(), 2);
        assert!(layout.cells.iter().all(|c| c.x_label == "Lung"));
    }

    #[test]
    fn log_legend_labels_back_transform() {
        let mut h = Heatmap::new(cells(), true, "YlGnBu", 2.0).unwrap();
        let legend = h.color_legend(0.0, 0.0, LegendCell { w: 60.0, h: 10.0 });
        assert_eq!(legend.title, "TPM");
        assert_eq!(legend.swatches.len(), 10);
        assert_eq!(legend.swatches[0].label, "0.0");
        for s in &legend.swatches {
            assert_eq!(s.label, to_precision(10f64.powf(s.value) - 1.0, 2));
        }
        assert_eq!(legend.swatches[3].x, 180.0);
    }

    #[test]
    fn linear_legend_labels() {
        let mut h = Heatmap::new(
            vec![HeatmapCell::new("A", "g", 0.0, 0.0), HeatmapCell::new("B", "g", 100.0, 100.0)],
            false,
            "rdpu",
            2.0,
        )
        .unwrap();
        let legend = h.color_legend(0.0, 0.0, LegendCell { w: 60.0, h: 10.0 });
        assert_eq!(legend.title, "Value");
        let labels: Vec<&str> = legend.swatches.iter().map(|s| s.label.as_str()).collect();
        assert_eq!(labels[0], "0.0");
        assert_eq!(labels.len(), 9);
        assert_eq!(h.color_scale().quantiles().len(), 8);
    }
}
