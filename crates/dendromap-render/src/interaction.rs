//! Pointer-driven highlight, tooltip and selection state over a rendered layout.
//!
//! Events address layout elements by index or label; queries report the classes and marker
//! attributes the host should apply.

use crate::boxplot::{BoxplotSelection, ExpressionSource, SelectionChange, TissueLabel};
use crate::dendrogram::{MARKER_FILL, MARKER_HOVER_FILL, MARKER_HOVER_RADIUS, MARKER_RADIUS};
use crate::model::{DendroHeatmapLayout, DendrogramLayout, HeatmapLabelLayout, NodeMarkerLayout};
use crate::tooltip::{Pointer, Tooltip};
use crate::{Error, Result};
use dendromap_core::NodeId;
use rustc_hash::FxHashSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelAxis {
    /// Heatmap column labels (`xLabel`).
    Column,
    /// Heatmap row labels (`yLabel`).
    Row,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeSide {
    Column,
    Row,
}

impl TreeSide {
    fn axis(self) -> LabelAxis {
        match self {
            Self::Column => LabelAxis::Column,
            Self::Row => LabelAxis::Row,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Interaction {
    layout: DendroHeatmapLayout,
    tooltip: Tooltip,
    highlighted_cells: FxHashSet<usize>,
    highlighted_labels: FxHashSet<(LabelAxis, String)>,
    hovered_marker: Option<(TreeSide, NodeId)>,
    boxplot: BoxplotSelection,
}

impl Interaction {
    pub fn new(layout: DendroHeatmapLayout) -> Self {
        Self::with_tooltip(layout, Tooltip::default())
    }

    pub fn with_tooltip(layout: DendroHeatmapLayout, tooltip: Tooltip) -> Self {
        Self {
            layout,
            tooltip,
            highlighted_cells: FxHashSet::default(),
            highlighted_labels: FxHashSet::default(),
            hovered_marker: None,
            boxplot: BoxplotSelection::new(),
        }
    }

    pub fn layout(&self) -> &DendroHeatmapLayout {
        &self.layout
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn boxplot(&self) -> &BoxplotSelection {
        &self.boxplot
    }

    pub fn boxplot_mut(&mut self) -> &mut BoxplotSelection {
        &mut self.boxplot
    }

    fn labels(&self, axis: LabelAxis) -> &[HeatmapLabelLayout] {
        match axis {
            LabelAxis::Column => &self.layout.heatmap.x_labels,
            LabelAxis::Row => &self.layout.heatmap.y_labels,
        }
    }

    fn tree(&self, side: TreeSide) -> Option<&DendrogramLayout> {
        match side {
            TreeSide::Column => self.layout.column_tree.as_ref(),
            TreeSide::Row => self.layout.row_tree.as_ref(),
        }
    }

    fn marker(&self, side: TreeSide, node: NodeId) -> Result<&NodeMarkerLayout> {
        self.tree(side)
            .and_then(|t| t.markers.iter().find(|m| m.node == node))
            .ok_or_else(|| Error::InvalidModel {
                message: format!("no {side:?} tree marker for node {node}"),
            })
    }

    pub fn hover_cell(&mut self, index: usize, pointer: Pointer) -> Result<()> {
        let cell = self
            .layout
            .heatmap
            .cells
            .get(index)
            .ok_or_else(|| Error::InvalidModel {
                message: format!("no heatmap cell at index {index}"),
            })?;
        let html = format!(
            "Column: {} <br/> Row: {} <br/> Value: {}",
            cell.x_label, cell.y_label, cell.original_value
        );
        let (x, y) = (cell.x_label.clone(), cell.y_label.clone());
        self.highlighted_cells.insert(index);
        self.highlighted_labels.insert((LabelAxis::Column, x));
        self.highlighted_labels.insert((LabelAxis::Row, y));
        self.tooltip.show(html, pointer);
        Ok(())
    }

    /// Clears every highlight, not just the ones the last cell set.
    pub fn leave_cell(&mut self) {
        self.highlighted_cells.clear();
        self.highlighted_labels.clear();
        self.tooltip.hide();
    }

    pub fn hover_label(&mut self, axis: LabelAxis, label: &str) {
        if self.labels(axis).iter().any(|l| l.text == label) {
            self.highlighted_labels.insert((axis, label.to_string()));
        }
    }

    pub fn leave_label(&mut self, axis: LabelAxis, label: &str) {
        self.highlighted_labels.remove(&(axis, label.to_string()));
    }

    /// Enlarges the marker and highlights the labels of every leaf beneath it.
    pub fn hover_tree_node(&mut self, side: TreeSide, node: NodeId, pointer: Pointer) -> Result<()> {
        let leaves = self.marker(side, node)?.leaves.clone();
        let axis = side.axis();
        for leaf in &leaves {
            if self.labels(axis).iter().any(|l| &l.text == leaf) {
                self.highlighted_labels.insert((axis, leaf.clone()));
            }
        }
        self.hovered_marker = Some((side, node));
        self.tooltip.show(leaves.join("<br/>"), pointer);
        Ok(())
    }

    pub fn leave_tree_node(&mut self) {
        if let Some((side, _)) = self.hovered_marker.take() {
            let axis = side.axis();
            self.highlighted_labels.retain(|(a, _)| *a != axis);
        }
        self.tooltip.hide();
    }

    /// Row labels are gencode ids; the series follows the current column order.
    pub fn click_row_label(
        &mut self,
        label: &str,
        alt: bool,
        source: &dyn ExpressionSource,
    ) -> Result<SelectionChange> {
        let tissue_order: Vec<TissueLabel> = self
            .layout
            .heatmap
            .x_list
            .iter()
            .map(|id| TissueLabel {
                id: id.clone(),
                name: id.clone(),
            })
            .collect();
        self.boxplot.click(label, alt, &tissue_order, source)
    }

    pub fn is_cell_highlighted(&self, index: usize) -> bool {
        self.highlighted_cells.contains(&index)
    }

    pub fn is_label_highlighted(&self, axis: LabelAxis, label: &str) -> bool {
        self.highlighted_labels.contains(&(axis, label.to_string()))
    }

    /// `"xLabel normal x3"` at rest, `highlighted` instead of `normal` while hovered, plus
    /// `clicked` for selected row labels.
    pub fn label_class(&self, axis: LabelAxis, label: &str) -> Option<String> {
        let entry = self.labels(axis).iter().find(|l| l.text == label)?;
        let (base, prefix) = match axis {
            LabelAxis::Column => ("xLabel", 'x'),
            LabelAxis::Row => ("yLabel", 'y'),
        };
        let state = if self.is_label_highlighted(axis, label) {
            "highlighted"
        } else {
            "normal"
        };
        let mut class = format!("{base} {state} {prefix}{}", entry.index);
        if axis == LabelAxis::Row && self.boxplot.is_clicked(label) {
            class.push_str(" clicked");
        }
        Some(class)
    }

    pub fn cell_class(&self, index: usize) -> Option<String> {
        let cell = self.layout.heatmap.cells.get(index)?;
        if self.is_cell_highlighted(index) {
            Some(format!("{} expressmap-highlighted", cell.class))
        } else {
            Some(cell.class.clone())
        }
    }

    /// `(radius, fill)` of a tree node marker.
    pub fn marker_state(&self, side: TreeSide, node: NodeId) -> (f64, &'static str) {
        if self.hovered_marker == Some((side, node)) {
            (MARKER_HOVER_RADIUS, MARKER_HOVER_FILL)
        } else {
            (MARKER_RADIUS, MARKER_FILL)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::boxplot::TissueExpression;
    use crate::layout::{DendroHeatmap, DendroHeatmapOptions, RenderOptions};
    use crate::config::DendroHeatmapConfig;
    use dendromap_core::HeatmapCell;

    fn interaction() -> Interaction {
        let cells = vec![
            HeatmapCell::new("T1", "G1", 0.1, 0.26),
            HeatmapCell::new("T2", "G1", 1.0, 9.0),
            HeatmapCell::new("T1", "G2", 2.0, 99.0),
            HeatmapCell::new("T2", "G2", 0.0, 0.0),
        ];
        let mut chart = DendroHeatmap::new(
            Some("(T1:1,T2:1);"),
            Some("(G1:1,G2:1);"),
            cells,
            DendroHeatmapOptions::default(),
            DendroHeatmapConfig::default(),
        )
        .unwrap();
        Interaction::new(chart.render(RenderOptions::default()).unwrap())
    }

    #[test]
    fn cell_hover_highlights_matching_labels() {
        let mut ui = interaction();
        let idx = ui
            .layout()
            .heatmap
            .cells
            .iter()
            .position(|c| c.x_label == "T1" && c.y_label == "G2")
            .unwrap();
        ui.hover_cell(idx, Pointer::new(10.0, 100.0)).unwrap();
        assert!(ui.is_cell_highlighted(idx));
        assert!(ui.is_label_highlighted(LabelAxis::Column, "T1"));
        assert!(ui.is_label_highlighted(LabelAxis::Row, "G2"));
        assert!(!ui.is_label_highlighted(LabelAxis::Column, "T2"));
        assert_eq!(ui.tooltip().content, "Column: T1 <br/> Row: G2 <br/> Value: 99");
        assert!(ui.cell_class(idx).unwrap().ends_with("expressmap-highlighted"));
        assert!(ui.label_class(LabelAxis::Column, "T1").unwrap().contains("highlighted"));

        ui.leave_cell();
        assert!(!ui.is_cell_highlighted(idx));
        assert!(!ui.is_label_highlighted(LabelAxis::Row, "G2"));
        assert!(!ui.tooltip().is_shown());
    }

    #[test]
    fn label_hover_toggles() {
        let mut ui = interaction();
        ui.hover_label(LabelAxis::Row, "G1");
        let class = ui.label_class(LabelAxis::Row, "G1").unwrap();
        assert!(class.starts_with("yLabel highlighted y"));
        ui.leave_label(LabelAxis::Row, "G1");
        assert!(ui.label_class(LabelAxis::Row, "G1").unwrap().contains("normal"));
        ui.hover_label(LabelAxis::Row, "unknown");
        assert!(!ui.is_label_highlighted(LabelAxis::Row, "unknown"));
    }

    #[test]
    fn tree_node_hover_lists_leaves() {
        let mut ui = interaction();
        let root = ui.layout().column_tree.as_ref().unwrap().markers[0].node;
        ui.hover_tree_node(TreeSide::Column, root, Pointer::new(0.0, 0.0))
            .unwrap();
        assert_eq!(ui.marker_state(TreeSide::Column, root), (6.0, "red"));
        assert!(ui.is_label_highlighted(LabelAxis::Column, "T1"));
        assert!(ui.is_label_highlighted(LabelAxis::Column, "T2"));
        assert!(!ui.is_label_highlighted(LabelAxis::Row, "G1"));
        assert!(ui.tooltip().content.contains("<br/>"));

        ui.leave_tree_node();
        assert_eq!(ui.marker_state(TreeSide::Column, root), (2.0, MARKER_FILL));
        assert!(!ui.is_label_highlighted(LabelAxis::Column, "T1"));
    }

    #[test]
    fn unknown_tree_node_is_an_error() {
        let mut ui = interaction();
        assert!(
            ui.hover_tree_node(TreeSide::Row, 999, Pointer::default())
                .is_err()
        );
    }

    #[test]
    fn row_label_click_builds_boxplot() {
        let mut ui = interaction();
        let source = |_: &str| -> std::result::Result<Vec<TissueExpression>, String> {
            Ok(vec![TissueExpression {
                tissue_id: "T2".to_string(),
                data: vec![3.0],
            }])
        };
        let change = ui.click_row_label("G1", false, &source).unwrap();
        assert_eq!(change, SelectionChange::Added);
        assert!(ui.label_class(LabelAxis::Row, "G1").unwrap().ends_with("clicked"));
        let trace = ui.boxplot().traces().next().unwrap();
        assert_eq!(trace.x, vec!["T2"]);
        assert_eq!(trace.marker.color, "grey");
    }
}
