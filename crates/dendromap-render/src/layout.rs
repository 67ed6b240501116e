//! Composition of the two dendrograms, the heatmap and the legend on one surface.

use crate::LayoutOptions;
use crate::colors::DEFAULT_COLOR_SCHEME;
use crate::config::{DendroHeatmapConfig, LegendPosition, Panel};
use crate::dendrogram::{Dendrogram, Orientation};
use crate::interaction::Interaction;
use crate::heatmap::{Dimensions, Heatmap, LegendCell};
use crate::model::{DendroHeatmapLayout, ListSource};
use crate::text::TextStyle;
use crate::tooltip::Tooltip;
use crate::Result;
use dendromap_core::input::usable_tree;
use dendromap_core::{HeatmapCell, ParseOptions, ParsedDendroHeatmap};

#[derive(Debug, Clone, PartialEq)]
pub struct DendroHeatmapOptions {
    pub color_scheme: String,
    /// Corner radius of the heatmap cells.
    pub corner_radius: f64,
    /// Values are `log10(v + 1)`; legend labels are back-transformed.
    pub use_log: bool,
    pub parse: ParseOptions,
}

impl Default for DendroHeatmapOptions {
    fn default() -> Self {
        Self {
            color_scheme: DEFAULT_COLOR_SCHEME.to_string(),
            corner_radius: 2.0,
            use_log: true,
            parse: ParseOptions::strict(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub show_top_tree: bool,
    pub show_left_tree: bool,
    pub legend_position: LegendPosition,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            show_top_tree: true,
            show_left_tree: true,
            legend_position: LegendPosition::Bottom,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DendroHeatmap {
    config: DendroHeatmapConfig,
    column_newick: Option<String>,
    row_newick: Option<String>,
    column_tree: Option<Dendrogram>,
    row_tree: Option<Dendrogram>,
    heatmap: Heatmap,
    tooltip: Tooltip,
}

impl DendroHeatmap {
    /// Blank trees and the `"Not enough data"` sentinel mean "no tree".
    pub fn new(
        column_tree: Option<&str>,
        row_tree: Option<&str>,
        cells: Vec<HeatmapCell>,
        options: DendroHeatmapOptions,
        config: DendroHeatmapConfig,
    ) -> Result<Self> {
        let column_newick = usable_tree(column_tree).map(str::to_string);
        let row_newick = usable_tree(row_tree).map(str::to_string);
        let column_tree = column_newick
            .as_deref()
            .map(|n| Dendrogram::new(n, Orientation::Vertical, options.parse))
            .transpose()?;
        let row_tree = row_newick
            .as_deref()
            .map(|n| Dendrogram::new(n, Orientation::Horizontal, options.parse))
            .transpose()?;
        let heatmap = Heatmap::new(
            cells,
            options.use_log,
            &options.color_scheme,
            options.corner_radius,
        )?;
        Ok(Self {
            tooltip: Tooltip::new(format!("{}-tooltip", config.id)),
            config,
            column_newick,
            row_newick,
            column_tree,
            row_tree,
            heatmap,
        })
    }

    /// Builds from already-validated input without re-parsing the trees.
    pub fn from_parsed(
        parsed: &ParsedDendroHeatmap,
        options: DendroHeatmapOptions,
        config: DendroHeatmapConfig,
    ) -> Result<Self> {
        let heatmap = Heatmap::new(
            parsed.heatmap.clone(),
            options.use_log,
            &options.color_scheme,
            options.corner_radius,
        )?;
        Ok(Self {
            tooltip: Tooltip::new(format!("{}-tooltip", config.id)),
            config,
            column_newick: parsed.column_tree.as_ref().map(|t| t.newick.clone()),
            row_newick: parsed.row_tree.as_ref().map(|t| t.newick.clone()),
            column_tree: parsed
                .column_tree
                .as_ref()
                .map(|t| Dendrogram::from_tree(t.root.clone(), Orientation::Vertical)),
            row_tree: parsed
                .row_tree
                .as_ref()
                .map(|t| Dendrogram::from_tree(t.root.clone(), Orientation::Horizontal)),
            heatmap,
        })
    }

    pub fn config(&self) -> &DendroHeatmapConfig {
        &self.config
    }

    pub fn column_newick(&self) -> Option<&str> {
        self.column_newick.as_deref()
    }

    pub fn row_newick(&self) -> Option<&str> {
        self.row_newick.as_deref()
    }

    pub fn column_tree(&self) -> Option<&Dendrogram> {
        self.column_tree.as_ref()
    }

    pub fn row_tree(&self) -> Option<&Dendrogram> {
        self.row_tree.as_ref()
    }

    pub fn heatmap(&self) -> &Heatmap {
        &self.heatmap
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    /// Renders and hands the layout to an [`Interaction`] that owns this chart's tooltip, so
    /// cell and tree-node hovers on both trees drive the same element.
    pub fn render_interactive(&mut self, options: RenderOptions) -> Result<Interaction> {
        let layout = self.render(options)?;
        Ok(Interaction::with_tooltip(layout, self.tooltip.clone()))
    }

    pub fn render(&mut self, options: RenderOptions) -> Result<DendroHeatmapLayout> {
        self.render_with(options, &LayoutOptions::default())
    }

    pub fn render_with(
        &mut self,
        options: RenderOptions,
        layout_options: &LayoutOptions,
    ) -> Result<DendroHeatmapLayout> {
        let rows = self
            .row_tree
            .as_ref()
            .map(|t| t.leaves().len())
            .unwrap_or(1);
        let columns = match &self.column_tree {
            Some(t) => t.leaves().len(),
            None => self.heatmap.derived_x_list().len(),
        };
        let mut geometry = self
            .config
            .geometry(rows, columns, options.legend_position);
        let panels = &geometry.panels;

        let column_tree = self
            .column_tree
            .as_mut()
            .map(|t| t.draw(panels.top.w, panels.top.h, options.show_top_tree))
            .transpose()?;
        let row_tree = self
            .row_tree
            .as_mut()
            .map(|t| t.draw(panels.left.w, panels.left.h, options.show_left_tree))
            .transpose()?;

        let (x_list, column_order) = axis_order(column_tree.as_ref().map(|t| {
            (t.category_domain.clone(), options.show_top_tree)
        }));
        let (y_list, row_order) = axis_order(row_tree.as_ref().map(|t| {
            (t.category_domain.clone(), options.show_left_tree)
        }));
        tracing::debug!(?column_order, ?row_order, rows, columns, "heatmap axis order");

        let main = &panels.main;
        let heatmap = self.heatmap.redraw(
            Dimensions {
                w: main.w,
                h: main.h,
            },
            x_list,
            y_list,
            layout_options.label_rotation_degrees,
        )?;
        let legend = self.heatmap.color_legend(
            panels.legend.x,
            panels.legend.y,
            LegendCell {
                w: self.config.legend_cell_width,
                h: self.config.legend_cell_height,
            },
        );

        let (width, height) = fit_labels(
            &self.config,
            main,
            &heatmap,
            layout_options,
            (geometry.width, geometry.height),
        );
        geometry.width = width;
        geometry.height = height;

        tracing::debug!(
            width = geometry.width,
            height = geometry.height,
            cells = heatmap.cells.len(),
            "laid out dendro-heatmap"
        );

        Ok(DendroHeatmapLayout {
            id: self.config.id.clone(),
            width: geometry.width,
            height: geometry.height,
            margin: self.config.margin,
            panels: geometry.panels,
            column_order,
            row_order,
            column_tree,
            row_tree,
            heatmap,
            legend,
        })
    }
}

/// A shown tree dictates the order; a hidden tree falls back to its leaves sorted by name.
fn axis_order(tree: Option<(Vec<String>, bool)>) -> (Option<Vec<String>>, ListSource) {
    match tree {
        Some((domain, true)) => (Some(domain), ListSource::Tree),
        Some((mut domain, false)) => {
            domain.sort();
            (Some(domain), ListSource::Sorted)
        }
        None => (None, ListSource::FirstSeen),
    }
}

/// Grows the surface so rotated column labels and row labels are not clipped.
fn fit_labels(
    config: &DendroHeatmapConfig,
    main: &Panel,
    heatmap: &crate::model::HeatmapLayout,
    options: &LayoutOptions,
    (width, height): (f64, f64),
) -> (f64, f64) {
    let style = TextStyle::default();
    let measurer = options.text_measurer.as_ref();

    let row_label_w = heatmap
        .y_labels
        .iter()
        .map(|l| measurer.measure(&l.text, &style).width)
        .fold(0.0, f64::max);
    let column_label_h = heatmap
        .x_labels
        .iter()
        .map(|l| {
            measurer
                .measure(&l.text, &style)
                .rotated_extent(options.label_rotation_degrees)
                .1
        })
        .fold(0.0, f64::max);

    let right = config.margin.left + main.x + main.w + 5.0 + row_label_w;
    let bottom = config.margin.top + main.y + main.h + 17.0 + column_label_h;
    (width.max(right), height.max(bottom))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::TreeSide;
    use crate::tooltip::Pointer;

    fn cells() -> Vec<HeatmapCell> {
        let mut out = Vec::new();
        for (i, x) in ["T1", "T2", "T3"].iter().enumerate() {
            for (j, y) in ["G1", "G2"].iter().enumerate() {
                out.push(HeatmapCell::log_transformed(*x, *y, (i * 10 + j) as f64));
            }
        }
        out
    }

    #[test]
    fn sentinel_trees_are_absent() {
        let chart = DendroHeatmap::new(
            Some("Not enough data for clustering"),
            Some("  "),
            cells(),
            DendroHeatmapOptions::default(),
            DendroHeatmapConfig::default(),
        )
        .unwrap();
        assert!(chart.column_tree().is_none());
        assert!(chart.row_tree().is_none());
    }

    #[test]
    fn tree_order_drives_heatmap_order() {
        let mut chart = DendroHeatmap::new(
            Some("((T3:1,T1:1):1,T2:2);"),
            Some("(G2:1,G1:1);"),
            cells(),
            DendroHeatmapOptions::default(),
            DendroHeatmapConfig::default(),
        )
        .unwrap();
        let layout = chart.render(RenderOptions::default()).unwrap();
        assert_eq!(layout.column_order, ListSource::Tree);
        assert_eq!(
            layout.heatmap.x_list,
            layout.column_tree.as_ref().unwrap().category_domain
        );
        assert_eq!(layout.heatmap.x_list, vec!["T2", "T3", "T1"]);
        assert_eq!(layout.heatmap.y_list, vec!["G2", "G1"]);
        assert_eq!(layout.panels.left.h, 24.0);
    }

    #[test]
    fn hidden_tree_sorts_alphabetically() {
        let mut chart = DendroHeatmap::new(
            Some("((T3:1,T1:1):1,T2:2);"),
            None,
            cells(),
            DendroHeatmapOptions::default(),
            DendroHeatmapConfig::default(),
        )
        .unwrap();
        let layout = chart
            .render(RenderOptions {
                show_top_tree: false,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(layout.column_order, ListSource::Sorted);
        assert_eq!(layout.heatmap.x_list, vec!["T1", "T2", "T3"]);
        assert!(layout.column_tree.as_ref().unwrap().branches.is_empty());
        assert_eq!(layout.row_order, ListSource::FirstSeen);
        assert_eq!(layout.heatmap.y_list, vec!["G1", "G2"]);
        assert_eq!(layout.panels.main.h, 20.0);
    }

    #[test]
    fn repeated_render_is_stable() {
        let mut chart = DendroHeatmap::new(
            None,
            Some("(G2:1,G1:1);"),
            cells(),
            DendroHeatmapOptions::default(),
            DendroHeatmapConfig::default(),
        )
        .unwrap();
        let a = chart.render(RenderOptions::default()).unwrap();
        let b = chart.render(RenderOptions::default()).unwrap();
        assert_eq!(a.height, b.height);
        assert_eq!(a.legend.y, b.legend.y);
    }

    #[test]
    fn render_defaults() {
        let options = RenderOptions::default();
        assert!(options.show_top_tree);
        assert!(options.show_left_tree);
        assert_eq!(options.legend_position, LegendPosition::Bottom);
        assert_eq!(LegendPosition::default(), LegendPosition::Bottom);
    }

    #[test]
    fn interaction_shares_the_chart_tooltip() {
        let mut chart = DendroHeatmap::new(
            Some("((T3:1,T1:1):1,T2:2);"),
            Some("(G2:1,G1:1);"),
            cells(),
            DendroHeatmapOptions::default(),
            DendroHeatmapConfig::default(),
        )
        .unwrap();
        assert_eq!(chart.tooltip().id, "chart-tooltip");

        let mut ui = chart.render_interactive(RenderOptions::default()).unwrap();
        assert_eq!(ui.tooltip().id, chart.tooltip().id);

        let root = ui.layout().row_tree.as_ref().unwrap().markers[0].node;
        ui.hover_tree_node(TreeSide::Row, root, Pointer::new(5.0, 5.0))
            .unwrap();
        assert_eq!(ui.tooltip().id, "chart-tooltip");
        assert!(ui.tooltip().is_shown());
        ui.leave_tree_node();
        ui.hover_cell(0, Pointer::new(5.0, 5.0)).unwrap();
        assert!(ui.tooltip().content.starts_with("Column: "));
    }

    #[test]
    fn bottom_legend() {
        let mut chart = DendroHeatmap::new(
            None,
            None,
            cells(),
            DendroHeatmapOptions::default(),
            DendroHeatmapConfig::default(),
        )
        .unwrap();
        let layout = chart
            .render(RenderOptions {
                legend_position: LegendPosition::Bottom,
                ..Default::default()
            })
            .unwrap();
        assert_eq!(layout.legend.y, 20.0 + 110.0 + 50.0);
    }

    #[test]
    fn invalid_tree_fails_in_strict_mode() {
        let err = DendroHeatmap::new(
            Some("((A,B);"),
            None,
            cells(),
            DendroHeatmapOptions::default(),
            DendroHeatmapConfig::default(),
        )
        .unwrap_err();
        assert!(matches!(err, crate::Error::Core(_)));
    }
}
