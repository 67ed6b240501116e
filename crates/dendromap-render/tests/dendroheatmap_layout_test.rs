use dendromap_core::{ParseOptions, parse_input_sync};
use dendromap_render::model::ListSource;
use dendromap_render::{
    DendroHeatmapConfig, DendroHeatmapOptions, LayoutOptions, LegendPosition, RenderOptions,
    layout_parsed,
};
use std::path::PathBuf;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn fixture(name: &str) -> String {
    let path = workspace_root()
        .join("fixtures")
        .join("dendroheatmap")
        .join(name);
    std::fs::read_to_string(&path).expect("fixture")
}

fn layout(name: &str, render: RenderOptions) -> dendromap_render::DendroHeatmapLayout {
    let parsed = parse_input_sync(&fixture(name), ParseOptions::strict()).expect("parse");
    layout_parsed(
        &parsed,
        DendroHeatmapOptions::default(),
        DendroHeatmapConfig::default(),
        render,
        &LayoutOptions::default(),
    )
    .expect("layout")
}

#[test]
fn gtex_sample_orders_heatmap_by_trees() {
    let layout = layout("gtex_sample.json", RenderOptions::default());
    let column_tree = layout.column_tree.as_ref().expect("column tree");
    let row_tree = layout.row_tree.as_ref().expect("row tree");

    assert_eq!(layout.column_order, ListSource::Tree);
    assert_eq!(layout.row_order, ListSource::Tree);
    assert_eq!(layout.heatmap.x_list, column_tree.category_domain);
    assert_eq!(layout.heatmap.y_list, row_tree.category_domain);
    assert_eq!(layout.heatmap.x_list.len(), 6);
    assert_eq!(layout.heatmap.y_list.len(), 5);
    assert_eq!(layout.heatmap.cells.len(), 30);

    // Ultrametric trees: every leaf ends at the far edge of its panel.
    for node in column_tree.nodes.iter().filter(|n| n.is_leaf) {
        assert!((node.y - column_tree.height).abs() < 1e-6, "{}", node.name);
    }
    for node in row_tree.nodes.iter().filter(|n| n.is_leaf) {
        assert!((node.x - row_tree.width).abs() < 1e-6, "{}", node.name);
    }
}

#[test]
fn gtex_sample_panels_follow_row_count() {
    let layout = layout("gtex_sample.json", RenderOptions::default());
    assert_eq!(layout.panels.left.h, 60.0);
    assert_eq!(layout.panels.main.h, 60.0);
    assert!(layout.height >= 50.0 + 50.0 + 25.0 + 170.0 + 60.0);
    assert_eq!(layout.width, 1200.0);
}

#[test]
fn band_positions_align_cells_and_leaves() {
    let layout = layout("gtex_sample.json", RenderOptions::default());
    let column_tree = layout.column_tree.as_ref().unwrap();
    let half = column_tree.bandwidth / 2.0;

    let mut xs: Vec<f64> = Vec::new();
    for label in &layout.heatmap.x_list {
        let cell = layout
            .heatmap
            .cells
            .iter()
            .find(|c| &c.x_label == label)
            .unwrap();
        let leaf = column_tree.nodes.iter().find(|n| &n.name == label).unwrap();
        // Same panel width and domain, so the band positions match.
        assert!((cell.x + half - leaf.x).abs() < 1e-6, "{label}");
        xs.push(cell.x);
    }
    assert!(xs.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn hidden_trees_fall_back_to_sorted_labels() {
    let layout = layout(
        "gtex_sample.json",
        RenderOptions {
            show_top_tree: false,
            show_left_tree: false,
            legend_position: LegendPosition::Bottom,
        },
    );
    assert_eq!(layout.column_order, ListSource::Sorted);
    let mut sorted = layout.heatmap.x_list.clone();
    sorted.sort();
    assert_eq!(layout.heatmap.x_list, sorted);
    assert!(layout.column_tree.as_ref().unwrap().branches.is_empty());
    assert_eq!(layout.legend.y, 60.0 + 110.0 + 50.0);
}

#[test]
fn not_enough_data_renders_without_trees() {
    let layout = layout("not_enough_data.json", RenderOptions::default());
    assert!(layout.column_tree.is_none());
    assert!(layout.row_tree.is_none());
    assert_eq!(layout.column_order, ListSource::FirstSeen);
    assert_eq!(layout.panels.left.h, 20.0);
    assert_eq!(layout.heatmap.y_list.len(), 1);
}

#[test]
fn legend_uses_unit_and_log_labels() {
    let layout = layout("gtex_sample.json", RenderOptions::default());
    assert_eq!(layout.legend.title, "TPM");
    assert_eq!(layout.legend.swatches[0].label, "0.0");
    assert_eq!(layout.legend.swatches.len(), 10);
}

#[test]
fn layout_serializes_to_json() {
    let layout = layout("gtex_sample.json", RenderOptions::default());
    let json = serde_json::to_value(&layout).unwrap();
    assert_eq!(json["id"], "chart");
    assert_eq!(json["column_order"], "tree");
    assert!(json["heatmap"]["cells"][0]["originalValue"].is_number());
}
