use dendromap_core::{ParseOptions, parse_input_sync};
use dendromap_render::interaction::LabelAxis;
use dendromap_render::svg::{SvgRenderOptions, render_dendro_heatmap_svg, render_interaction_svg};
use dendromap_render::tooltip::Pointer;
use dendromap_render::{DendroHeatmap, DendroHeatmapConfig, DendroHeatmapOptions, RenderOptions};
use std::path::PathBuf;

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..")
}

fn chart() -> DendroHeatmap {
    let path = workspace_root()
        .join("fixtures")
        .join("dendroheatmap")
        .join("gtex_sample.json");
    let text = std::fs::read_to_string(&path).expect("fixture");
    let parsed = parse_input_sync(&text, ParseOptions::strict()).expect("parse");
    DendroHeatmap::from_parsed(
        &parsed,
        DendroHeatmapOptions::default(),
        DendroHeatmapConfig::default(),
    )
    .expect("chart")
}

#[test]
fn svg_contains_panels_labels_and_cells() {
    let layout = chart().render(RenderOptions::default()).unwrap();
    let svg = render_dendro_heatmap_svg(&layout, &SvgRenderOptions::default()).unwrap();

    assert!(svg.starts_with("<svg "));
    assert!(svg.ends_with("</svg>"));
    assert!(svg.contains(r#"id="chart-svg""#));
    assert!(svg.contains(r#"<g transform="translate(10, 50)">"#));
    for id in ["topTree", "leftTree", "heatmap", "legend"] {
        assert!(svg.contains(&format!(r#"id="{id}""#)), "{id}");
    }
    assert!(svg.contains(r#"class="xLabel normal x0""#));
    assert!(svg.contains(r#"class="yLabel normal y4""#));
    assert_eq!(svg.matches(r#"class="cell expressmap-bordered""#).count(), 30);
    assert!(svg.contains(r#"row="x0""#));
    assert!(svg.contains(r#"col="y0""#));
    assert!(svg.contains(r#"attributeName="fill""#));
    assert!(svg.contains(r#"dur="2000ms""#));
    assert!(svg.contains("<style>"));
    assert_eq!(svg.matches(r#"class="dendrogram-node""#).count(), 5 + 4);
}

#[test]
fn static_svg_skips_animation_and_style() {
    let layout = chart().render(RenderOptions::default()).unwrap();
    let svg = render_dendro_heatmap_svg(
        &layout,
        &SvgRenderOptions {
            animate: false,
            include_style: false,
            diagram_id: Some("static".to_string()),
        },
    )
    .unwrap();
    assert!(!svg.contains("<animate"));
    assert!(!svg.contains("<style>"));
    assert!(svg.contains(r#"id="static-svg""#));
}

#[test]
fn hidden_trees_are_not_drawn() {
    let layout = chart()
        .render(RenderOptions {
            show_top_tree: false,
            show_left_tree: false,
            ..Default::default()
        })
        .unwrap();
    let svg = render_dendro_heatmap_svg(&layout, &SvgRenderOptions::default()).unwrap();
    assert!(!svg.contains(r#"id="topTree""#));
    assert!(!svg.contains("dendrogram-branch"));
}

#[test]
fn interaction_state_is_reflected() {
    let mut ui = chart().render_interactive(RenderOptions::default()).unwrap();
    ui.hover_cell(0, Pointer::new(200.0, 300.0)).unwrap();
    let column = ui.layout().heatmap.cells[0].x_label.clone();
    assert!(ui.is_label_highlighted(LabelAxis::Column, &column));

    let svg = render_interaction_svg(&ui, &SvgRenderOptions::default()).unwrap();
    assert!(svg.contains("expressmap-highlighted"));
    assert!(svg.contains(r#"class="xLabel highlighted x"#));
    assert!(ui.tooltip().content.starts_with("Column: "));
    assert_eq!(ui.tooltip().id, "chart-tooltip");
}

#[test]
fn svg_parses_as_xml_with_escaped_labels() {
    let parsed = parse_input_sync(
        r#"{"heatmap": [
            {"x": "A&B", "y": "<g1>", "value": 1.0, "originalValue": 9.0},
            {"x": "C\"D", "y": "<g1>", "value": 0.0, "originalValue": 0.0}
        ]}"#,
        ParseOptions::strict(),
    )
    .unwrap();
    let mut chart = DendroHeatmap::from_parsed(
        &parsed,
        DendroHeatmapOptions::default(),
        DendroHeatmapConfig::default(),
    )
    .unwrap();
    let svg = render_dendro_heatmap_svg(
        &chart.render(RenderOptions::default()).unwrap(),
        &SvgRenderOptions::default(),
    )
    .unwrap();

    let doc = roxmltree::Document::parse(&svg).expect("well-formed svg");
    let labels: Vec<&str> = doc
        .descendants()
        .filter(|n| n.has_tag_name("text"))
        .filter_map(|n| n.text())
        .collect();
    assert!(labels.contains(&"A&B"));
    assert!(labels.contains(&"C\"D"));
    assert!(labels.contains(&"<g1>"));
}
