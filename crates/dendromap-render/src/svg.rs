//! SVG output for a [`DendroHeatmapLayout`].

use crate::interaction::{Interaction, LabelAxis, TreeSide};
use crate::model::{DendroHeatmapLayout, DendrogramLayout, HeatmapLayout, LegendLayout, LineSegment};
use crate::{Error, Result};
use std::fmt::Write as _;

#[derive(Debug, Clone)]
pub struct SvgRenderOptions {
    /// Emit SMIL `<animate>` elements for the cell color transitions.
    pub animate: bool,
    /// Emit the default `<style>` block.
    pub include_style: bool,
    /// Overrides the layout id for the root element ids.
    pub diagram_id: Option<String>,
}

impl Default for SvgRenderOptions {
    fn default() -> Self {
        Self {
            animate: true,
            include_style: true,
            diagram_id: None,
        }
    }
}

const BRANCH_STROKE: &str = "gray";

pub fn render_dendro_heatmap_svg(
    layout: &DendroHeatmapLayout,
    options: &SvgRenderOptions,
) -> Result<String> {
    render(layout, None, options)
}

/// Same as [`render_dendro_heatmap_svg`], with classes and marker sizes taken from the current
/// interaction state.
pub fn render_interaction_svg(
    interaction: &Interaction,
    options: &SvgRenderOptions,
) -> Result<String> {
    render(interaction.layout(), Some(interaction), options)
}

fn render(
    layout: &DendroHeatmapLayout,
    state: Option<&Interaction>,
    options: &SvgRenderOptions,
) -> Result<String> {
    if !(layout.width.is_finite() && layout.height.is_finite()) {
        return Err(Error::InvalidModel {
            message: format!("non-finite surface size {}x{}", layout.width, layout.height),
        });
    }
    let id = options.diagram_id.as_deref().unwrap_or(&layout.id);
    let id_attr = escape_attr(id);

    let mut out = String::new();
    let _ = write!(
        &mut out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" id="{id}-svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        id = id_attr,
        w = fmt(layout.width),
        h = fmt(layout.height),
    );
    if options.include_style {
        let _ = write!(&mut out, "<style>{}</style>", style_css(&id_attr));
    }
    let _ = write!(
        &mut out,
        r#"<g transform="translate({}, {})">"#,
        fmt(layout.margin.left),
        fmt(layout.margin.top)
    );

    if let Some(tree) = layout.column_tree.as_ref().filter(|t| t.visible) {
        let p = &layout.panels.top;
        render_tree(&mut out, &p.id, p.x, p.y, tree, TreeSide::Column, state);
    }
    if let Some(tree) = layout.row_tree.as_ref().filter(|t| t.visible) {
        let p = &layout.panels.left;
        render_tree(&mut out, &p.id, p.x, p.y, tree, TreeSide::Row, state);
    }

    let main = &layout.panels.main;
    let _ = write!(
        &mut out,
        r#"<g id="{}" transform="translate({}, {})">"#,
        escape_attr(&main.id),
        fmt(main.x),
        fmt(main.y)
    );
    render_heatmap(&mut out, &layout.heatmap, state, options);
    out.push_str("</g>");

    render_legend(&mut out, &layout.panels.legend.id, &layout.legend);

    out.push_str("</g></svg>");
    Ok(out)
}

fn style_css(id: &str) -> String {
    format!(
        "#{id}-svg{{font-family:\"Libre Franklin\",sans-serif;font-size:10px;}}\
#{id}-svg .normal{{fill:#000000;font-weight:normal;}}\
#{id}-svg .highlighted{{fill:#2c7fb8;font-weight:bold;}}\
#{id}-svg .clicked{{fill:#bb453e;}}\
#{id}-svg .expressmap-bordered{{stroke:#ffffff;stroke-width:1px;}}\
#{id}-svg .expressmap-highlighted{{stroke:#000000;stroke-width:1px;}}\
#{id}-svg .dendrogram-axis line{{stroke:#999999;}}"
    )
}

fn line(out: &mut String, seg: &LineSegment, class: &str) {
    let _ = write!(
        out,
        r#"<line class="{}" x1="{}" y1="{}" x2="{}" y2="{}" stroke="{}" stroke-width="1"/>"#,
        class,
        fmt(seg.x1),
        fmt(seg.y1),
        fmt(seg.x2),
        fmt(seg.y2),
        BRANCH_STROKE
    );
}

fn render_tree(
    out: &mut String,
    panel_id: &str,
    x: f64,
    y: f64,
    tree: &DendrogramLayout,
    side: TreeSide,
    state: Option<&Interaction>,
) {
    let _ = write!(
        out,
        r#"<g id="{}" transform="translate({}, {})">"#,
        escape_attr(panel_id),
        fmt(x),
        fmt(y)
    );
    for seg in &tree.branches {
        line(out, seg, "dendrogram-branch");
    }
    for seg in &tree.arms {
        line(out, seg, "dendrogram-arm");
    }
    for marker in &tree.markers {
        let (r, fill) = match state {
            Some(s) => {
                let (r, fill) = s.marker_state(side, marker.node);
                (r, fill.to_string())
            }
            None => (marker.r, marker.fill.clone()),
        };
        let _ = write!(
            out,
            r#"<circle class="dendrogram-node" data-node="{}" cx="{}" cy="{}" r="{}" fill="{}"/>"#,
            marker.node,
            fmt(marker.cx),
            fmt(marker.cy),
            fmt(r),
            escape_attr(&fill)
        );
    }
    if let Some(axis) = &tree.axis {
        out.push_str(r#"<g class="dendrogram-axis">"#);
        line(out, &axis.line, "axis-line");
        let horizontal = axis.line.y1 == axis.line.y2;
        for tick in &axis.ticks {
            let (tx, ty, anchor) = if horizontal {
                (tick.position, axis.line.y1 + 12.0, "middle")
            } else {
                (axis.line.x1 - 4.0, tick.position + 3.0, "end")
            };
            let _ = write!(
                out,
                r#"<text class="axis-tick" x="{}" y="{}" text-anchor="{}">{}</text>"#,
                fmt(tx),
                fmt(ty),
                anchor,
                escape_xml(&tick.label)
            );
        }
        out.push_str("</g>");
    }
    out.push_str("</g>");
}

fn render_heatmap(
    out: &mut String,
    heatmap: &HeatmapLayout,
    state: Option<&Interaction>,
    options: &SvgRenderOptions,
) {
    let label_class = |axis: LabelAxis, text: &str, default: &str| {
        state
            .and_then(|s| s.label_class(axis, text))
            .unwrap_or_else(|| default.to_string())
    };

    for label in &heatmap.x_labels {
        let _ = write!(
            out,
            r#"<text class="{}" x="0" y="0" style="text-anchor: start;" transform="translate({}, {}) rotate({})">{}</text>"#,
            escape_attr(&label_class(LabelAxis::Column, &label.text, &label.class)),
            fmt(label.x),
            fmt(label.y),
            fmt(label.rotate),
            escape_xml(&label.text)
        );
    }
    for label in &heatmap.y_labels {
        let _ = write!(
            out,
            r#"<text class="{}" x="{}" y="{}" style="text-anchor: start;">{}</text>"#,
            escape_attr(&label_class(LabelAxis::Row, &label.text, &label.class)),
            fmt(label.x),
            fmt(label.y),
            escape_xml(&label.text)
        );
    }

    for (i, cell) in heatmap.cells.iter().enumerate() {
        let class = state
            .and_then(|s| s.cell_class(i))
            .unwrap_or_else(|| cell.class.clone());
        let _ = write!(
            out,
            r#"<rect row="{}" col="{}" x="{}" y="{}" rx="{}" ry="{}" class="{}" width="{}" height="{}" fill="{}""#,
            escape_attr(&cell.row),
            escape_attr(&cell.col),
            fmt(cell.x),
            fmt(cell.y),
            fmt(cell.rx),
            fmt(cell.ry),
            escape_attr(&class),
            fmt(cell.width),
            fmt(cell.height),
            escape_attr(&cell.fill)
        );
        if options.animate && cell.initial_fill != cell.fill {
            let _ = write!(
                out,
                r#"><animate attributeName="fill" from="{}" to="{}" dur="{}ms" fill="freeze"/></rect>"#,
                escape_attr(&cell.initial_fill),
                escape_attr(&cell.fill),
                cell.transition_ms
            );
        } else {
            out.push_str("/>");
        }
    }
}

fn render_legend(out: &mut String, panel_id: &str, legend: &LegendLayout) {
    let _ = write!(
        out,
        r#"<g id="{}" transform="translate({}, {})">"#,
        escape_attr(panel_id),
        fmt(legend.x),
        fmt(legend.y)
    );
    let _ = write!(
        out,
        r#"<text class="legend-title normal" x="{}" y="{}" text-anchor="end">{}</text>"#,
        fmt(legend.title_x),
        fmt(legend.title_y),
        escape_xml(&legend.title)
    );
    for s in &legend.swatches {
        let _ = write!(
            out,
            r#"<g class="legend"><rect x="{}" y="{}" width="{}" height="{}" fill="{}"/><text class="normal" x="{}" y="{}">{}</text></g>"#,
            fmt(s.x),
            fmt(s.y),
            fmt(s.width),
            fmt(s.height),
            escape_attr(&s.fill),
            fmt(s.label_x),
            fmt(s.label_y),
            escape_xml(&s.label)
        );
    }
    out.push_str("</g>");
}

/// Shortest round-trip decimal, with float noise below 1/1000 px dropped.
fn fmt(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let mut v = (v * 1000.0).round() / 1000.0;
    if v == 0.0 {
        v = 0.0;
    }
    let mut buf = ryu_js::Buffer::new();
    buf.format_finite(v).to_string()
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn escape_attr(text: &str) -> String {
    escape_xml(text)
}
