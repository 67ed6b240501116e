use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use dendromap::render::{
    DendroHeatmapConfig, DendroHeatmapOptions, LayoutOptions, RenderOptions, SvgRenderOptions,
    layout_parsed, render_dendro_heatmap_svg, sanitize_svg_id,
};
use dendromap_core::{ParseOptions, parse_input_sync};
use std::fmt::Write as _;

/// Caterpillar-shaped Newick tree over `prefix0..prefixN`.
fn ladder_newick(prefix: &str, n: usize) -> String {
    let mut out = format!("{prefix}0:1");
    for i in 1..n {
        out = format!("({out},{prefix}{i}:{}):0.5", i + 1);
    }
    out.push(';');
    out
}

fn input_json(columns: usize, rows: usize) -> String {
    let mut cells = String::new();
    for r in 0..rows {
        for c in 0..columns {
            if !cells.is_empty() {
                cells.push(',');
            }
            let original = ((r * 31 + c * 17) % 500) as f64 / 3.0;
            let _ = write!(
                &mut cells,
                r#"{{"x":"T{c}","y":"G{r}","value":{},"originalValue":{original}}}"#,
                (original + 1.0).log10()
            );
        }
    }
    format!(
        r#"{{"columnTree":"{}","rowTree":"{}","heatmap":[{cells}]}}"#,
        ladder_newick("T", columns),
        ladder_newick("G", rows)
    )
}

fn fixtures() -> Vec<(&'static str, String)> {
    vec![
        ("small_6x5", input_json(6, 5)),
        ("gtex_54x50", input_json(54, 50)),
        ("wide_54x200", input_json(54, 200)),
    ]
}

fn bench_parse_only_sync(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse_only_sync");
    for (name, input) in fixtures() {
        group.bench_function(name, |b| {
            b.iter(|| {
                let _ = parse_input_sync(&input, ParseOptions::strict()).unwrap();
            });
        });
    }
    group.finish();
}

fn bench_layout_only_sync(c: &mut Criterion) {
    let layout = LayoutOptions::default();

    let mut group = c.benchmark_group("layout_only_sync");
    for (name, input) in fixtures() {
        let parsed = parse_input_sync(&input, ParseOptions::strict()).unwrap();
        group.bench_function(name, |b| {
            b.iter(|| {
                let _ = layout_parsed(
                    &parsed,
                    DendroHeatmapOptions::default(),
                    DendroHeatmapConfig::default(),
                    RenderOptions::default(),
                    &layout,
                )
                .unwrap();
            });
        });
    }
    group.finish();
}

fn bench_render_svg_sync(c: &mut Criterion) {
    let layout = LayoutOptions::default();

    let mut group = c.benchmark_group("render_svg_sync");
    for (name, input) in fixtures() {
        let diagram_id = sanitize_svg_id(name);
        group.bench_function(name, |b| {
            b.iter_batched(
                || input.as_str(),
                |text| {
                    let parsed = parse_input_sync(text, ParseOptions::strict()).unwrap();
                    let diagram = layout_parsed(
                        &parsed,
                        DendroHeatmapOptions::default(),
                        DendroHeatmapConfig::default(),
                        RenderOptions::default(),
                        &layout,
                    )
                    .unwrap();
                    let svg_opts = SvgRenderOptions {
                        diagram_id: Some(diagram_id.clone()),
                        ..SvgRenderOptions::default()
                    };
                    let _svg = render_dendro_heatmap_svg(&diagram, &svg_opts).unwrap();
                },
                BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_parse_only_sync,
    bench_layout_only_sync,
    bench_render_svg_sync
);
criterion_main!(benches);
