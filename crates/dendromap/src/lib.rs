#![forbid(unsafe_code)]

//! `dendromap` is a headless dendro-heatmap (clustered heatmap) engine.
//!
//! Input is a JSON document with a column tree, a row tree (both Newick) and heatmap cells;
//! output is a positioned layout model, an SVG document or, with `raster`, PNG/JPG/PDF bytes.
//!
//! # Features
//!
//! - `render`: enable layout + SVG rendering (`dendromap::render`)
//! - `raster`: enable PNG/JPG/PDF output via pure-Rust SVG rasterization/conversion

pub use dendromap_core::*;

#[cfg(feature = "render")]
pub mod render {
    use dendromap_core::{ParseOptions, ParsedDendroHeatmap};

    pub use dendromap_render::config::{CellSize, Margin};
    pub use dendromap_render::interaction::{Interaction, LabelAxis, TreeSide};
    pub use dendromap_render::model::DendroHeatmapLayout;
    pub use dendromap_render::svg::{SvgRenderOptions, render_dendro_heatmap_svg};
    pub use dendromap_render::text::{DeterministicTextMeasurer, TextMeasurer};
    pub use dendromap_render::{
        DendroHeatmap, DendroHeatmapConfig, DendroHeatmapOptions, LayoutOptions, LegendPosition,
        RenderOptions, layout_parsed,
    };

    #[cfg(feature = "raster")]
    pub mod raster;

    #[derive(Debug, thiserror::Error)]
    pub enum HeadlessError {
        #[error(transparent)]
        Parse(#[from] dendromap_core::Error),
        #[error(transparent)]
        Render(#[from] dendromap_render::Error),
    }

    pub type Result<T> = std::result::Result<T, HeadlessError>;

    /// Converts an arbitrary string into a conservative SVG `id` token, so several charts can
    /// be inlined in one document without id collisions.
    ///
    /// Unsupported characters become `-`, and ids not starting with an ASCII letter get a
    /// `d-` prefix.
    pub fn sanitize_svg_id(raw: &str) -> String {
        let raw = raw.trim();
        if raw.is_empty() {
            return "d-untitled".to_string();
        }

        let mut out = String::with_capacity(raw.len() + 4);
        for ch in raw.chars() {
            let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_';
            out.push(if ok { ch } else { '-' });
        }

        let starts_ok = out.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
        if !starts_ok {
            out.insert_str(0, "d-");
        }

        while out.contains("--") {
            out = out.replace("--", "-");
        }
        let out = out.trim_matches('-');
        if out.is_empty() || out == "d" {
            return "d-untitled".to_string();
        }
        out.to_string()
    }

    /// Synchronous layout helper (executor-free).
    pub fn layout_sync(
        text: &str,
        parse_options: ParseOptions,
        chart_options: DendroHeatmapOptions,
        config: DendroHeatmapConfig,
        render_options: RenderOptions,
        layout_options: &LayoutOptions,
    ) -> Result<DendroHeatmapLayout> {
        let parsed = dendromap_core::parse_input_sync(text, parse_options)?;
        Ok(layout_parsed(
            &parsed,
            chart_options,
            config,
            render_options,
            layout_options,
        )?)
    }

    pub async fn layout(
        text: &str,
        parse_options: ParseOptions,
        chart_options: DendroHeatmapOptions,
        config: DendroHeatmapConfig,
        render_options: RenderOptions,
        layout_options: &LayoutOptions,
    ) -> Result<DendroHeatmapLayout> {
        layout_sync(
            text,
            parse_options,
            chart_options,
            config,
            render_options,
            layout_options,
        )
    }

    pub fn render_layout_svg(
        layout: &DendroHeatmapLayout,
        svg_options: &SvgRenderOptions,
    ) -> Result<String> {
        Ok(render_dendro_heatmap_svg(layout, svg_options)?)
    }

    /// Bundles the options of a headless pipeline: JSON text in, layout or SVG out.
    ///
    /// Runtime-agnostic: all work is CPU-bound and does not perform I/O.
    #[derive(Clone)]
    pub struct HeadlessRenderer {
        pub parse: ParseOptions,
        pub chart: DendroHeatmapOptions,
        pub config: DendroHeatmapConfig,
        pub render: RenderOptions,
        pub layout: LayoutOptions,
        pub svg: SvgRenderOptions,
    }

    impl Default for HeadlessRenderer {
        fn default() -> Self {
            Self {
                parse: ParseOptions::strict(),
                chart: DendroHeatmapOptions::default(),
                config: DendroHeatmapConfig::default(),
                render: RenderOptions::default(),
                layout: LayoutOptions::default(),
                svg: SvgRenderOptions::default(),
            }
        }
    }

    impl HeadlessRenderer {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_config(mut self, config: DendroHeatmapConfig) -> Self {
            self.config = config;
            self
        }

        pub fn with_color_scheme(mut self, name: impl Into<String>) -> Self {
            self.chart.color_scheme = name.into();
            self
        }

        pub fn lenient(mut self) -> Self {
            self.parse = ParseOptions::lenient();
            self.chart.parse = ParseOptions::lenient();
            self
        }

        pub fn parse_sync(&self, text: &str) -> Result<ParsedDendroHeatmap> {
            Ok(dendromap_core::parse_input_sync(text, self.parse)?)
        }

        pub fn layout_sync(&self, text: &str) -> Result<DendroHeatmapLayout> {
            layout_sync(
                text,
                self.parse,
                self.chart.clone(),
                self.config.clone(),
                self.render,
                &self.layout,
            )
        }

        pub fn render_svg_sync(&self, text: &str) -> Result<String> {
            let layout = self.layout_sync(text)?;
            render_layout_svg(&layout, &self.svg)
        }

        pub async fn render_svg(&self, text: &str) -> Result<String> {
            self.render_svg_sync(text)
        }

        pub fn render_svg_sync_with_diagram_id(
            &self,
            text: &str,
            diagram_id: &str,
        ) -> Result<String> {
            let layout = self.layout_sync(text)?;
            let mut svg = self.svg.clone();
            svg.diagram_id = Some(sanitize_svg_id(diagram_id));
            render_layout_svg(&layout, &svg)
        }

        #[cfg(feature = "raster")]
        pub fn render_png_sync(
            &self,
            text: &str,
            raster: &raster::RasterOptions,
        ) -> raster::Result<Vec<u8>> {
            raster::svg_to_png(&self.render_svg_sync(text)?, raster)
        }

        #[cfg(feature = "raster")]
        pub fn render_jpeg_sync(
            &self,
            text: &str,
            raster: &raster::RasterOptions,
        ) -> raster::Result<Vec<u8>> {
            raster::svg_to_jpeg(&self.render_svg_sync(text)?, raster)
        }

        #[cfg(feature = "raster")]
        pub fn render_pdf_sync(&self, text: &str) -> raster::Result<Vec<u8>> {
            raster::svg_to_pdf(&self.render_svg_sync(text)?)
        }
    }

}
