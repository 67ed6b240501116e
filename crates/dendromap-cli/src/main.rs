use dendromap::ParseOptions;
use dendromap::render::raster::{self, RasterOptions};
use dendromap::render::{
    DendroHeatmapConfig, HeadlessError, HeadlessRenderer, LegendPosition, RenderOptions,
};
use dendromap_render::colors::PALETTE_NAMES;
use futures::executor::block_on;
use serde::Serialize;
use std::io::{Read, Write};
use std::str::FromStr;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Headless(HeadlessError),
    Raster(raster::RasterError),
    Json(serde_json::Error),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Headless(err) => write!(f, "{err}"),
            CliError::Raster(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<HeadlessError> for CliError {
    fn from(value: HeadlessError) -> Self {
        Self::Headless(value)
    }
}

impl From<dendromap::Error> for CliError {
    fn from(value: dendromap::Error) -> Self {
        Self::Headless(value.into())
    }
}

impl From<raster::RasterError> for CliError {
    fn from(value: raster::RasterError) -> Self {
        Self::Raster(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Parse,
    Layout,
    Render,
    Palettes,
}

#[derive(Debug, Clone, Copy, Default)]
enum RenderFormat {
    #[default]
    Svg,
    Png,
    Jpeg,
    Pdf,
}

impl RenderFormat {
    fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Pdf => "pdf",
        }
    }
}

impl FromStr for RenderFormat {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "svg" => Ok(Self::Svg),
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "pdf" => Ok(Self::Pdf),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    lenient: bool,
    color_scheme: Option<String>,
    linear: bool,
    hide_top_tree: bool,
    hide_left_tree: bool,
    legend: LegendPosition,
    config: Option<String>,
    static_svg: bool,
    render_format: RenderFormat,
    render_scale: f32,
    background: Option<String>,
    diagram_id: Option<String>,
    out: Option<String>,
}

fn usage() -> &'static str {
    "dendromap-cli\n\
\n\
USAGE:\n\
  dendromap-cli [parse] [--pretty] [--lenient] [<path>|-]\n\
  dendromap-cli layout [--pretty] [CHART OPTIONS] [<path>|-]\n\
  dendromap-cli render [--format svg|png|jpg|pdf] [--scale <n>] [--background <css-color>] [--id <chart-id>] [--static] [--out <path>] [CHART OPTIONS] [<path>|-]\n\
  dendromap-cli palettes\n\
\n\
CHART OPTIONS:\n\
  --color-scheme <name>   one of `dendromap-cli palettes` (default YlGnBu)\n\
  --linear                values are not log-transformed\n\
  --no-top-tree           hide the column dendrogram\n\
  --no-left-tree          hide the row dendrogram\n\
  --legend top|bottom     legend position (default bottom)\n\
  --config <path>         JSON chart config (id, width, margin, cell, ...)\n\
  --lenient               drop duplicate cells and keep partial trees instead of failing\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin.\n\
  - Input is JSON: {\"columnTree\": <newick>, \"rowTree\": <newick>, \"heatmap\": [cells]}.\n\
  - render prints SVG to stdout by default; use --out to write a file.\n\
  - PNG/JPG/PDF output defaults to writing next to the input file (or ./out.<ext> for stdin).\n\
"
}

fn next_value<'a>(it: &mut impl Iterator<Item = &'a String>) -> Result<&'a String, CliError> {
    it.next().ok_or(CliError::Usage(usage()))
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args {
        render_scale: 1.0,
        ..Default::default()
    };

    let mut it = argv.iter().skip(1);
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "parse" => args.command = Command::Parse,
            "layout" => args.command = Command::Layout,
            "render" => args.command = Command::Render,
            "palettes" => args.command = Command::Palettes,
            "--pretty" => args.pretty = true,
            "--lenient" => args.lenient = true,
            "--linear" => args.linear = true,
            "--no-top-tree" => args.hide_top_tree = true,
            "--no-left-tree" => args.hide_left_tree = true,
            "--static" => args.static_svg = true,
            "--color-scheme" => args.color_scheme = Some(next_value(&mut it)?.clone()),
            "--legend" => {
                args.legend = next_value(&mut it)?
                    .parse::<LegendPosition>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--config" => args.config = Some(next_value(&mut it)?.clone()),
            "--format" => {
                args.render_format = next_value(&mut it)?
                    .parse::<RenderFormat>()
                    .map_err(|_| CliError::Usage(usage()))?;
            }
            "--scale" => {
                args.render_scale = next_value(&mut it)?
                    .parse::<f32>()
                    .map_err(|_| CliError::Usage(usage()))?;
                if !(args.render_scale.is_finite() && args.render_scale > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
            }
            "--background" => {
                let bg = next_value(&mut it)?;
                if !bg.trim().is_empty() {
                    args.background = Some(bg.trim().to_string());
                }
            }
            "--id" => args.diagram_id = Some(next_value(&mut it)?.clone()),
            "--out" => args.out = Some(next_value(&mut it)?.clone()),
            "--" => {
                if let Some(rest) = it.next() {
                    if args.input.is_some() {
                        return Err(CliError::Usage(usage()));
                    }
                    args.input = Some(rest.clone());
                }
                if it.next().is_some() {
                    return Err(CliError::Usage(usage()));
                }
            }
            "-" if args.input.is_none() => args.input = Some("-".to_string()),
            other if other.starts_with('-') => return Err(CliError::Usage(usage())),
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn write_json(value: &impl Serialize, pretty: bool) -> Result<(), CliError> {
    let mut stdout = std::io::stdout().lock();
    if pretty {
        serde_json::to_writer_pretty(&mut stdout, value)?;
    } else {
        serde_json::to_writer(&mut stdout, value)?;
    }
    writeln!(stdout)?;
    Ok(())
}

fn write_bytes(bytes: &[u8], out: &str) -> Result<(), CliError> {
    if out == "-" {
        std::io::stdout().lock().write_all(bytes)?;
    } else {
        std::fs::write(out, bytes)?;
    }
    Ok(())
}

fn default_raster_out_path(input: Option<&str>, ext: &str) -> std::path::PathBuf {
    match input {
        Some(path) if path != "-" => std::path::PathBuf::from(path).with_extension(ext),
        _ => std::path::PathBuf::from(format!("out.{ext}")),
    }
}

fn build_renderer(args: &Args) -> Result<HeadlessRenderer, CliError> {
    let config = match args.config.as_deref() {
        Some(path) => serde_json::from_str::<DendroHeatmapConfig>(&std::fs::read_to_string(path)?)?,
        None => DendroHeatmapConfig::default(),
    };

    let mut renderer = HeadlessRenderer::new().with_config(config);
    if args.lenient {
        renderer = renderer.lenient();
    }
    if let Some(name) = &args.color_scheme {
        renderer = renderer.with_color_scheme(name.clone());
    }
    renderer.chart.use_log = !args.linear;
    renderer.render = RenderOptions {
        show_top_tree: !args.hide_top_tree,
        show_left_tree: !args.hide_left_tree,
        legend_position: args.legend,
    };
    renderer.svg.animate = !args.static_svg;
    Ok(renderer)
}

fn run(args: Args) -> Result<(), CliError> {
    if let Command::Palettes = args.command {
        let mut stdout = std::io::stdout().lock();
        for name in PALETTE_NAMES {
            writeln!(stdout, "{name}")?;
        }
        return Ok(());
    }

    let text = read_input(args.input.as_deref())?;
    let renderer = build_renderer(&args)?;
    let parse_options = if args.lenient {
        ParseOptions::lenient()
    } else {
        ParseOptions::strict()
    };

    match args.command {
        Command::Palettes => Ok(()),
        Command::Parse => {
            let parsed = block_on(dendromap::parse_input(&text, parse_options))?;
            write_json(&parsed, args.pretty)
        }
        Command::Layout => {
            let layout = renderer.layout_sync(&text)?;
            write_json(&layout, args.pretty)
        }
        Command::Render => {
            let svg = match args.diagram_id.as_deref() {
                Some(id) => renderer.render_svg_sync_with_diagram_id(&text, id)?,
                None => block_on(renderer.render_svg(&text))?,
            };

            let raster_options = RasterOptions {
                scale: args.render_scale,
                background: args.background.clone(),
                ..RasterOptions::default()
            };
            let bytes = match args.render_format {
                RenderFormat::Svg => {
                    match args.out.as_deref() {
                        None => print!("{svg}"),
                        Some(path) => write_bytes(svg.as_bytes(), path)?,
                    }
                    return Ok(());
                }
                RenderFormat::Png => raster::svg_to_png(&svg, &raster_options)?,
                RenderFormat::Jpeg => raster::svg_to_jpeg(&svg, &raster_options)?,
                RenderFormat::Pdf => raster::svg_to_pdf(&svg)?,
            };

            let out = args.out.clone().unwrap_or_else(|| {
                default_raster_out_path(args.input.as_deref(), args.render_format.extension())
                    .to_string_lossy()
                    .to_string()
            });
            write_bytes(&bytes, &out)
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    if let Err(err) = run(args) {
        eprintln!("{err}");
        std::process::exit(1);
    }
}
