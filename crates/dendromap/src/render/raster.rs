#![forbid(unsafe_code)]

use crate::render::HeadlessError;
use dendromap_render::colors::Color;

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error(transparent)]
    Headless(#[from] HeadlessError),
    #[error("failed to parse SVG")]
    SvgParse,
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
    #[error("invalid background color: {0}")]
    Background(String),
    #[error("JPG rendering requires an opaque background color (e.g. white)")]
    JpegOpaqueBackgroundRequired,
    #[error("failed to encode JPG")]
    JpegEncode,
    #[error("failed to convert SVG to PDF")]
    PdfConvert,
}

pub type Result<T> = std::result::Result<T, RasterError>;

#[derive(Debug, Clone)]
pub struct RasterOptions {
    pub scale: f32,
    pub background: Option<String>,
    pub jpeg_quality: u8,
}

impl Default for RasterOptions {
    fn default() -> Self {
        Self {
            scale: 1.0,
            background: None,
            jpeg_quality: 90,
        }
    }
}

pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let background = options
        .background
        .as_deref()
        .map(parse_background)
        .transpose()?;
    let pixmap = svg_to_pixmap(svg, options.scale, background)?;
    pixmap.encode_png().map_err(|_| RasterError::PngEncode)
}

pub fn svg_to_jpeg(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let color = parse_background(options.background.as_deref().unwrap_or("white"))?;
    if color.alpha() != 1.0 {
        return Err(RasterError::JpegOpaqueBackgroundRequired);
    }

    let pixmap = svg_to_pixmap(svg, options.scale, Some(color))?;
    let (w, h) = (pixmap.width(), pixmap.height());

    // Opaque fill underneath, so alpha is always 255.
    let mut rgb = Vec::with_capacity((w as usize) * (h as usize) * 3);
    for px in pixmap.data().chunks_exact(4) {
        rgb.extend_from_slice(&px[..3]);
    }

    let mut out = Vec::new();
    let mut enc =
        image::codecs::jpeg::JpegEncoder::new_with_quality(&mut out, options.jpeg_quality);
    enc.encode(&rgb, w, h, image::ExtendedColorType::Rgb8)
        .map_err(|_| RasterError::JpegEncode)?;
    Ok(out)
}

pub fn svg_to_pdf(svg: &str) -> Result<Vec<u8>> {
    let mut opt = svg2pdf::usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "Libre Franklin".to_string();

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opt).map_err(|_| RasterError::SvgParse)?;

    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|_| RasterError::PdfConvert)
}

/// Chart SVGs always carry `viewBox="0 0 w h"`, so the tree size is the raster size.
fn svg_to_pixmap(
    svg: &str,
    scale: f32,
    background: Option<tiny_skia::Color>,
) -> Result<tiny_skia::Pixmap> {
    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "Libre Franklin".to_string();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|_| RasterError::SvgParse)?;
    let size = tree.size();

    let width_px = (size.width() * scale).ceil().max(1.0) as u32;
    let height_px = (size.height() * scale).ceil().max(1.0) as u32;
    let mut pixmap = tiny_skia::Pixmap::new(width_px, height_px).ok_or(RasterError::PixmapAlloc)?;

    if let Some(color) = background {
        pixmap.fill(color);
    }

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap)
}

/// Accepts `transparent`, `white`, `black` and anything [`Color::parse`] understands.
fn parse_background(text: &str) -> Result<tiny_skia::Color> {
    let named = match text.trim().to_ascii_lowercase().as_str() {
        "transparent" => Some(tiny_skia::Color::from_rgba8(0, 0, 0, 0)),
        "white" => Some(tiny_skia::Color::WHITE),
        "black" => Some(tiny_skia::Color::BLACK),
        _ => None,
    };
    if let Some(color) = named {
        return Ok(color);
    }

    let rgb = Color::parse(text)
        .ok_or_else(|| RasterError::Background(text.to_string()))?
        .to_rgb();
    let c = |v: f64| v.round().clamp(0.0, 255.0) as u8;
    Ok(tiny_skia::Color::from_rgba8(c(rgb.r), c(rgb.g), c(rgb.b), 255))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SQUARE: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="10" height="10" viewBox="0 0 10 10"><rect width="10" height="10" fill="black"/></svg>"#;

    #[test]
    fn svg_to_png_produces_png_signature() {
        let bytes = svg_to_png(SQUARE, &RasterOptions::default()).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    }

    #[test]
    fn svg_to_jpeg_produces_jpeg_signature() {
        let bytes = svg_to_jpeg(SQUARE, &RasterOptions::default()).unwrap();
        assert!(bytes.starts_with(&[0xFF, 0xD8]));
    }

    #[test]
    fn jpeg_rejects_transparent_background() {
        let opts = RasterOptions {
            background: Some("transparent".to_string()),
            ..RasterOptions::default()
        };
        assert!(matches!(
            svg_to_jpeg(SQUARE, &opts),
            Err(RasterError::JpegOpaqueBackgroundRequired)
        ));
    }

    #[test]
    fn svg_to_pdf_produces_pdf_signature() {
        let bytes = svg_to_pdf(SQUARE).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn parses_backgrounds() {
        assert_eq!(parse_background("White").unwrap(), tiny_skia::Color::WHITE);
        let c = parse_background("#ff0000").unwrap();
        assert_eq!(c.red(), 1.0);
        assert_eq!(c.green(), 0.0);
        assert!(matches!(
            parse_background("nope"),
            Err(RasterError::Background(_))
        ));
    }
}
