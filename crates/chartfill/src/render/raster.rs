#![forbid(unsafe_code)]

//! Raster and PDF output for rendered charts.

use chartfill_core::ChartDescriptor;
use chartfill_render::{RenderOptions, render_chart_svg};

#[derive(Debug, thiserror::Error)]
pub enum RasterError {
    #[error("failed to parse SVG")]
    SvgParse,
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
    #[error("invalid background color for JPG rendering")]
    JpegBackground,
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
    /// Raster scale factor; non-finite or non-positive values fall back to 1.0.
    pub scale: f32,
    /// Canvas fill behind the SVG: named, `#hex`, or `rgb()`/`rgba()`.
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

impl RasterOptions {
    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }
}

/// Renders a descriptor straight to PNG bytes.
pub fn render_chart_png(
    chart: &ChartDescriptor,
    render: &RenderOptions,
    raster: &RasterOptions,
) -> Result<Vec<u8>> {
    svg_to_png(&render_chart_svg(chart, render), raster)
}

/// Renders a descriptor straight to JPG bytes.
pub fn render_chart_jpeg(
    chart: &ChartDescriptor,
    render: &RenderOptions,
    raster: &RasterOptions,
) -> Result<Vec<u8>> {
    svg_to_jpeg(&render_chart_svg(chart, render), raster)
}

/// Renders a descriptor straight to a single-page PDF.
pub fn render_chart_pdf(chart: &ChartDescriptor, render: &RenderOptions) -> Result<Vec<u8>> {
    svg_to_pdf(&render_chart_svg(chart, render))
}

pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let pixmap = svg_to_pixmap(svg, options.scale, options.background.as_deref())?;
    pixmap.encode_png().map_err(|_| RasterError::PngEncode)
}

pub fn svg_to_jpeg(svg: &str, options: &RasterOptions) -> Result<Vec<u8>> {
    let bg = options.background.as_deref().unwrap_or("white");
    let Some(color) = parse_background_color(bg) else {
        return Err(RasterError::JpegBackground);
    };
    if color.alpha() != 1.0 {
        return Err(RasterError::JpegOpaqueBackgroundRequired);
    }

    let pixmap = svg_to_pixmap(svg, options.scale, Some(bg))?;
    let (w, h) = (pixmap.width(), pixmap.height());

    // tiny-skia renders into an RGBA8 buffer. The destination is opaque
    // (JPG always gets a solid background fill), so alpha is always 255
    // and can be dropped.
    let rgba = pixmap.data();
    let mut rgb = vec![0u8; (w as usize) * (h as usize) * 3];
    for (src, dst) in rgba.chunks_exact(4).zip(rgb.chunks_exact_mut(3)) {
        dst[0] = src[0];
        dst[1] = src[1];
        dst[2] = src[2];
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
    opt.font_family = "Arial".to_string();

    let tree = svg2pdf::usvg::Tree::from_str(svg, &opt).map_err(|_| RasterError::SvgParse)?;

    svg2pdf::to_pdf(
        &tree,
        svg2pdf::ConversionOptions::default(),
        svg2pdf::PageOptions::default(),
    )
    .map_err(|_| RasterError::PdfConvert)
}

fn svg_to_pixmap(svg: &str, scale: f32, background: Option<&str>) -> Result<tiny_skia::Pixmap> {
    let scale = if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    };

    let mut opt = usvg::Options::default();
    opt.fontdb_mut().load_system_fonts();
    // Chart SVGs declare a sans-serif stack; system font selection is
    // best-effort and only affects glyph shapes, not layout.
    opt.font_family = "Arial".to_string();

    let tree = usvg::Tree::from_str(svg, &opt).map_err(|_| RasterError::SvgParse)?;

    // Chart SVGs always carry root width/height plus a matching viewBox,
    // so the tree size is the full canvas.
    let size = tree.size();
    let width_px = (size.width() * scale).ceil().max(1.0) as u32;
    let height_px = (size.height() * scale).ceil().max(1.0) as u32;

    let mut pixmap = tiny_skia::Pixmap::new(width_px, height_px).ok_or(RasterError::PixmapAlloc)?;
    if let Some(bg) = background {
        if let Some(color) = parse_background_color(bg) {
            pixmap.fill(color);
        }
    }

    resvg::render(
        &tree,
        tiny_skia::Transform::from_scale(scale, scale),
        &mut pixmap.as_mut(),
    );
    Ok(pixmap)
}

fn parse_background_color(text: &str) -> Option<tiny_skia::Color> {
    let s = text.trim().to_ascii_lowercase();
    match s.as_str() {
        "transparent" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 0)),
        "white" => return Some(tiny_skia::Color::from_rgba8(255, 255, 255, 255)),
        "black" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 255)),
        _ => {}
    }

    if let Some(args) = s
        .strip_prefix("rgba(")
        .or_else(|| s.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
    {
        return parse_rgb_args(args);
    }

    let hex = s.strip_prefix('#')?;
    fn hex2(b: &[u8]) -> Option<u8> {
        let hi = (*b.first()? as char).to_digit(16)? as u8;
        let lo = (*b.get(1)? as char).to_digit(16)? as u8;
        Some((hi << 4) | lo)
    }
    fn hex1(c: u8) -> Option<u8> {
        let v = (c as char).to_digit(16)? as u8;
        Some((v << 4) | v)
    }

    let bytes = hex.as_bytes();
    match bytes.len() {
        3 => Some(tiny_skia::Color::from_rgba8(
            hex1(bytes[0])?,
            hex1(bytes[1])?,
            hex1(bytes[2])?,
            255,
        )),
        4 => Some(tiny_skia::Color::from_rgba8(
            hex1(bytes[0])?,
            hex1(bytes[1])?,
            hex1(bytes[2])?,
            hex1(bytes[3])?,
        )),
        6 => Some(tiny_skia::Color::from_rgba8(
            hex2(&bytes[0..2])?,
            hex2(&bytes[2..4])?,
            hex2(&bytes[4..6])?,
            255,
        )),
        8 => Some(tiny_skia::Color::from_rgba8(
            hex2(&bytes[0..2])?,
            hex2(&bytes[2..4])?,
            hex2(&bytes[4..6])?,
            hex2(&bytes[6..8])?,
        )),
        _ => None,
    }
}

// `r, g, b` as 0-255 integers, optional fourth component as a 0-1 alpha.
fn parse_rgb_args(args: &str) -> Option<tiny_skia::Color> {
    let parts: Vec<&str> = args.split(',').map(str::trim).collect();
    if parts.len() != 3 && parts.len() != 4 {
        return None;
    }
    let r = parts[0].parse::<u8>().ok()?;
    let g = parts[1].parse::<u8>().ok()?;
    let b = parts[2].parse::<u8>().ok()?;
    let a = match parts.get(3) {
        Some(raw) => {
            let a = raw.parse::<f32>().ok()?;
            if !(0.0..=1.0).contains(&a) {
                return None;
            }
            (a * 255.0).round() as u8
        }
        None => 255,
    };
    Some(tiny_skia::Color::from_rgba8(r, g, b, a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chartfill_core::{ChartKind, Dataset, normalize};

    fn sample_chart() -> ChartDescriptor {
        let mut chart = ChartDescriptor::new(ChartKind::Pie, "Share");
        chart.labels = vec!["a".to_string(), "b".to_string()];
        chart.datasets = vec![Dataset::new("Share", vec![3.0, 1.0])];
        normalize(&mut chart);
        chart
    }

    #[test]
    fn chart_png_has_png_signature_and_scales() {
        let chart = sample_chart();
        let bytes =
            render_chart_png(&chart, &RenderOptions::default(), &RasterOptions::default()).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));

        let doubled = render_chart_png(
            &chart,
            &RenderOptions::default(),
            &RasterOptions::default().with_scale(2.0),
        )
        .unwrap();
        assert!(doubled.len() > 8);
    }

    #[test]
    fn chart_jpeg_has_jfif_signature() {
        let bytes = render_chart_jpeg(
            &sample_chart(),
            &RenderOptions::default(),
            &RasterOptions::default(),
        )
        .unwrap();
        assert!(bytes.starts_with(&[0xFF, 0xD8]));
    }

    #[test]
    fn jpeg_rejects_translucent_backgrounds() {
        let err = svg_to_jpeg(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="4" viewBox="0 0 4 4"/>"#,
            &RasterOptions::default().with_background("#00000080"),
        )
        .unwrap_err();
        assert!(matches!(err, RasterError::JpegOpaqueBackgroundRequired));
    }

    #[test]
    fn chart_pdf_has_pdf_signature() {
        let bytes = render_chart_pdf(&sample_chart(), &RenderOptions::default()).unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn background_colors_parse_hex_named_and_functional_forms() {
        assert!(parse_background_color("white").is_some());
        assert!(parse_background_color("#fff").is_some());
        assert!(parse_background_color("#ffffff").is_some());
        assert_eq!(
            parse_background_color("#12345678").map(|c| c.alpha() < 1.0),
            Some(true)
        );
        assert_eq!(
            parse_background_color("rgb(255, 255, 255)"),
            parse_background_color("white")
        );
        assert_eq!(
            parse_background_color("rgba(0, 0, 0, 0.5)").map(|c| c.alpha() < 1.0),
            Some(true)
        );
        assert!(parse_background_color("rgb(300, 0, 0)").is_none());
        assert!(parse_background_color("not-a-color").is_none());
    }
}
