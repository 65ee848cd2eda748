use crate::export::{Artifact, ExportError, PNG_FILENAME};
use selkie_render::rewrite::foreign_object_labels_to_text;
use selkie_render::surface::{NaturalSize, Surface, parse_svg_natural_size};

#[derive(Debug, Clone, thiserror::Error)]
pub enum RasterError {
    #[error("failed to parse SVG")]
    SvgParse,
    #[error("failed to allocate pixmap for raster rendering")]
    PixmapAlloc,
    #[error("failed to encode PNG")]
    PngEncode,
}

/// Raster export geometry: padding in document units around the content, then a uniform scale.
#[derive(Debug, Clone)]
pub struct RasterOptions {
    pub scale: f32,
    pub padding: f32,
    pub background: Option<String>,
}

impl Default for RasterOptions {
    fn default() -> Self {
        // 3x for high-density output; raster formats default to transparent, which is undesirable
        // here, so the background is opaque white.
        Self {
            scale: 3.0,
            padding: 20.0,
            background: Some("white".to_string()),
        }
    }
}

/// Rasterizes the currently mounted vector document into a `diagram.png` artifact.
pub fn export_png_sync(surface: &Surface, options: &RasterOptions) -> Result<Artifact, ExportError> {
    let Some(svg) = surface.svg() else {
        return Err(ExportError::NothingToExport);
    };
    let bytes = svg_to_png(svg, options)?;
    Ok(Artifact::new(PNG_FILENAME, "image/png", bytes))
}

pub async fn export_png(surface: &Surface, options: &RasterOptions) -> Result<Artifact, ExportError> {
    export_png_sync(surface, options)
}

pub fn svg_to_png(svg: &str, options: &RasterOptions) -> Result<Vec<u8>, RasterError> {
    let pixmap = svg_to_pixmap(svg, options)?;
    pixmap.encode_png().map_err(|_| RasterError::PngEncode)
}

/// The allocated pixel-buffer dimensions: `(dimension + 2 * padding) * scale` per axis.
pub fn raster_pixmap_size(size: NaturalSize, options: &RasterOptions) -> (u32, u32) {
    let width = ((size.width as f32 + options.padding * 2.0) * options.scale)
        .ceil()
        .max(1.0) as u32;
    let height = ((size.height as f32 + options.padding * 2.0) * options.scale)
        .ceil()
        .max(1.0) as u32;
    (width, height)
}

fn svg_to_pixmap(svg: &str, options: &RasterOptions) -> Result<tiny_skia::Pixmap, RasterError> {
    // The rasterizer cannot draw rich-text label nodes, and rendered documents carry no text
    // styling of their own once labels are rewritten, so a default text style rule goes in first.
    let prepared =
        foreign_object_labels_to_text(&inject_text_style(&strip_percentage_dimensions(svg)));

    let size = parse_svg_natural_size(&prepared).unwrap_or(NaturalSize {
        width: 800.0,
        height: 600.0,
    });
    let (width_px, height_px) = raster_pixmap_size(size, options);

    let mut opt = usvg::Options::default();
    // Keep output stable-ish across environments while still using system fonts.
    opt.fontdb_mut().load_system_fonts();
    opt.font_family = "Arial".to_string();

    let tree = usvg::Tree::from_str(&prepared, &opt).map_err(|_| RasterError::SvgParse)?;

    let mut pixmap =
        tiny_skia::Pixmap::new(width_px, height_px).ok_or(RasterError::PixmapAlloc)?;

    if let Some(bg) = options.background.as_deref() {
        if let Some(color) = parse_tiny_skia_color(bg) {
            pixmap.fill(color);
        }
    }

    // Uniform scale, content shifted inward by the scaled padding on both axes.
    let transform = tiny_skia::Transform::from_row(
        options.scale,
        0.0,
        0.0,
        options.scale,
        options.padding * options.scale,
        options.padding * options.scale,
    );
    resvg::render(&tree, transform, &mut pixmap.as_mut());
    Ok(pixmap)
}

/// Inserts a default text style rule immediately after the opening `<svg ...>` tag.
fn inject_text_style(svg: &str) -> String {
    const STYLE_TAG: &str =
        "<style>text { font-family: Arial, sans-serif; font-size: 16px; fill: #222; }</style>";
    let Some(open_start) = svg.find("<svg") else {
        return svg.to_string();
    };
    let Some(open_len) = svg[open_start..].find('>') else {
        return svg.to_string();
    };
    let insert_at = open_start + open_len + 1;
    let mut out = String::with_capacity(svg.len() + STYLE_TAG.len());
    out.push_str(&svg[..insert_at]);
    out.push_str(STYLE_TAG);
    out.push_str(&svg[insert_at..]);
    out
}

/// Drops percentage `width`/`height` from the root tag.
///
/// Mounted documents are made responsive (`width="100%"`); the rasterizer must size the viewport
/// from the viewBox instead.
fn strip_percentage_dimensions(svg: &str) -> String {
    let Some(open_start) = svg.find("<svg") else {
        return svg.to_string();
    };
    let Some(open_len) = svg[open_start..].find('>') else {
        return svg.to_string();
    };
    let open_end = open_start + open_len;

    let mut tag = svg[open_start..open_end].to_string();
    for name in ["width", "height"] {
        let needle = format!("{name}=\"");
        let Some(i) = tag.find(&needle) else {
            continue;
        };
        let value_start = i + needle.len();
        let Some(value_len) = tag[value_start..].find('"') else {
            continue;
        };
        if !tag[value_start..value_start + value_len].ends_with('%') {
            continue;
        }
        let mut start = i;
        if tag[..start].ends_with(' ') {
            start -= 1;
        }
        tag.replace_range(start..value_start + value_len + 1, "");
    }

    format!("{}{}{}", &svg[..open_start], tag, &svg[open_end..])
}

fn parse_tiny_skia_color(text: &str) -> Option<tiny_skia::Color> {
    let s = text.trim().to_ascii_lowercase();
    match s.as_str() {
        "transparent" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 0)),
        "white" => return Some(tiny_skia::Color::from_rgba8(255, 255, 255, 255)),
        "black" => return Some(tiny_skia::Color::from_rgba8(0, 0, 0, 255)),
        _ => {}
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixmap_size_adds_padding_then_scales() {
        let options = RasterOptions::default();
        let size = NaturalSize {
            width: 400.0,
            height: 300.0,
        };
        assert_eq!(raster_pixmap_size(size, &options), (1320, 1020));
    }

    #[test]
    fn viewbox_drives_the_pixmap_size() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 400 300"><rect width="400" height="300" fill="black"/></svg>"#;
        let pixmap = svg_to_pixmap(svg, &RasterOptions::default()).unwrap();
        assert_eq!((pixmap.width(), pixmap.height()), (1320, 1020));
    }

    #[test]
    fn missing_dimensions_default_to_800_by_600() {
        let options = RasterOptions::default();
        let size = NaturalSize {
            width: 800.0,
            height: 600.0,
        };
        assert_eq!(raster_pixmap_size(size, &options), (2520, 1920));
    }

    #[test]
    fn svg_to_png_produces_png_signature() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><rect width="10" height="10" fill="black"/></svg>"#;
        let bytes = svg_to_png(svg, &RasterOptions::default()).unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
    }

    #[test]
    fn white_background_is_painted() {
        let svg =
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 4 4"><rect width="1" height="1" fill="none"/></svg>"#;
        let pixmap = svg_to_pixmap(svg, &RasterOptions::default()).unwrap();
        let px = pixmap.pixel(0, 0).unwrap();
        assert_eq!((px.red(), px.green(), px.blue(), px.alpha()), (255, 255, 255, 255));
    }

    #[test]
    fn style_rule_lands_right_after_the_opening_tag() {
        let svg = r#"<svg viewBox="0 0 10 10"><rect/></svg>"#;
        let out = inject_text_style(svg);
        assert!(out.starts_with(r#"<svg viewBox="0 0 10 10"><style>text {"#));
    }

    #[test]
    fn responsive_root_sizing_is_dropped_for_rasterization() {
        let svg = r#"<svg width="100%" height="100%" viewBox="0 0 400 300"><rect/></svg>"#;
        let out = strip_percentage_dimensions(svg);
        assert_eq!(out, r#"<svg viewBox="0 0 400 300"><rect/></svg>"#);

        let svg = r#"<svg width="450" height="300"><rect/></svg>"#;
        assert_eq!(strip_percentage_dimensions(svg), svg);
    }

    #[test]
    fn parse_tiny_skia_color_handles_named_and_hex() {
        assert!(parse_tiny_skia_color("white").is_some());
        assert!(parse_tiny_skia_color("#ffffff").is_some());
        assert!(parse_tiny_skia_color("#fff").is_some());
        assert!(parse_tiny_skia_color("nope").is_none());
    }
}
