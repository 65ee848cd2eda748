//! Export emitters: vector file, raster image and structured JSON.
//!
//! All three emitters package their bytes into an [`Artifact`], the one shared
//! "package and deliver" primitive. They are independent and fail-safe: a failed export leaves
//! the mounted document and source text untouched for a retry with another format.

use selkie_core::strip_markdown_fences;
use selkie_render::surface::Surface;
use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

#[cfg(feature = "raster")]
pub mod raster;

#[cfg(feature = "raster")]
pub use raster::{RasterOptions, export_png, export_png_sync};

pub const SVG_FILENAME: &str = "diagram.svg";
pub const PNG_FILENAME: &str = "diagram.png";
pub const JSON_FILENAME: &str = "diagram.json";

const SVG_NAMESPACE: &str = "http://www.w3.org/2000/svg";

/// A finished export: bytes plus the delivery metadata every emitter needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub media_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Artifact {
    pub fn new(filename: impl Into<String>, media_type: &'static str, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            media_type,
            bytes,
        }
    }

    /// Writes the artifact under its own filename and returns the written path.
    pub fn write_to_dir(&self, dir: &Path) -> io::Result<PathBuf> {
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        Ok(path)
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("nothing to export: no rendered diagram is mounted")]
    NothingToExport,

    #[error("failed to serialize diagram code: {0}")]
    Json(#[from] serde_json::Error),

    /// Rasterization failed; the vector export path is unaffected and should be offered instead.
    #[cfg(feature = "raster")]
    #[error("failed to render the diagram for PNG export ({source}); use the SVG export instead")]
    Rasterization {
        #[from]
        source: raster::RasterError,
    },
}

/// Serializes the currently mounted vector document as a `diagram.svg` artifact.
///
/// Reads the live surface, not a cached render result. The output always declares the SVG
/// namespace on the root tag.
pub fn export_svg(surface: &Surface) -> Result<Artifact> {
    let Some(svg) = surface.svg() else {
        return Err(ExportError::NothingToExport);
    };
    let svg = ensure_svg_namespace(svg);
    Ok(Artifact::new(
        SVG_FILENAME,
        "image/svg+xml;charset=utf-8",
        svg.into_bytes(),
    ))
}

#[derive(Serialize)]
struct StructuredExport<'a> {
    #[serde(rename = "diagramCode")]
    diagram_code: &'a str,
}

/// Packages the fence-stripped source text as indented JSON.
///
/// Depends only on the source text, not on any rendered document.
pub fn export_json(source: &str) -> Result<Artifact> {
    let stripped = strip_markdown_fences(source);
    let json = serde_json::to_string_pretty(&StructuredExport {
        diagram_code: &stripped,
    })?;
    Ok(Artifact::new(
        JSON_FILENAME,
        "application/json;charset=utf-8",
        json.into_bytes(),
    ))
}

fn ensure_svg_namespace(svg: &str) -> String {
    let Some(open_start) = svg.find("<svg") else {
        return svg.to_string();
    };
    let Some(open_len) = svg[open_start..].find('>') else {
        return svg.to_string();
    };
    if svg[open_start..open_start + open_len].contains("xmlns=") {
        return svg.to_string();
    }

    let insert_at = open_start + 4;
    let mut out = String::with_capacity(svg.len() + SVG_NAMESPACE.len() + 10);
    out.push_str(&svg[..insert_at]);
    out.push_str(&format!(" xmlns=\"{SVG_NAMESPACE}\""));
    out.push_str(&svg[insert_at..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use selkie_render::surface::Surface;

    #[test]
    fn svg_export_requires_a_mounted_document() {
        let surface = Surface::new("view", 800.0, 600.0);
        assert!(matches!(
            export_svg(&surface),
            Err(ExportError::NothingToExport)
        ));
    }

    #[test]
    fn svg_export_adds_the_namespace_when_missing() {
        let mut surface = Surface::new("view", 800.0, 600.0);
        surface.set_diagram(r#"<svg viewBox="0 0 10 10"><rect/></svg>"#);
        let artifact = export_svg(&surface).unwrap();
        assert_eq!(artifact.filename, "diagram.svg");
        let text = String::from_utf8(artifact.bytes).unwrap();
        assert!(text.starts_with(r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox"#));
    }

    #[test]
    fn svg_export_keeps_an_existing_namespace() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"/>"#;
        let mut surface = Surface::new("view", 800.0, 600.0);
        surface.set_diagram(svg);
        let artifact = export_svg(&surface).unwrap();
        assert_eq!(artifact.bytes, svg.as_bytes());
    }

    #[test]
    fn json_export_strips_fences_and_indents_two_spaces() {
        let artifact = export_json("  flowchart TD\nA-->B  ").unwrap();
        assert_eq!(artifact.filename, "diagram.json");
        let text = String::from_utf8(artifact.bytes).unwrap();
        assert_eq!(text, "{\n  \"diagramCode\": \"flowchart TD\\nA-->B\"\n}");
    }

    #[test]
    fn json_export_strips_a_whole_fence_block() {
        let artifact = export_json("```mermaid\npie\n  title T\n```").unwrap();
        let text = String::from_utf8(artifact.bytes).unwrap();
        assert!(text.contains("\"diagramCode\": \"pie\\n  title T\""));
        assert!(!text.contains("```"));
    }
}
