use crate::engine::{DiagramEngine, EngineConfig, RenderedDiagram};
use crate::error::{Error, Result};
use crate::surface::{NaturalSize, SurfaceHost, diagnostic_panel, parse_svg_natural_size};
use selkie_core::{DialectRegistry, NormalizeResult, normalize, strip_markdown_fences};
use std::sync::atomic::{AtomicU64, Ordering};

/// Orchestrates the engine: normalization, surface attachment, fit scaling and failure display.
///
/// Renders are not protected against overlap; callers are expected to serialize or debounce calls
/// into the same surface. With `&mut SurfaceHost` threading that discipline is enforced by the
/// borrow checker in-process.
pub struct RenderAdapter<E> {
    engine: E,
    config: EngineConfig,
    dialects: DialectRegistry,
    render_seq: AtomicU64,
}

impl<E: DiagramEngine> RenderAdapter<E> {
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, EngineConfig::default())
    }

    pub fn with_config(engine: E, config: EngineConfig) -> Self {
        Self {
            engine,
            config,
            dialects: DialectRegistry::default_dialects(),
            render_seq: AtomicU64::new(0),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// Renders raw diagram text into the named surface.
    ///
    /// Returns the engine's serialized vector document on success, `Ok(None)` when there is
    /// nothing to render (unknown surface, empty source) or when the engine failed and an
    /// in-place diagnostic was attached instead. Normalization failures are raised: an
    /// unrenderable diagram is a user-visible failure.
    pub fn render_into_sync(
        &self,
        host: &mut SurfaceHost,
        surface_id: &str,
        raw: &str,
    ) -> Result<Option<String>> {
        let Some(surface) = host.surface_mut(surface_id) else {
            if !raw.trim().is_empty() {
                tracing::warn!(surface_id, "render surface not found, cannot render diagram");
            }
            return Ok(None);
        };

        let stripped = strip_markdown_fences(raw);
        if stripped.is_empty() {
            surface.clear();
            return Ok(None);
        }

        let NormalizeResult { code, error } = normalize(&stripped, &self.dialects);
        if let Some(message) = error {
            return Err(Error::Transform { message });
        }

        let render_id = self.next_render_id(surface_id);
        match self.engine.render_sync(&render_id, &code, &self.config) {
            Ok(RenderedDiagram { svg, bind }) => {
                let natural = parse_svg_natural_size(&svg);
                surface.set_diagram(make_responsive(&svg));
                if let Some(natural) = natural {
                    if let Some(scale) = fit_scale(
                        surface.container_width(),
                        surface.container_height(),
                        natural,
                    ) {
                        surface.set_scale(scale);
                    }
                }
                if let Some(bind) = bind {
                    bind(surface);
                }
                Ok(Some(svg))
            }
            Err(err) => {
                tracing::error!(error = %err, "diagram rendering failed");
                tracing::error!(code = %code, "problematic code passed to the rendering engine");
                surface.set_diagnostic(diagnostic_panel(&err.message, &code));
                Ok(None)
            }
        }
    }

    pub async fn render_into(
        &self,
        host: &mut SurfaceHost,
        surface_id: &str,
        raw: &str,
    ) -> Result<Option<String>> {
        self.render_into_sync(host, surface_id, raw)
    }

    fn next_render_id(&self, surface_id: &str) -> String {
        let seq = self.render_seq.fetch_add(1, Ordering::Relaxed);
        format!("{}-svg-{seq}", sanitize_render_id(surface_id))
    }
}

/// Converts an arbitrary mount-point id into a conservative id token for the render call.
///
/// Engines embed the render id as the root `<svg id="...">` and as a prefix for internal ids
/// (markers, titles). Inlining multiple documents with colliding ids corrupts those references,
/// so unsupported characters are replaced and a letter prefix is guaranteed.
pub fn sanitize_render_id(raw: &str) -> String {
    let raw = raw.trim();
    if raw.is_empty() {
        return "s-untitled".to_string();
    }

    let mut out = String::with_capacity(raw.len() + 4);
    for ch in raw.chars() {
        let ok = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' || ch == ':' || ch == '.';
        out.push(if ok { ch } else { '-' });
    }

    let starts_ok = out.chars().next().is_some_and(|c| c.is_ascii_alphabetic());
    if !starts_ok {
        out.insert_str(0, "s-");
    }

    while out.contains("--") {
        out = out.replace("--", "-");
    }
    let out = out.trim_matches('-');
    if out.is_empty() || out == "s" {
        return "s-untitled".to_string();
    }
    out.to_string()
}

/// Shrink-only fit: the ratio of the container box to the document's natural box, capped at 1.
fn fit_scale(container_width: f64, container_height: f64, natural: NaturalSize) -> Option<f64> {
    let scale = (container_width / natural.width).min(container_height / natural.height);
    if scale.is_finite() && scale < 1.0 {
        Some(scale)
    } else {
        None
    }
}

/// Rewrites the root tag so the document fills its container and keeps its aspect ratio.
fn make_responsive(svg: &str) -> String {
    let svg = set_svg_root_attribute(svg, "width", "100%");
    let svg = set_svg_root_attribute(&svg, "height", "100%");
    let svg = set_svg_root_attribute(&svg, "style", "max-height: 100%;");
    set_svg_root_attribute(&svg, "preserveAspectRatio", "xMidYMid meet")
}

/// Sets (or replaces) one attribute on the root `<svg>` opening tag.
fn set_svg_root_attribute(svg: &str, name: &str, value: &str) -> String {
    let Some(open_start) = svg.find("<svg") else {
        return svg.to_string();
    };
    let Some(open_len) = svg[open_start..].find('>') else {
        return svg.to_string();
    };
    let open_end = open_start + open_len;
    let open_tag = &svg[open_start..open_end];

    let needle = format!("{name}=\"");
    let mut out = String::with_capacity(svg.len() + name.len() + value.len() + 4);
    if let Some(attr_rel) = open_tag.find(&needle) {
        let value_start = open_start + attr_rel + needle.len();
        let Some(value_len) = svg[value_start..].find('"') else {
            return svg.to_string();
        };
        out.push_str(&svg[..value_start]);
        out.push_str(value);
        out.push_str(&svg[value_start + value_len..]);
    } else {
        let insert_at = open_start + 4;
        out.push_str(&svg[..insert_at]);
        out.push_str(&format!(" {name}=\"{value}\""));
        out.push_str(&svg[insert_at..]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_render_id_passes_clean_ids_through() {
        assert_eq!(sanitize_render_id("diagram-view"), "diagram-view");
    }

    #[test]
    fn sanitize_render_id_replaces_unsupported_characters() {
        assert_eq!(sanitize_render_id("my diagram #1"), "my-diagram-1");
    }

    #[test]
    fn sanitize_render_id_guarantees_letter_prefix() {
        assert_eq!(sanitize_render_id("1st"), "s-1st");
        assert_eq!(sanitize_render_id("  "), "s-untitled");
    }

    #[test]
    fn fit_scale_only_shrinks() {
        let natural = NaturalSize {
            width: 100.0,
            height: 100.0,
        };
        assert_eq!(fit_scale(50.0, 200.0, natural), Some(0.5));
        assert_eq!(fit_scale(200.0, 300.0, natural), None);
    }

    #[test]
    fn set_svg_root_attribute_replaces_existing_values() {
        let svg = r#"<svg width="450" viewBox="0 0 10 10"><rect/></svg>"#;
        let out = set_svg_root_attribute(svg, "width", "100%");
        assert!(out.contains(r#"width="100%""#));
        assert!(!out.contains(r#"width="450""#));
        assert!(out.contains(r#"viewBox="0 0 10 10""#));
    }

    #[test]
    fn set_svg_root_attribute_inserts_missing_attributes() {
        let svg = r#"<svg viewBox="0 0 10 10"/>"#;
        let out = set_svg_root_attribute(svg, "preserveAspectRatio", "xMidYMid meet");
        assert!(out.starts_with(r#"<svg preserveAspectRatio="xMidYMid meet""#));
    }
}
