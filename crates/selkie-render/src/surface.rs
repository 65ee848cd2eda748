use rustc_hash::FxHashMap;

/// What a surface currently displays.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SurfaceContent {
    #[default]
    Empty,
    /// A rendered vector document. Replaced wholesale on every re-render.
    Diagram(String),
    /// Markup for the in-place render-failure panel.
    Diagnostic(String),
}

/// A mount point a rendered vector document is attached to.
///
/// The host UI owns the surface's container box; the adapter owns its content and fit scale.
#[derive(Debug)]
pub struct Surface {
    id: String,
    container_width: f64,
    container_height: f64,
    content: SurfaceContent,
    scale: Option<f64>,
    interactive: bool,
}

impl Surface {
    pub fn new(id: impl Into<String>, container_width: f64, container_height: f64) -> Self {
        Self {
            id: id.into(),
            container_width,
            container_height,
            content: SurfaceContent::Empty,
            scale: None,
            interactive: false,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn container_width(&self) -> f64 {
        self.container_width
    }

    pub fn container_height(&self) -> f64 {
        self.container_height
    }

    pub fn content(&self) -> &SurfaceContent {
        &self.content
    }

    /// The currently mounted vector document, if any.
    pub fn svg(&self) -> Option<&str> {
        match &self.content {
            SurfaceContent::Diagram(svg) => Some(svg),
            _ => None,
        }
    }

    /// Shrink-only fit scale applied on top of the document's own sizing.
    pub fn scale(&self) -> Option<f64> {
        self.scale
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Marks the surface as carrying bound interaction handlers. Intended for engine bind
    /// callbacks.
    pub fn mark_interactive(&mut self) {
        self.interactive = true;
    }

    /// Attaches a rendered vector document, replacing prior content and resetting fit state.
    pub fn set_diagram(&mut self, svg: impl Into<String>) {
        self.content = SurfaceContent::Diagram(svg.into());
        self.scale = None;
        self.interactive = false;
    }

    pub(crate) fn set_diagnostic(&mut self, panel: String) {
        self.content = SurfaceContent::Diagnostic(panel);
        self.scale = None;
        self.interactive = false;
    }

    pub(crate) fn set_scale(&mut self, scale: f64) {
        self.scale = Some(scale);
    }

    pub fn clear(&mut self) {
        self.content = SurfaceContent::Empty;
        self.scale = None;
        self.interactive = false;
    }
}

/// Registry of live surfaces, keyed by mount-point id.
#[derive(Debug, Default)]
pub struct SurfaceHost {
    surfaces: FxHashMap<String, Surface>,
}

impl SurfaceHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a surface, replacing any prior surface with the same id.
    pub fn insert(&mut self, surface: Surface) {
        self.surfaces.insert(surface.id.clone(), surface);
    }

    pub fn surface(&self, id: &str) -> Option<&Surface> {
        self.surfaces.get(id)
    }

    pub fn surface_mut(&mut self, id: &str) -> Option<&mut Surface> {
        self.surfaces.get_mut(id)
    }

    pub fn remove(&mut self, id: &str) -> Option<Surface> {
        self.surfaces.remove(id)
    }
}

/// Natural (unscaled) size of a vector document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NaturalSize {
    pub width: f64,
    pub height: f64,
}

/// Probes a serialized vector document for its natural size.
///
/// Cheap, non-validating scan of the root tag: `viewBox` wins, explicit `width`/`height`
/// attributes are the fallback. Returns `None` when neither yields finite positive dimensions.
pub fn parse_svg_natural_size(svg: &str) -> Option<NaturalSize> {
    let open_start = svg.find("<svg")?;
    let open_end = open_start + svg[open_start..].find('>')?;
    let open_tag = &svg[open_start..=open_end];

    if let Some(size) = parse_view_box_size(open_tag) {
        return Some(size);
    }

    let width = parse_dimension(attr_value(open_tag, "width")?)?;
    let height = parse_dimension(attr_value(open_tag, "height")?)?;
    if width > 0.0 && height > 0.0 {
        Some(NaturalSize { width, height })
    } else {
        None
    }
}

fn parse_view_box_size(open_tag: &str) -> Option<NaturalSize> {
    let raw = attr_value(open_tag, "viewBox")?;
    let mut it = raw.split_whitespace();
    let _min_x = it.next()?.parse::<f64>().ok()?;
    let _min_y = it.next()?.parse::<f64>().ok()?;
    let width = it.next()?.parse::<f64>().ok()?;
    let height = it.next()?.parse::<f64>().ok()?;
    if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
        Some(NaturalSize { width, height })
    } else {
        None
    }
}

pub(crate) fn attr_value<'a>(tag: &'a str, name: &str) -> Option<&'a str> {
    let needle = format!("{name}=\"");
    let i = tag.find(&needle)?;
    let rest = &tag[i + needle.len()..];
    let end = rest.find('"')?;
    Some(&rest[..end])
}

/// Parses a leading numeric prefix, so `"450px"` yields 450. Mirrors how hosts read dimension
/// attributes.
fn parse_dimension(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let end = raw
        .find(|c: char| !(c.is_ascii_digit() || c == '.' || c == '-' || c == '+'))
        .unwrap_or(raw.len());
    raw[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Builds the in-place diagnostic panel shown when the rendering engine rejects a document.
///
/// The submitted code is HTML-escaped; it is the exact text that was handed to the engine.
pub fn diagnostic_panel(message: &str, submitted_code: &str) -> String {
    let escaped = htmlize::escape_text(submitted_code);
    format!(
        "<div class=\"render-error\">\n\
         <p class=\"render-error-title\">Error rendering diagram:</p>\n\
         <pre class=\"render-error-message\">{message}</pre>\n\
         <p>Please check your diagram code for syntax errors. Ensure it does not include Markdown fences like ```mermaid.</p>\n\
         <p class=\"render-error-code-label\">Code submitted to the renderer:</p>\n\
         <pre class=\"render-error-code\">{escaped}</pre>\n\
         </div>"
    )
}
