use crate::surface::Surface;
use std::fmt;

/// Sandboxing posture handed to the rendering engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecurityLevel {
    Strict,
    Loose,
    Antiscript,
    Sandbox,
}

impl SecurityLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            SecurityLevel::Strict => "strict",
            SecurityLevel::Loose => "loose",
            SecurityLevel::Antiscript => "antiscript",
            SecurityLevel::Sandbox => "sandbox",
        }
    }
}

/// Process-wide, one-time engine configuration.
///
/// The host initializes this once at process start and hands it to the [`RenderAdapter`]; it is
/// deliberately a plain value rather than global state.
///
/// [`RenderAdapter`]: crate::adapter::RenderAdapter
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// When false, the engine must not kick off rendering on its own at load time; all renders go
    /// through the adapter.
    pub start_on_load: bool,
    /// Named visual theme.
    pub theme: String,
    pub security_level: SecurityLevel,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            start_on_load: false,
            theme: "neutral".to_string(),
            security_level: SecurityLevel::Loose,
        }
    }
}

/// Interaction-binding callback returned by the engine alongside a rendered document.
///
/// Run once against the surface the document was attached to; engines use it to wire embedded
/// interactivity (tooltips, click handlers).
pub type BindFn = Box<dyn FnOnce(&mut Surface) + Send>;

/// One successful engine render: the serialized vector document plus the optional binding hook.
pub struct RenderedDiagram {
    pub svg: String,
    pub bind: Option<BindFn>,
}

impl RenderedDiagram {
    pub fn new(svg: impl Into<String>) -> Self {
        Self {
            svg: svg.into(),
            bind: None,
        }
    }

    pub fn with_bind(mut self, bind: BindFn) -> Self {
        self.bind = Some(bind);
        self
    }
}

impl fmt::Debug for RenderedDiagram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderedDiagram")
            .field("svg", &self.svg)
            .field("bind", &self.bind.as_ref().map(|_| "FnOnce"))
            .finish()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("{message}")]
pub struct EngineError {
    pub message: String,
}

impl EngineError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The rendering-engine capability.
///
/// Given normalized diagram code and a process-unique render id, produce a serialized vector
/// document or fail with a message. Implementations are expected to be CPU-bound; async callers
/// go through [`RenderAdapter::render_into`].
///
/// [`RenderAdapter::render_into`]: crate::adapter::RenderAdapter::render_into
pub trait DiagramEngine {
    fn render_sync(
        &self,
        render_id: &str,
        code: &str,
        config: &EngineConfig,
    ) -> std::result::Result<RenderedDiagram, EngineError>;
}
