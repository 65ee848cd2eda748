#![forbid(unsafe_code)]

//! Render surfaces + engine adapter for diagram code (headless).
//!
//! The rendering engine itself is an external capability behind [`engine::DiagramEngine`]; this
//! crate owns everything around it: normalizing the submitted text, managing the mount surface a
//! rendered vector document is attached to, responsive fit scaling, in-place render diagnostics,
//! and the structural rewrite that replaces rich-text label nodes with plain vector text for
//! rasterization.

pub mod adapter;
pub mod engine;
pub mod error;
pub mod rewrite;
pub mod surface;

pub use adapter::RenderAdapter;
pub use engine::{BindFn, DiagramEngine, EngineConfig, EngineError, RenderedDiagram, SecurityLevel};
pub use error::{Error, Result};
pub use rewrite::foreign_object_labels_to_text;
pub use surface::{NaturalSize, Surface, SurfaceContent, SurfaceHost};
