#![forbid(unsafe_code)]

//! `selkie` is a headless diagram-code normalization and export pipeline.
//!
//! It takes arbitrary, possibly markdown-fenced diagram source text, repairs it into a form a
//! rendering engine's grammar accepts, manages the rendered vector document on a mount surface,
//! and emits distributable artifacts. The rendering engine itself is an external capability
//! behind [`render::DiagramEngine`].
//!
//! # Features
//!
//! - `render`: surface management, render adapter, vector-document rewriting, SVG/JSON export
//! - `raster`: PNG export via pure-Rust SVG rasterization

pub use selkie_core::*;

#[cfg(feature = "render")]
pub mod render {
    pub use selkie_render::adapter::{RenderAdapter, sanitize_render_id};
    pub use selkie_render::engine::{
        BindFn, DiagramEngine, EngineConfig, EngineError, RenderedDiagram, SecurityLevel,
    };
    pub use selkie_render::rewrite::foreign_object_labels_to_text;
    pub use selkie_render::surface::{
        NaturalSize, Surface, SurfaceContent, SurfaceHost, parse_svg_natural_size,
    };
    pub use selkie_render::{Error, Result};
}

#[cfg(feature = "render")]
pub mod export;
