//! Rendering adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers never mutate the scene.
//! - Render output derives only from the scene and the view.
//!
//! The GPU backend lives in `walkabout-render-wgpu`; the debug text
//! renderer here serves headless tools and tests.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderView, Renderer};

pub fn crate_info() -> &'static str {
    "walkabout-render v0.1.0"
}
