//! Rendering module
//!
//! The game loop calls a [`Renderer`] once per iteration with a read-only
//! [`Frame`]. Renderers draw to an optional surface: while no surface is
//! attached (or after it fails) frames are silently skipped.

pub mod json;
pub mod text;

pub use json::JsonRenderer;
pub use text::{TextRenderer, draw_frame};

use crate::sim::Frame;

/// Render callback invoked from the loop thread
pub trait Renderer: Send {
    fn render(&mut self, frame: &Frame<'_>);
}

/// Renderer that draws nothing (headless sessions)
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn render(&mut self, _frame: &Frame<'_>) {}
}
