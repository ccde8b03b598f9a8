//! Color model shared by the draw-list engine and the renderer.

pub mod color;

pub use color::Color;
