//! Turns a display list into clip-space triangles for the draw-list engine.
//!
//! The view autoscales to every coordinate the list holds. Points and line
//! widths are constant in pixels, so the expansion needs the viewport.

mod bounds;
mod geometry;
mod view;

pub use bounds::{Bounds, MARGIN};
pub use geometry::{tessellate, LINE_PX, POINT_PX};
pub use view::{View, CLIP_CORRECTION};
