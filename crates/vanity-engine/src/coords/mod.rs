//! Screen-space types.
//!
//! Geometry reaching the draw-list engine is already in clip space; the
//! viewport only tells the tessellator how large a pixel is.

mod viewport;

pub use viewport::Viewport;
