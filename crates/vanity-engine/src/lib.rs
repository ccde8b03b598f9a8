//! Vanity engine crate.
//!
//! Platform + GPU runtime pieces and the retained draw-list engine used by
//! the plot viewer.

pub mod core;
pub mod device;
pub mod draw;
pub mod window;

pub mod coords;
pub mod logging;
pub mod paint;
pub mod render;
