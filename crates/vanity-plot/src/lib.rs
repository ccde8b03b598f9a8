//! Fire-and-forget 2D plotting.
//!
//! A [`Session`] spawns the `vanity-plot-viewer` process and streams drawing
//! commands to it over a pipe. The viewer keeps the commands it has seen and
//! redraws them every frame, fitted to the window.
//!
//! ```rust,ignore
//! let mut plot = vanity_plot::Session::open(800, 600)?;
//! plot.line(0.0, 0.0, 5.0, 0.0);
//! plot.set_color(1.0, 0.0, 0.0);
//! plot.points(&[1.0, 2.0, 3.0], &[1.0, 4.0, 9.0]);
//! ```

pub mod consumer;
pub mod session;
pub mod tessellate;
pub mod viewer;
pub mod wire;

pub use session::{Session, SessionConfig, SessionError};
pub use viewer::Viewer;
pub use wire::{Command, DecodeError};
