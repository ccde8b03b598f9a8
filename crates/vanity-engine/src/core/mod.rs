//! Core engine-facing contracts.
//!
//! This module defines the stable interface between the runtime (platform loop)
//! and the application driving it, plus the per-frame context.

mod app;
mod ctx;

pub use app::{App, AppControl, Pacing};
pub use ctx::{FrameCtx, WindowCtx};
