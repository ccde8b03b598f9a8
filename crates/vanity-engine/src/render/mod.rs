//! GPU rendering subsystem.
//!
//! The draw-list engine replays its opcodes into a `TriangleRecorder`;
//! `TriangleRenderer` then turns the recording into render passes.
//!
//! Convention:
//! - vertices arrive in homogeneous object space, transformed by the loaded
//!   matrix in the vertex shader
//! - clip space follows wgpu (z in [0, 1], +Y up)

mod ctx;
mod triangles;

pub use ctx::{RenderCtx, RenderTarget};
pub use triangles::{TriangleRecorder, TriangleRenderer, WgpuDevice};
