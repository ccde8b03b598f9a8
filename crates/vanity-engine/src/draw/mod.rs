//! Retained immediate-mode draw-list engine.
//!
//! A `DrawList` collects triangles from `begin`/`vertex`/`end` calls and
//! from attribute-pointer array draws, coalesces matrix uploads, and replays
//! everything through the `Device`/`Target` seam on `submit`.
//!
//! Convention:
//! - positions are 4-D homogeneous and transformed by the current matrix
//!   on the GPU
//! - colors are straight-alpha RGBA

mod attrib;
mod grow;
mod list;
mod matrix;
mod op;
mod submit;

pub use attrib::{AttribPointer, AttribSlot, ScalarType};
pub use grow::GrowArray;
pub use list::{Assembly, DrawList, Primitive};
pub use matrix::MatrixStack;
pub use op::{DrawRange, Op, Vertex};
pub use submit::{BufferKind, Device, DeviceBuffer, Parity, Target, UploadRing, MIN_BUFFER_SIZE};
