//! Viewer side of the command stream.
//!
//! A reader thread moves raw bytes from the pipe into an [`Inbox`]; the
//! render loop drains it through an [`Accumulator`], which keeps the
//! [`DisplayList`] that gets tessellated every frame.

mod accumulator;
mod display;
mod inbox;
mod reader;

pub use accumulator::{Accumulator, Drain, Mode};
pub(crate) use accumulator::DECODE_LIMIT;
pub use display::DisplayList;
pub use inbox::{Inbox, ReadStatus};
pub use reader::{spawn_reader, DEFAULT_QUEUE_CHUNKS};
