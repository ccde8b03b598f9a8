//! Producer → viewer wire format.
//!
//! Every command is a fixed 36-byte header (`u32` tag + 32-byte payload)
//! small enough for a single atomic pipe write. Array commands are followed
//! by two blocks of `count` `f32`s, xs first. Everything is native-endian:
//! both ends of the pipe live on the same machine.

mod command;
mod error;
mod header;

pub use command::Command;
pub use error::DecodeError;
pub use header::{Header, Tag, HEADER_SIZE, PAYLOAD_SIZE};

pub(crate) use command::split_blocks;
