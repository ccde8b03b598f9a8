use thiserror::Error;

/// Why a header could not be decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("unknown command tag {0}")]
    UnknownTag(u32),

    #[error("command tag {0} is reserved for bitmaps and not supported")]
    ReservedTag(u32),

    #[error("array command with negative element count {0}")]
    NegativeCount(i32),
}
