//! Protocol-level errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProtoError {
    #[error("buffer too short: need {needed} more bytes, have {remaining}")]
    BufferTooShort { needed: usize, remaining: usize },

    #[error("VarInt encoding error: {0}")]
    VarInt(#[from] crate::types::VarIntError),

    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    #[error("string too long: {len} bytes (limit {max})")]
    StringTooLong { len: usize, max: usize },

    #[error("decompression error: {0}")]
    DecompressError(String),

    #[error("compression error: {0}")]
    CompressError(String),

    #[error("frame too large: {0} bytes")]
    FrameTooLarge(usize),

    #[error("negative length: {0}")]
    NegativeLength(i32),

    #[error("unknown next state: {0}")]
    UnknownNextState(i32),

    #[error("JSON parse error: {0}")]
    JsonParse(String),

    #[error("invalid data: {0}")]
    InvalidData(String),
}
