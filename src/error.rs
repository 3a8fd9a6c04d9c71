// Error types for LeCroy trace decoding

use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FormatError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("WAVEDESC marker not found in the first {} bytes", crate::descriptor::MARKER_SEARCH_LEN)]
    MarkerNotFound,

    #[error("Truncated buffer: read of {len} bytes at offset {offset} exceeds buffer length {available}")]
    Truncated {
        offset: usize,
        len: usize,
        available: usize,
    },

    #[error("Unknown code {code} for field {field}")]
    UnknownEnumCode { field: &'static str, code: u16 },

    #[error("Invalid value for field {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },

    #[error("Channel {channel} does not match the shared time base: {reason}")]
    ChannelMismatch { channel: usize, reason: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, FormatError>;
