//! Encode and decode error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("cannot pack type: {shape} ({detail})")]
    UnsupportedType { shape: &'static str, detail: String },
    #[error("extension payload of {len} bytes exceeds the 32-bit length field")]
    OutOfRange { len: usize },
    #[error("failed to write packed bytes: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid MessagePack byte 0x{byte:02x} at offset {offset}")]
    Malformed { byte: u8, offset: usize },
    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },
    #[error("declared length {len} at offset {offset} is out of range")]
    OutOfRange { len: u64, offset: usize },
    #[error("containers nested deeper than {limit} levels at offset {offset}")]
    TooDeep { limit: usize, offset: usize },
    #[error("input ended inside an object ({pending} bytes pending)")]
    Truncated { pending: usize },
    #[error("{trailing} unconsumed bytes after the object ending at offset {consumed}")]
    TrailingBytes { consumed: usize, trailing: usize },
    #[error("byte source failed: {0}")]
    Io(#[from] std::io::Error),
}

impl DecodeError {
    /// `true` for errors caused by the bytes themselves rather than the
    /// source that delivered them.
    pub fn is_malformed(&self) -> bool {
        !matches!(self, DecodeError::Io(_))
    }
}
