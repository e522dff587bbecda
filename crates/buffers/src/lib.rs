//! Binary buffer utilities for msgpack-stream.
//!
//! # Overview
//!
//! - [`Reader`] - Reads big-endian data from a bounded window of a byte slice
//! - [`Writer`] - Writes big-endian data to an auto-growing buffer
//!
//! # Example
//!
//! ```
//! use msgpack_stream_buffers::{Reader, Writer};
//!
//! let mut writer = Writer::new();
//! writer.u8(0x01);
//! writer.u16(0x0203);
//! writer.utf8("hello");
//! let data = writer.flush();
//!
//! let mut reader = Reader::new(&data);
//! assert_eq!(reader.try_u8(), Ok(0x01));
//! assert_eq!(reader.try_u16(), Ok(0x0203));
//! assert_eq!(reader.try_buf(5), Ok(&b"hello"[..]));
//! ```

mod reader;
mod writer;

pub use reader::Reader;
pub use writer::Writer;

/// Error type for buffer operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BufferError {
    /// A read needed more bytes than the window holds.
    EndOfBuffer {
        /// Bytes the read required.
        needed: usize,
        /// Bytes left in the window.
        available: usize,
    },
}

impl std::fmt::Display for BufferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BufferError::EndOfBuffer { needed, available } => write!(
                f,
                "end of buffer: needed {} bytes, {} available",
                needed, available
            ),
        }
    }
}

impl std::error::Error for BufferError {}
