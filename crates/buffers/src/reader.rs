//! Bounded binary reader with cursor tracking.

use crate::BufferError;

/// A big-endian reader over the window `[x, end)` of a byte slice.
///
/// Every read is bounds-checked against `end`, not against the length of the
/// slice, so a caller can expose only a prefix of a larger buffer. A failed
/// read never moves the cursor.
///
/// # Example
///
/// ```
/// use msgpack_stream_buffers::Reader;
///
/// let data = [0x01, 0x02, 0x03, 0x04];
/// let mut reader = Reader::from_slice(&data, 1, 3);
///
/// assert_eq!(reader.try_u16(), Ok(0x0203));
/// assert!(reader.try_u8().is_err());
/// ```
#[derive(Debug, Clone, Copy)]
pub struct Reader<'a> {
    /// The underlying byte slice.
    pub uint8: &'a [u8],
    /// Current cursor position.
    pub x: usize,
    /// End position (exclusive).
    pub end: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader over the whole slice.
    pub fn new(uint8: &'a [u8]) -> Self {
        Self {
            uint8,
            x: 0,
            end: uint8.len(),
        }
    }

    /// Creates a reader over `[x, end)`; `end` is clamped to the slice length.
    pub fn from_slice(uint8: &'a [u8], x: usize, end: usize) -> Self {
        let end = end.min(uint8.len());
        Self {
            uint8,
            x: x.min(end),
            end,
        }
    }

    /// Returns the number of bytes left in the window.
    pub fn size(&self) -> usize {
        self.end - self.x
    }

    /// Checks that `n` more bytes are available from the current cursor.
    #[inline]
    fn check(&self, n: usize) -> Result<(), BufferError> {
        if n > self.size() {
            Err(BufferError::EndOfBuffer {
                needed: n,
                available: self.size(),
            })
        } else {
            Ok(())
        }
    }

    #[inline]
    fn array<const N: usize>(&mut self) -> Result<[u8; N], BufferError> {
        self.check(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.uint8[self.x..self.x + N]);
        self.x += N;
        Ok(out)
    }

    /// Peeks at the current byte without advancing.
    pub fn try_peek(&self) -> Result<u8, BufferError> {
        self.check(1)?;
        Ok(self.uint8[self.x])
    }

    /// Reads an unsigned 8-bit integer.
    #[inline]
    pub fn try_u8(&mut self) -> Result<u8, BufferError> {
        self.array::<1>().map(|b| b[0])
    }

    /// Reads a signed 8-bit integer.
    #[inline]
    pub fn try_i8(&mut self) -> Result<i8, BufferError> {
        self.array::<1>().map(|b| b[0] as i8)
    }

    /// Reads an unsigned 16-bit big-endian integer.
    #[inline]
    pub fn try_u16(&mut self) -> Result<u16, BufferError> {
        self.array().map(u16::from_be_bytes)
    }

    /// Reads a signed 16-bit big-endian integer.
    #[inline]
    pub fn try_i16(&mut self) -> Result<i16, BufferError> {
        self.array().map(i16::from_be_bytes)
    }

    /// Reads an unsigned 32-bit big-endian integer.
    #[inline]
    pub fn try_u32(&mut self) -> Result<u32, BufferError> {
        self.array().map(u32::from_be_bytes)
    }

    /// Reads a signed 32-bit big-endian integer.
    #[inline]
    pub fn try_i32(&mut self) -> Result<i32, BufferError> {
        self.array().map(i32::from_be_bytes)
    }

    /// Reads an unsigned 64-bit big-endian integer.
    #[inline]
    pub fn try_u64(&mut self) -> Result<u64, BufferError> {
        self.array().map(u64::from_be_bytes)
    }

    /// Reads a signed 64-bit big-endian integer.
    #[inline]
    pub fn try_i64(&mut self) -> Result<i64, BufferError> {
        self.array().map(i64::from_be_bytes)
    }

    /// Reads a 32-bit big-endian float.
    #[inline]
    pub fn try_f32(&mut self) -> Result<f32, BufferError> {
        self.array().map(f32::from_be_bytes)
    }

    /// Reads a 64-bit big-endian float.
    #[inline]
    pub fn try_f64(&mut self) -> Result<f64, BufferError> {
        self.array().map(f64::from_be_bytes)
    }

    /// Reads `size` raw bytes and advances the cursor.
    pub fn try_buf(&mut self, size: usize) -> Result<&'a [u8], BufferError> {
        self.check(size)?;
        let x = self.x;
        self.x += size;
        Ok(&self.uint8[x..self.x])
    }
}
