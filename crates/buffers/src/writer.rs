//! Binary buffer writer with auto-growing capacity.

/// A big-endian binary writer that grows automatically as needed.
///
/// Bytes between `x0` and `x` are the pending output; [`Writer::flush`]
/// hands them out and starts a new segment in the same allocation.
///
/// # Example
///
/// ```
/// use msgpack_stream_buffers::Writer;
///
/// let mut writer = Writer::new();
/// writer.u8(0xcd);
/// writer.u16(0x0100);
/// assert_eq!(writer.flush(), [0xcd, 0x01, 0x00]);
/// ```
pub struct Writer {
    /// The underlying byte buffer.
    pub uint8: Vec<u8>,
    /// Position where last flush happened.
    pub x0: usize,
    /// Current cursor position.
    pub x: usize,
    /// Allocation size when buffer needs to grow.
    alloc_size: usize,
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

impl Writer {
    /// Creates a new writer with default allocation size (4KB).
    pub fn new() -> Self {
        Self::with_alloc_size(4 * 1024)
    }

    /// Creates a new writer with custom allocation size.
    pub fn with_alloc_size(alloc_size: usize) -> Self {
        Self {
            uint8: vec![0u8; alloc_size],
            x0: 0,
            x: 0,
            alloc_size,
        }
    }

    /// Number of bytes written since the last flush.
    pub fn len(&self) -> usize {
        self.x - self.x0
    }

    /// Returns `true` when nothing was written since the last flush.
    pub fn is_empty(&self) -> bool {
        self.x == self.x0
    }

    /// Ensures the buffer has at least `capacity` bytes available.
    pub fn ensure_capacity(&mut self, capacity: usize) {
        let remaining = self.uint8.len() - self.x;
        if remaining < capacity {
            let total = self.uint8.len() - self.x0;
            let required = capacity - remaining;
            let total_required = total + required;
            let new_size = if total_required <= self.alloc_size {
                self.alloc_size
            } else {
                total_required * 2
            };
            self.grow(new_size);
        }
    }

    fn grow(&mut self, new_size: usize) {
        let pending = self.x - self.x0;
        let mut new_buf = vec![0u8; new_size];
        new_buf[..pending].copy_from_slice(&self.uint8[self.x0..self.x]);
        self.uint8 = new_buf;
        self.x = pending;
        self.x0 = 0;
    }

    /// Drops everything written since the last flush.
    pub fn reset(&mut self) {
        self.x = self.x0;
    }

    /// Returns the written data and advances the flush position.
    pub fn flush(&mut self) -> Vec<u8> {
        let result = self.uint8[self.x0..self.x].to_vec();
        self.x0 = self.x;
        result
    }

    /// Writes an unsigned 8-bit integer.
    #[inline]
    pub fn u8(&mut self, val: u8) {
        self.ensure_capacity(1);
        self.uint8[self.x] = val;
        self.x += 1;
    }

    /// Writes an unsigned 16-bit integer (big-endian).
    #[inline]
    pub fn u16(&mut self, val: u16) {
        self.ensure_capacity(2);
        self.uint8[self.x..self.x + 2].copy_from_slice(&val.to_be_bytes());
        self.x += 2;
    }

    /// Writes an unsigned 32-bit integer (big-endian).
    #[inline]
    pub fn u32(&mut self, val: u32) {
        self.ensure_capacity(4);
        self.uint8[self.x..self.x + 4].copy_from_slice(&val.to_be_bytes());
        self.x += 4;
    }

    /// Writes a u8 followed by a u8, in one capacity check.
    pub fn u8u8(&mut self, a: u8, b: u8) {
        self.ensure_capacity(2);
        self.uint8[self.x] = a;
        self.uint8[self.x + 1] = b;
        self.x += 2;
    }

    /// Writes a u8 followed by a u16 (big-endian).
    pub fn u8u16(&mut self, u8_val: u8, u16_val: u16) {
        self.ensure_capacity(3);
        self.uint8[self.x] = u8_val;
        self.uint8[self.x + 1..self.x + 3].copy_from_slice(&u16_val.to_be_bytes());
        self.x += 3;
    }

    /// Writes a u8 followed by a u32 (big-endian).
    pub fn u8u32(&mut self, u8_val: u8, u32_val: u32) {
        self.ensure_capacity(5);
        self.uint8[self.x] = u8_val;
        self.uint8[self.x + 1..self.x + 5].copy_from_slice(&u32_val.to_be_bytes());
        self.x += 5;
    }

    /// Writes a u8 followed by a u64 (big-endian).
    pub fn u8u64(&mut self, u8_val: u8, u64_val: u64) {
        self.ensure_capacity(9);
        self.uint8[self.x] = u8_val;
        self.uint8[self.x + 1..self.x + 9].copy_from_slice(&u64_val.to_be_bytes());
        self.x += 9;
    }

    /// Writes a u8 followed by an i8.
    pub fn u8i8(&mut self, u8_val: u8, i8_val: i8) {
        self.u8u8(u8_val, i8_val as u8);
    }

    /// Writes a u8 followed by an i16 (big-endian).
    pub fn u8i16(&mut self, u8_val: u8, i16_val: i16) {
        self.u8u16(u8_val, i16_val as u16);
    }

    /// Writes a u8 followed by an i32 (big-endian).
    pub fn u8i32(&mut self, u8_val: u8, i32_val: i32) {
        self.u8u32(u8_val, i32_val as u32);
    }

    /// Writes a u8 followed by an i64 (big-endian).
    pub fn u8i64(&mut self, u8_val: u8, i64_val: i64) {
        self.u8u64(u8_val, i64_val as u64);
    }

    /// Writes a u8 followed by a f64 (big-endian).
    pub fn u8f64(&mut self, u8_val: u8, f64_val: f64) {
        self.u8u64(u8_val, f64_val.to_bits());
    }

    /// Writes a byte slice.
    pub fn buf(&mut self, buf: &[u8]) {
        let length = buf.len();
        self.ensure_capacity(length);
        self.uint8[self.x..self.x + length].copy_from_slice(buf);
        self.x += length;
    }

    /// Writes a UTF-8 string. Returns the number of bytes written.
    pub fn utf8(&mut self, s: &str) -> usize {
        self.buf(s.as_bytes());
        s.len()
    }
}
