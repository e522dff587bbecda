//! Parses one MessagePack object out of a byte window.
//!
//! Decoding runs in two passes. [`Scan`] walks the headers without
//! allocating to find where the object ends; only then is the value built.
//! Running out of bytes anywhere inside an object surfaces as
//! [`Decoded::Incomplete`] and consumes nothing.

use msgpack_stream_buffers::{BufferError, Reader};

use crate::{DecodeError, Extension, Value};

/// Deepest container nesting accepted by the decoder, the same bound
/// `serde_json` puts on its own recursion.
pub const MAX_DEPTH: usize = 128;

/// Outcome of one decode attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A whole object was read; `offset` is the first byte past it.
    Complete { value: Value, offset: usize },
    /// The window ends before the object does. Retry with more bytes.
    Incomplete,
}

/// Internal failure: either a retry signal or a hard error.
#[derive(Debug)]
enum ReadError {
    Incomplete,
    Fail(DecodeError),
}

impl From<BufferError> for ReadError {
    fn from(_: BufferError) -> Self {
        ReadError::Incomplete
    }
}

impl From<DecodeError> for ReadError {
    fn from(err: DecodeError) -> Self {
        ReadError::Fail(err)
    }
}

/// Converts a declared length into a `usize` for the current target.
fn to_usize(len: u64, at: usize) -> Result<usize, ReadError> {
    usize::try_from(len).map_err(|_| ReadError::Fail(DecodeError::OutOfRange { len, offset: at }))
}

/// Decodes exactly one object from `buffer[offset..limit]`.
///
/// `limit` is an absolute end position and is clamped to the buffer length.
/// A reserved marker fails immediately, even when more bytes follow it.
///
/// ```
/// use msgpack_stream::{decode_one, Decoded, Value};
///
/// let buf = [0x92, 0x01, 0x02];
/// assert_eq!(decode_one(&buf, 0, 2).unwrap(), Decoded::Incomplete);
/// assert_eq!(
///     decode_one(&buf, 0, 3).unwrap(),
///     Decoded::Complete {
///         value: Value::Array(vec![Value::Int(1), Value::Int(2)]),
///         offset: 3,
///     }
/// );
/// ```
pub fn decode_one(buffer: &[u8], offset: usize, limit: usize) -> Result<Decoded, DecodeError> {
    match Scan::new(offset).advance(buffer, limit)? {
        Some(end) => decode_span(buffer, offset, end),
        None => Ok(Decoded::Incomplete),
    }
}

/// Builds the value of an object already known to end at `end`.
pub(crate) fn decode_span(
    buffer: &[u8],
    offset: usize,
    end: usize,
) -> Result<Decoded, DecodeError> {
    let mut decoder = Decoder::new(buffer, offset, end);
    match decoder.read_any() {
        Ok(value) => Ok(Decoded::Complete {
            value,
            offset: decoder.position(),
        }),
        Err(ReadError::Incomplete) => Ok(Decoded::Incomplete),
        Err(ReadError::Fail(err)) => Err(err),
    }
}

/// Resumable, non-allocating walk over one object's headers.
///
/// `stack` holds how many values are still owed at each open level. A
/// header is consumed only once it and any fixed-size payload are fully
/// buffered, so a later [`Scan::advance`] over a longer buffer picks up at
/// the first unread header instead of starting over.
#[derive(Debug, Clone)]
pub(crate) struct Scan {
    pos: usize,
    stack: Vec<usize>,
}

impl Scan {
    pub(crate) fn new(offset: usize) -> Self {
        Self {
            pos: offset,
            stack: vec![1],
        }
    }

    /// Walks on through `buffer[..end]`. Returns the end offset of the
    /// object once its last byte is present, `None` while bytes are missing.
    pub(crate) fn advance(
        &mut self,
        buffer: &[u8],
        end: usize,
    ) -> Result<Option<usize>, DecodeError> {
        loop {
            while self.stack.last() == Some(&0) {
                self.stack.pop();
            }
            if self.stack.is_empty() {
                return Ok(Some(self.pos));
            }
            let mut reader = Reader::from_slice(buffer, self.pos, end);
            let children = match skip_header(&mut reader) {
                Ok(children) => children,
                Err(ReadError::Incomplete) => return Ok(None),
                Err(ReadError::Fail(err)) => return Err(err),
            };
            if let Some(owed) = self.stack.last_mut() {
                *owed -= 1;
            }
            if children > 0 {
                // containers open once this one is pushed
                if self.stack.len() > MAX_DEPTH {
                    return Err(DecodeError::TooDeep {
                        limit: MAX_DEPTH,
                        offset: self.pos,
                    });
                }
                self.stack.push(children);
            }
            self.pos = reader.x;
        }
    }
}

/// Skips one header plus its scalar or raw payload. Returns the number of
/// child values that follow it.
fn skip_header(reader: &mut Reader<'_>) -> Result<usize, ReadError> {
    let at = reader.x;
    let byte = reader.try_u8()?;
    let skip = match byte {
        0x00..=0x7f | 0xc0 | 0xc2 | 0xc3 | 0xe0..=0xff => 0,
        0x80..=0x8f => return Ok(2 * (byte & 0x0f) as usize),
        0x90..=0x9f => return Ok((byte & 0x0f) as usize),
        0xa0..=0xbf => (byte & 0x1f) as u64,
        0xc1 => return Err(DecodeError::Malformed { byte, offset: at }.into()),
        0xc4 | 0xd9 => reader.try_u8()? as u64,
        0xc5 | 0xda => reader.try_u16()? as u64,
        0xc6 | 0xdb => reader.try_u32()? as u64,
        // ext payload plus the type id
        0xc7 => reader.try_u8()? as u64 + 1,
        0xc8 => reader.try_u16()? as u64 + 1,
        0xc9 => reader.try_u32()? as u64 + 1,
        0xcc | 0xd0 => 1,
        0xcd | 0xd1 => 2,
        0xca | 0xce | 0xd2 => 4,
        0xcb | 0xcf | 0xd3 => 8,
        0xd4 => 2,
        0xd5 => 3,
        0xd6 => 5,
        0xd7 => 9,
        0xd8 => 17,
        0xdc => return to_usize(reader.try_u16()? as u64, at),
        0xdd => return to_usize(reader.try_u32()? as u64, at),
        0xde => return to_usize(reader.try_u16()? as u64 * 2, at),
        0xdf => return to_usize(reader.try_u32()? as u64 * 2, at),
    };
    reader.try_buf(to_usize(skip, at)?)?;
    Ok(0)
}

struct Decoder<'a> {
    reader: Reader<'a>,
}

impl<'a> Decoder<'a> {
    fn new(buffer: &'a [u8], offset: usize, limit: usize) -> Self {
        Self {
            reader: Reader::from_slice(buffer, offset, limit),
        }
    }

    /// Absolute position of the cursor in the buffer.
    fn position(&self) -> usize {
        self.reader.x
    }

    fn read_any(&mut self) -> Result<Value, ReadError> {
        let at = self.reader.x;
        let byte = self.reader.try_u8()?;

        match byte {
            // positive fixint
            0x00..=0x7f => Ok(Value::Int(byte as i128)),
            // fixmap, fixarray, fixstr
            0x80..=0x8f => self.read_map((byte & 0x0f) as usize),
            0x90..=0x9f => self.read_arr((byte & 0x0f) as usize),
            0xa0..=0xbf => self.read_str((byte & 0x1f) as usize),
            0xc0 => Ok(Value::Nil),
            // reserved, never valid
            0xc1 => Err(DecodeError::Malformed { byte, offset: at }.into()),
            0xc2 => Ok(Value::Bool(false)),
            0xc3 => Ok(Value::Bool(true)),
            // bin 8/16/32
            0xc4 => {
                let n = self.reader.try_u8()? as u64;
                self.read_bin(n, at)
            }
            0xc5 => {
                let n = self.reader.try_u16()? as u64;
                self.read_bin(n, at)
            }
            0xc6 => {
                let n = self.reader.try_u32()? as u64;
                self.read_bin(n, at)
            }
            // ext 8/16/32
            0xc7 => {
                let n = self.reader.try_u8()? as u64;
                self.read_ext(n, at)
            }
            0xc8 => {
                let n = self.reader.try_u16()? as u64;
                self.read_ext(n, at)
            }
            0xc9 => {
                let n = self.reader.try_u32()? as u64;
                self.read_ext(n, at)
            }
            // float 32 is widened, float 64 is kept bit for bit
            0xca => Ok(Value::Float(self.reader.try_f32()? as f64)),
            0xcb => Ok(Value::Float(self.reader.try_f64()?)),
            // uint 8/16/32/64
            0xcc => Ok(Value::Int(self.reader.try_u8()? as i128)),
            0xcd => Ok(Value::Int(self.reader.try_u16()? as i128)),
            0xce => Ok(Value::Int(self.reader.try_u32()? as i128)),
            0xcf => Ok(Value::Int(self.reader.try_u64()? as i128)),
            // int 8/16/32/64
            0xd0 => Ok(Value::Int(self.reader.try_i8()? as i128)),
            0xd1 => Ok(Value::Int(self.reader.try_i16()? as i128)),
            0xd2 => Ok(Value::Int(self.reader.try_i32()? as i128)),
            0xd3 => Ok(Value::Int(self.reader.try_i64()? as i128)),
            // fixext 1/2/4/8/16
            0xd4 => self.read_ext(1, at),
            0xd5 => self.read_ext(2, at),
            0xd6 => self.read_ext(4, at),
            0xd7 => self.read_ext(8, at),
            0xd8 => self.read_ext(16, at),
            // str 8/16/32
            0xd9 => {
                let n = self.reader.try_u8()? as u64;
                let n = to_usize(n, at)?;
                self.read_str(n)
            }
            0xda => {
                let n = self.reader.try_u16()? as u64;
                let n = to_usize(n, at)?;
                self.read_str(n)
            }
            0xdb => {
                let n = self.reader.try_u32()? as u64;
                let n = to_usize(n, at)?;
                self.read_str(n)
            }
            // array 16/32
            0xdc => {
                let n = self.reader.try_u16()? as u64;
                let n = to_usize(n, at)?;
                self.read_arr(n)
            }
            0xdd => {
                let n = self.reader.try_u32()? as u64;
                let n = to_usize(n, at)?;
                self.read_arr(n)
            }
            // map 16/32
            0xde => {
                let n = self.reader.try_u16()? as u64;
                let n = to_usize(n, at)?;
                self.read_map(n)
            }
            0xdf => {
                let n = self.reader.try_u32()? as u64;
                let n = to_usize(n, at)?;
                self.read_map(n)
            }
            // negative fixint
            0xe0..=0xff => Ok(Value::Int(byte as i8 as i128)),
        }
    }

    fn read_str(&mut self, size: usize) -> Result<Value, ReadError> {
        let at = self.reader.x;
        let bytes = self.reader.try_buf(size)?;
        let s = std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { offset: at })?;
        Ok(Value::Text(s.to_owned()))
    }

    fn read_bin(&mut self, len: u64, at: usize) -> Result<Value, ReadError> {
        let len = to_usize(len, at)?;
        Ok(Value::Bytes(self.reader.try_buf(len)?.to_vec()))
    }

    fn read_ext(&mut self, len: u64, at: usize) -> Result<Value, ReadError> {
        let len = to_usize(len, at)?;
        let type_id = self.reader.try_i8()?;
        let payload = self.reader.try_buf(len)?.to_vec();
        Ok(Value::Extension(Extension { type_id, payload }))
    }

    fn read_arr(&mut self, size: usize) -> Result<Value, ReadError> {
        // Every element takes at least one byte.
        let mut items = Vec::with_capacity(size.min(self.reader.size()));
        for _ in 0..size {
            items.push(self.read_any()?);
        }
        Ok(Value::Array(items))
    }

    fn read_map(&mut self, size: usize) -> Result<Value, ReadError> {
        let mut pairs = Vec::with_capacity(size.min(self.reader.size() / 2));
        for _ in 0..size {
            let key = self.read_any()?;
            let val = self.read_any()?;
            pairs.push((key, val));
        }
        Ok(Value::Map(pairs))
    }
}
