//! Minimal-width MessagePack encoder.
//!
//! Every header picks the smallest form that can hold its length or value.
//! Floats always go out as `float 64`.

use msgpack_stream_buffers::Writer;

use crate::constants::{
    MsgPackMarker, FIXARRAY_MAX, FIXARRAY_PREFIX, FIXEXT, FIXMAP_MAX, FIXMAP_PREFIX, FIXSTR_MAX,
    FIXSTR_PREFIX, NEGATIVE_FIXINT_MIN, POSITIVE_FIXINT_MAX,
};
use crate::{EncodeError, Extension, Value};

pub struct Encoder {
    pub writer: Writer,
}

impl Default for Encoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Checks that a length fits the 32-bit length fields of the format.
fn len32(shape: &'static str, len: usize) -> Result<u32, EncodeError> {
    u32::try_from(len).map_err(|_| EncodeError::UnsupportedType {
        shape,
        detail: format!("length {} exceeds u32::MAX", len),
    })
}

impl Encoder {
    pub fn new() -> Self {
        Self {
            writer: Writer::new(),
        }
    }

    /// Encodes one value. On error nothing of the partial output is kept.
    pub fn encode(&mut self, value: &Value) -> Result<Vec<u8>, EncodeError> {
        self.writer.reset();
        match self.write_any(value) {
            Ok(()) => Ok(self.writer.flush()),
            Err(err) => {
                self.writer.reset();
                Err(err)
            }
        }
    }

    pub fn write_any(&mut self, value: &Value) -> Result<(), EncodeError> {
        match value {
            Value::Nil => self.write_nil(),
            Value::Bool(b) => self.write_boolean(*b),
            Value::Float(f) => self.write_float(*f),
            Value::Int(i) => self.write_integer(*i)?,
            Value::Text(s) => self.write_str(s)?,
            Value::Bytes(b) => self.write_bin(b)?,
            Value::Array(items) => self.write_arr(items)?,
            Value::Map(pairs) => self.write_map(pairs)?,
            Value::Extension(ext) => self.write_ext(ext)?,
        }
        Ok(())
    }

    pub fn write_nil(&mut self) {
        self.writer.u8(MsgPackMarker::Nil as u8);
    }

    pub fn write_boolean(&mut self, b: bool) {
        let marker = if b {
            MsgPackMarker::True
        } else {
            MsgPackMarker::False
        };
        self.writer.u8(marker as u8);
    }

    pub fn write_float(&mut self, float: f64) {
        self.writer.u8f64(0xcb, float);
    }

    pub fn write_integer(&mut self, int: i128) -> Result<(), EncodeError> {
        if int >= 0 {
            let uint = u64::try_from(int).map_err(|_| EncodeError::UnsupportedType {
                shape: "int",
                detail: format!("{} is above the uint 64 range", int),
            })?;
            self.write_u_integer(uint);
        } else {
            let int = i64::try_from(int).map_err(|_| EncodeError::UnsupportedType {
                shape: "int",
                detail: format!("{} is below the int 64 range", int),
            })?;
            self.write_n_integer(int);
        }
        Ok(())
    }

    /// Encodes a non-negative integer.
    pub fn write_u_integer(&mut self, uint: u64) {
        if uint <= POSITIVE_FIXINT_MAX {
            self.writer.u8(uint as u8);
        } else if uint <= u8::MAX as u64 {
            self.writer.u8u8(0xcc, uint as u8);
        } else if uint <= u16::MAX as u64 {
            self.writer.u8u16(0xcd, uint as u16);
        } else if uint <= u32::MAX as u64 {
            self.writer.u8u32(0xce, uint as u32);
        } else {
            self.writer.u8u64(0xcf, uint);
        }
    }

    /// Encodes a negative integer.
    pub fn write_n_integer(&mut self, int: i64) {
        if int >= NEGATIVE_FIXINT_MIN {
            // negative fixint: 0xe0..0xff
            self.writer.u8(int as i8 as u8);
        } else if int >= i8::MIN as i64 {
            self.writer.u8i8(0xd0, int as i8);
        } else if int >= i16::MIN as i64 {
            self.writer.u8i16(0xd1, int as i16);
        } else if int >= i32::MIN as i64 {
            self.writer.u8i32(0xd2, int as i32);
        } else {
            self.writer.u8i64(0xd3, int);
        }
    }

    pub fn write_str_hdr(&mut self, length: usize) -> Result<(), EncodeError> {
        let length = len32("text", length)?;
        if length as usize <= FIXSTR_MAX {
            self.writer.u8(FIXSTR_PREFIX | length as u8);
        } else if length <= 0xff {
            self.writer.u8u8(0xd9, length as u8);
        } else if length <= 0xffff {
            self.writer.u8u16(0xda, length as u16);
        } else {
            self.writer.u8u32(0xdb, length);
        }
        Ok(())
    }

    pub fn write_str(&mut self, s: &str) -> Result<(), EncodeError> {
        self.write_str_hdr(s.len())?;
        self.writer.utf8(s);
        Ok(())
    }

    pub fn write_bin_hdr(&mut self, length: usize) -> Result<(), EncodeError> {
        let length = len32("bytes", length)?;
        if length <= 0xff {
            self.writer.u8u8(0xc4, length as u8);
        } else if length <= 0xffff {
            self.writer.u8u16(0xc5, length as u16);
        } else {
            self.writer.u8u32(0xc6, length);
        }
        Ok(())
    }

    pub fn write_bin(&mut self, buf: &[u8]) -> Result<(), EncodeError> {
        self.write_bin_hdr(buf.len())?;
        self.writer.buf(buf);
        Ok(())
    }

    pub fn write_arr_hdr(&mut self, length: usize) -> Result<(), EncodeError> {
        let length = len32("array", length)?;
        if length as usize <= FIXARRAY_MAX {
            self.writer.u8(FIXARRAY_PREFIX | length as u8);
        } else if length <= 0xffff {
            self.writer.u8u16(0xdc, length as u16);
        } else {
            self.writer.u8u32(0xdd, length);
        }
        Ok(())
    }

    pub fn write_arr(&mut self, items: &[Value]) -> Result<(), EncodeError> {
        self.write_arr_hdr(items.len())?;
        for item in items {
            self.write_any(item)?;
        }
        Ok(())
    }

    pub fn write_map_hdr(&mut self, length: usize) -> Result<(), EncodeError> {
        let length = len32("map", length)?;
        if length as usize <= FIXMAP_MAX {
            self.writer.u8(FIXMAP_PREFIX | length as u8);
        } else if length <= 0xffff {
            self.writer.u8u16(0xde, length as u16);
        } else {
            self.writer.u8u32(0xdf, length);
        }
        Ok(())
    }

    pub fn write_map(&mut self, pairs: &[(Value, Value)]) -> Result<(), EncodeError> {
        self.write_map_hdr(pairs.len())?;
        for (key, val) in pairs {
            self.write_any(key)?;
            self.write_any(val)?;
        }
        Ok(())
    }

    /// Writes the ext header; the form depends only on `length`.
    pub fn write_ext_hdr(&mut self, type_id: i8, length: usize) -> Result<(), EncodeError> {
        if let Some(&(_, marker)) = FIXEXT.iter().find(|(size, _)| *size == length) {
            self.writer.u8i8(marker, type_id);
            return Ok(());
        }
        let length = u32::try_from(length).map_err(|_| EncodeError::OutOfRange { len: length })?;
        if length <= 0xff {
            self.writer.u8u8(0xc7, length as u8);
        } else if length <= 0xffff {
            self.writer.u8u16(0xc8, length as u16);
        } else {
            self.writer.u8u32(0xc9, length);
        }
        self.writer.u8(type_id as u8);
        Ok(())
    }

    pub fn write_ext(&mut self, ext: &Extension) -> Result<(), EncodeError> {
        self.write_ext_hdr(ext.type_id, ext.payload.len())?;
        self.writer.buf(&ext.payload);
        Ok(())
    }
}
