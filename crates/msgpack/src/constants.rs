//! MessagePack marker bytes and form limits.

/// Single-byte markers with a fixed meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MsgPackMarker {
    Nil = 0xc0,
    /// Never used by the format; decoding it is always an error.
    Reserved = 0xc1,
    False = 0xc2,
    True = 0xc3,
}

pub const POSITIVE_FIXINT_MAX: u64 = 0x7f;
pub const NEGATIVE_FIXINT_MIN: i64 = -0x20;

pub const FIXSTR_MAX: usize = 0x1f;
pub const FIXARRAY_MAX: usize = 0x0f;
pub const FIXMAP_MAX: usize = 0x0f;

pub const FIXSTR_PREFIX: u8 = 0xa0;
pub const FIXARRAY_PREFIX: u8 = 0x90;
pub const FIXMAP_PREFIX: u8 = 0x80;

/// `(payload length, marker)` for the fixext forms.
pub const FIXEXT: [(usize, u8); 5] = [(1, 0xd4), (2, 0xd5), (4, 0xd6), (8, 0xd7), (16, 0xd8)];
