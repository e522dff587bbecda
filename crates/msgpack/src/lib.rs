//! MessagePack codec: a minimal-width encoder, a windowed object decoder and
//! a streaming [`Unpacker`].
//!
//! ```
//! use msgpack_stream::{pack, unpack, Unpacker, Value};
//!
//! let value = Value::Map(vec![(Value::from("hello"), Value::from("world"))]);
//! let bytes = pack(&value).unwrap();
//! assert_eq!(unpack(&bytes).unwrap(), value);
//!
//! let mut unpacker = Unpacker::new();
//! let mut seen = Vec::new();
//! for chunk in bytes.chunks(3) {
//!     unpacker.feed_each(chunk, |v| seen.push(v)).unwrap();
//! }
//! assert_eq!(seen, vec![value]);
//! ```

pub mod constants;
mod core_ext;
mod decoder;
mod encoder;
mod error;
mod json;
mod options;
pub mod unpacker;
mod util;
mod value;

pub use constants::MsgPackMarker;
pub use core_ext::ToMsgPack;
pub use decoder::{decode_one, Decoded, MAX_DEPTH};
pub use encoder::Encoder;
pub use error::{DecodeError, EncodeError};
pub use options::{apply_hooks, DecodeHooks, TrailingBytes, UnpackOptions};
pub use unpacker::{Unpacker, Values};
pub use util::{dump, load, pack, unpack, unpack_with};
pub use value::{Extension, Value, INT_MAX, INT_MIN};
