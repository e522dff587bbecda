//! One-shot pack and unpack helpers.

use crate::decoder::{decode_one, Decoded};
use crate::options::{apply_hooks, TrailingBytes, UnpackOptions};
use crate::{DecodeError, EncodeError, Encoder, Value};

/// Encodes `value` into a fresh byte vector.
pub fn pack(value: &Value) -> Result<Vec<u8>, EncodeError> {
    Encoder::new().encode(value)
}

/// Alias of [`pack`].
pub fn dump(value: &Value) -> Result<Vec<u8>, EncodeError> {
    pack(value)
}

/// Decodes the first object in `bytes`. Trailing bytes are ignored.
pub fn unpack(bytes: &[u8]) -> Result<Value, DecodeError> {
    unpack_with(bytes, &UnpackOptions::default())
}

/// Alias of [`unpack`].
pub fn load(bytes: &[u8]) -> Result<Value, DecodeError> {
    unpack(bytes)
}

/// Decodes the first object in `bytes` under `options`.
///
/// Input that ends inside the object is reported as
/// [`DecodeError::Truncated`]; there is nothing to retry with here.
pub fn unpack_with(bytes: &[u8], options: &UnpackOptions<'_>) -> Result<Value, DecodeError> {
    let (value, consumed) = match decode_one(bytes, 0, bytes.len())? {
        Decoded::Complete { value, offset } => (value, offset),
        Decoded::Incomplete => {
            return Err(DecodeError::Truncated {
                pending: bytes.len(),
            })
        }
    };
    if options.trailing == TrailingBytes::Reject && consumed < bytes.len() {
        return Err(DecodeError::TrailingBytes {
            consumed,
            trailing: bytes.len() - consumed,
        });
    }
    Ok(match options.hooks {
        Some(hooks) => apply_hooks(value, hooks),
        None => value,
    })
}
