//! Serialization entry points on common Rust types.

use std::collections::{BTreeMap, HashMap};
use std::io::Write;

use crate::{EncodeError, Encoder, Extension, Value};

/// Types that can be serialized to MessagePack.
///
/// Implementors only provide [`ToMsgPack::to_msgpack_value`]; the byte
/// producing methods share one encoding path.
pub trait ToMsgPack {
    fn to_msgpack_value(&self) -> Value;

    /// Packs `self` into a new byte vector.
    fn to_msgpack(&self) -> Result<Vec<u8>, EncodeError> {
        Encoder::new().encode(&self.to_msgpack_value())
    }

    /// Appends the packed bytes to `out`. On error `out` is left unchanged.
    fn append_msgpack(&self, out: &mut Vec<u8>) -> Result<(), EncodeError> {
        let bytes = self.to_msgpack()?;
        out.extend_from_slice(&bytes);
        Ok(())
    }

    /// Writes the packed bytes to `sink` in a single `write_all`.
    fn write_msgpack<W: Write + ?Sized>(&self, sink: &mut W) -> Result<(), EncodeError> {
        let bytes = self.to_msgpack()?;
        sink.write_all(&bytes)?;
        Ok(())
    }
}

impl ToMsgPack for Value {
    fn to_msgpack_value(&self) -> Value {
        self.clone()
    }

    fn to_msgpack(&self) -> Result<Vec<u8>, EncodeError> {
        Encoder::new().encode(self)
    }
}

impl ToMsgPack for Extension {
    fn to_msgpack_value(&self) -> Value {
        Value::Extension(self.clone())
    }
}

impl ToMsgPack for () {
    fn to_msgpack_value(&self) -> Value {
        Value::Nil
    }
}

impl ToMsgPack for bool {
    fn to_msgpack_value(&self) -> Value {
        Value::Bool(*self)
    }
}

macro_rules! impl_to_msgpack {
    ($($ty:ty),*) => {
        $(
            impl ToMsgPack for $ty {
                fn to_msgpack_value(&self) -> Value {
                    Value::from(*self)
                }
            }
        )*
    };
}

impl_to_msgpack!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl ToMsgPack for str {
    fn to_msgpack_value(&self) -> Value {
        Value::Text(self.to_owned())
    }
}

impl ToMsgPack for String {
    fn to_msgpack_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl<T: ToMsgPack> ToMsgPack for [T] {
    fn to_msgpack_value(&self) -> Value {
        Value::Array(self.iter().map(ToMsgPack::to_msgpack_value).collect())
    }
}

impl<T: ToMsgPack> ToMsgPack for Vec<T> {
    fn to_msgpack_value(&self) -> Value {
        self.as_slice().to_msgpack_value()
    }
}

impl<T: ToMsgPack> ToMsgPack for Option<T> {
    fn to_msgpack_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_msgpack_value(),
            None => Value::Nil,
        }
    }
}

impl<K: ToMsgPack, V: ToMsgPack> ToMsgPack for BTreeMap<K, V> {
    fn to_msgpack_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_msgpack_value(), v.to_msgpack_value()))
                .collect(),
        )
    }
}

/// Pairs follow the map's iteration order.
impl<K: ToMsgPack, V: ToMsgPack, S> ToMsgPack for HashMap<K, V, S> {
    fn to_msgpack_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(k, v)| (k.to_msgpack_value(), v.to_msgpack_value()))
                .collect(),
        )
    }
}
