//! Per-call decode configuration and post-processing hooks.
//!
//! Nothing here is global: options travel with each `unpack_with` call, so
//! concurrent decodes with different settings never interfere.

use crate::Value;

/// Post-processing applied to a freshly decoded value.
///
/// The decoder itself always produces raw [`Value::Text`] and
/// [`Value::Bytes`]; a binding layer implements this trait to intern keys
/// (`symbolize_keys`) or transcode text (`encoding`).
pub trait DecodeHooks {
    /// Called with every decoded text value, map keys included.
    fn text(&self, text: String) -> Value {
        Value::Text(text)
    }

    /// Called with every map key after its own contents were processed.
    fn map_key(&self, key: Value) -> Value {
        key
    }
}

/// What a one-shot unpack does with bytes after the first object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrailingBytes {
    /// Ignore them.
    #[default]
    Ignore,
    /// Fail with [`crate::DecodeError::TrailingBytes`].
    Reject,
}

#[derive(Clone, Copy, Default)]
pub struct UnpackOptions<'h> {
    pub trailing: TrailingBytes,
    pub hooks: Option<&'h dyn DecodeHooks>,
}

impl<'h> UnpackOptions<'h> {
    /// Options that reject trailing bytes.
    pub fn strict() -> Self {
        Self {
            trailing: TrailingBytes::Reject,
            hooks: None,
        }
    }

    pub fn with_hooks(mut self, hooks: &'h dyn DecodeHooks) -> Self {
        self.hooks = Some(hooks);
        self
    }
}

impl std::fmt::Debug for UnpackOptions<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UnpackOptions")
            .field("trailing", &self.trailing)
            .field("hooks", &self.hooks.is_some())
            .finish()
    }
}

/// Rebuilds `value` bottom-up through `hooks`.
pub fn apply_hooks(value: Value, hooks: &dyn DecodeHooks) -> Value {
    match value {
        Value::Text(s) => hooks.text(s),
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|v| apply_hooks(v, hooks)).collect())
        }
        Value::Map(pairs) => Value::Map(
            pairs
                .into_iter()
                .map(|(k, v)| {
                    let key = hooks.map_key(apply_hooks(k, hooks));
                    (key, apply_hooks(v, hooks))
                })
                .collect(),
        ),
        other => other,
    }
}
