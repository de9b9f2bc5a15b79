//! Composite storage keys.
//!
//! A block stored in a TSM file or WAL segment is keyed by the series key
//! followed by [`FIELD_SEPARATOR`] and the field name:
//!
//! ```text
//! cpu,host=server1#!~#usage_idle
//! └─── series ───┘    └─ field ─┘
//! ```

/// Separator between the series key and the field name.
pub const FIELD_SEPARATOR: &[u8] = b"#!~#";

/// Builds a composite key from a series key and a field name.
pub fn composite_key(series: &[u8], field: &[u8]) -> Vec<u8> {
    let mut key = Vec::with_capacity(series.len() + FIELD_SEPARATOR.len() + field.len());
    key.extend_from_slice(series);
    key.extend_from_slice(FIELD_SEPARATOR);
    key.extend_from_slice(field);
    key
}

/// Splits a composite key at the first separator.
///
/// A key without a separator is treated as a bare series key with an empty
/// field name.
pub fn series_and_field(key: &[u8]) -> (&[u8], &[u8]) {
    match key
        .windows(FIELD_SEPARATOR.len())
        .position(|window| window == FIELD_SEPARATOR)
    {
        Some(pos) => (&key[..pos], &key[pos + FIELD_SEPARATOR.len()..]),
        None => (key, &[]),
    }
}

/// Decodes composite keys into `(series, field)` pairs.
///
/// Implementations must be deterministic: the same key always decodes to the
/// same pair. Malformed keys are not errors; whatever the decoder returns is
/// used as-is.
pub trait KeyDecoder: Send + Sync {
    /// Splits `key` into its series and field parts.
    fn decode<'a>(&self, key: &'a [u8]) -> (&'a [u8], &'a [u8]);
}

/// Decoder for keys laid out as `series#!~#field`.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeKeyDecoder;

impl KeyDecoder for CompositeKeyDecoder {
    fn decode<'a>(&self, key: &'a [u8]) -> (&'a [u8], &'a [u8]) {
        series_and_field(key)
    }
}
