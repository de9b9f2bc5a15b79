//! Timestamped samples as decoded from TSM blocks and WAL write records.

/// Nanoseconds since the Unix epoch.
pub type Timestamp = i64;

/// The typed payload of a single sample.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// 64-bit float field.
    Float(f64),
    /// Signed integer field.
    Integer(i64),
    /// Unsigned integer field.
    Unsigned(u64),
    /// Boolean field.
    Boolean(bool),
    /// String field.
    String(String),
}

/// A single timestamped sample of one field of one series.
///
/// # Examples
/// ```rust,ignore
/// use alopex_skulk_rules::value::Value;
///
/// let value = Value::float(1_000, 0.75);
/// assert_eq!(value.unix_nano(), 1_000);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Value {
    /// Sample time in nanoseconds.
    pub timestamp: Timestamp,
    /// Sample payload.
    pub value: FieldValue,
}

impl Value {
    /// Creates a new sample.
    pub fn new(timestamp: Timestamp, value: FieldValue) -> Self {
        Self { timestamp, value }
    }

    /// Creates a float sample.
    pub fn float(timestamp: Timestamp, value: f64) -> Self {
        Self::new(timestamp, FieldValue::Float(value))
    }

    /// Creates an integer sample.
    pub fn integer(timestamp: Timestamp, value: i64) -> Self {
        Self::new(timestamp, FieldValue::Integer(value))
    }

    /// Creates an unsigned integer sample.
    pub fn unsigned(timestamp: Timestamp, value: u64) -> Self {
        Self::new(timestamp, FieldValue::Unsigned(value))
    }

    /// Creates a boolean sample.
    pub fn boolean(timestamp: Timestamp, value: bool) -> Self {
        Self::new(timestamp, FieldValue::Boolean(value))
    }

    /// Creates a string sample.
    pub fn string(timestamp: Timestamp, value: impl Into<String>) -> Self {
        Self::new(timestamp, FieldValue::String(value.into()))
    }

    /// Returns the sample time in nanoseconds since the Unix epoch.
    pub fn unix_nano(&self) -> Timestamp {
        self.timestamp
    }
}
