//! Output encodings for reported series.
//!
//! A formatter writes exactly one line per call, handed to the destination
//! in a single `write_all` so lines from rules sharing a stream never mix. The encoding is chosen by
//! name when the rule is built; unknown names are rejected there, so
//! formatting itself never fails on configuration.

use crate::error::{Result, RuleError};
use crate::timestamp::TimestampLayout;
use crate::value::Timestamp;
use serde_json::{Map, Value as JsonValue};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Writes one reported series to a destination.
pub trait Formatter: Send + Sync {
    /// Writes `series`, last seen at `timestamp`, as one line of `out`.
    fn format(&self, out: &mut dyn Write, series: &str, timestamp: Timestamp) -> Result<()>;
}

/// Supported output encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `series` or `series: timestamp` per line.
    #[default]
    Text,
    /// One compact JSON object per line.
    Json,
}

impl OutputFormat {
    /// Name used in configuration.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Json => "json",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = RuleError;

    fn from_str(name: &str) -> Result<Self> {
        match name {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(RuleError::UnsupportedFormat(other.to_string())),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Timestamp options shared by every formatter.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FormatterConfig {
    /// Whether the last-seen timestamp is written next to the series.
    pub include_timestamp: bool,
    /// How the timestamp is rendered.
    pub layout: TimestampLayout,
}

impl FormatterConfig {
    /// Creates a config, validating the layout specifier.
    pub fn new(include_timestamp: bool, layout: &str) -> Result<Self> {
        Ok(Self {
            include_timestamp,
            layout: TimestampLayout::parse(layout)?,
        })
    }
}

/// Plain text lines: `series\n` or `series: timestamp\n`.
#[derive(Debug, Clone, Default)]
pub struct TextFormatter {
    config: FormatterConfig,
}

impl TextFormatter {
    /// Creates a text formatter.
    pub fn new(config: FormatterConfig) -> Self {
        Self { config }
    }
}

impl Formatter for TextFormatter {
    fn format(&self, out: &mut dyn Write, series: &str, timestamp: Timestamp) -> Result<()> {
        let line = if self.config.include_timestamp {
            let rendered = self.config.layout.render(timestamp)?;
            format!("{}: {}\n", series, rendered)
        } else {
            format!("{}\n", series)
        };
        out.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// JSON lines: `{"Serie":"..."}` or `{"Serie":"...","Timestamp":"..."}`.
///
/// Consumers must not rely on the order of keys inside an object.
#[derive(Debug, Clone, Default)]
pub struct JsonFormatter {
    config: FormatterConfig,
}

impl JsonFormatter {
    /// Creates a JSON formatter.
    pub fn new(config: FormatterConfig) -> Self {
        Self { config }
    }
}

impl Formatter for JsonFormatter {
    fn format(&self, out: &mut dyn Write, series: &str, timestamp: Timestamp) -> Result<()> {
        let mut line = Map::new();
        line.insert("Serie".to_string(), JsonValue::from(series));
        if self.config.include_timestamp {
            let rendered = self.config.layout.render(timestamp)?;
            line.insert("Timestamp".to_string(), JsonValue::from(rendered));
        }
        let mut buf = serde_json::to_vec(&line)?;
        buf.push(b'\n');
        out.write_all(&buf)?;
        Ok(())
    }
}

/// Builds the formatter for `format`.
pub fn new_formatter(format: OutputFormat, config: FormatterConfig) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Text => Box::new(TextFormatter::new(config)),
        OutputFormat::Json => Box::new(JsonFormatter::new(config)),
    }
}
