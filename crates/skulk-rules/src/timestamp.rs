//! Human-readable rendering of nanosecond timestamps.

use crate::error::{Result, RuleError};
use crate::value::Timestamp;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fmt::Write;

/// How a timestamp is turned into text.
///
/// Every layout renders in UTC, never in the host's local zone.
///
/// # Examples
/// ```rust,ignore
/// use alopex_skulk_rules::timestamp::TimestampLayout;
///
/// let layout = TimestampLayout::parse("rfc3339")?;
/// assert_eq!(layout.render(0)?, "1970-01-01T00:00:00Z");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TimestampLayout {
    /// Empty layout: the value becomes a single character whose code point is
    /// the timestamp. Values outside the Unicode scalar range render as U+FFFD.
    #[default]
    Legacy,
    /// RFC 3339 in UTC, truncated to whole seconds.
    Rfc3339,
    /// A strftime pattern applied in UTC.
    Pattern(String),
}

impl TimestampLayout {
    /// Parses a layout specifier. `"RFC3339"` matches case-insensitively.
    pub fn parse(layout: &str) -> Result<Self> {
        if layout.is_empty() {
            return Ok(Self::Legacy);
        }
        if layout.eq_ignore_ascii_case("RFC3339") {
            return Ok(Self::Rfc3339);
        }
        if StrftimeItems::new(layout).any(|item| matches!(item, Item::Error)) {
            return Err(RuleError::InvalidTimestampLayout(layout.to_string()));
        }
        Ok(Self::Pattern(layout.to_string()))
    }

    /// Renders `unix_nano` with this layout.
    pub fn render(&self, unix_nano: Timestamp) -> Result<String> {
        match self {
            Self::Legacy => Ok(legacy_char(unix_nano).to_string()),
            Self::Rfc3339 => {
                Ok(to_datetime(unix_nano).to_rfc3339_opts(SecondsFormat::Secs, true))
            }
            Self::Pattern(pattern) => {
                let mut out = String::new();
                write!(out, "{}", to_datetime(unix_nano).format(pattern))
                    .map_err(|_| RuleError::TimestampRender(pattern.clone()))?;
                Ok(out)
            }
        }
    }
}

/// Renders `unix_nano` using `layout`, parsing the layout first.
pub fn render_timestamp(unix_nano: Timestamp, layout: &str) -> Result<String> {
    TimestampLayout::parse(layout)?.render(unix_nano)
}

fn to_datetime(unix_nano: Timestamp) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp_nanos(unix_nano)
}

fn legacy_char(unix_nano: Timestamp) -> char {
    u32::try_from(unix_nano)
        .ok()
        .and_then(char::from_u32)
        .unwrap_or(char::REPLACEMENT_CHARACTER)
}
