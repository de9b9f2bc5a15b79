//! Detection of series that stopped receiving data.
//!
//! [`StalenessRule`] tracks, for every series it sees, the newest timestamp
//! across all blocks, fields, TSM files and WAL segments. When traversal ends
//! it reports every series whose newest timestamp is at or before the
//! threshold, in ascending byte order of the series key.
//!
//! The rule is read-only: [`Rule::apply`] always answers `Ok(None)`.

use crate::error::Result;
use crate::format::{new_formatter, Formatter, FormatterConfig, OutputFormat};
use crate::key::{CompositeKeyDecoder, KeyDecoder};
use crate::rule::{Rewrite, Rule, RuleFlags, ShardInfo};
use crate::value::{Timestamp, Value};
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::Mutex;
use tracing::{debug, info, info_span, warn, Span};

/// Newest observed timestamp per series.
///
/// Values only ever grow. Two maps built from disjoint sets of blocks can be
/// combined with [`LastSeen::merge`] in any order with the same result, which
/// lets a parallel engine keep one map per worker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LastSeen {
    series: HashMap<Vec<u8>, Timestamp>,
}

impl LastSeen {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `timestamp` for `series`, keeping the larger of the stored and
    /// new values. Returns the value stored afterwards.
    pub fn observe(&mut self, series: &[u8], timestamp: Timestamp) -> Timestamp {
        match self.series.get_mut(series) {
            Some(stored) => {
                if timestamp > *stored {
                    *stored = timestamp;
                }
                *stored
            }
            None => {
                self.series.insert(series.to_vec(), timestamp);
                timestamp
            }
        }
    }

    /// Folds `other` into `self` with `max`.
    pub fn merge(&mut self, other: LastSeen) {
        for (series, timestamp) in other.series {
            self.series
                .entry(series)
                .and_modify(|stored| *stored = (*stored).max(timestamp))
                .or_insert(timestamp);
        }
    }

    /// Returns the newest timestamp seen for `series`.
    pub fn get(&self, series: &[u8]) -> Option<Timestamp> {
        self.series.get(series).copied()
    }

    /// Number of distinct series.
    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// Returns true if no series has been observed.
    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// All entries sorted by series key.
    pub fn sorted(&self) -> Vec<(&[u8], Timestamp)> {
        let mut entries: Vec<(&[u8], Timestamp)> = self
            .series
            .iter()
            .map(|(series, ts)| (series.as_slice(), *ts))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Outcome of a staleness report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StaleReport {
    /// Series at or before the threshold.
    pub stale: usize,
    /// Distinct series observed.
    pub total: usize,
}

impl fmt::Display for StaleReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Detected {}/{} series as old.", self.stale, self.total)
    }
}

/// Read-only rule reporting series whose newest sample is not after a
/// threshold.
///
/// # Examples
/// ```rust,ignore
/// use alopex_skulk_rules::staleness::StalenessRule;
/// use alopex_skulk_rules::format::{OutputFormat, FormatterConfig, new_formatter};
///
/// let formatter = new_formatter(OutputFormat::Text, FormatterConfig::default());
/// let mut rule = StalenessRule::new(threshold, Box::new(std::io::stdout()), formatter);
/// rule.apply(b"cpu,host=a#!~#usage", &values)?;
/// rule.end()?;
/// ```
pub struct StalenessRule<D: KeyDecoder = CompositeKeyDecoder> {
    threshold: Timestamp,
    out: Mutex<Box<dyn Write + Send>>,
    formatter: Box<dyn Formatter>,
    decoder: D,
    last_seen: Mutex<LastSeen>,
    span: Span,
    ended: bool,
}

impl StalenessRule {
    /// Creates a rule using the `series#!~#field` key layout.
    pub fn new(
        threshold: Timestamp,
        out: Box<dyn Write + Send>,
        formatter: Box<dyn Formatter>,
    ) -> Self {
        Self::with_decoder(threshold, out, formatter, CompositeKeyDecoder)
    }

    /// Creates a rule writing series names only, in the named format.
    pub fn with_format(
        threshold: Timestamp,
        out: Box<dyn Write + Send>,
        format: &str,
    ) -> Result<Self> {
        let format: OutputFormat = format.parse()?;
        Ok(Self::new(
            threshold,
            out,
            new_formatter(format, FormatterConfig::default()),
        ))
    }
}

impl<D: KeyDecoder> StalenessRule<D> {
    /// Creates a rule with a custom key decoder.
    pub fn with_decoder(
        threshold: Timestamp,
        out: Box<dyn Write + Send>,
        formatter: Box<dyn Formatter>,
        decoder: D,
    ) -> Self {
        Self {
            threshold,
            out: Mutex::new(out),
            formatter,
            decoder,
            last_seen: Mutex::new(LastSeen::new()),
            span: info_span!("rule", name = "old-series"),
            ended: false,
        }
    }

    /// Inclusive staleness threshold in nanoseconds.
    pub fn threshold(&self) -> Timestamp {
        self.threshold
    }

    /// Newest timestamp observed so far for `series`.
    pub fn last_seen(&self, series: &[u8]) -> Option<Timestamp> {
        self.last_seen
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .get(series)
    }

    /// Number of distinct series observed so far.
    pub fn series_count(&self) -> usize {
        self.last_seen
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .len()
    }

    /// Merges a map accumulated elsewhere, e.g. by a worker that decoded
    /// blocks without going through [`Rule::apply`].
    pub fn absorb(&self, partial: LastSeen) {
        self.last_seen
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .merge(partial);
    }

    /// Writes every stale series to the output in sorted order and flushes it.
    pub fn report(&mut self) -> Result<StaleReport> {
        let last_seen = self.last_seen.get_mut().unwrap_or_else(|err| err.into_inner());
        let out = self.out.get_mut().unwrap_or_else(|err| err.into_inner());

        let entries = last_seen.sorted();
        let mut report = StaleReport {
            stale: 0,
            total: entries.len(),
        };
        for (series, max_ts) in entries {
            if max_ts <= self.threshold {
                let series = String::from_utf8_lossy(series);
                self.formatter.format(out.as_mut(), &series, max_ts)?;
                report.stale += 1;
            }
        }
        out.flush()?;
        Ok(report)
    }
}

impl<D: KeyDecoder> Rule for StalenessRule<D> {
    fn name(&self) -> &'static str {
        "old-series"
    }

    fn flags(&self) -> RuleFlags {
        RuleFlags::READ_ONLY
    }

    fn with_logger(&mut self, span: Span) {
        self.span = span;
    }

    fn end(&mut self) -> Result<()> {
        if self.ended {
            warn!(parent: &self.span, "end called more than once, report skipped");
            return Ok(());
        }
        self.ended = true;

        let report = self.report()?;
        let _enter = self.span.enter();
        info!("{}", report);
        Ok(())
    }

    fn start_shard(&self, info: &ShardInfo) {
        debug!(parent: &self.span, shard_id = info.id, database = %info.database, "start shard");
    }

    fn start_tsm(&self, path: &Path) {
        debug!(parent: &self.span, path = %path.display(), "start TSM");
    }

    fn start_wal(&self, path: &Path) {
        debug!(parent: &self.span, path = %path.display(), "start WAL");
    }

    fn apply(&self, key: &[u8], values: &[Value]) -> Result<Option<Rewrite>> {
        let (series, _field) = self.decoder.decode(key);
        let Some(last) = values.last() else {
            warn!(parent: &self.span, key = %String::from_utf8_lossy(key), "empty block ignored");
            return Ok(None);
        };

        self.last_seen
            .lock()
            .unwrap_or_else(|err| err.into_inner())
            .observe(series, last.unix_nano());
        Ok(None)
    }
}
