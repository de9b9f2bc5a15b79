//! The rule contract the traversal engine programs against.
//!
//! The engine constructs a rule, then drives it through:
//!
//! ```text
//! start
//!   { start_shard
//!       { start_tsm | start_wal  apply*  end_tsm | end_wal }*
//!     end_shard }*
//! end
//! ```
//!
//! Hooks running inside a traversal scope take `&self` so a shared instance
//! can be handed to several workers. `start` and `end` take `&mut self`, so
//! they can never overlap with an `apply` call.

use crate::error::Result;
use crate::value::Value;
use std::ops::BitOr;
use std::path::{Path, PathBuf};

/// Capability flags a rule advertises to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RuleFlags(u32);

impl RuleFlags {
    /// TSM files are only read; the engine must not persist rewritten blocks.
    pub const TSM_READ_ONLY: Self = Self(0b01);
    /// WAL segments are only read.
    pub const WAL_READ_ONLY: Self = Self(0b10);
    /// Neither TSM files nor WAL segments are rewritten.
    pub const READ_ONLY: Self = Self(0b11);

    /// Creates flags with nothing set.
    pub fn empty() -> Self {
        Self(0)
    }

    /// Returns the raw bits.
    pub fn bits(self) -> u32 {
        self.0
    }

    /// Returns true if every bit of `other` is set.
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if the rule never asks for TSM or WAL data to be rewritten.
    pub fn is_read_only(self) -> bool {
        self.contains(Self::READ_ONLY)
    }
}

impl BitOr for RuleFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// Identity of the shard being traversed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ShardInfo {
    /// Shard id.
    pub id: u64,
    /// Database owning the shard.
    pub database: String,
    /// Retention policy owning the shard.
    pub retention_policy: String,
    /// Shard directory.
    pub path: PathBuf,
}

/// Replacement data returned by a mutating rule from [`Rule::apply`].
#[derive(Debug, Clone, PartialEq)]
pub struct Rewrite {
    /// Replacement composite key.
    pub key: Vec<u8>,
    /// Replacement values.
    pub values: Vec<Value>,
}

/// A policy applied to every key/value block the engine decodes.
///
/// All hooks besides [`Rule::name`], [`Rule::flags`] and [`Rule::apply`] are
/// no-ops by default.
pub trait Rule: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Capabilities and requirements of this rule.
    fn flags(&self) -> RuleFlags;

    /// Enables or disables check mode.
    fn check_mode(&mut self, _enabled: bool) {}

    /// Sets the span the rule logs under.
    fn with_logger(&mut self, _span: tracing::Span) {}

    /// Called once before traversal begins.
    fn start(&mut self) {}

    /// Called once after every `apply` call has been delivered.
    fn end(&mut self) -> Result<()> {
        Ok(())
    }

    /// Called when the engine enters a shard.
    fn start_shard(&self, _info: &ShardInfo) {}

    /// Called when the engine leaves a shard. An error asks the engine to
    /// abort the shard.
    fn end_shard(&self) -> Result<()> {
        Ok(())
    }

    /// Called when the engine opens a TSM file.
    fn start_tsm(&self, _path: &Path) {}

    /// Called when the engine closes a TSM file.
    fn end_tsm(&self) {}

    /// Called when the engine opens a WAL segment.
    fn start_wal(&self, _path: &Path) {}

    /// Called when the engine closes a WAL segment.
    fn end_wal(&self) {}

    /// Visits one decoded block.
    ///
    /// `Ok(None)` keeps the original data unchanged; read-only rules must
    /// always return it.
    fn apply(&self, key: &[u8], values: &[Value]) -> Result<Option<Rewrite>>;
}

/// Configuration that knows how to build a rule.
pub trait RuleConfig {
    /// An annotated TOML snippet showing how to configure the rule.
    fn sample(&self) -> &'static str;

    /// Builds the configured rule.
    fn build(&self) -> Result<Box<dyn Rule>>;
}
