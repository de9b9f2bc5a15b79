//! Skulk Rules - read-only inspection rules for Alopex Skulk storage.
//!
//! A traversal engine walks shards, TSM files and WAL segments and hands every
//! decoded key/value block to one or more [`Rule`]s. This crate defines that
//! contract and the rules that plug into it.
//!
//! # Components
//!
//! - [`Rule`]: lifecycle hooks driven by the traversal engine
//! - [`StalenessRule`]: reports series whose newest sample is at or before a threshold
//! - [`Formatter`]: text and JSON report encodings
//! - [`RulesConfig`]: TOML configuration building rules
//!
//! # Example
//!
//! ```rust,ignore
//! use alopex_skulk_rules::{Rule, RulesConfig};
//!
//! let config = RulesConfig::from_toml_str(r#"
//!     [[rules.old-series]]
//!     time = "2020-01-01T00:00:00Z"
//!     format = "json"
//! "#)?;
//!
//! for mut rule in config.build_rules()? {
//!     rule.start();
//!     // engine: start_shard / start_tsm / apply* / end_tsm / end_shard ...
//!     rule.end()?;
//! }
//! ```

#![deny(missing_docs)]

pub mod config;
pub mod error;
pub mod format;
pub mod key;
pub mod output;
pub mod rule;
pub mod staleness;
pub mod timestamp;
pub mod value;

pub use config::{RulesConfig, StalenessRuleConfig};
pub use error::{Result, RuleError};
pub use format::{Formatter, FormatterConfig, JsonFormatter, OutputFormat, TextFormatter};
pub use key::{CompositeKeyDecoder, KeyDecoder};
pub use output::{Output, OutputTarget};
pub use rule::{Rewrite, Rule, RuleConfig, RuleFlags, ShardInfo};
pub use staleness::{LastSeen, StaleReport, StalenessRule};
pub use timestamp::TimestampLayout;
pub use value::{FieldValue, Timestamp, Value};
