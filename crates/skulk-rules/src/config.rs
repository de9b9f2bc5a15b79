//! TOML configuration for rules.
//!
//! ```toml
//! [[rules.old-series]]
//! time = "2020-01-01T00:08:00Z"
//! out = "stdout"
//! format = "text"
//! timestamp = true
//! timestamp_layout = "RFC3339"
//! ```

use crate::error::{Result, RuleError};
use crate::format::{new_formatter, FormatterConfig, OutputFormat};
use crate::output::OutputTarget;
use crate::rule::{Rule, RuleConfig};
use crate::staleness::StalenessRule;
use crate::value::Timestamp;
use chrono::DateTime;
use serde::Deserialize;
use tracing::debug;

const OLD_SERIES_SAMPLE: &str = r#"
[[rules.old-series]]
    time = "2020-01-01T00:08:00Z"
    out = "stdout"
    # out = "out_file.log"
    format = "text"
    # format = "json"
    timestamp = true
    # timestamp_layout = "RFC3339"
"#;

/// Configuration of the old-series rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct StalenessRuleConfig {
    /// RFC 3339 threshold; series last seen at or before it are reported.
    #[serde(alias = "Time")]
    pub time: String,
    /// `""`/`"stdout"`, `"stderr"`, or a file path.
    #[serde(alias = "Out")]
    pub out: String,
    /// `"text"` (default when empty) or `"json"`.
    #[serde(alias = "Format")]
    pub format: String,
    /// Whether timestamps are written next to series.
    #[serde(alias = "Timestamp")]
    pub timestamp: bool,
    /// Timestamp layout: empty, `"RFC3339"`, or a strftime pattern.
    #[serde(alias = "TimestampLayout")]
    pub timestamp_layout: String,
}

impl StalenessRuleConfig {
    /// Parses the threshold into nanoseconds since the epoch.
    pub fn threshold(&self) -> Result<Timestamp> {
        let parsed =
            DateTime::parse_from_rfc3339(&self.time).map_err(|source| RuleError::InvalidTime {
                value: self.time.clone(),
                source,
            })?;
        // Outside the i64 nanosecond range, clamp to the nearest representable instant.
        Ok(parsed.timestamp_nanos_opt().unwrap_or(if parsed.timestamp() < 0 {
            i64::MIN
        } else {
            i64::MAX
        }))
    }

    /// Selected output format.
    pub fn output_format(&self) -> Result<OutputFormat> {
        if self.format.is_empty() {
            return Ok(OutputFormat::default());
        }
        self.format.parse()
    }

    /// Builds the concrete rule.
    pub fn build_rule(&self) -> Result<StalenessRule> {
        let threshold = self.threshold()?;
        let format = self.output_format()?;
        let formatter_config = FormatterConfig::new(self.timestamp, &self.timestamp_layout)?;
        let target = OutputTarget::parse(&self.out);
        let out = target.open()?;

        debug!(threshold, format = %format, target = ?target, "built old-series rule");
        Ok(StalenessRule::new(
            threshold,
            Box::new(out),
            new_formatter(format, formatter_config),
        ))
    }
}

impl RuleConfig for StalenessRuleConfig {
    fn sample(&self) -> &'static str {
        OLD_SERIES_SAMPLE
    }

    fn build(&self) -> Result<Box<dyn Rule>> {
        Ok(Box::new(self.build_rule()?))
    }
}

/// Rule tables of a configuration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuleTables {
    /// `[[rules.old-series]]` entries.
    #[serde(rename = "old-series", alias = "old-serie")]
    pub old_series: Vec<StalenessRuleConfig>,
}

/// A configuration document listing the rules to run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Configured rules.
    pub rules: RuleTables,
}

impl RulesConfig {
    /// Parses a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Every configured rule, in declaration order.
    pub fn configs(&self) -> Vec<&dyn RuleConfig> {
        self.rules
            .old_series
            .iter()
            .map(|config| config as &dyn RuleConfig)
            .collect()
    }

    /// Builds every configured rule, stopping at the first failure.
    pub fn build_rules(&self) -> Result<Vec<Box<dyn Rule>>> {
        self.configs()
            .into_iter()
            .map(|config| config.build())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(time: &str) -> StalenessRuleConfig {
        StalenessRuleConfig {
            time: time.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_threshold_parse() {
        assert_eq!(
            config("1970-01-01T00:00:01Z").threshold().unwrap(),
            1_000_000_000
        );
        assert_eq!(config("1970-01-01T01:00:00+01:00").threshold().unwrap(), 0);
    }

    #[test]
    fn test_invalid_time_rejected() {
        let err = config("2020-01-01 00:08:00").build_rule().err().unwrap();
        assert!(matches!(err, RuleError::InvalidTime { .. }));
        let err = config("").build_rule().err().unwrap();
        assert!(err.is_config());
    }

    #[test]
    fn test_unknown_format_rejected() {
        let mut cfg = config("2020-01-01T00:00:00Z");
        cfg.format = "xml".to_string();
        let err = cfg.build().err().unwrap();
        assert!(matches!(err, RuleError::UnsupportedFormat(ref name) if name == "xml"));
    }

    #[test]
    fn test_default_format_is_text() {
        assert_eq!(
            config("2020-01-01T00:00:00Z").output_format().unwrap(),
            OutputFormat::Text
        );
    }

    #[test]
    fn test_invalid_layout_rejected() {
        let mut cfg = config("2020-01-01T00:00:00Z");
        cfg.timestamp = true;
        cfg.timestamp_layout = "%Q".to_string();
        assert!(matches!(
            cfg.build_rule().err().unwrap(),
            RuleError::InvalidTimestampLayout(_)
        ));
    }

    #[test]
    fn test_output_file_created() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("old.log");
        let mut cfg = config("2020-01-01T00:00:00Z");
        cfg.out = path.to_string_lossy().into_owned();
        let rule = cfg.build_rule().unwrap();
        assert!(path.exists());
        assert_eq!(rule.threshold(), 1_577_836_800_000_000_000);
    }

    #[test]
    fn test_parse_document() {
        let doc = RulesConfig::from_toml_str(
            r#"
            [[rules.old-series]]
            time = "2020-01-01T00:00:00Z"
            format = "json"
            timestamp = true
            timestamp_layout = "RFC3339"

            [[rules.old-series]]
            Time = "2021-01-01T00:00:00Z"
            Out = "stderr"
            TimestampLayout = "%Y"
            "#,
        )
        .unwrap();
        assert_eq!(doc.rules.old_series.len(), 2);
        assert_eq!(doc.rules.old_series[0].format, "json");
        assert!(doc.rules.old_series[0].timestamp);
        assert_eq!(doc.rules.old_series[1].out, "stderr");
        assert_eq!(doc.rules.old_series[1].timestamp_layout, "%Y");

        let rules = doc.build_rules().unwrap();
        assert_eq!(rules.len(), 2);
        assert!(rules.iter().all(|rule| rule.flags().is_read_only()));
    }

    #[test]
    fn test_sample_is_buildable() {
        let doc = RulesConfig::from_toml_str(StalenessRuleConfig::default().sample()).unwrap();
        assert_eq!(doc.rules.old_series.len(), 1);
        let rules = doc.build_rules().unwrap();
        assert_eq!(rules[0].name(), "old-series");
    }

    #[test]
    fn test_malformed_document() {
        let err =
            RulesConfig::from_toml_str("[[rules.old-series]]\ntimestamp = \"yes\"").unwrap_err();
        assert!(matches!(err, RuleError::Config(_)));
    }
}
