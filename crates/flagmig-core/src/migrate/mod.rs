//! Migration orchestrator
//!
//! Runs one conversion end to end:
//!
//! ```text
//! Start → Decode → NormalizeAll → Encode → Done
//!   └────────┴──────────┴───────────┴──→ Failed
//! ```
//!
//! Normalization is all-or-nothing. The first malformed flag in name order
//! fails the run and no output is produced.

use std::collections::BTreeMap;

use flagmig_codec::{Format, RawCollection};
use flagmig_model::FlagCollection;
use rayon::prelude::*;

use crate::config::MigrationConfig;
use crate::error::{MalformedFlagError, MigrationResult};
use crate::normalize::{normalize, NormalizeWarning, Normalized, SchemaShape};

mod stage;

pub use stage::{allowed_transitions, validate_transition, Stage, StageError};
use stage::StageTracker;

/// Outcome of a successful run
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationReport {
    /// Encoded collection
    pub output: Vec<u8>,
    /// Format the output was written in
    pub output_format: Format,
    /// Number of flags migrated
    pub flags: usize,
    /// Flags upgraded from the legacy shape, in name order
    pub upgraded: Vec<String>,
    /// Warnings per flag; flags without warnings are absent
    pub warnings: BTreeMap<String, Vec<NormalizeWarning>>,
}

impl MigrationReport {
    /// Total warnings across all flags
    #[must_use]
    pub fn warning_count(&self) -> usize {
        self.warnings.values().map(Vec::len).sum()
    }
}

/// Flag migration pipeline
#[derive(Debug, Clone, Default)]
pub struct Migrator {
    config: MigrationConfig,
}

impl Migrator {
    /// Create migrator
    #[must_use]
    pub fn new(config: MigrationConfig) -> Self {
        Self { config }
    }

    /// Get config
    #[inline]
    #[must_use]
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Convert `input` and return the encoded bytes
    ///
    /// # Errors
    /// See [`Migrator::migrate_report`]
    pub fn migrate(&self, input: &[u8]) -> MigrationResult<Vec<u8>> {
        self.migrate_report(input).map(|report| report.output)
    }

    /// Convert `input` and return the bytes with diagnostics
    ///
    /// # Errors
    /// - unsupported input format tag
    /// - input that is not valid for its format
    /// - a flag that cannot be normalized
    /// - a value the output format cannot represent
    pub fn migrate_report(&self, input: &[u8]) -> MigrationResult<MigrationReport> {
        let mut stages = StageTracker::new();
        let result = self.run(input, &mut stages);
        if let Err(err) = &result {
            tracing::debug!(stage = %stages.current(), error = %err, "migration failed");
            stages.fail();
        }
        result
    }

    fn run(&self, input: &[u8], stages: &mut StageTracker) -> MigrationResult<MigrationReport> {
        stages.advance(Stage::Decode)?;
        let input_format = Format::for_input(&self.config.input_format)?;
        let raw = flagmig_codec::decode_as(input, input_format)?;
        tracing::debug!(format = %input_format, flags = raw.len(), "decoded input");

        stages.advance(Stage::NormalizeAll)?;
        let normalized = normalize_all(&raw, self.config.parallel)?;

        stages.advance(Stage::Encode)?;
        let mut flags = FlagCollection::new();
        let mut upgraded = Vec::new();
        let mut warnings = BTreeMap::new();
        for (name, Normalized { flag, shape, warnings: flag_warnings }) in normalized {
            for warning in &flag_warnings {
                tracing::warn!(flag = %name, "{warning}");
            }
            if shape != SchemaShape::Current {
                tracing::debug!(flag = %name, from = %shape, "upgraded legacy flag");
                upgraded.push(name.clone());
            }
            if !flag_warnings.is_empty() {
                warnings.insert(name.clone(), flag_warnings);
            }
            flags.insert(name, flag);
        }

        let output_format = Format::for_output(&self.config.output_format);
        let output = flagmig_codec::encode_as(&flags, output_format)?;

        stages.advance(Stage::Done)?;
        tracing::info!(
            from = %input_format,
            to = %output_format,
            flags = flags.len(),
            upgraded = upgraded.len(),
            "migration complete"
        );

        Ok(MigrationReport {
            output,
            output_format,
            flags: flags.len(),
            upgraded,
            warnings,
        })
    }
}

/// Convert `input` from one format to another with default settings
///
/// # Errors
/// See [`Migrator::migrate_report`]
pub fn migrate(input: &[u8], input_format: &str, output_format: &str) -> MigrationResult<Vec<u8>> {
    Migrator::new(
        MigrationConfig::new()
            .with_input_format(input_format)
            .with_output_format(output_format),
    )
    .migrate(input)
}

/// Normalize every record of a collection
///
/// With `parallel` the records are normalized on the rayon pool. Either way
/// the error returned is the one for the first failing flag in name order.
///
/// # Errors
/// Returns the first [`MalformedFlagError`] in name order
pub fn normalize_all(
    raw: &RawCollection,
    parallel: bool,
) -> Result<BTreeMap<String, Normalized>, MalformedFlagError> {
    if parallel {
        let results: Vec<_> = raw
            .par_iter()
            .map(|(name, record)| (name, normalize(name, record)))
            .collect();
        results
            .into_iter()
            .map(|(name, result)| result.map(|normalized| (name.clone(), normalized)))
            .collect()
    } else {
        raw.iter()
            .map(|(name, record)| normalize(name, record).map(|normalized| (name.clone(), normalized)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use flagmig_codec::RawFlagRecord;
    use serde_json::json;

    fn collection(value: serde_json::Value) -> RawCollection {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn first_failure_in_name_order_wins() {
        let raw = collection(json!({
            "b": {"variations": 1},
            "a": {"variations": {"A": 1}},
            "c": {"trackEvents": "nope"}
        }));
        for parallel in [false, true] {
            let err = normalize_all(&raw, parallel).unwrap_err();
            assert_eq!(err.flag, "b");
            assert_eq!(err.field, "variations");
        }
    }

    #[test]
    fn parallel_matches_sequential() {
        let raw: RawCollection = (0..64)
            .map(|i| {
                let record = if i % 2 == 0 {
                    json!({"true": i, "false": 0, "percentage": i})
                } else {
                    json!({"variations": {"A": i}, "defaultRule": {"variation": "A"}})
                };
                (format!("flag-{i:02}"), RawFlagRecord::try_from(record).unwrap())
            })
            .collect();
        assert_eq!(
            normalize_all(&raw, true).unwrap(),
            normalize_all(&raw, false).unwrap()
        );
    }

    #[test]
    fn report_counts_upgrades_and_warnings() {
        let input = br#"{
            "old": {"true": 1, "false": 0, "percentage": 20},
            "new": {"variations": {"A": 1}, "rules": []},
            "odd": {"variations": {"A": 1}, "owner": "me"}
        }"#;
        let report = Migrator::new(MigrationConfig::new().with_input_format("json"))
            .migrate_report(input)
            .unwrap();

        assert_eq!(report.flags, 3);
        assert_eq!(report.upgraded, vec!["old".to_string()]);
        assert_eq!(report.warning_count(), 2);
        assert!(report.warnings.contains_key("new"));
        assert!(report.warnings.contains_key("odd"));
        assert_eq!(report.output_format, Format::Yaml);
    }

    #[test]
    fn unsupported_input_tag_fails_before_decoding() {
        let err = migrate(b"", "xml", "yaml").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn unknown_output_tag_writes_yaml() {
        let report = Migrator::new(
            MigrationConfig::new()
                .with_input_format("json")
                .with_output_format("xml"),
        )
        .migrate_report(br#"{"f1": {"variations": {"A": 1}}}"#)
        .unwrap();
        assert_eq!(report.output_format, Format::Yaml);
    }

    #[test]
    fn empty_collection_migrates() {
        let output = migrate(b"", "yaml", "json").unwrap();
        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        assert_eq!(value, json!({}));
    }
}
