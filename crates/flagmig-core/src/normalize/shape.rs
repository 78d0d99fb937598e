//! Schema shape detection and dispatch
//!
//! A record is either the legacy v0 layout or the current one. Detection
//! picks a [`SchemaShape`]; [`RecordShape`] holds the fields read for that
//! shape and maps them to a [`FlagDefinition`] with one function per
//! variant.

use std::fmt;

use flagmig_model::FlagDefinition;

use super::current::CurrentRecord;
use super::fields::FieldReader;
use super::legacy::LegacyRecord;
use super::NormalizeWarning;
use crate::error::MalformedFlagError;

/// Explicit schema marker field
pub const CONVERTER_FIELD: &str = "converter";

/// Keys only found in v0 records
pub const LEGACY_V0_FIELDS: [&str; 6] = ["true", "false", "default", "rule", "percentage", "rollout"];

/// Keys read from v0 records; a top-level window is accepted as well
///
/// `experimentation` is read by both shapes and never decides detection.
const LEGACY_V0_READ: [&str; 7] = [
    "true",
    "false",
    "default",
    "rule",
    "percentage",
    "rollout",
    "experimentation",
];

/// Keys only found in current records, including older aliases
pub const CURRENT_FIELDS: [&str; 6] = [
    "variations",
    "targeting",
    "rules",
    "defaultRule",
    "scheduledRollout",
    "scheduled",
];

/// Keys read from current records
const CURRENT_READ: [&str; 7] = [
    "variations",
    "targeting",
    "rules",
    "defaultRule",
    "scheduledRollout",
    "scheduled",
    "experimentation",
];

/// Keys read for every shape
pub const COMMON_FIELDS: [&str; 7] = [
    CONVERTER_FIELD,
    "trackEvents",
    "disable",
    "disabled",
    "version",
    "bucketingKey",
    "metadata",
];

/// Generation of the flag schema a record was written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaShape {
    /// `true`/`false`/`default` values with a single rule and percentage
    LegacyV0,
    /// Named variations with targeting rules
    Current,
}

impl SchemaShape {
    /// Marker used in the `converter` field
    #[inline]
    #[must_use]
    pub fn marker(self) -> &'static str {
        match self {
            Self::LegacyV0 => "v0",
            Self::Current => "v1",
        }
    }

    /// Decide which shape a record uses
    ///
    /// An explicit `converter` marker wins; otherwise a record with legacy
    /// keys and no current keys is v0.
    pub(crate) fn detect(reader: &FieldReader<'_>) -> Result<Self, MalformedFlagError> {
        if let Some(marker) = reader.read::<String>(CONVERTER_FIELD)? {
            return [Self::LegacyV0, Self::Current]
                .into_iter()
                .find(|shape| marker.eq_ignore_ascii_case(shape.marker()))
                .ok_or_else(|| {
                    reader.malformed(CONVERTER_FIELD, format!("unknown schema marker '{marker}'"))
                });
        }

        let legacy = LEGACY_V0_FIELDS.iter().any(|field| reader.has(field));
        let current = CURRENT_FIELDS.iter().any(|field| reader.has(field));
        Ok(if legacy && !current {
            Self::LegacyV0
        } else {
            Self::Current
        })
    }

    /// Shape-specific keys this shape reads
    pub(crate) fn fields(self) -> &'static [&'static str] {
        match self {
            Self::LegacyV0 => &LEGACY_V0_READ,
            Self::Current => &CURRENT_READ,
        }
    }
}

impl fmt::Display for SchemaShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.marker())
    }
}

/// Shape-specific fields of one record
#[derive(Debug)]
pub(crate) enum RecordShape {
    LegacyV0(LegacyRecord),
    Current(CurrentRecord),
}

impl RecordShape {
    pub(crate) fn read(
        shape: SchemaShape,
        reader: &FieldReader<'_>,
        warnings: &mut Vec<NormalizeWarning>,
    ) -> Result<Self, MalformedFlagError> {
        Ok(match shape {
            SchemaShape::LegacyV0 => Self::LegacyV0(LegacyRecord::read(reader)?),
            SchemaShape::Current => Self::Current(CurrentRecord::read(reader, warnings)?),
        })
    }

    pub(crate) fn into_definition(self) -> FlagDefinition {
        match self {
            Self::LegacyV0(record) => record.upgrade(),
            Self::Current(record) => record.into_definition(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flagmig_codec::RawFlagRecord;
    use serde_json::{json, Value};

    fn detect(value: Value) -> Result<SchemaShape, MalformedFlagError> {
        let raw = RawFlagRecord::try_from(value).unwrap();
        SchemaShape::detect(&FieldReader::new("f1", &raw))
    }

    #[test]
    fn legacy_keys_mean_v0() {
        assert_eq!(detect(json!({"true": 1, "false": 0})).unwrap(), SchemaShape::LegacyV0);
        assert_eq!(detect(json!({"percentage": 10})).unwrap(), SchemaShape::LegacyV0);
    }

    #[test]
    fn current_keys_win_over_legacy_keys() {
        let shape = detect(json!({"variations": {}, "percentage": 10})).unwrap();
        assert_eq!(shape, SchemaShape::Current);
    }

    #[test]
    fn bare_record_is_current() {
        assert_eq!(detect(json!({})).unwrap(), SchemaShape::Current);
        assert_eq!(detect(json!({"bucketingKey": "team"})).unwrap(), SchemaShape::Current);
    }

    #[test]
    fn marker_overrides_structure() {
        let shape = detect(json!({"converter": "V0", "variations": {}})).unwrap();
        assert_eq!(shape, SchemaShape::LegacyV0);

        let shape = detect(json!({"converter": "v1", "true": 1})).unwrap();
        assert_eq!(shape, SchemaShape::Current);
    }

    #[test]
    fn unknown_marker_is_malformed() {
        let err = detect(json!({"converter": "v7"})).unwrap_err();
        assert_eq!(err.field, "converter");
        assert!(err.reason.contains("v7"));
    }

    #[test]
    fn window_does_not_hide_legacy_keys() {
        let shape = detect(json!({
            "true": "on",
            "false": "off",
            "default": "off",
            "percentage": 20,
            "rule": "key eq \"a\"",
            "experimentation": {"start": "2021-03-20T00:00:00Z", "end": "2021-03-21T00:00:00Z"}
        }))
        .unwrap();
        assert_eq!(shape, SchemaShape::LegacyV0);
    }

    #[test]
    fn window_alone_is_current() {
        let shape = detect(json!({"experimentation": {"start": "2021-03-20"}})).unwrap();
        assert_eq!(shape, SchemaShape::Current);
        assert!(shape.fields().contains(&"experimentation"));
        assert!(SchemaShape::LegacyV0.fields().contains(&"experimentation"));
    }

    #[test]
    fn null_legacy_key_is_ignored() {
        assert_eq!(detect(json!({"rule": null})).unwrap(), SchemaShape::Current);
    }
}
