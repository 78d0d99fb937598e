//! Schema normalizer
//!
//! Reads a [`RawFlagRecord`] of any supported vintage and produces a
//! current-schema [`Flag`].
//!
//! # Pipeline
//!
//! ```text
//! RawFlagRecord → detect SchemaShape → RecordShape::{LegacyV0, Current}
//!               → FlagDefinition (+ common fields) → Flag
//! ```
//!
//! Normalization is a pure function. Anything worth telling the user comes
//! back as [`NormalizeWarning`]s on the result; it never changes the model.

use std::collections::BTreeMap;
use std::fmt;

use flagmig_codec::RawFlagRecord;
use flagmig_model::{version, Flag, DEFAULT_TRACK_EVENTS};
use serde_json::Value;

use crate::error::MalformedFlagError;

mod current;
mod fields;
pub mod legacy;
pub mod shape;

use fields::FieldReader;
pub use shape::SchemaShape;
use shape::{RecordShape, COMMON_FIELDS};

/// Flag produced by normalization
#[derive(Debug, Clone, PartialEq)]
pub struct Normalized {
    /// Current-schema flag
    pub flag: Flag,
    /// Shape the record was read as
    pub shape: SchemaShape,
    /// Advisory diagnostics
    pub warnings: Vec<NormalizeWarning>,
}

impl Normalized {
    /// Record was upgraded from an older shape
    #[inline]
    #[must_use]
    pub fn upgraded(&self) -> bool {
        self.shape != SchemaShape::Current
    }
}

/// Advisory diagnostic raised while normalizing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NormalizeWarning {
    /// Field not part of the detected shape; ignored
    UnknownField(String),
    /// Older field name read in place of the current one
    AliasUsed {
        alias: &'static str,
        canonical: &'static str,
    },
    /// Both names present; the older one was ignored
    AliasShadowed {
        alias: &'static str,
        canonical: &'static str,
    },
    /// Experimentation window missing its start or end
    IncompleteExperimentation,
}

impl fmt::Display for NormalizeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField(field) => write!(f, "unknown field '{field}' ignored"),
            Self::AliasUsed { alias, canonical } => {
                write!(f, "field '{alias}' read as '{canonical}'")
            }
            Self::AliasShadowed { alias, canonical } => {
                write!(f, "field '{alias}' ignored, '{canonical}' is also set")
            }
            Self::IncompleteExperimentation => {
                f.write_str("experimentation window is missing its start or end")
            }
        }
    }
}

/// Normalize one flag record to the current schema
///
/// Absent fields take their defaults (`trackEvents = true`,
/// `disable = false`, everything else empty or unset).
///
/// # Errors
/// Returns [`MalformedFlagError`] when a present field cannot be read as
/// its expected type
pub fn normalize(name: &str, record: &RawFlagRecord) -> Result<Normalized, MalformedFlagError> {
    let reader = FieldReader::new(name, record);
    let mut warnings = Vec::new();

    let shape = SchemaShape::detect(&reader)?;
    let track_events: Option<bool> = reader.read("trackEvents")?;
    let disabled: Option<bool> = reader.read_aliased("disable", "disabled", &mut warnings)?;
    let version = reader.read_with("version", |value| version::deserialize(value))?.flatten();
    let bucketing_key: Option<String> = reader.read("bucketingKey")?;
    let metadata: Option<BTreeMap<String, Value>> = reader.read("metadata")?;

    let body = RecordShape::read(shape, &reader, &mut warnings)?;

    warnings.extend(
        reader
            .keys()
            .filter(|key| !COMMON_FIELDS.contains(key) && !shape.fields().contains(key))
            .map(|key| NormalizeWarning::UnknownField(key.to_string())),
    );

    let mut definition = body.into_definition();
    definition.bucketing_key = bucketing_key;
    definition.metadata = metadata.unwrap_or_default();

    if definition
        .experimentation
        .as_ref()
        .is_some_and(|window| !window.is_complete())
    {
        warnings.push(NormalizeWarning::IncompleteExperimentation);
    }

    Ok(Normalized {
        flag: Flag {
            track_events: track_events.unwrap_or(DEFAULT_TRACK_EVENTS),
            disabled: disabled.unwrap_or(false),
            version,
            definition,
        },
        shape,
        warnings,
    })
}
