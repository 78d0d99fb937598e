//! Typed access to raw record fields
//!
//! `null` reads as absent. A present value that does not deserialize into
//! the requested type becomes a [`MalformedFlagError`] naming the flag and
//! the field.

use std::fmt::Display;

use flagmig_codec::RawFlagRecord;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::NormalizeWarning;
use crate::error::MalformedFlagError;

pub(crate) struct FieldReader<'a> {
    flag: &'a str,
    record: &'a RawFlagRecord,
}

impl<'a> FieldReader<'a> {
    pub(crate) fn new(flag: &'a str, record: &'a RawFlagRecord) -> Self {
        Self { flag, record }
    }

    pub(crate) fn keys(&self) -> impl Iterator<Item = &'a str> {
        self.record.keys()
    }

    /// Present and not `null`
    pub(crate) fn value(&self, field: &str) -> Option<&'a Value> {
        self.record.get(field).filter(|value| !value.is_null())
    }

    pub(crate) fn has(&self, field: &str) -> bool {
        self.value(field).is_some()
    }

    pub(crate) fn read<T: DeserializeOwned>(
        &self,
        field: &str,
    ) -> Result<Option<T>, MalformedFlagError> {
        self.read_with(field, |value| T::deserialize(value))
    }

    pub(crate) fn read_with<T, F>(&self, field: &str, read: F) -> Result<Option<T>, MalformedFlagError>
    where
        F: FnOnce(&'a Value) -> Result<T, serde_json::Error>,
    {
        self.value(field)
            .map(|value| read(value).map_err(|e| self.malformed(field, e)))
            .transpose()
    }

    /// Read `canonical`, falling back to an older `alias`
    pub(crate) fn read_aliased<T: DeserializeOwned>(
        &self,
        canonical: &'static str,
        alias: &'static str,
        warnings: &mut Vec<NormalizeWarning>,
    ) -> Result<Option<T>, MalformedFlagError> {
        match (self.has(canonical), self.has(alias)) {
            (true, true) => {
                warnings.push(NormalizeWarning::AliasShadowed { alias, canonical });
                self.read(canonical)
            }
            (false, true) => {
                warnings.push(NormalizeWarning::AliasUsed { alias, canonical });
                self.read(alias)
            }
            _ => self.read(canonical),
        }
    }

    pub(crate) fn malformed(&self, field: &str, reason: impl Display) -> MalformedFlagError {
        MalformedFlagError::new(self.flag, field, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn record(value: Value) -> RawFlagRecord {
        RawFlagRecord::try_from(value).unwrap()
    }

    #[test]
    fn null_is_absent() {
        let raw = record(json!({"version": null}));
        let reader = FieldReader::new("f1", &raw);
        assert!(!reader.has("version"));
        assert_eq!(reader.read::<String>("version").unwrap(), None);
    }

    #[test]
    fn wrong_type_names_flag_and_field() {
        let raw = record(json!({"variations": true}));
        let reader = FieldReader::new("f1", &raw);
        let err = reader.read::<BTreeMap<String, Value>>("variations").unwrap_err();
        assert_eq!(err.flag, "f1");
        assert_eq!(err.field, "variations");
    }

    #[test]
    fn alias_fallback_warns() {
        let raw = record(json!({"rules": []}));
        let reader = FieldReader::new("f1", &raw);
        let mut warnings = Vec::new();
        let rules: Option<Vec<Value>> = reader.read_aliased("targeting", "rules", &mut warnings).unwrap();
        assert_eq!(rules, Some(vec![]));
        assert_eq!(
            warnings,
            vec![NormalizeWarning::AliasUsed {
                alias: "rules",
                canonical: "targeting"
            }]
        );
    }

    #[test]
    fn canonical_wins_over_alias() {
        let raw = record(json!({"targeting": [1], "rules": [2]}));
        let reader = FieldReader::new("f1", &raw);
        let mut warnings = Vec::new();
        let rules: Option<Vec<u8>> = reader.read_aliased("targeting", "rules", &mut warnings).unwrap();
        assert_eq!(rules, Some(vec![1]));
        assert!(matches!(warnings[0], NormalizeWarning::AliasShadowed { .. }));
    }
}
