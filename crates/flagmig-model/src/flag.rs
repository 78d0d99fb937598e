//! Canonical flag model
//!
//! The wire layout keeps the definition flat: `bucketingKey`, `variations`,
//! `targeting` and friends sit next to `trackEvents` and `disable` in the
//! encoded document even though they live in [`FlagDefinition`] here.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::rule::Rule;
use crate::timestamp::{self, Timestamp};

/// Default for `trackEvents` when a source omits it
pub const DEFAULT_TRACK_EVENTS: bool = true;

fn default_track_events() -> bool {
    DEFAULT_TRACK_EVENTS
}

/// Feature flag in the current schema
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flag {
    /// Record evaluation events for this flag
    #[serde(default = "default_track_events")]
    pub track_events: bool,

    /// Flag switched off
    #[serde(rename = "disable", default)]
    pub disabled: bool,

    /// Author-assigned version
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "version::deserialize"
    )]
    pub version: Option<String>,

    /// Variations, targeting and scheduling
    #[serde(flatten)]
    pub definition: FlagDefinition,
}

impl Flag {
    /// Create flag with default switches around a definition
    #[inline]
    #[must_use]
    pub fn new(definition: FlagDefinition) -> Self {
        Self {
            track_events: DEFAULT_TRACK_EVENTS,
            disabled: false,
            version: None,
            definition,
        }
    }

    /// With version
    #[inline]
    #[must_use]
    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    /// With disabled switch
    #[inline]
    #[must_use]
    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// With event tracking switch
    #[inline]
    #[must_use]
    pub fn with_track_events(mut self, track_events: bool) -> Self {
        self.track_events = track_events;
        self
    }
}

impl Default for Flag {
    fn default() -> Self {
        Self::new(FlagDefinition::default())
    }
}

/// Body of a flag: what it serves and to whom
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagDefinition {
    /// Variation name to served value
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub variations: BTreeMap<String, Value>,

    /// Targeting rules, evaluated in order
    #[serde(rename = "targeting", default, skip_serializing_if = "Vec::is_empty")]
    pub rules: Vec<Rule>,

    /// Context attribute used for bucketing instead of the targeting key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucketing_key: Option<String>,

    /// Rule applied when no targeting rule matches
    #[serde(default)]
    pub default_rule: Rule,

    /// Dated changes applied on top of the flag
    #[serde(rename = "scheduledRollout", default, skip_serializing_if = "Vec::is_empty")]
    pub scheduled: Vec<ScheduledStep>,

    /// Experimentation window
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimentation: Option<ExperimentationWindow>,

    /// Free-form metadata, carried through untouched
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub metadata: BTreeMap<String, Value>,
}

/// Start and end of an experiment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExperimentationWindow {
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub start: Option<Timestamp>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub end: Option<Timestamp>,
}

impl ExperimentationWindow {
    /// Window with both bounds
    #[inline]
    #[must_use]
    pub fn between(start: Timestamp, end: Timestamp) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Both bounds present
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }
}

/// Dated change to a flag
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduledStep {
    /// When the change applies
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub date: Option<Timestamp>,

    /// Fields replaced at that date
    #[serde(flatten)]
    pub patch: FlagPatch,
}

/// Partial flag; only the fields present are applied
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlagPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variations: Option<BTreeMap<String, Value>>,

    #[serde(rename = "targeting", default, skip_serializing_if = "Option::is_none")]
    pub rules: Option<Vec<Rule>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucketing_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_rule: Option<Rule>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimentation: Option<ExperimentationWindow>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_events: Option<bool>,

    #[serde(rename = "disable", default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "version::deserialize"
    )]
    pub version: Option<String>,
}

impl FlagPatch {
    /// No field set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Lenient reader for flag versions
///
/// Versions are text in the current schema; older files often carry a bare
/// number, which is kept as its decimal text.
pub mod version {
    use serde::{de::Error as _, Deserialize, Deserializer};
    use serde_json::Number;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Text(String),
        Number(Number),
    }

    /// Deserialize a version from text or a number
    ///
    /// # Errors
    /// Returns error for any other value type
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Repr>::deserialize(deserializer) {
            Ok(Some(Repr::Text(text))) => Ok(Some(text)),
            Ok(Some(Repr::Number(number))) => Ok(Some(number.to_string())),
            Ok(None) => Ok(None),
            Err(_) => Err(D::Error::custom("expected text or a number")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> Flag {
        let mut definition = FlagDefinition::default();
        definition.variations.insert("A".to_string(), json!(true));
        definition.variations.insert("B".to_string(), json!(false));
        definition.bucketing_key = Some("teamId".to_string());
        definition.default_rule = Rule::serving("A");
        Flag::new(definition).with_version("1.2")
    }

    #[test]
    fn definition_is_flattened_on_the_wire() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(
            value,
            json!({
                "trackEvents": true,
                "disable": false,
                "version": "1.2",
                "variations": {"A": true, "B": false},
                "bucketingKey": "teamId",
                "defaultRule": {"variation": "A"}
            })
        );
    }

    #[test]
    fn missing_switches_take_defaults() {
        let flag: Flag = serde_json::from_value(json!({"variations": {"A": 1}})).unwrap();
        assert!(flag.track_events);
        assert!(!flag.disabled);
        assert_eq!(flag.definition.default_rule, Rule::default());
    }

    #[test]
    fn numeric_version_becomes_text() {
        let flag: Flag = serde_json::from_value(json!({"version": 3})).unwrap();
        assert_eq!(flag.version.as_deref(), Some("3"));

        let flag: Flag = serde_json::from_value(json!({"version": 1.5})).unwrap();
        assert_eq!(flag.version.as_deref(), Some("1.5"));
    }

    #[test]
    fn version_rejects_maps() {
        let result: Result<Flag, _> = serde_json::from_value(json!({"version": {"major": 1}}));
        assert!(result.is_err());
    }

    #[test]
    fn scheduled_step_flattens_patch() {
        let step = ScheduledStep {
            date: Some(timestamp::parse("2022-03-01T00:00:00Z").unwrap()),
            patch: FlagPatch {
                disabled: Some(true),
                ..FlagPatch::default()
            },
        };
        let value = serde_json::to_value(&step).unwrap();
        assert_eq!(value, json!({"date": "2022-03-01T00:00:00Z", "disable": true}));

        let back: ScheduledStep = serde_json::from_value(value).unwrap();
        assert_eq!(back, step);
    }

    #[test]
    fn yaml_layout_is_flat() {
        let yaml = serde_yaml::to_string(&sample()).unwrap();
        assert!(yaml.contains("bucketingKey: teamId"));
        assert!(yaml.contains("disable: false"));
        assert!(!yaml.contains("definition"));
    }

    #[test]
    fn experimentation_window_completeness() {
        let start = timestamp::parse("2022-01-01").unwrap();
        let end = timestamp::parse("2022-02-01").unwrap();
        assert!(ExperimentationWindow::between(start, end).is_complete());
        assert!(!ExperimentationWindow {
            start: Some(start),
            end: None
        }
        .is_complete());
    }

    #[test]
    fn empty_patch() {
        assert!(FlagPatch::default().is_empty());
        assert!(!FlagPatch {
            bucketing_key: Some("org".to_string()),
            ..FlagPatch::default()
        }
        .is_empty());
    }
}
