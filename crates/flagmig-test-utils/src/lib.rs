//! Testing utilities for the flagmig workspace
//!
//! Shared fixture documents, model builders and proptest strategies.

#![allow(missing_docs)]

use std::collections::BTreeMap;

use chrono::{DateTime, FixedOffset};
use flagmig_codec::{RawCollection, RawFlagRecord};
use flagmig_model::{
    ExperimentationWindow, Flag, FlagCollection, FlagDefinition, FlagPatch, ProgressiveRollout,
    ProgressiveRolloutStep, Rule, ScheduledStep, Timestamp,
};
use proptest::collection::{btree_map, vec};
use proptest::option;
use proptest::prelude::*;
use serde_json::{json, Value};

/// Current-schema collection with one flag
pub const CURRENT_JSON: &str =
    r#"{"f1":{"variations":{"A":true,"B":false},"defaultRule":{"variation":"A"}}}"#;

/// Legacy v0 collection: one flag with a rule, one without
pub const LEGACY_YAML: &str = r#"
beta-banner:
  rule: key eq "random-key"
  percentage: 30
  "true": "on"
  "false": "off"
  "default": "off"
  trackEvents: false
global-switch:
  percentage: 100
  "true": true
  "false": false
  bucketingKey: teamId
"#;

/// Legacy v0 collection in TOML with a progressive rollout
pub const LEGACY_TOML: &str = r#"
[ramp]
true = "new"
false = "old"
default = "old"

[ramp.rollout.progressive.percentage]
initial = 10
end = 90

[ramp.rollout.progressive.releaseRamp]
start = 2021-03-20T00:00:00Z
end = "2021-03-21T00:00:00Z"
"#;

/// Three flags where the middle one has scalar `variations`
pub const MALFORMED_JSON: &str = r#"{
  "alpha": {"variations": {"A": 1}},
  "bravo": {"variations": "A"},
  "charlie": {"variations": {"C": 3}}
}"#;

/// Raw record from a JSON object
///
/// # Panics
/// Panics when `value` is not an object
#[must_use]
pub fn record(value: Value) -> RawFlagRecord {
    RawFlagRecord::try_from(value).expect("fixture record must be an object")
}

/// Raw collection from `(name, object)` pairs
#[must_use]
pub fn raw_collection<'a>(records: impl IntoIterator<Item = (&'a str, Value)>) -> RawCollection {
    records
        .into_iter()
        .map(|(name, value)| (name.to_string(), record(value)))
        .collect()
}

/// Flag with boolean `A`/`B` variations serving `A` by default
#[must_use]
pub fn boolean_flag() -> Flag {
    let mut definition = FlagDefinition::default();
    definition.variations.insert("A".to_string(), json!(true));
    definition.variations.insert("B".to_string(), json!(false));
    definition.default_rule = Rule::serving("A");
    Flag::new(definition)
}

/// Timestamp from epoch seconds and a whole-hour offset
///
/// # Panics
/// Panics when either argument is out of range
#[must_use]
pub fn timestamp_at(seconds: i64, offset_hours: i32) -> Timestamp {
    let offset = FixedOffset::east_opt(offset_hours * 3600).expect("offset within a day");
    DateTime::from_timestamp(seconds, 0)
        .expect("timestamp in range")
        .with_timezone(&offset)
}

fn arb_timestamp() -> impl Strategy<Value = Timestamp> {
    // 2000-01-01 .. 2040-01-01
    (946_684_800_i64..2_208_988_800, -11_i32..=12).prop_map(|(s, h)| timestamp_at(s, h))
}

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<bool>().prop_map(Value::from),
        (-1000_i64..1000).prop_map(Value::from),
        // quarters are exact in every format
        (-4000_i32..4000).prop_map(|n| Value::from(f64::from(n) / 4.0)),
        "[a-z]{0,8}".prop_map(Value::from),
    ]
}

/// Variation value: a scalar, a list of scalars or a map of scalars
fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        3 => arb_scalar(),
        1 => vec(arb_scalar(), 0..4).prop_map(Value::from),
        1 => btree_map("[a-z]{1,6}", arb_scalar(), 0..4)
            .prop_map(|map| Value::Object(map.into_iter().collect())),
    ]
}

fn arb_metadata() -> impl Strategy<Value = BTreeMap<String, Value>> {
    btree_map("[a-z]{1,6}", "[a-z ]{0,10}".prop_map(Value::from), 0..3)
}

fn arb_percentage() -> impl Strategy<Value = f64> {
    (0_u32..=100).prop_map(f64::from)
}

fn arb_step() -> impl Strategy<Value = ProgressiveRolloutStep> {
    (
        option::of("[A-Z][a-z]{0,4}"),
        option::of(arb_percentage()),
        option::of(arb_timestamp()),
    )
        .prop_map(|(variation, percentage, date)| ProgressiveRolloutStep {
            variation,
            percentage,
            date,
        })
}

fn arb_rule() -> impl Strategy<Value = Rule> {
    (
        option::of("[a-z]{1,6}"),
        option::of("[a-z]{1,6} eq \"[a-z]{1,6}\""),
        option::of("[A-Z][a-z]{0,4}"),
        option::of(btree_map("[A-Z][a-z]{0,4}", arb_percentage(), 1..3)),
        option::weighted(0.2, (arb_step(), arb_step())),
        option::of(any::<bool>()),
    )
        .prop_map(|(name, query, variation, percentages, progressive, disable)| Rule {
            name,
            query,
            variation,
            percentages,
            progressive_rollout: progressive.map(|(initial, end)| ProgressiveRollout { initial, end }),
            disable,
        })
}

fn arb_window() -> impl Strategy<Value = ExperimentationWindow> {
    (option::of(arb_timestamp()), option::of(arb_timestamp()))
        .prop_map(|(start, end)| ExperimentationWindow { start, end })
}

fn arb_patch() -> impl Strategy<Value = FlagPatch> {
    (
        option::of(btree_map("[A-Z][a-z]{0,5}", arb_value(), 0..3)),
        option::of(vec(arb_rule(), 0..2)),
        option::of("[a-z][a-zA-Z]{0,7}"),
        option::of(arb_rule()),
        option::of(arb_window()),
        option::of(arb_metadata()),
        option::of(any::<bool>()),
        option::of(any::<bool>()),
        option::of("v[0-9]{1,2}"),
    )
        .prop_map(
            |(
                variations,
                rules,
                bucketing_key,
                default_rule,
                experimentation,
                metadata,
                track_events,
                disabled,
                version,
            )| FlagPatch {
                variations,
                rules,
                bucketing_key,
                default_rule,
                experimentation,
                metadata,
                track_events,
                disabled,
                version,
            },
        )
}

fn arb_scheduled_step() -> impl Strategy<Value = ScheduledStep> {
    (option::of(arb_timestamp()), arb_patch()).prop_map(|(date, patch)| ScheduledStep { date, patch })
}

/// Current-schema flag without `null` anywhere
pub fn arb_flag() -> impl Strategy<Value = Flag> {
    let definition = (
        btree_map("[A-Z][a-z]{0,5}", arb_value(), 0..4),
        vec(arb_rule(), 0..3),
        option::of("[a-z][a-zA-Z]{0,7}"),
        arb_rule(),
        vec(arb_scheduled_step(), 0..3),
        option::of(arb_window()),
        arb_metadata(),
    )
        .prop_map(
            |(variations, rules, bucketing_key, default_rule, scheduled, experimentation, metadata)| {
                FlagDefinition {
                    variations,
                    rules,
                    bucketing_key,
                    default_rule,
                    scheduled,
                    experimentation,
                    metadata,
                }
            },
        );

    (any::<bool>(), any::<bool>(), option::of("v[0-9]{1,2}"), definition).prop_map(
        |(track_events, disabled, version, definition)| Flag {
            track_events,
            disabled,
            version,
            definition,
        },
    )
}

/// Collection of current-schema flags
pub fn arb_flag_collection() -> impl Strategy<Value = FlagCollection> {
    btree_map("f_[a-z0-9]{1,8}", arb_flag(), 0..5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_are_objects() {
        let raw = raw_collection([("a", json!({"true": 1})), ("b", json!({}))]);
        assert_eq!(raw.len(), 2);
        assert!(raw["a"].contains("true"));
    }

    fn has_null(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::Array(items) => items.iter().any(has_null),
            Value::Object(map) => map.values().any(has_null),
            _ => false,
        }
    }

    proptest! {
        #[test]
        fn generated_flags_have_no_nulls(flag in arb_flag()) {
            prop_assert!(!has_null(&serde_json::to_value(&flag).unwrap()));
        }

        #[test]
        fn variation_values_are_never_null(value in arb_value()) {
            prop_assert!(!has_null(&value));
        }
    }

    #[test]
    fn timestamps_keep_their_offset() {
        let at = timestamp_at(946_684_800, 2);
        assert_eq!(at.offset().local_minus_utc(), 7200);
        assert_eq!(at.timestamp(), 946_684_800);
    }
}
