//! Legacy v0 upgrade
//!
//! v0 flags have three fixed values (`true`, `false`, `default`), an
//! optional `rule` query and a `percentage` of matching users served the
//! `true` value. The upgrade turns the values into the `True`, `False` and
//! `Default` variations and the rule into targeting:
//!
//! - with a rule, matching users get the split and everyone else `Default`
//! - without a rule, everyone gets the split through the default rule
//!
//! `rollout.progressive` replaces the split with a ramp, `rollout.scheduled`
//! becomes the scheduled rollout, `rollout.experimentation` the window.

use std::collections::BTreeMap;

use flagmig_model::{
    timestamp, version, ExperimentationWindow, FlagDefinition, FlagPatch, ProgressiveRollout,
    ProgressiveRolloutStep, Rule, ScheduledStep, Timestamp,
};
use serde::Deserialize;
use serde_json::Value;

use super::fields::FieldReader;
use crate::error::MalformedFlagError;

/// Variation holding the v0 `true` value
pub const TRUE_VARIATION: &str = "True";
/// Variation holding the v0 `false` value
pub const FALSE_VARIATION: &str = "False";
/// Variation holding the v0 `default` value
pub const DEFAULT_VARIATION: &str = "Default";
/// Name given to the upgraded v0 rule
pub const LEGACY_RULE_NAME: &str = "legacyRuleV0";
/// Name given to the upgraded default rule
pub const LEGACY_DEFAULT_RULE_NAME: &str = "legacyDefaultRule";

/// v0 fields of one record
#[derive(Debug, Default)]
pub(crate) struct LegacyRecord {
    rule: Option<String>,
    percentage: Option<f64>,
    true_value: Option<Value>,
    false_value: Option<Value>,
    default_value: Option<Value>,
    rollout: RolloutV0,
    experimentation: Option<ExperimentationWindow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RolloutV0 {
    experimentation: Option<ExperimentationWindow>,
    progressive: Option<ProgressiveV0>,
    scheduled: Option<ScheduledV0>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProgressiveV0 {
    percentage: RampPercentageV0,
    release_ramp: ReleaseRampV0,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RampPercentageV0 {
    initial: Option<f64>,
    end: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ReleaseRampV0 {
    #[serde(with = "timestamp::option")]
    start: Option<Timestamp>,
    #[serde(with = "timestamp::option")]
    end: Option<Timestamp>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScheduledV0 {
    steps: Vec<StepV0>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct StepV0 {
    #[serde(with = "timestamp::option")]
    date: Option<Timestamp>,
    rule: Option<String>,
    percentage: Option<f64>,
    #[serde(rename = "true")]
    true_value: Option<Value>,
    #[serde(rename = "false")]
    false_value: Option<Value>,
    #[serde(rename = "default")]
    default_value: Option<Value>,
    disable: Option<bool>,
    track_events: Option<bool>,
    #[serde(deserialize_with = "version::deserialize")]
    version: Option<String>,
}

impl LegacyRecord {
    pub(crate) fn read(reader: &FieldReader<'_>) -> Result<Self, MalformedFlagError> {
        Ok(Self {
            rule: reader.read("rule")?,
            percentage: reader.read("percentage")?,
            true_value: reader.read("true")?,
            false_value: reader.read("false")?,
            default_value: reader.read("default")?,
            rollout: reader.read("rollout")?.unwrap_or_default(),
            experimentation: reader.read("experimentation")?,
        })
    }

    pub(crate) fn upgrade(self) -> FlagDefinition {
        let strategy = match self.rollout.progressive {
            Some(progressive) => Rule::progressive(progressive.into_rollout()),
            None => split(self.percentage.unwrap_or(0.0)),
        };

        let (rules, default_rule) = match non_blank(self.rule) {
            Some(query) => (
                vec![strategy.with_name(LEGACY_RULE_NAME).with_query(query)],
                Rule::serving(DEFAULT_VARIATION).with_name(LEGACY_DEFAULT_RULE_NAME),
            ),
            None => (Vec::new(), strategy.with_name(LEGACY_DEFAULT_RULE_NAME)),
        };

        let scheduled = self
            .rollout
            .scheduled
            .map(|scheduled| scheduled.steps.into_iter().map(StepV0::upgrade).collect())
            .unwrap_or_default();

        FlagDefinition {
            variations: variations(self.true_value, self.false_value, self.default_value),
            rules,
            default_rule,
            scheduled,
            experimentation: self.rollout.experimentation.or(self.experimentation),
            ..FlagDefinition::default()
        }
    }
}

impl ProgressiveV0 {
    fn into_rollout(self) -> ProgressiveRollout {
        ProgressiveRollout {
            initial: ProgressiveRolloutStep {
                variation: Some(TRUE_VARIATION.to_string()),
                percentage: Some(self.percentage.initial.unwrap_or(0.0)),
                date: self.release_ramp.start,
            },
            end: ProgressiveRolloutStep {
                variation: Some(TRUE_VARIATION.to_string()),
                percentage: Some(self.percentage.end.unwrap_or(100.0)),
                date: self.release_ramp.end,
            },
        }
    }
}

impl StepV0 {
    /// Only the fields the step sets end up in the patch
    fn upgrade(self) -> ScheduledStep {
        let values = variations(self.true_value, self.false_value, self.default_value);
        let split = self.percentage.map(split);

        let mut patch = FlagPatch {
            variations: (!values.is_empty()).then_some(values),
            track_events: self.track_events,
            disabled: self.disable,
            version: self.version,
            ..FlagPatch::default()
        };
        match non_blank(self.rule) {
            Some(query) => {
                let rule = split.unwrap_or_default();
                patch.rules = Some(vec![rule.with_name(LEGACY_RULE_NAME).with_query(query)]);
            }
            None => patch.default_rule = split.map(|rule| rule.with_name(LEGACY_DEFAULT_RULE_NAME)),
        }

        ScheduledStep {
            date: self.date,
            patch,
        }
    }
}

fn split(percentage: f64) -> Rule {
    Rule::split([
        (TRUE_VARIATION, percentage),
        (FALSE_VARIATION, 100.0 - percentage),
    ])
}

fn variations(
    true_value: Option<Value>,
    false_value: Option<Value>,
    default_value: Option<Value>,
) -> BTreeMap<String, Value> {
    [
        (TRUE_VARIATION, true_value),
        (FALSE_VARIATION, false_value),
        (DEFAULT_VARIATION, default_value),
    ]
    .into_iter()
    .filter_map(|(name, value)| value.map(|value| (name.to_string(), value)))
    .collect()
}

fn non_blank(rule: Option<String>) -> Option<String> {
    rule.filter(|query| !query.trim().is_empty())
}
