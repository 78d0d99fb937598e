//! Targeting rules
//!
//! A rule either serves a single variation, splits traffic by percentage, or
//! ramps a split over time with a progressive rollout.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::timestamp::{self, Timestamp};

/// Targeting rule
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Rule name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Targeting query, evaluated against user context by the flag runtime
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,

    /// Variation served when the rule matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation: Option<String>,

    /// Variation name to traffic weight
    #[serde(rename = "percentage", default, skip_serializing_if = "Option::is_none")]
    pub percentages: Option<BTreeMap<String, f64>>,

    /// Time-based ramp between two splits
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progressive_rollout: Option<ProgressiveRollout>,

    /// Rule switched off
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disable: Option<bool>,
}

impl Rule {
    /// Rule serving a single variation
    #[inline]
    #[must_use]
    pub fn serving(variation: impl Into<String>) -> Self {
        Self {
            variation: Some(variation.into()),
            ..Self::default()
        }
    }

    /// Rule splitting traffic between variations
    #[must_use]
    pub fn split<I, K>(weights: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            percentages: Some(weights.into_iter().map(|(k, w)| (k.into(), w)).collect()),
            ..Self::default()
        }
    }

    /// Rule ramping with a progressive rollout
    #[inline]
    #[must_use]
    pub fn progressive(rollout: ProgressiveRollout) -> Self {
        Self {
            progressive_rollout: Some(rollout),
            ..Self::default()
        }
    }

    /// With name
    #[inline]
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// With query
    #[inline]
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }
}

/// Progressive rollout between two dated steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressiveRollout {
    #[serde(default)]
    pub initial: ProgressiveRolloutStep,
    #[serde(default)]
    pub end: ProgressiveRolloutStep,
}

/// One end of a progressive rollout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressiveRolloutStep {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variation: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "timestamp::option"
    )]
    pub date: Option<Timestamp>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn rule_wire_names() {
        let rule = Rule::split([("A", 20.0), ("B", 80.0)])
            .with_name("beta")
            .with_query("country eq \"FR\"");
        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(
            value,
            json!({
                "name": "beta",
                "query": "country eq \"FR\"",
                "percentage": {"A": 20.0, "B": 80.0}
            })
        );
    }

    #[test]
    fn empty_rule_is_empty_object() {
        let value = serde_json::to_value(Rule::default()).unwrap();
        assert_eq!(value, json!({}));
    }

    #[test]
    fn progressive_rollout_reads_dates() {
        let rule: Rule = serde_json::from_value(json!({
            "progressiveRollout": {
                "initial": {"variation": "B", "percentage": 0, "date": "2024-01-01T05:00:00Z"},
                "end": {"variation": "B", "percentage": 100, "date": "2024-01-05"}
            }
        }))
        .unwrap();

        let rollout = rule.progressive_rollout.unwrap();
        assert_eq!(rollout.initial.percentage, Some(0.0));
        assert_eq!(rollout.end.percentage, Some(100.0));
        assert_eq!(
            rollout.end.date,
            Some(timestamp::parse("2024-01-05T00:00:00Z").unwrap())
        );
    }

    #[test]
    fn percentages_reject_non_numbers() {
        let result: Result<Rule, _> = serde_json::from_value(json!({"percentage": {"A": "lots"}}));
        assert!(result.is_err());
    }
}
