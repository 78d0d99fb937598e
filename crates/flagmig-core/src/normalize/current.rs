//! Current-schema records
//!
//! Fields are already in their final shape; reading them is a typed
//! deserialize per field. `rules` and `scheduled` are accepted as older
//! names of `targeting` and `scheduledRollout`.

use std::collections::BTreeMap;

use flagmig_model::{ExperimentationWindow, FlagDefinition, Rule, ScheduledStep};
use serde_json::Value;

use super::fields::FieldReader;
use super::NormalizeWarning;
use crate::error::MalformedFlagError;

#[derive(Debug, Default)]
pub(crate) struct CurrentRecord {
    variations: Option<BTreeMap<String, Value>>,
    rules: Option<Vec<Rule>>,
    default_rule: Option<Rule>,
    scheduled: Option<Vec<ScheduledStep>>,
    experimentation: Option<ExperimentationWindow>,
}

impl CurrentRecord {
    pub(crate) fn read(
        reader: &FieldReader<'_>,
        warnings: &mut Vec<NormalizeWarning>,
    ) -> Result<Self, MalformedFlagError> {
        Ok(Self {
            variations: reader.read("variations")?,
            rules: reader.read_aliased("targeting", "rules", warnings)?,
            default_rule: reader.read("defaultRule")?,
            scheduled: reader.read_aliased("scheduledRollout", "scheduled", warnings)?,
            experimentation: reader.read("experimentation")?,
        })
    }

    pub(crate) fn into_definition(self) -> FlagDefinition {
        FlagDefinition {
            variations: self.variations.unwrap_or_default(),
            rules: self.rules.unwrap_or_default(),
            default_rule: self.default_rule.unwrap_or_default(),
            scheduled: self.scheduled.unwrap_or_default(),
            experimentation: self.experimentation,
            ..FlagDefinition::default()
        }
    }
}
