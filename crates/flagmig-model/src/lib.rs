//! Flag Model
//!
//! The canonical, current-schema representation of a feature flag.
//!
//! # Core Concepts
//!
//! - [`Flag`]: switches (`trackEvents`, `disable`, `version`) around a
//!   [`FlagDefinition`]
//! - [`FlagDefinition`]: variations, targeting rules, default rule, scheduled
//!   rollout, experimentation window and metadata
//! - [`Rule`]: serve a variation, split by percentage, or ramp progressively
//! - [`ScheduledStep`]: a dated [`FlagPatch`]
//!
//! # Example
//!
//! ```rust
//! use flagmig_model::{Flag, FlagDefinition, Rule};
//!
//! let mut definition = FlagDefinition::default();
//! definition.variations.insert("on".to_string(), true.into());
//! definition.default_rule = Rule::serving("on");
//!
//! let flag = Flag::new(definition);
//! assert!(flag.track_events);
//! assert!(!flag.disabled);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod flag;
mod rule;
pub mod timestamp;

pub use flag::{
    version, ExperimentationWindow, Flag, FlagDefinition, FlagPatch, ScheduledStep,
    DEFAULT_TRACK_EVENTS,
};
pub use rule::{ProgressiveRollout, ProgressiveRolloutStep, Rule};
pub use timestamp::{Timestamp, TimestampError};

/// Flag name to flag
pub type FlagCollection = std::collections::BTreeMap<String, Flag>;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
