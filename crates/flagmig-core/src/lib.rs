//! Flagmig Core - feature flag migration
//!
//! Converts a flag collection between TOML, JSON and YAML and normalizes
//! every flag to the current schema on the way:
//! - Decodes the input into untyped records
//! - Detects legacy v0 records and upgrades them
//! - Reads current records with typed field access
//! - Encodes the normalized collection in the target format
//!
//! # Example
//!
//! ```rust
//! use flagmig_core::{MigrationConfig, Migrator};
//!
//! let input = br#"{"f1": {"variations": {"A": true, "B": false}, "defaultRule": {"variation": "A"}}}"#;
//! let migrator = Migrator::new(MigrationConfig::new().with_input_format("json"));
//!
//! let report = migrator.migrate_report(input)?;
//! assert_eq!(report.flags, 1);
//! assert!(String::from_utf8_lossy(&report.output).contains("trackEvents: true"));
//! # Ok::<(), flagmig_core::MigrationError>(())
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod migrate;
pub mod normalize;

// Re-exports for convenience
pub use config::MigrationConfig;
pub use error::{ErrorKind, MalformedFlagError, MigrationError, MigrationResult};
pub use flagmig_codec::{CodecError, Format, RawCollection, RawFlagRecord};
pub use flagmig_model::{Flag, FlagCollection, FlagDefinition};
pub use migrate::{migrate, normalize_all, MigrationReport, Migrator, Stage, StageError};
pub use normalize::{normalize, NormalizeWarning, Normalized, SchemaShape};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with Flagmig Core
    pub use crate::{
        migrate, normalize, Flag, FlagCollection, Format, MigrationConfig, MigrationError,
        MigrationReport, Migrator, NormalizeWarning, RawFlagRecord,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
