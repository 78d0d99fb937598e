//! Migration configuration

use flagmig_codec::Format;
use serde::{Deserialize, Serialize};

/// Settings for one [`Migrator`](crate::Migrator)
///
/// Format tags are kept as given; they are resolved when a run starts, so an
/// unsupported input tag fails that run rather than construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MigrationConfig {
    /// Tag of the source format
    pub input_format: String,
    /// Tag of the target format; unknown tags encode YAML
    pub output_format: String,
    /// Normalize flags on the rayon pool
    pub parallel: bool,
}

impl MigrationConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With input format tag
    #[inline]
    #[must_use]
    pub fn with_input_format(mut self, tag: impl Into<String>) -> Self {
        self.input_format = tag.into();
        self
    }

    /// With output format tag
    #[inline]
    #[must_use]
    pub fn with_output_format(mut self, tag: impl Into<String>) -> Self {
        self.output_format = tag.into();
        self
    }

    /// With parallel normalization
    #[inline]
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            input_format: Format::Yaml.as_str().to_string(),
            output_format: Format::Yaml.as_str().to_string(),
            parallel: false,
        }
    }
}
