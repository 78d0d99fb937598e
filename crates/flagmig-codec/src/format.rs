//! Format selection
//!
//! Every format tag in the workspace goes through [`Format::for_input`] or
//! [`Format::for_output`]. Input is strict: an unknown tag is an error before
//! any byte is parsed. Output is permissive: anything other than `toml` or
//! `json` encodes YAML.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use crate::error::CodecError;

/// Serialized configuration format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// TOML v1.0
    Toml,
    /// JSON
    Json,
    /// YAML 1.2
    Yaml,
}

impl Format {
    /// All supported formats
    pub const ALL: [Self; 3] = [Self::Toml, Self::Json, Self::Yaml];

    /// Canonical lowercase tag
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }

    /// File extensions (without dot)
    #[inline]
    #[must_use]
    pub fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Toml => &["toml"],
            Self::Json => &["json"],
            Self::Yaml => &["yaml", "yml"],
        }
    }

    /// Resolve an input tag, case-insensitive
    ///
    /// # Errors
    /// Returns [`CodecError::UnsupportedFormat`] for any other tag
    pub fn for_input(tag: &str) -> Result<Self, CodecError> {
        Self::ALL
            .into_iter()
            .find(|format| tag.eq_ignore_ascii_case(format.as_str()))
            .ok_or_else(|| CodecError::UnsupportedFormat(tag.to_string()))
    }

    /// Resolve an output tag; unknown and empty tags fall back to YAML
    #[must_use]
    pub fn for_output(tag: &str) -> Self {
        match Self::for_input(tag) {
            Ok(Self::Toml) => Self::Toml,
            Ok(Self::Json) => Self::Json,
            _ => Self::Yaml,
        }
    }

    /// Infer from a file extension
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        Self::ALL.into_iter().find(|format| {
            format
                .extensions()
                .iter()
                .any(|candidate| ext.eq_ignore_ascii_case(candidate))
        })
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::for_input(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn input_tags_are_case_insensitive() {
        assert_eq!(Format::for_input("TOML").unwrap(), Format::Toml);
        assert_eq!(Format::for_input("Json").unwrap(), Format::Json);
        assert_eq!(Format::for_input("yaml").unwrap(), Format::Yaml);
    }

    #[test]
    fn unknown_input_tag_is_rejected() {
        for tag in ["xml", "", "yml", " json"] {
            let err = Format::for_input(tag).unwrap_err();
            assert!(matches!(err, CodecError::UnsupportedFormat(ref t) if t == tag));
        }
    }

    #[test]
    fn output_falls_back_to_yaml() {
        assert_eq!(Format::for_output("toml"), Format::Toml);
        assert_eq!(Format::for_output("JSON"), Format::Json);
        assert_eq!(Format::for_output("yaml"), Format::Yaml);
        assert_eq!(Format::for_output(""), Format::Yaml);
        assert_eq!(Format::for_output("xml"), Format::Yaml);
    }

    #[test]
    fn format_from_path() {
        assert_eq!(Format::from_path(Path::new("flags.toml")), Some(Format::Toml));
        assert_eq!(Format::from_path(Path::new("/etc/flags.JSON")), Some(Format::Json));
        assert_eq!(Format::from_path(Path::new("flags.yml")), Some(Format::Yaml));
        assert_eq!(Format::from_path(Path::new("flags.txt")), None);
        assert_eq!(Format::from_path(Path::new("flags")), None);
    }

    #[test]
    fn parse_via_from_str() {
        let format: Format = "yaml".parse().unwrap();
        assert_eq!(format.to_string(), "yaml");
    }
}
