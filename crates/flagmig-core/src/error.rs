//! Error types for flag migration
//!
//! Provides error handling for:
//! - Format selection and decoding (from the codec)
//! - Schema errors on individual flags
//! - Encoding to the target format
//! - Stage machine violations

use flagmig_codec::CodecError;

use crate::migrate::{Stage, StageError};

/// A present field on a flag has a type or shape that cannot be read
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("malformed flag '{flag}': field '{field}': {reason}")]
pub struct MalformedFlagError {
    /// Flag name
    pub flag: String,
    /// Offending field, dotted for nested fields
    pub field: String,
    /// What was wrong with it
    pub reason: String,
}

impl MalformedFlagError {
    /// Create error for a flag field
    pub fn new(flag: impl Into<String>, field: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            flag: flag.into(),
            field: field.into(),
            reason: reason.to_string(),
        }
    }
}

/// Main migration error type
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// Unsupported format, malformed input, or unencodable output
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// A flag could not be normalized
    #[error(transparent)]
    MalformedFlag(#[from] MalformedFlagError),

    /// Pipeline attempted an illegal stage transition
    ///
    /// Guards against bugs in the pipeline itself; no input reaches it.
    #[error(transparent)]
    Stage(#[from] StageError),
}

/// Error categories exposed to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unknown input format tag
    UnsupportedFormat,
    /// Input syntax error
    Decode,
    /// Flag field of the wrong type
    MalformedFlag,
    /// Output could not represent a value
    Encode,
    /// Pipeline bug; never caused by input
    Internal,
}

impl MigrationError {
    /// Category of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Codec(CodecError::UnsupportedFormat(_)) => ErrorKind::UnsupportedFormat,
            Self::Codec(CodecError::Decode(_)) => ErrorKind::Decode,
            Self::Codec(CodecError::Encode { .. }) => ErrorKind::Encode,
            Self::MalformedFlag(_) => ErrorKind::MalformedFlag,
            Self::Stage(_) => ErrorKind::Internal,
        }
    }

    /// Stage the pipeline was in when this error was raised
    #[must_use]
    pub fn stage(&self) -> Stage {
        match self.kind() {
            ErrorKind::UnsupportedFormat | ErrorKind::Decode => Stage::Decode,
            ErrorKind::MalformedFlag => Stage::NormalizeAll,
            ErrorKind::Encode => Stage::Encode,
            ErrorKind::Internal => Stage::Failed,
        }
    }

    /// Flag name, for schema errors
    #[must_use]
    pub fn flag(&self) -> Option<&str> {
        match self {
            Self::MalformedFlag(err) => Some(&err.flag),
            _ => None,
        }
    }
}

/// Result type alias for migration operations
pub type MigrationResult<T> = Result<T, MigrationError>;

#[cfg(test)]
mod tests {
    use super::*;
    use flagmig_codec::{DecodeError, Format};

    #[test]
    fn malformed_flag_display() {
        let err = MalformedFlagError::new("f1", "variations", "expected a map");
        assert_eq!(
            err.to_string(),
            "malformed flag 'f1': field 'variations': expected a map"
        );
    }

    #[test]
    fn kinds_and_stages() {
        let unsupported: MigrationError = CodecError::UnsupportedFormat("xml".into()).into();
        assert_eq!(unsupported.kind(), ErrorKind::UnsupportedFormat);
        assert_eq!(unsupported.stage(), Stage::Decode);

        let decode: MigrationError = CodecError::from(DecodeError::new(Format::Json, "eof")).into();
        assert_eq!(decode.kind(), ErrorKind::Decode);

        let encode: MigrationError = CodecError::encode(Format::Toml, "unit").into();
        assert_eq!(encode.kind(), ErrorKind::Encode);
        assert_eq!(encode.stage(), Stage::Encode);

        let malformed: MigrationError = MalformedFlagError::new("f2", "rollout", "bad").into();
        assert_eq!(malformed.kind(), ErrorKind::MalformedFlag);
        assert_eq!(malformed.stage(), Stage::NormalizeAll);
        assert_eq!(malformed.flag(), Some("f2"));
    }

    #[test]
    fn stage_violation_is_internal() {
        let err: MigrationError = StageError {
            from: Stage::Start,
            to: Stage::Encode,
        }
        .into();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.stage(), Stage::Failed);
        assert_eq!(err.flag(), None);
        assert_eq!(err.to_string(), "illegal stage transition: start -> encode");
    }

    #[test]
    fn codec_errors_display_unchanged() {
        let err: MigrationError = CodecError::UnsupportedFormat("xml".into()).into();
        assert_eq!(err.to_string(), "unsupported format: 'xml'");
    }
}
