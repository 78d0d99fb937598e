//! Error types for the codec
//!
//! Provides error handling for:
//! - Format selection (unknown input tag)
//! - Decode operations (bytes → raw collection)
//! - Encode operations (collection → bytes)

use std::fmt;

use crate::format::Format;

/// Errors raised by the codec
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Input format tag is not one of toml, json, yaml
    #[error("unsupported format: '{0}'")]
    UnsupportedFormat(String),

    /// Input is not well-formed for its declared format
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Target format cannot represent a value
    #[error("cannot encode {format}: {message}")]
    Encode {
        /// Target format
        format: Format,
        /// Serializer diagnostic
        message: String,
    },
}

impl CodecError {
    /// Create encode error for format
    pub fn encode(format: Format, message: impl Into<String>) -> Self {
        Self::Encode {
            format,
            message: message.into(),
        }
    }
}

/// Syntax error reported by a format parser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeError {
    /// Declared input format
    pub format: Format,
    /// Parser diagnostic, without location
    pub message: String,
    /// 1-based line, when the parser reports one
    pub line: Option<usize>,
    /// 1-based column, when the parser reports one
    pub column: Option<usize>,
}

impl DecodeError {
    /// Create decode error without location
    pub fn new(format: Format, message: impl Into<String>) -> Self {
        Self {
            format,
            message: message.into(),
            line: None,
            column: None,
        }
    }

    /// With 1-based line and column
    #[inline]
    #[must_use]
    pub fn at(mut self, line: usize, column: usize) -> Self {
        self.line = Some(line);
        self.column = Some(column);
        self
    }
}

impl fmt::Display for DecodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid {} input: {}", self.format, self.message)?;
        if let (Some(line), Some(column)) = (self.line, self.column) {
            write!(f, " (line {line}, column {column})")?;
        }
        Ok(())
    }
}

impl std::error::Error for DecodeError {}

/// Split a parser's trailing "at line X column Y" off its message
pub(crate) fn strip_location(text: &str) -> &str {
    text.rsplit_once(" at line ").map_or(text, |(head, _)| head)
}

/// Result type alias for codec operations
pub type CodecResult<T> = Result<T, CodecError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_format_display() {
        let err = CodecError::UnsupportedFormat("xml".to_string());
        assert_eq!(err.to_string(), "unsupported format: 'xml'");
    }

    #[test]
    fn decode_error_display_with_location() {
        let err = DecodeError::new(Format::Json, "expected value").at(3, 7);
        assert_eq!(
            err.to_string(),
            "invalid json input: expected value (line 3, column 7)"
        );
    }

    #[test]
    fn decode_error_display_without_location() {
        let err = DecodeError::new(Format::Toml, "invalid utf-8");
        assert_eq!(err.to_string(), "invalid toml input: invalid utf-8");
    }

    #[test]
    fn decode_error_converts() {
        let err: CodecError = DecodeError::new(Format::Yaml, "bad").into();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn strips_trailing_location() {
        assert_eq!(strip_location("EOF while parsing at line 1 column 2"), "EOF while parsing");
        assert_eq!(strip_location("no location here"), "no location here");
    }
}
