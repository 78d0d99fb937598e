//! Per-format decode and encode
//!
//! Each submodule wraps one serde backend:
//! - TOML via toml
//! - JSON via serde_json
//! - YAML via serde_yaml

use serde::Serialize;

use crate::error::{CodecError, CodecResult};
use crate::format::Format;
use crate::raw::RawCollection;

mod json;
mod toml;
mod yaml;

/// Decode bytes declared as `tag`
///
/// # Errors
/// Returns [`CodecError::UnsupportedFormat`] for an unknown tag, without
/// looking at the bytes, and [`CodecError::Decode`] for malformed input
pub fn decode(bytes: &[u8], tag: &str) -> CodecResult<RawCollection> {
    let format = Format::for_input(tag)?;
    decode_as(bytes, format)
}

/// Decode bytes in a known format
///
/// # Errors
/// Returns [`CodecError::Decode`] for malformed input
pub fn decode_as(bytes: &[u8], format: Format) -> CodecResult<RawCollection> {
    let decoded = match format {
        Format::Toml => toml::decode(bytes),
        Format::Json => json::decode(bytes),
        Format::Yaml => yaml::decode(bytes),
    };
    decoded.map_err(CodecError::from)
}

/// Encode to the format named by `tag`; unknown tags encode YAML
///
/// # Errors
/// Returns [`CodecError::Encode`] if the target cannot represent a value
pub fn encode<T: Serialize + ?Sized>(value: &T, tag: &str) -> CodecResult<Vec<u8>> {
    encode_as(value, Format::for_output(tag))
}

/// Encode to a known format
///
/// # Errors
/// Returns [`CodecError::Encode`] if the target cannot represent a value
pub fn encode_as<T: Serialize + ?Sized>(value: &T, format: Format) -> CodecResult<Vec<u8>> {
    match format {
        Format::Toml => toml::encode(value),
        Format::Json => json::encode(value),
        Format::Yaml => yaml::encode(value),
    }
}
