//! YAML codec
//!
//! Uses serde_yaml. A blank or `null` document decodes to an empty
//! collection; multi-document streams are rejected.

use serde::Serialize;

use crate::error::{strip_location, CodecError, DecodeError};
use crate::format::Format;
use crate::raw::RawCollection;

pub(crate) fn decode(bytes: &[u8]) -> Result<RawCollection, DecodeError> {
    if is_blank(bytes) {
        return Ok(RawCollection::new());
    }

    serde_yaml::from_slice::<Option<RawCollection>>(bytes)
        .map(Option::unwrap_or_default)
        .map_err(|e| {
            let text = e.to_string();
            let err = DecodeError::new(Format::Yaml, strip_location(&text));
            match e.location() {
                Some(location) => err.at(location.line(), location.column()),
                None => err,
            }
        })
}

/// Only whitespace and comment lines
fn is_blank(bytes: &[u8]) -> bool {
    bytes.split(|b| *b == b'\n').all(|line| {
        line.iter()
            .find(|b| !b.is_ascii_whitespace())
            .map_or(true, |first| *first == b'#')
    })
}

pub(crate) fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    serde_yaml::to_string(value)
        .map(String::into_bytes)
        .map_err(|e| CodecError::encode(Format::Yaml, e.to_string()))
}
