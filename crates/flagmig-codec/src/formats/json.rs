//! JSON codec
//!
//! Uses serde_json; output is pretty-printed with two-space indentation.

use serde::Serialize;

use crate::error::{strip_location, CodecError, DecodeError};
use crate::format::Format;
use crate::raw::RawCollection;

pub(crate) fn decode(bytes: &[u8]) -> Result<RawCollection, DecodeError> {
    serde_json::from_slice(bytes).map_err(|e| {
        let text = e.to_string();
        let err = DecodeError::new(Format::Json, strip_location(&text));
        if e.line() == 0 {
            err
        } else {
            err.at(e.line(), e.column())
        }
    })
}

pub(crate) fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    serde_json::to_vec_pretty(value).map_err(|e| CodecError::encode(Format::Json, e.to_string()))
}
