//! TOML codec
//!
//! Decoding goes through `toml::Table` and converts to JSON values; native
//! date-times become their RFC 3339 text. Encoding fails on values TOML has
//! no form for, such as `null`.

use serde::Serialize;
use serde_json::{Map, Number, Value};

use crate::error::{CodecError, DecodeError};
use crate::format::Format;
use crate::raw::{RawCollection, RawFlagRecord};

pub(crate) fn decode(bytes: &[u8]) -> Result<RawCollection, DecodeError> {
    let text = std::str::from_utf8(bytes)
        .map_err(|e| DecodeError::new(Format::Toml, format!("input is not UTF-8: {e}")))?;

    let table: ::toml::Table = ::toml::from_str(text).map_err(|e| {
        let err = DecodeError::new(Format::Toml, e.message().trim());
        match e.span() {
            Some(span) => {
                let (line, column) = line_column(text, span.start);
                err.at(line, column)
            }
            None => err,
        }
    })?;

    table
        .into_iter()
        .map(|(name, value)| match value {
            ::toml::Value::Table(fields) => {
                let fields = table_to_map(fields)
                    .map_err(|message| DecodeError::new(Format::Toml, format!("flag '{name}': {message}")))?;
                Ok((name, RawFlagRecord::new(fields)))
            }
            other => Err(DecodeError::new(
                Format::Toml,
                format!("flag '{name}' is a {}, expected a table", other.type_str()),
            )),
        })
        .collect()
}

pub(crate) fn encode<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, CodecError> {
    ::toml::to_string(value)
        .map(String::into_bytes)
        .map_err(|e| CodecError::encode(Format::Toml, e.to_string()))
}

fn table_to_map(table: ::toml::Table) -> Result<Map<String, Value>, String> {
    table
        .into_iter()
        .map(|(key, value)| Ok((key, to_json(value)?)))
        .collect()
}

fn to_json(value: ::toml::Value) -> Result<Value, String> {
    Ok(match value {
        ::toml::Value::String(s) => Value::String(s),
        ::toml::Value::Integer(i) => Value::from(i),
        ::toml::Value::Float(f) => Number::from_f64(f)
            .map(Value::Number)
            .ok_or_else(|| format!("non-finite float {f}"))?,
        ::toml::Value::Boolean(b) => Value::Bool(b),
        ::toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        ::toml::Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(to_json)
                .collect::<Result<_, _>>()?,
        ),
        ::toml::Value::Table(table) => Value::Object(table_to_map(table)?),
    })
}

/// 1-based line and column of a byte offset
fn line_column(text: &str, offset: usize) -> (usize, usize) {
    let before = &text.as_bytes()[..offset.min(text.len())];
    let line = before.iter().filter(|b| **b == b'\n').count() + 1;
    let line_start = before
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |i| i + 1);
    (line, before.len() - line_start + 1)
}
