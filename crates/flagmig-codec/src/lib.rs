//! Flag Codec
//!
//! The boundary between serialized configuration and flag records.
//!
//! # Core Operations
//!
//! - **Decode**: bytes + format tag → [`RawCollection`] of loosely typed
//!   [`RawFlagRecord`]s
//! - **Encode**: any serializable collection → bytes in the target format
//!
//! # Architecture
//!
//! ```text
//! bytes ─→ Format::for_input ─→ toml | serde_json | serde_yaml ─→ RawCollection
//! model ─→ Format::for_output ─→ toml | serde_json | serde_yaml ─→ bytes
//! ```
//!
//! Input tags are strict and output tags are permissive: an unknown input
//! tag is [`CodecError::UnsupportedFormat`], an unknown output tag encodes
//! YAML.
//!
//! # Example
//!
//! ```rust
//! use flagmig_codec::{decode, encode};
//!
//! let raw = decode(br#"{"f1": {"disable": true}}"#, "json").unwrap();
//! let yaml = encode(&raw, "yaml").unwrap();
//! assert_eq!(String::from_utf8(yaml).unwrap(), "f1:\n  disable: true\n");
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod format;
mod formats;
mod raw;

pub use error::{CodecError, CodecResult, DecodeError};
pub use format::Format;
pub use formats::{decode, decode_as, encode, encode_as};
pub use raw::{RawCollection, RawFlagRecord};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
