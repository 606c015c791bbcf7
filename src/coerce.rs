//! Textual coercion into leaf configuration values.
//!
//! Every scalar type a configuration structure may contain gets a `Bind`
//! implementation here. A leaf only accepts the empty key (the key has been
//! fully consumed by the time resolution reaches it); any remaining key
//! means the caller is probing past a scalar, which is reported as "no
//! match" rather than an error.
//!
//! Dispatch order, first applicable wins:
//!
//! 1. custom text-decodable types (manual `Bind` impls, typically through
//!    [`bind_via_from_str!`](crate::bind_via_from_str)) — their errors
//!    propagate verbatim;
//! 2. timestamps (`chrono::DateTime<Utc>`, RFC 3339);
//! 3. byte sequences (`Vec<u8>`, standard base64);
//! 4. plain scalars: strings, signed and unsigned integers, booleans,
//!    floats.

use base64::Engine as _;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::bind::Bind;

/// Failure to turn a textual value into a leaf's semantic type.
///
/// Carried without the offending key; callers wrap it with the key name and
/// source location when they surface it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoerceError {
    /// Integer parse failure (non-numeric, overflow, or negative input for
    /// an unsigned destination).
    #[error("invalid integer: {0}")]
    Int(#[from] std::num::ParseIntError),

    /// The value is not a recognized boolean literal.
    #[error("invalid boolean literal {0:?}")]
    Bool(String),

    /// Floating point parse failure.
    #[error("invalid float: {0}")]
    Float(#[from] std::num::ParseFloatError),

    /// The value is not valid standard base64.
    #[error("invalid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    /// The value is not a valid RFC 3339 timestamp.
    #[error("invalid timestamp: {0}")]
    Timestamp(#[from] chrono::ParseError),

    /// A custom text decoder rejected the value; the message is the
    /// decoder's own, passed through verbatim.
    #[error("{0}")]
    Custom(String),

    /// The addressed node has a kind that cannot accept text.
    #[error("unsupported type {0}")]
    Unsupported(&'static str),
}

/// Boolean literals in the classic `strconv` style.
fn parse_bool(value: &str) -> Result<bool, CoerceError> {
    match value {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Ok(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Ok(false),
        other => Err(CoerceError::Bool(other.to_string())),
    }
}

macro_rules! bind_parse {
    ($($ty:ty),+ $(,)?) => {$(
        impl Bind for $ty {
            fn bind_text(&mut self, key: &str, _sep: char, value: &str) -> Result<bool, CoerceError> {
                if !key.is_empty() {
                    return Ok(false);
                }
                *self = value.parse::<$ty>()?;
                Ok(true)
            }
        }
    )+};
}

bind_parse!(i8, i16, i32, i64, isize);
bind_parse!(u8, u16, u32, u64, usize);
bind_parse!(f32, f64);

impl Bind for String {
    fn bind_text(&mut self, key: &str, _sep: char, value: &str) -> Result<bool, CoerceError> {
        if !key.is_empty() {
            return Ok(false);
        }
        *self = value.to_string();
        Ok(true)
    }
}

impl Bind for bool {
    fn bind_text(&mut self, key: &str, _sep: char, value: &str) -> Result<bool, CoerceError> {
        if !key.is_empty() {
            return Ok(false);
        }
        *self = parse_bool(value)?;
        Ok(true)
    }
}

impl Bind for Vec<u8> {
    fn bind_text(&mut self, key: &str, _sep: char, value: &str) -> Result<bool, CoerceError> {
        if !key.is_empty() {
            return Ok(false);
        }
        *self = base64::engine::general_purpose::STANDARD.decode(value)?;
        Ok(true)
    }
}

impl Bind for DateTime<Utc> {
    fn bind_text(&mut self, key: &str, _sep: char, value: &str) -> Result<bool, CoerceError> {
        if !key.is_empty() {
            return Ok(false);
        }
        *self = DateTime::parse_from_rfc3339(value)?.with_timezone(&Utc);
        Ok(true)
    }
}

impl Bind for std::path::PathBuf {
    fn bind_text(&mut self, key: &str, _sep: char, value: &str) -> Result<bool, CoerceError> {
        if !key.is_empty() {
            return Ok(false);
        }
        *self = std::path::PathBuf::from(value);
        Ok(true)
    }
}

/// Implement `Bind` for leaf types that already parse themselves.
///
/// The type's `FromStr` error is forwarded verbatim as
/// [`CoerceError::Custom`].
///
/// ```ignore
/// use std::net::SocketAddr;
/// palimpsest::bind_via_from_str!(SocketAddr);
/// ```
#[macro_export]
macro_rules! bind_via_from_str {
    ($($ty:ty),+ $(,)?) => {$(
        impl $crate::Bind for $ty {
            fn bind_text(
                &mut self,
                key: &str,
                _sep: char,
                value: &str,
            ) -> ::std::result::Result<bool, $crate::CoerceError> {
                if !key.is_empty() {
                    return Ok(false);
                }
                *self = value
                    .parse()
                    .map_err(|e| $crate::CoerceError::Custom(::std::string::ToString::to_string(&e)))?;
                Ok(true)
            }
        }
    )+};
}
