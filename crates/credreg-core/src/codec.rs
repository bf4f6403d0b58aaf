//! # Application Argument Codec
//!
//! Application arguments travel as opaque byte strings. The orchestrator
//! encodes typed values into them and the evaluator decodes the ones it
//! needs:
//!
//! - strings are their UTF-8 bytes;
//! - unsigned integers are big-endian, eight bytes on the way in;
//!   [`decode_uint`] accepts anything from zero to eight bytes, matching the
//!   platform's byte-to-integer conversion, and rejects wider input.
//!
//! [`ByteString`] is the owned byte-string type used in contexts, records and
//! transactions. It serializes as standard base64 so JSON snapshots stay
//! readable.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CodecError;

/// Width of an encoded unsigned integer argument.
pub const UINT_WIDTH: usize = 8;

/// Encode an integer argument as eight big-endian bytes.
pub fn encode_uint(value: u64) -> Vec<u8> {
    value.to_be_bytes().to_vec()
}

/// Decode a big-endian integer argument of at most eight bytes.
///
/// The empty string decodes to zero.
pub fn decode_uint(bytes: &[u8]) -> Result<u64, CodecError> {
    if bytes.len() > UINT_WIDTH {
        return Err(CodecError::IntegerTooWide { len: bytes.len() });
    }
    Ok(bytes.iter().fold(0u64, |acc, b| (acc << 8) | u64::from(*b)))
}

/// An owned, opaque byte string.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteString(Vec<u8>);

impl ByteString {
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The contents as UTF-8, if they are valid UTF-8.
    pub fn as_utf8(&self) -> Option<&str> {
        std::str::from_utf8(&self.0).ok()
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }
}

impl From<Vec<u8>> for ByteString {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl From<&[u8]> for ByteString {
    fn from(bytes: &[u8]) -> Self {
        Self(bytes.to_vec())
    }
}

impl From<&str> for ByteString {
    fn from(s: &str) -> Self {
        Self(s.as_bytes().to_vec())
    }
}

impl From<String> for ByteString {
    fn from(s: String) -> Self {
        Self(s.into_bytes())
    }
}

impl AsRef<[u8]> for ByteString {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// UTF-8 text is shown as-is, anything else as base64.
impl fmt::Display for ByteString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_utf8() {
            Some(text) => f.write_str(text),
            None => write!(f, "base64:{}", self.to_base64()),
        }
    }
}

impl Serialize for ByteString {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for ByteString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map(Self)
            .map_err(serde::de::Error::custom)
    }
}

/// A typed application argument, as the orchestrator builds it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppArg {
    /// UTF-8 text.
    Str(String),
    /// Unsigned integer, encoded big-endian over [`UINT_WIDTH`] bytes.
    Uint(u64),
    /// Raw bytes passed through untouched.
    Bytes(Vec<u8>),
}

impl AppArg {
    /// Encode into the wire byte string.
    pub fn encode(&self) -> ByteString {
        match self {
            Self::Str(s) => ByteString::from(s.as_str()),
            Self::Uint(n) => ByteString::new(encode_uint(*n)),
            Self::Bytes(b) => ByteString::from(b.as_slice()),
        }
    }
}

/// Encode an argument list in order.
pub fn encode_args(args: &[AppArg]) -> Vec<ByteString> {
    args.iter().map(AppArg::encode).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_uint_is_big_endian_eight_bytes() {
        assert_eq!(encode_uint(4), vec![0, 0, 0, 0, 0, 0, 0, 4]);
        assert_eq!(encode_uint(0x0102), vec![0, 0, 0, 0, 0, 0, 1, 2]);
    }

    #[test]
    fn decode_uint_accepts_short_input() {
        assert_eq!(decode_uint(&[]).unwrap(), 0);
        assert_eq!(decode_uint(&[4]).unwrap(), 4);
        assert_eq!(decode_uint(&[1, 0]).unwrap(), 256);
    }

    #[test]
    fn decode_uint_rejects_nine_bytes() {
        assert_eq!(
            decode_uint(&[0; 9]),
            Err(CodecError::IntegerTooWide { len: 9 })
        );
    }

    #[test]
    fn decode_uint_max() {
        assert_eq!(decode_uint(&[0xff; 8]).unwrap(), u64::MAX);
    }

    #[test]
    fn app_args_encode_in_order() {
        let args = encode_args(&[
            AppArg::Str("issue_diploma".into()),
            AppArg::Str("Alice::BSc::2020".into()),
            AppArg::Uint(4),
        ]);
        assert_eq!(args[0].as_utf8(), Some("issue_diploma"));
        assert_eq!(args[1].as_slice(), b"Alice::BSc::2020");
        assert_eq!(decode_uint(args[2].as_slice()).unwrap(), 4);
    }

    #[test]
    fn byte_string_serializes_as_base64() {
        let bs = ByteString::from("hi");
        assert_eq!(serde_json::to_string(&bs).unwrap(), r#""aGk=""#);
        let back: ByteString = serde_json::from_str(r#""aGk=""#).unwrap();
        assert_eq!(back, bs);
        assert!(serde_json::from_str::<ByteString>(r#""not base64!""#).is_err());
    }

    #[test]
    fn byte_string_display() {
        assert_eq!(ByteString::from("MIT BSc").to_string(), "MIT BSc");
        assert_eq!(ByteString::new(vec![0xff, 0xfe]).to_string(), "base64://4=");
    }
}
