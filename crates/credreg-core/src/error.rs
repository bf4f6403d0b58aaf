//! # Error Types
//!
//! Errors raised by the foundational types. Every variant carries enough
//! context to be shown to an operator verbatim.

use thiserror::Error;

/// Top-level error type for `credreg-core`.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Canonicalization failed.
    #[error("canonicalization error: {0}")]
    Canonicalization(#[from] CanonicalizationError),

    /// An account identifier failed validation.
    #[error("invalid address {address:?}: {reason}")]
    InvalidAddress {
        /// The rejected input.
        address: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// An instance identifier was zero or not a number.
    #[error("invalid instance id: {0:?}")]
    InvalidInstanceId(String),

    /// A digest string could not be parsed.
    #[error("invalid digest: {0:?}")]
    InvalidDigest(String),

    /// A timestamp could not be parsed or was not UTC.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Floats have no canonical JCS rendering across implementations.
    #[error("float values are not permitted in canonical representations: {0}")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Error decoding an application argument.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Integer arguments are big-endian and at most eight bytes wide.
    #[error("integer argument is {len} bytes wide, at most 8 are allowed")]
    IntegerTooWide {
        /// Length of the rejected byte string.
        len: usize,
    },
}
