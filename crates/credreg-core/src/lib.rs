//! # credreg-core: Foundational Types
//!
//! Every other credreg crate depends on this one; it depends on nothing
//! internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtypes for identifiers.** [`Address`], [`InstanceId`] and [`TxId`]
//!    are distinct types with validated constructors. "No instance yet" is
//!    `None`, never a zero identifier.
//!
//! 2. **Digests only over canonical bytes.** Transaction identifiers are
//!    [`sha256_digest`] of [`CanonicalBytes`]; the JCS pipeline rejects floats.
//!
//! 3. **One argument codec.** Integers cross the request boundary as
//!    big-endian byte strings ([`encode_uint`] / [`decode_uint`]); opaque
//!    payloads are [`ByteString`].
//!
//! ## Crate Policy
//!
//! - No `unsafe`.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod codec;
pub mod digest;
pub mod error;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use codec::{decode_uint, encode_args, encode_uint, AppArg, ByteString, UINT_WIDTH};
pub use digest::{sha256_digest, ContentDigest, Sha256Accumulator};
pub use error::{CanonicalizationError, CodecError, CoreError};
pub use identity::{Address, InstanceId, TxId, MAX_ADDRESS_LEN};
pub use temporal::Timestamp;
