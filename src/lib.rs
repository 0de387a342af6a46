//! # bitcodec
//!
//! Pure, bidirectional, bit-level binary codecs.
//!
//! A [`Codec<A>`](codec::Codec) is a pair of total functions: an encoder
//! from `A` into a [`BitVector`](bitvector::BitVector), and a decoder from a
//! `BitVector` into an `A` plus the unconsumed remainder. Codecs are values,
//! and they compose: bigger codecs are built out of smaller ones with
//! combinators that mirror the shape of the binary protocol being
//! described.
//!
//! ## Example
//!
//! ```
//! use bitcodec::prelude::*;
//!
//! let c = uint8().flat_zip(|n: &u64| fixed_size_bits(*n * 8, utf8()));
//! let encoded = c.encode(&(4, "test".to_string())).expect("encode failed");
//! assert_eq!(encoded.to_hex(), "0474657374");
//! let decoded = c.decode_value(&encoded).expect("decode failed");
//! assert_eq!(decoded, (4, "test".to_string()));
//! ```
//!
//! ## Layout
//!
//! - [`bitvector`] — the immutable bit-addressable sequence every codec
//!   ultimately encodes into and decodes out of.
//! - [`attempt`] — the `Attempt<A>`/`Error` result type threaded through
//!   every fallible operation.
//! - [`size_bound`] — the lattice of possible encoded lengths.
//! - [`codec`] — the `Codec<A>` contract and its generic transformation
//!   combinators (`xmap`, `exmap`, `with_context`, `complete`, `lazily`, ...).
//! - [`primitives`] — integers, floats, bits, bytes, strings, UUIDs, and the
//!   always-succeeding building blocks (`provide`, `ignore`, `constant`).
//! - [`framing`] — fixed/variable-size framing, `conditional`, and the
//!   repetition combinators.
//! - [`tuple`] — product composition: `append`, `flat_zip`, `consume`,
//!   `derive`, and friends.
//! - [`discriminated`] — the discriminated-union (tagged sum type) codec
//!   builder.
//! - [`adapters`] — checksum/signature, cipher, and certificate wrapper
//!   codecs over pluggable backend traits.
//!
//! This crate never initializes a logger itself (that is an application
//! concern); it only emits `log::debug!`/`log::trace!` calls at decode
//! failure boundaries for an embedding binary to surface.

pub mod adapters;
pub mod attempt;
pub mod bitvector;
pub mod codec;
pub mod discriminated;
pub mod framing;
pub mod primitives;
pub mod size_bound;
pub mod tuple;

/// Re-exports the surface most call sites need: the core types plus every
/// module-level codec constructor, so `use bitcodec::prelude::*;` is enough
/// to assemble a codec without spelling out each submodule path.
pub mod prelude {
    pub use crate::adapters::{
        certified, encrypted, signed, AdditiveChecksum, CertificateFactory, Cipher, CipherFactory, Signer,
        SignerFactory,
    };
    pub use crate::attempt::{decode_valid_value, encode_valid, Attempt, Error, ErrorKind};
    pub use crate::bitvector::BitVector;
    pub use crate::codec::{lazily, Codec, CompleteOptions, DecodeResult};
    pub use crate::discriminated::{discriminated, DiscriminatedBuilder};
    pub use crate::framing::{
        conditional, fixed_size_bits, fixed_size_bytes, list_of_n, repeated, repeated_collecting_errors,
        variable_size_bits, variable_size_bytes, vector_of_n,
    };
    pub use crate::primitives::{
        ascii, bits, bits_n, bool_codec, bool_n, bytes, bytes_n, constant, float32, float32_le, float64,
        float64_le, ignore, int, int16, int16_le, int24, int24_le, int32, int32_le, int64, int64_le, int8,
        int8_le, int_le, long, provide, string, ulong, uint, uint16, uint16_le, uint2, uint24, uint24_le, uint32,
        uint32_le, uint4, uint8, uint8_le, uint_le, utf8, uuid, Ascii, Charset, Utf8, Uuid,
    };
    pub use crate::size_bound::SizeBound;
    pub use crate::tuple::{as_record, derive, drop_leading_unit, drop_trailing_unit};
}
