//! Adapters: pluggable backends for checksums, signatures, ciphers, and
//! certificates, wrapped as codec combinators over `Codec<A>`.
//!
//! No cryptography crate is pulled in here — the traits define the seam,
//! and this module ships one dependency-free reference backend (an
//! additive checksum) so the plumbing is exercised by tests without
//! claiming real security properties. Grounded on the teacher's
//! `Error::BadChecksum` variant and `td0.rs`'s header-field validation
//! (`td_header[0] != b't' || td_header[1] != b'd'`) — both check a small
//! fixed field derived from the payload and fail a specific error variant
//! on mismatch.

use crate::attempt::{Error, ErrorKind};
use crate::bitvector::BitVector;
use crate::codec::{Codec, DecodeResult};
use crate::size_bound::SizeBound;

/// Computes and verifies a fixed-size checksum/signature field over an
/// encoded payload. A `Signer` instance is not assumed thread-safe — see
/// [`SignerFactory`] — and only sees bytes, so it composes with any payload
/// codec via [`signed`].
pub trait Signer {
    /// Width of the signature field, in bits.
    fn width_bits(&self) -> u64;
    fn sign(&mut self, payload: &[u8]) -> Vec<u8>;
    fn verify(&mut self, payload: &[u8], signature: &[u8]) -> bool;
}

/// Thread-safe source of fresh, per-operation `Signer` instances. Mirrors
/// the crate's concurrency model (§5): codecs are freely `Send`/`Sync`
/// shareable, but a `Signer` itself generally is not, so `signed` asks the
/// factory for a new one on every single encode or decode call rather than
/// holding one shared instance.
pub trait SignerFactory {
    fn new_signer(&self) -> Box<dyn Signer>;
}

/// Wraps `inner` so its byte-aligned encoding is followed by a signature
/// field; decoding verifies the signature before decoding the payload.
/// `factory` is asked for a fresh [`Signer`] on every encode and decode.
pub fn signed<A: Clone + 'static>(factory: impl SignerFactory + 'static, inner: Codec<A>) -> Codec<A> {
    use std::rc::Rc;
    let factory = Rc::new(factory);
    let enc_factory = factory.clone();
    let dec_factory = factory;
    let width = enc_factory.new_signer().width_bits();
    Codec::new(
        inner.size_bound() + SizeBound::exact(width),
        move |a: &A| {
            let payload = inner.encode(a)?;
            let bytes = payload.to_bytes()?;
            let sig = enc_factory.new_signer().sign(&bytes);
            Ok(payload.concat(&BitVector::from_bytes(&sig)))
        },
        move |bits: &BitVector| {
            if bits.size() < width {
                return Err(Error::insufficient_bits(width, bits.size(), vec![]));
            }
            let payload_len = bits.size() - width;
            let payload = bits.take(payload_len);
            let sig_bits = bits.slice(payload_len, payload_len + width);
            let payload_bytes = payload.to_bytes()?;
            let sig_bytes = sig_bits.to_bytes()?;
            if !dec_factory.new_signer().verify(&payload_bytes, &sig_bytes) {
                log::debug!("signed: signature verification failed");
                return Err(Error::new(ErrorKind::BackendFailure));
            }
            let r = inner.decode(&payload)?;
            Ok(DecodeResult::new(r.value, r.remainder.concat(&bits.drop(payload_len + width))))
        },
    )
}

/// A one-byte additive checksum: the sum of the payload's bytes, mod 256.
/// Reference backend only — not a cryptographic MAC. Stateless, so one
/// instance can stand in as its own factory.
pub struct AdditiveChecksum;

impl Signer for AdditiveChecksum {
    fn width_bits(&self) -> u64 {
        8
    }
    fn sign(&mut self, payload: &[u8]) -> Vec<u8> {
        vec![payload.iter().fold(0u8, |acc, &b| acc.wrapping_add(b))]
    }
    fn verify(&mut self, payload: &[u8], signature: &[u8]) -> bool {
        signature == self.sign(payload)
    }
}

impl SignerFactory for AdditiveChecksum {
    fn new_signer(&self) -> Box<dyn Signer> {
        Box::new(AdditiveChecksum)
    }
}

/// Symmetric encrypt/decrypt over a byte-aligned payload. Not assumed
/// thread-safe — see [`CipherFactory`].
pub trait Cipher {
    fn encrypt(&mut self, plaintext: &[u8]) -> Vec<u8>;
    fn decrypt(&mut self, ciphertext: &[u8]) -> Option<Vec<u8>>;
}

/// Thread-safe source of fresh, per-operation `Cipher` instances.
pub trait CipherFactory {
    fn new_cipher(&self) -> Box<dyn Cipher>;
}

/// Wraps `inner` so its byte-aligned encoding passes through a fresh
/// [`Cipher`] (obtained from `factory`) before going on the wire, and back
/// through another fresh one when read off the wire. The ciphertext is
/// assumed to consume the entire remainder, like [`crate::primitives::bytes`].
pub fn encrypted<A: Clone + 'static>(factory: impl CipherFactory + 'static, inner: Codec<A>) -> Codec<A> {
    use std::rc::Rc;
    let factory = Rc::new(factory);
    let enc_factory = factory.clone();
    let dec_factory = factory;
    Codec::new(
        SizeBound::unknown(),
        move |a: &A| {
            let plaintext = inner.encode(a)?.to_bytes()?;
            Ok(BitVector::from_bytes(&enc_factory.new_cipher().encrypt(&plaintext)))
        },
        move |bits: &BitVector| {
            let ciphertext = bits.to_bytes()?;
            let plaintext = dec_factory
                .new_cipher()
                .decrypt(&ciphertext)
                .ok_or_else(|| Error::new(ErrorKind::BackendFailure))?;
            let r = inner.decode(&BitVector::from_bytes(&plaintext))?;
            Ok(DecodeResult::new(r.value, BitVector::empty()))
        },
    )
}

/// Validates an encoded payload against a certificate chain before
/// accepting it; the certificate material itself is out-of-band (not
/// carried on the wire by this adapter).
pub trait CertificateFactory {
    fn validate(&self, payload: &[u8]) -> bool;
}

/// Wraps `inner` so decoding additionally requires `factory` to accept the
/// byte-aligned payload; encoding is unaffected.
pub fn certified<A: Clone + 'static>(factory: impl CertificateFactory + 'static, inner: Codec<A>) -> Codec<A> {
    use std::rc::Rc;
    let factory = Rc::new(factory);
    Codec::new(
        inner.size_bound(),
        move |a: &A| inner.encode(a),
        move |bits: &BitVector| {
            let bytes = bits.to_bytes()?;
            if !factory.validate(&bytes) {
                return Err(Error::new(ErrorKind::BackendFailure));
            }
            inner.decode(bits)
        },
    )
}
