//! The `Codec<A>` contract and the generic combinators every other module
//! builds on: transformation (`xmap`/`exmap`/`narrow`/`widen`), diagnostics
//! (`with_context`, `with_to_string`), framing helpers (`unit`, `complete`,
//! `compact`), variant recasting (`upcast`/`downcast`), half-duplex codecs,
//! and lazy/recursive construction (`lazily`).
//!
//! A `Codec<A>` is realized here as a concrete struct of shared, cloneable
//! closures rather than a trait: instances are plain values (like the rest
//! of this algebra), not trait-object implementors. See `DESIGN.md` for why
//! this departs from the source library's `Codec` *trait*.

use crate::attempt::{Attempt, Error, ErrorKind};
use crate::bitvector::BitVector;
use crate::size_bound::SizeBound;
use std::rc::Rc;
use std::sync::OnceLock;

/// A decoded value plus the unconsumed remainder of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeResult<A> {
    pub value: A,
    pub remainder: BitVector,
}

impl<A> DecodeResult<A> {
    pub fn new(value: A, remainder: BitVector) -> Self {
        Self { value, remainder }
    }
}

type Encoder<A> = Rc<dyn Fn(&A) -> Attempt<BitVector>>;
type Decoder<A> = Rc<dyn Fn(&BitVector) -> Attempt<DecodeResult<A>>>;

/// A bidirectional, failable mapping between values of type `A` and bit vectors.
pub struct Codec<A> {
    size_bound: SizeBound,
    encoder: Encoder<A>,
    decoder: Decoder<A>,
    label: Rc<str>,
}

impl<A> Clone for Codec<A> {
    fn clone(&self) -> Self {
        Self {
            size_bound: self.size_bound,
            encoder: self.encoder.clone(),
            decoder: self.decoder.clone(),
            label: self.label.clone(),
        }
    }
}

impl<A> std::fmt::Debug for Codec<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label)
    }
}

impl<A> Codec<A> {
    /// Builds a codec from its three contracts: a size bound and the two directions.
    pub fn new(
        size_bound: SizeBound,
        encoder: impl Fn(&A) -> Attempt<BitVector> + 'static,
        decoder: impl Fn(&BitVector) -> Attempt<DecodeResult<A>> + 'static,
    ) -> Self {
        Self { size_bound, encoder: Rc::new(encoder), decoder: Rc::new(decoder), label: Rc::from("codec") }
    }

    pub fn size_bound(&self) -> SizeBound {
        self.size_bound
    }

    pub fn encode(&self, a: &A) -> Attempt<BitVector> {
        (self.encoder)(a)
    }

    pub fn decode(&self, bits: &BitVector) -> Attempt<DecodeResult<A>> {
        (self.decoder)(bits)
    }

    /// `decode` discarding the remainder.
    pub fn decode_value(&self, bits: &BitVector) -> Attempt<A> {
        self.decode(bits).map(|r| r.value)
    }
}

impl<A: Clone + 'static> Codec<A> {
    /// Total isomorphism: `A` and `B` encode identically, only the in-memory shape differs.
    pub fn xmap<B: Clone + 'static>(
        &self,
        f: impl Fn(&A) -> B + 'static,
        g: impl Fn(&B) -> A + 'static,
    ) -> Codec<B> {
        let enc_self = self.clone();
        let dec_self = self.clone();
        Codec::new(
            self.size_bound,
            move |b: &B| enc_self.encode(&g(b)),
            move |bits: &BitVector| {
                let r = dec_self.decode(bits)?;
                Ok(DecodeResult::new(f(&r.value), r.remainder))
            },
        )
    }

    /// Partial isomorphism: either direction may fail.
    pub fn exmap<B: Clone + 'static>(
        &self,
        f: impl Fn(&A) -> Attempt<B> + 'static,
        g: impl Fn(&B) -> Attempt<A> + 'static,
    ) -> Codec<B> {
        let enc_self = self.clone();
        let dec_self = self.clone();
        Codec::new(
            self.size_bound,
            move |b: &B| enc_self.encode(&g(b)?),
            move |bits: &BitVector| {
                let r = dec_self.decode(bits)?;
                Ok(DecodeResult::new(f(&r.value)?, r.remainder))
            },
        )
    }

    /// One-sided partiality: decode (the `A -> B` direction) may fail, encode never does.
    pub fn narrow<B: Clone + 'static>(
        &self,
        f: impl Fn(&A) -> Attempt<B> + 'static,
        g: impl Fn(&B) -> A + 'static,
    ) -> Codec<B> {
        let enc_self = self.clone();
        let dec_self = self.clone();
        Codec::new(
            self.size_bound,
            move |b: &B| enc_self.encode(&g(b)),
            move |bits: &BitVector| {
                let r = dec_self.decode(bits)?;
                Ok(DecodeResult::new(f(&r.value)?, r.remainder))
            },
        )
    }

    /// One-sided partiality: encode (the `B -> A` direction) may fail, decode never does.
    pub fn widen<B: Clone + 'static>(
        &self,
        f: impl Fn(&A) -> B + 'static,
        g: impl Fn(&B) -> Attempt<A> + 'static,
    ) -> Codec<B> {
        let enc_self = self.clone();
        let dec_self = self.clone();
        Codec::new(
            self.size_bound,
            move |b: &B| enc_self.encode(&g(b)?),
            move |bits: &BitVector| {
                let r = dec_self.decode(bits)?;
                Ok(DecodeResult::new(f(&r.value), r.remainder))
            },
        )
    }

    /// Wraps both encode and decode errors with a named context frame.
    pub fn with_context(&self, name: impl Into<String>) -> Codec<A> {
        let name: Rc<str> = Rc::from(name.into());
        let name_enc = name.clone();
        let enc_self = self.clone();
        let dec_self = self.clone();
        Codec::new(
            self.size_bound,
            move |a: &A| enc_self.encode(a).map_err(|e| e.push_context(name_enc.to_string())),
            move |bits: &BitVector| dec_self.decode(bits).map_err(|e| e.push_context(name.to_string())),
        )
    }

    /// Debug-label override only; has no effect on the wire.
    pub fn with_to_string(&self, s: impl Into<String>) -> Codec<A> {
        let mut out = self.clone();
        out.label = Rc::from(s.into());
        out
    }

    /// Encodes `()` as `encode(zero)`; decodes and discards the value.
    pub fn unit(&self, zero: A) -> Codec<()> {
        let enc_self = self.clone();
        let dec_self = self.clone();
        Codec::new(
            self.size_bound,
            move |_: &()| enc_self.encode(&zero),
            move |bits: &BitVector| {
                let r = dec_self.decode(bits)?;
                Ok(DecodeResult::new((), r.remainder))
            },
        )
    }

    /// Fails decode if the remainder is non-empty, previewing up to 512 bits of it.
    pub fn complete(&self) -> Codec<A> {
        self.complete_with(CompleteOptions::default())
    }

    /// Like [`Codec::complete`], but with a caller-chosen preview limit instead
    /// of the spec's default 512 bits.
    pub fn complete_with(&self, options: CompleteOptions) -> Codec<A> {
        let enc_self = self.clone();
        let dec_self = self.clone();
        Codec::new(
            self.size_bound,
            move |a: &A| enc_self.encode(a),
            move |bits: &BitVector| {
                let r = dec_self.decode(bits)?;
                if r.remainder.is_empty() {
                    Ok(r)
                } else {
                    Err(remainder_error(&r.remainder, options.preview_bits))
                }
            },
        )
    }

    /// Canonicalizes the encoded bit vector to a contiguous form.
    pub fn compact(&self) -> Codec<A> {
        let enc_self = self.clone();
        let dec_self = self.clone();
        Codec::new(
            self.size_bound,
            move |a: &A| enc_self.encode(a).map(|b| b.compact()),
            move |bits: &BitVector| dec_self.decode(bits),
        )
    }

    /// Safe widening: decode unchanged, encode fails if `extract` rejects the input.
    pub fn upcast<B: Clone + 'static>(
        &self,
        inject: impl Fn(A) -> B + 'static,
        extract: impl Fn(&B) -> Option<A> + 'static,
    ) -> Codec<B> {
        let enc_self = self.clone();
        let dec_self = self.clone();
        Codec::new(
            self.size_bound,
            move |b: &B| match extract(b) {
                Some(a) => enc_self.encode(&a),
                None => Err(Error::msg(format!("not a value of type {}", std::any::type_name::<A>()))),
            },
            move |bits: &BitVector| {
                let r = dec_self.decode(bits)?;
                Ok(DecodeResult::new(inject(r.value), r.remainder))
            },
        )
    }

    /// Safe narrowing: encode unchanged, decode fails if `extract` rejects the decoded value.
    pub fn downcast<B: Clone + 'static>(
        &self,
        inject: impl Fn(B) -> A + 'static,
        extract: impl Fn(&A) -> Option<B> + 'static,
    ) -> Codec<B> {
        let enc_self = self.clone();
        let dec_self = self.clone();
        Codec::new(
            self.size_bound,
            move |b: &B| enc_self.encode(&inject(b.clone())),
            move |bits: &BitVector| {
                let r = dec_self.decode(bits)?;
                match extract(&r.value) {
                    Some(b) => Ok(DecodeResult::new(b, r.remainder)),
                    None => Err(Error::new(ErrorKind::TypeMismatch)),
                }
            },
        )
    }

    /// Half-duplex: decoding always fails with `HalfDuplex`.
    pub fn encode_only(&self) -> Codec<A> {
        let enc_self = self.clone();
        Codec::new(self.size_bound, move |a: &A| enc_self.encode(a), |_| Err(Error::new(ErrorKind::HalfDuplex)))
    }

    /// Half-duplex: encoding always fails with `HalfDuplex`.
    pub fn decode_only(&self) -> Codec<A> {
        let dec_self = self.clone();
        Codec::new(self.size_bound, |_| Err(Error::new(ErrorKind::HalfDuplex)), move |bits: &BitVector| dec_self.decode(bits))
    }
}

/// Configuration for [`Codec::complete_with`]: how much of a non-empty
/// remainder to render into the error message. The teacher's `Options`/
/// `STD_OPTIONS` pattern (a plain `Clone` struct of tunables with a
/// `pub const` default) is the model for this and other small adapter
/// config structs in `adapters.rs`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompleteOptions {
    pub preview_bits: u64,
}

impl CompleteOptions {
    pub const STD: CompleteOptions = CompleteOptions { preview_bits: 512 };
}

impl Default for CompleteOptions {
    fn default() -> Self {
        Self::STD
    }
}

fn remainder_error(remainder: &BitVector, preview_bits: u64) -> Error {
    if remainder.size_less_than(preview_bits + 1) {
        Error::msg(format!("{} bits remaining: 0x{}", remainder.size(), remainder.to_hex()))
    } else {
        Error::msg(format!("more than {preview_bits} bits remaining"))
    }
}

/// Defers construction of a codec until first use, memoizing the result.
/// Required for recursive codecs that would otherwise recurse infinitely at construction time.
pub fn lazily<A, F>(thunk: F) -> Codec<A>
where
    A: Clone + 'static,
    F: Fn() -> Codec<A> + 'static,
{
    let cell: Rc<OnceLock<Codec<A>>> = Rc::new(OnceLock::new());
    let thunk = Rc::new(thunk);
    let cell_enc = cell.clone();
    let thunk_enc = thunk.clone();
    let cell_dec = cell;
    let thunk_dec = thunk;
    Codec::new(
        SizeBound::unknown(),
        move |a: &A| cell_enc.get_or_init(|| thunk_enc()).encode(a),
        move |bits: &BitVector| cell_dec.get_or_init(|| thunk_dec()).decode(bits),
    )
}
