//! Discriminated-union codec: a fluent builder over a discriminator codec
//! and an ordered list of typed cases, mirroring a tagged `enum` on the wire
//! as `discriminator || case payload`.
//!
//! Rust has no runtime `Typeable` dispatch, so case selection on encode
//! works the way `choice` already does in this crate: each case's codec is
//! tried in registration order and the first one whose encode succeeds
//! wins. Decoding is exact — the discriminator value is looked up directly
//! against the registered cases.

use crate::attempt::{Error, ErrorKind};
use crate::bitvector::BitVector;
use crate::codec::{Codec, DecodeResult};
use crate::size_bound::SizeBound;
use std::rc::Rc;

struct Case<D, A> {
    discriminator: D,
    codec: Codec<A>,
}

/// Adapts a predicate/injector pair into a `Codec<A>` case the way
/// `typecase` expects: an `A` that `matches` rejects, or whose extracted
/// payload `inject` cannot round-trip, fails `encode`/`decode` the same as
/// `typecase`'s `exmap`-built cases do.
fn case_from_predicate<A, V, M, I, J>(matches: M, inject: I, project: J, payload: Codec<V>) -> Codec<A>
where
    A: Clone + 'static,
    V: Clone + 'static,
    M: Fn(&A) -> bool + 'static,
    I: Fn(V) -> A + 'static,
    J: Fn(&A) -> Option<V> + 'static,
{
    payload.exmap(
        move |v: &V| Ok(inject(v.clone())),
        move |a: &A| {
            if matches(a) {
                project(a).ok_or_else(|| Error::msg("case predicate matched but projection failed"))
            } else {
                Err(Error::msg("value does not belong to this case"))
            }
        },
    )
}

/// Builder for a discriminated-union codec over value type `A`, tagged by
/// discriminator values of type `D`.
pub struct DiscriminatedBuilder<D, A> {
    discriminator_codec: Option<Codec<D>>,
    cases: Vec<Case<D, A>>,
}

/// Starts building a discriminated-union codec for `A`, tagged by `D`.
pub fn discriminated<D: Clone + PartialEq + 'static, A: Clone + 'static>() -> DiscriminatedBuilder<D, A> {
    DiscriminatedBuilder { discriminator_codec: None, cases: Vec::new() }
}

impl<D: Clone + PartialEq + 'static, A: Clone + 'static> DiscriminatedBuilder<D, A> {
    /// Sets the codec used to read/write the tag value.
    pub fn by(mut self, discriminator_codec: Codec<D>) -> Self {
        self.discriminator_codec = Some(discriminator_codec);
        self
    }

    /// Registers one case: values tagged `discriminator` are encoded/decoded with `codec`.
    pub fn typecase(mut self, discriminator: D, codec: Codec<A>) -> Self {
        self.cases.push(Case { discriminator, codec });
        self
    }

    /// Registers one case with an explicit membership predicate and
    /// injector/projector pair, rather than relying on `codec`'s own
    /// `exmap` to reject non-members. Equivalent in result to `typecase`,
    /// but spells out matching as data instead of encode-failure.
    pub fn case_p<V, M, I, J>(self, discriminator: D, matches: M, inject: I, project: J, payload: Codec<V>) -> Self
    where
        V: Clone + 'static,
        M: Fn(&A) -> bool + 'static,
        I: Fn(V) -> A + 'static,
        J: Fn(&A) -> Option<V> + 'static,
    {
        self.typecase(discriminator, case_from_predicate(matches, inject, project, payload))
    }

    /// Finishes the builder, producing the combined codec.
    ///
    /// Panics if `by` was never called — this is a builder misuse, not a
    /// runtime data error, so it is reported at construction rather than
    /// folded into `Attempt`.
    pub fn build(self) -> Codec<A> {
        let discriminator_codec =
            self.discriminator_codec.expect("discriminated builder requires `.by(...)` before `.build()`");
        let cases: Rc<Vec<Case<D, A>>> = Rc::new(self.cases);
        let enc_tag = discriminator_codec.clone();
        let dec_tag = discriminator_codec;
        let enc_cases = cases.clone();
        let dec_cases = cases;
        Codec::new(
            enc_tag.size_bound() + SizeBound::unknown(),
            move |a: &A| {
                for case in enc_cases.iter() {
                    if let Ok(payload) = case.codec.encode(a) {
                        let tag = enc_tag.encode(&case.discriminator)?;
                        return Ok(tag.concat(&payload));
                    }
                }
                Err(Error::new(ErrorKind::DiscriminatorMismatch))
            },
            move |bits: &BitVector| {
                let tag = dec_tag.decode(bits)?;
                for case in dec_cases.iter() {
                    if case.discriminator == tag.value {
                        let r = case.codec.decode(&tag.remainder)?;
                        return Ok(DecodeResult::new(r.value, r.remainder));
                    }
                }
                log::debug!("discriminated: no case registered for decoded tag");
                Err(Error::new(ErrorKind::DiscriminatorMismatch))
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{int32, uint8, utf8};

    #[derive(Debug, Clone, PartialEq)]
    enum Shape {
        Circle(i64),
        Square(i64),
        Label(String),
    }

    fn shape_codec() -> Codec<Shape> {
        discriminated::<u64, Shape>()
            .by(uint8())
            .typecase(
                0,
                int32().exmap(
                    |r: &i64| Ok(Shape::Circle(*r)),
                    |s: &Shape| match s {
                        Shape::Circle(r) => Ok(*r),
                        _ => Err(Error::msg("not a circle")),
                    },
                ),
            )
            .typecase(
                1,
                int32().exmap(
                    |side: &i64| Ok(Shape::Square(*side)),
                    |s: &Shape| match s {
                        Shape::Square(side) => Ok(*side),
                        _ => Err(Error::msg("not a square")),
                    },
                ),
            )
            .typecase(
                2,
                utf8().exmap(
                    |s: &String| Ok(Shape::Label(s.clone())),
                    |s: &Shape| match s {
                        Shape::Label(text) => Ok(text.clone()),
                        _ => Err(Error::msg("not a label")),
                    },
                ),
            )
            .build()
    }

    #[test]
    fn encodes_with_matching_case_tag() {
        let c = shape_codec();
        let bits = c.encode(&Shape::Circle(5)).unwrap();
        assert_eq!(bits.to_hex(), "0000000005");
        let bits = c.encode(&Shape::Square(9)).unwrap();
        assert_eq!(bits.to_hex(), "0100000009");
    }

    #[test]
    fn decodes_by_looking_up_the_tag() {
        let c = shape_codec();
        let bits = BitVector::from_hex("0000000007").unwrap();
        assert_eq!(c.decode(&bits).unwrap().value, Shape::Circle(7));
        let bits = BitVector::from_hex("0274657374").unwrap();
        assert_eq!(c.decode(&bits).unwrap().value, Shape::Label("test".to_string()));
    }

    #[test]
    fn unknown_tag_fails_with_discriminator_mismatch() {
        let c = shape_codec();
        let bits = BitVector::from_hex("ff00000000").unwrap();
        let err = c.decode(&bits).unwrap_err();
        assert_eq!(*err.kind(), ErrorKind::DiscriminatorMismatch);
    }

    #[test]
    fn case_p_registers_with_explicit_predicate_and_projector() {
        let c = discriminated::<u64, Shape>()
            .by(uint8())
            .case_p(
                0,
                |s: &Shape| matches!(s, Shape::Circle(_)),
                Shape::Circle,
                |s: &Shape| match s {
                    Shape::Circle(r) => Some(*r),
                    _ => None,
                },
                int32(),
            )
            .case_p(
                2,
                |s: &Shape| matches!(s, Shape::Label(_)),
                Shape::Label,
                |s: &Shape| match s {
                    Shape::Label(t) => Some(t.clone()),
                    _ => None,
                },
                utf8(),
            )
            .build();
        let bits = c.encode(&Shape::Circle(5)).unwrap();
        assert_eq!(bits.to_hex(), "0000000005");
        assert_eq!(c.decode(&bits).unwrap().value, Shape::Circle(5));
        assert!(c.encode(&Shape::Square(1)).is_err());
    }
}
