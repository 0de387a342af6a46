//! Framing combinators: wrap a codec in a fixed or length-prefixed window,
//! make it conditional on a runtime flag, or repeat it into a collection.
//!
//! Grounded on the teacher's windowed-buffer discipline in
//! `tools/ring_buffer.rs` (read exactly `n`, then operate on what's left) and
//! its table-driven repetition in `tools/adaptive_huff.rs` (decode until a
//! sentinel/count is reached), generalized from bytes to bits.

use crate::attempt::Error;
use crate::bitvector::BitVector;
use crate::codec::{Codec, DecodeResult};
use crate::size_bound::SizeBound;

/// Carves out exactly `n` bits for `inner`; `inner` must consume them
/// entirely (via `complete`) or be written to fit them exactly.
pub fn fixed_size_bits<A: Clone + 'static>(n: u64, inner: Codec<A>) -> Codec<A> {
    Codec::new(
        SizeBound::exact(n),
        move |a: &A| {
            let bits = inner.encode(a)?;
            if bits.size() > n {
                return Err(Error::msg(format!("encoded value needs {} bits, frame is {n}", bits.size())));
            }
            Ok(bits.concat(&BitVector::low(n - bits.size())))
        },
        move |bits: &BitVector| {
            if bits.size() < n {
                return Err(Error::insufficient_bits(n, bits.size(), vec![]));
            }
            let frame = bits.take(n);
            let r = inner.decode(&frame)?;
            Ok(DecodeResult::new(r.value, bits.drop(n)))
        },
    )
}

/// Byte-aligned version of [`fixed_size_bits`].
pub fn fixed_size_bytes<A: Clone + 'static>(n_bytes: u64, inner: Codec<A>) -> Codec<A> {
    fixed_size_bits(n_bytes * 8, inner)
}

/// Prefixes `inner`'s encoding with its bit-length, encoded by `size_codec`.
/// `size_padding` is added to the stored length on encode and subtracted
/// on decode (useful when the size field counts units other than bits).
pub fn variable_size_bits<A: Clone + 'static>(
    size_codec: Codec<u64>,
    inner: Codec<A>,
    size_padding: i64,
) -> Codec<A> {
    Codec::new(
        size_codec.size_bound() + SizeBound::unknown(),
        move |a: &A| {
            let payload = inner.encode(a)?;
            let stored_size = (payload.size() as i64 + size_padding).max(0) as u64;
            let header = size_codec.encode(&stored_size)?;
            Ok(header.concat(&payload))
        },
        move |bits: &BitVector| {
            let header = size_codec.decode(bits)?;
            let payload_size = (header.value as i64 - size_padding).max(0) as u64;
            if header.remainder.size() < payload_size {
                return Err(Error::insufficient_bits(payload_size, header.remainder.size(), vec![]));
            }
            let payload = header.remainder.take(payload_size);
            // Same semantics as `fixed_size_bits`: the frame is exactly
            // `payload_size` bits, and any of `inner`'s leftover remainder
            // inside that frame is discarded rather than treated as an error.
            let r = inner.decode(&payload)?;
            Ok(DecodeResult::new(r.value, header.remainder.drop(payload_size)))
        },
    )
}

/// Byte-aligned version of [`variable_size_bits`]; `size_padding` is in bytes.
pub fn variable_size_bytes<A: Clone + 'static>(
    size_codec: Codec<u64>,
    inner: Codec<A>,
    size_padding: i64,
) -> Codec<A> {
    let bit_size_codec = size_codec.xmap(|bytes: &u64| bytes * 8, |bits: &u64| bits / 8);
    variable_size_bits(bit_size_codec, inner, size_padding * 8)
}

/// Runs `inner` only when `included` is true; otherwise always produces/consumes `default`.
pub fn conditional<A: Clone + 'static>(included: bool, inner: Codec<A>) -> Codec<Option<A>> {
    Codec::new(
        if included { inner.size_bound() } else { SizeBound::exact(0) },
        move |a: &Option<A>| match (included, a) {
            (true, Some(v)) => inner.encode(v),
            (true, None) => Err(Error::msg("conditional codec included but no value provided")),
            (false, _) => Ok(BitVector::empty()),
        },
        move |bits: &BitVector| {
            if included {
                let r = inner.decode(bits)?;
                Ok(DecodeResult::new(Some(r.value), r.remainder))
            } else {
                Ok(DecodeResult::new(None, bits.clone()))
            }
        },
    )
}

/// Repeats `inner` until the input is exhausted; fails on the first element
/// error (after at least one successful element, an empty remainder ends
/// the loop rather than being treated as a failure).
pub fn repeated<A: Clone + 'static>(inner: Codec<A>) -> Codec<Vec<A>> {
    Codec::new(
        SizeBound::at_least(0),
        move |items: &Vec<A>| {
            let mut out = BitVector::empty();
            for item in items {
                out = out.concat(&inner.encode(item)?);
            }
            Ok(out)
        },
        move |bits: &BitVector| {
            let mut remainder = bits.clone();
            let mut values = Vec::new();
            while !remainder.is_empty() {
                let r = inner.decode(&remainder)?;
                remainder = r.remainder;
                values.push(r.value);
            }
            Ok(DecodeResult::new(values, remainder))
        },
    )
}

/// Like [`repeated`], but never fails: decoding stops at the first element
/// error (or exhaustion) and returns everything decoded so far, with the
/// remainder left at the point of failure.
pub fn repeated_collecting_errors<A: Clone + 'static>(inner: Codec<A>) -> Codec<Vec<A>> {
    Codec::new(
        SizeBound::at_least(0),
        move |items: &Vec<A>| {
            let mut out = BitVector::empty();
            for item in items {
                out = out.concat(&inner.encode(item)?);
            }
            Ok(out)
        },
        move |bits: &BitVector| {
            let mut remainder = bits.clone();
            let mut values = Vec::new();
            loop {
                if remainder.is_empty() {
                    break;
                }
                match inner.decode(&remainder) {
                    Ok(r) => {
                        remainder = r.remainder;
                        values.push(r.value);
                    }
                    Err(_) => break,
                }
            }
            Ok(DecodeResult::new(values, remainder))
        },
    )
}

/// Exactly `count` repetitions of `inner`.
pub fn vector_of_n<A: Clone + 'static>(count: u64, inner: Codec<A>) -> Codec<Vec<A>> {
    Codec::new(
        inner.size_bound() * count,
        move |items: &Vec<A>| {
            if items.len() as u64 != count {
                return Err(Error::msg(format!("expected {count} elements, got {}", items.len())));
            }
            let mut out = BitVector::empty();
            for item in items {
                out = out.concat(&inner.encode(item)?);
            }
            Ok(out)
        },
        move |bits: &BitVector| {
            let mut remainder = bits.clone();
            let mut values = Vec::with_capacity(count as usize);
            for _ in 0..count {
                let r = inner.decode(&remainder)?;
                remainder = r.remainder;
                values.push(r.value);
            }
            Ok(DecodeResult::new(values, remainder))
        },
    )
}

/// A length-prefixed list: `count_codec` followed by that many repetitions of `inner`.
pub fn list_of_n<A: Clone + 'static>(count_codec: Codec<u64>, inner: Codec<A>) -> Codec<Vec<A>> {
    Codec::new(
        SizeBound::unknown(),
        move |items: &Vec<A>| {
            let header = count_codec.encode(&(items.len() as u64))?;
            let mut out = header;
            for item in items {
                out = out.concat(&inner.encode(item)?);
            }
            Ok(out)
        },
        move |bits: &BitVector| {
            let header = count_codec.decode(bits)?;
            let count = header.value;
            let mut remainder = header.remainder;
            let mut values = Vec::with_capacity(count.min(1024) as usize);
            for _ in 0..count {
                let r = inner.decode(&remainder)?;
                remainder = r.remainder;
                values.push(r.value);
            }
            Ok(DecodeResult::new(values, remainder))
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::{bytes, uint8};

    #[test]
    fn fixed_size_bits_pads_short_payload_and_truncates_on_decode() {
        let c = fixed_size_bits(16, uint8());
        let bits = c.encode(&7).unwrap();
        assert_eq!(bits.size(), 16);
        assert_eq!(bits.to_hex(), "0700");
        let r = c.decode(&BitVector::from_hex("07ffee").unwrap()).unwrap();
        assert_eq!(r.value, 7);
        assert_eq!(r.remainder.to_hex(), "ee");
    }

    #[test]
    fn fixed_size_bits_rejects_oversize_payload() {
        let inner = bytes();
        let c = fixed_size_bits(8, inner);
        assert!(c.encode(&vec![1, 2]).is_err());
    }

    #[test]
    fn variable_size_bytes_round_trips() {
        let c = variable_size_bytes(uint8(), bytes(), 0);
        let bits = c.encode(&vec![1, 2, 3]).unwrap();
        assert_eq!(bits.to_hex(), "03010203");
        let r = c.decode(&bits).unwrap();
        assert_eq!(r.value, vec![1, 2, 3]);
        assert!(r.remainder.is_empty());
    }

    #[test]
    fn variable_size_bits_discards_inner_under_consumption_like_fixed_size_bits() {
        // The frame is 8 bits (size header = 8), but `bits_n(4)` only consumes
        // the first 4 of them; the other 4 inside the frame are discarded,
        // same as `fixed_size_bits`, rather than failing with RemainderPresent.
        let c = variable_size_bits(uint8(), crate::primitives::bits_n(4), 0);
        let bits = BitVector::from_hex("08f0ff").unwrap();
        let r = c.decode(&bits).unwrap();
        assert_eq!(r.value.to_bin(), "1111");
        assert_eq!(r.remainder.to_hex(), "ff");
    }

    #[test]
    fn conditional_included_false_consumes_nothing() {
        let c = conditional(false, uint8());
        assert!(c.encode(&None).unwrap().is_empty());
        let bits = BitVector::from_hex("ab").unwrap();
        let r = c.decode(&bits).unwrap();
        assert_eq!(r.value, None);
        assert_eq!(r.remainder, bits);
    }

    #[test]
    fn conditional_included_true_requires_value() {
        let c = conditional(true, uint8());
        assert!(c.encode(&None).is_err());
        let bits = c.encode(&Some(9)).unwrap();
        assert_eq!(c.decode(&bits).unwrap().value, Some(9));
    }

    #[test]
    fn repeated_consumes_until_exhausted() {
        let c = repeated(uint8());
        let bits = BitVector::from_hex("010203").unwrap();
        let r = c.decode(&bits).unwrap();
        assert_eq!(r.value, vec![1, 2, 3]);
        assert!(r.remainder.is_empty());
    }

    #[test]
    fn repeated_collecting_errors_stops_at_first_bad_element() {
        let inner = uint8().exmap(
            |v: &u64| if *v == 0xff { Err(Error::msg("bad")) } else { Ok(*v) },
            |v: &u64| Ok(*v),
        );
        let c = repeated_collecting_errors(inner);
        let bits = BitVector::from_hex("0102ff03").unwrap();
        let r = c.decode(&bits).unwrap();
        assert_eq!(r.value, vec![1, 2]);
        assert_eq!(r.remainder.to_hex(), "ff03");
    }

    #[test]
    fn vector_of_n_requires_exact_count() {
        let c = vector_of_n(2, uint8());
        assert!(c.encode(&vec![1]).is_err());
        let bits = c.encode(&vec![1, 2]).unwrap();
        let r = c.decode(&bits).unwrap();
        assert_eq!(r.value, vec![1, 2]);
    }

    #[test]
    fn list_of_n_round_trips_with_count_prefix() {
        let c = list_of_n(uint8(), uint8());
        let bits = c.encode(&vec![10, 20, 30]).unwrap();
        assert_eq!(bits.to_hex(), "030a141e");
        let r = c.decode(&bits).unwrap();
        assert_eq!(r.value, vec![10, 20, 30]);
        assert!(r.remainder.is_empty());
    }
}
