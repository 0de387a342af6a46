//! Primitive codecs: fixed- and arbitrary-bit-width integers, floats,
//! booleans, raw bits/bytes, charset-backed strings, UUIDs, and the
//! always-succeeding `provide`/`ignore`/`constant` building blocks.
//!
//! The bit-width integer codecs share one generic packer, parameterized
//! over `num_traits::PrimInt` (the teacher crate's own generic bound, see
//! `tools/ring_buffer.rs`'s `RingBuffer<T: PrimInt>`), so the same push/pull
//! loop drives both the signed and unsigned families.

use crate::attempt::{Attempt, Error, ErrorKind};
use crate::bitvector::BitVector;
use crate::codec::{Codec, DecodeResult};
use crate::size_bound::SizeBound;
use bit_vec::BitVec;
use num_traits::{One, PrimInt};
use std::rc::Rc;

fn push_be_bits<T: PrimInt>(v: &mut BitVec, value: T, width: u32) {
    for i in (0..width).rev() {
        let bit = (value >> i as usize) & T::one();
        v.push(bit == T::one());
    }
}

fn require_width(n: u32) {
    debug_assert!((1..=64).contains(&n), "bit width must be in 1..=64, got {n}");
}

/// Unsigned, big-endian, `n`-bit integer (1..=64). High bits of the value
/// beyond `n` must be zero or encoding fails with an out-of-range error.
pub fn uint(n: u32) -> Codec<u64> {
    require_width(n);
    let mask: u64 = if n == 64 { u64::MAX } else { (1u64 << n) - 1 };
    Codec::new(
        SizeBound::exact(n as u64),
        move |value: &u64| {
            if *value & !mask != 0 {
                return Err(Error::new(ErrorKind::OutOfRange));
            }
            let mut v = BitVec::with_capacity(n as usize);
            push_be_bits(&mut v, *value, n);
            Ok(bits_of(v))
        },
        move |bits: &BitVector| {
            if bits.size() < n as u64 {
                return Err(Error::insufficient_bits(n as u64, bits.size(), vec![]));
            }
            let value = read_be_unsigned(bits, n);
            Ok(DecodeResult::new(value, bits.drop(n as u64)))
        },
    )
}

/// Unsigned, little-endian, `n`-bit integer; `n` must be a multiple of 8.
pub fn uint_le(n: u32) -> Codec<u64> {
    debug_assert!(n % 8 == 0, "little-endian width must be a multiple of 8, got {n}");
    let be = uint(n);
    be.xmap(
        move |v: &u64| swap_byte_order(*v, n),
        move |v: &u64| swap_byte_order(*v, n),
    )
}

/// Signed, big-endian, two's-complement, `n`-bit integer (1..=64).
pub fn int(n: u32) -> Codec<i64> {
    require_width(n);
    Codec::new(
        SizeBound::exact(n as u64),
        move |value: &i64| {
            let lo = if n == 64 { i64::MIN } else { -(1i64 << (n - 1)) };
            let hi = if n == 64 { i64::MAX } else { (1i64 << (n - 1)) - 1 };
            if *value < lo || *value > hi {
                return Err(Error::new(ErrorKind::OutOfRange));
            }
            let mut v = BitVec::with_capacity(n as usize);
            push_be_bits(&mut v, *value, n);
            Ok(bits_of(v))
        },
        move |bits: &BitVector| {
            if bits.size() < n as u64 {
                return Err(Error::insufficient_bits(n as u64, bits.size(), vec![]));
            }
            let unsigned = read_be_unsigned(bits, n);
            let value = if n < 64 && unsigned & (1u64 << (n - 1)) != 0 {
                (unsigned as i64) - (1i64 << n)
            } else {
                unsigned as i64
            };
            Ok(DecodeResult::new(value, bits.drop(n as u64)))
        },
    )
}

/// Signed, little-endian, `n`-bit integer; `n` must be a multiple of 8.
///
/// Built by reversing the *encoded bytes* of `int(n)`, not by byte-swapping
/// the magnitude and re-running `int(n)`'s signed range check: swapping the
/// magnitude first can overflow that check even for values whose two's
/// complement byte pattern is perfectly valid (e.g. `-1` swapped as a u64
/// magnitude before the sign-range check is rejected as out of range).
pub fn int_le(n: u32) -> Codec<i64> {
    debug_assert!(n % 8 == 0, "little-endian width must be a multiple of 8, got {n}");
    let enc_be = int(n);
    let dec_be = int(n);
    Codec::new(
        SizeBound::exact(n as u64),
        move |value: &i64| Ok(reverse_byte_order(&enc_be.encode(value)?)),
        move |bits: &BitVector| {
            if bits.size() < n as u64 {
                return Err(Error::insufficient_bits(n as u64, bits.size(), vec![]));
            }
            let frame = bits.take(n as u64);
            let r = dec_be.decode(&reverse_byte_order(&frame))?;
            Ok(DecodeResult::new(r.value, bits.drop(n as u64)))
        },
    )
}

/// Reverses the byte order of a byte-aligned bit vector.
fn reverse_byte_order(bits: &BitVector) -> BitVector {
    let mut bytes = bits.to_bytes().expect("little-endian width is always byte-aligned");
    bytes.reverse();
    BitVector::from_bytes(&bytes)
}

/// `int(n)` under another name, for widths up to 64 bits.
pub fn long(n: u32) -> Codec<i64> {
    int(n)
}

/// `uint(n)` under another name, for widths up to 64 bits.
pub fn ulong(n: u32) -> Codec<u64> {
    uint(n)
}

fn bits_of(v: BitVec) -> BitVector {
    BitVector::from_bin(&v.iter().map(|b| if b { '1' } else { '0' }).collect::<String>())
        .expect("bitvec render is always valid binary text")
}

fn read_be_unsigned(bits: &BitVector, n: u32) -> u64 {
    let head = bits.take(n as u64);
    let mut value = 0u64;
    for i in 0..n as u64 {
        value = (value << 1) | (head.get(i).expect("index within bounds") as u64);
    }
    value
}

fn swap_byte_order(value: u64, n: u32) -> u64 {
    let nbytes = (n / 8) as usize;
    let be = value.to_be_bytes();
    let be_tail = &be[be.len() - nbytes..];
    let mut reversed = be_tail.to_vec();
    reversed.reverse();
    let mut padded = [0u8; 8];
    padded[8 - nbytes..].copy_from_slice(&reversed);
    u64::from_be_bytes(padded)
}

macro_rules! named_int {
    ($name:ident, $n:expr) => {
        pub fn $name() -> Codec<i64> {
            int($n)
        }
    };
}

macro_rules! named_uint {
    ($name:ident, $n:expr) => {
        pub fn $name() -> Codec<u64> {
            uint($n)
        }
    };
}

named_int!(int8, 8);
named_int!(int16, 16);
named_int!(int24, 24);
named_int!(int32, 32);
named_int!(int64, 64);
named_uint!(uint2, 2);
named_uint!(uint4, 4);
named_uint!(uint8, 8);
named_uint!(uint16, 16);
named_uint!(uint24, 24);
/// Unsigned 32-bit: the value type is `u64` because an unsigned 32-bit
/// quantity doesn't fit in a signed 32-bit container.
named_uint!(uint32, 32);

macro_rules! named_int_le {
    ($name:ident, $n:expr) => {
        pub fn $name() -> Codec<i64> {
            int_le($n)
        }
    };
}

macro_rules! named_uint_le {
    ($name:ident, $n:expr) => {
        pub fn $name() -> Codec<u64> {
            uint_le($n)
        }
    };
}

named_int_le!(int8_le, 8);
named_int_le!(int16_le, 16);
named_int_le!(int24_le, 24);
named_int_le!(int32_le, 32);
named_int_le!(int64_le, 64);
named_uint_le!(uint8_le, 8);
named_uint_le!(uint16_le, 16);
named_uint_le!(uint24_le, 24);
named_uint_le!(uint32_le, 32);

/// 32-bit IEEE-754, big-endian.
pub fn float32() -> Codec<f32> {
    Codec::new(
        SizeBound::exact(32),
        |value: &f32| Ok(BitVector::from_bytes(&value.to_be_bytes())),
        |bits: &BitVector| {
            if bits.size() < 32 {
                return Err(Error::insufficient_bits(32, bits.size(), vec![]));
            }
            let bytes = bits.take(32).to_bytes().expect("32 bits is byte-aligned");
            let value = f32::from_be_bytes(bytes.try_into().expect("exactly 4 bytes"));
            Ok(DecodeResult::new(value, bits.drop(32)))
        },
    )
}

/// 32-bit IEEE-754, little-endian.
pub fn float32_le() -> Codec<f32> {
    Codec::new(
        SizeBound::exact(32),
        |value: &f32| Ok(BitVector::from_bytes(&value.to_le_bytes())),
        |bits: &BitVector| {
            if bits.size() < 32 {
                return Err(Error::insufficient_bits(32, bits.size(), vec![]));
            }
            let bytes = bits.take(32).to_bytes().expect("32 bits is byte-aligned");
            let value = f32::from_le_bytes(bytes.try_into().expect("exactly 4 bytes"));
            Ok(DecodeResult::new(value, bits.drop(32)))
        },
    )
}

/// 64-bit IEEE-754, big-endian.
pub fn float64() -> Codec<f64> {
    Codec::new(
        SizeBound::exact(64),
        |value: &f64| Ok(BitVector::from_bytes(&value.to_be_bytes())),
        |bits: &BitVector| {
            if bits.size() < 64 {
                return Err(Error::insufficient_bits(64, bits.size(), vec![]));
            }
            let bytes = bits.take(64).to_bytes().expect("64 bits is byte-aligned");
            let value = f64::from_be_bytes(bytes.try_into().expect("exactly 8 bytes"));
            Ok(DecodeResult::new(value, bits.drop(64)))
        },
    )
}

/// 64-bit IEEE-754, little-endian.
pub fn float64_le() -> Codec<f64> {
    Codec::new(
        SizeBound::exact(64),
        |value: &f64| Ok(BitVector::from_bytes(&value.to_le_bytes())),
        |bits: &BitVector| {
            if bits.size() < 64 {
                return Err(Error::insufficient_bits(64, bits.size(), vec![]));
            }
            let bytes = bits.take(64).to_bytes().expect("64 bits is byte-aligned");
            let value = f64::from_le_bytes(bytes.try_into().expect("exactly 8 bytes"));
            Ok(DecodeResult::new(value, bits.drop(64)))
        },
    )
}

/// A single bit; `0` is false.
pub fn bool_codec() -> Codec<bool> {
    Codec::new(
        SizeBound::exact(1),
        |value: &bool| Ok(if *value { BitVector::high(1) } else { BitVector::low(1) }),
        |bits: &BitVector| {
            if bits.is_empty() {
                return Err(Error::insufficient_bits(1, 0, vec![]));
            }
            Ok(DecodeResult::new(bits.get(0).expect("nonempty"), bits.drop(1)))
        },
    )
}

/// `n` bits (n >= 1); all-zero decodes false, anything else decodes true.
/// Encodes true as all-ones, false as all-zero.
pub fn bool_n(n: u64) -> Codec<bool> {
    debug_assert!(n >= 1);
    Codec::new(
        SizeBound::exact(n),
        move |value: &bool| Ok(if *value { BitVector::high(n) } else { BitVector::low(n) }),
        move |bits: &BitVector| {
            if bits.size() < n {
                return Err(Error::insufficient_bits(n, bits.size(), vec![]));
            }
            let head = bits.take(n);
            let any_set = (0..n).any(|i| head.get(i).expect("within bounds"));
            Ok(DecodeResult::new(any_set, bits.drop(n)))
        },
    )
}

/// Identity passthrough: consumes the entire remaining buffer.
pub fn bits() -> Codec<BitVector> {
    Codec::new(
        SizeBound::unknown(),
        |value: &BitVector| Ok(value.clone()),
        |bits: &BitVector| Ok(DecodeResult::new(bits.clone(), BitVector::empty())),
    )
}

/// Fixed-size bit passthrough.
pub fn bits_n(n: u64) -> Codec<BitVector> {
    Codec::new(
        SizeBound::exact(n),
        move |value: &BitVector| {
            if value.size() != n {
                Err(Error::msg(format!("expected {n} bits, got {}", value.size())))
            } else {
                Ok(value.clone())
            }
        },
        move |bits: &BitVector| {
            if bits.size() < n {
                return Err(Error::insufficient_bits(n, bits.size(), vec![]));
            }
            Ok(DecodeResult::new(bits.take(n), bits.drop(n)))
        },
    )
}

/// Byte-aligned identity passthrough: consumes the entire remaining buffer.
pub fn bytes() -> Codec<Vec<u8>> {
    Codec::new(
        SizeBound::unknown(),
        |value: &Vec<u8>| Ok(BitVector::from_bytes(value)),
        |bits: &BitVector| {
            let v = bits.to_bytes()?;
            Ok(DecodeResult::new(v, BitVector::empty()))
        },
    )
}

/// Fixed-size byte-aligned passthrough.
pub fn bytes_n(n_bytes: u64) -> Codec<Vec<u8>> {
    let inner = bits_n(n_bytes * 8);
    inner.exmap(
        |bits: &BitVector| bits.to_bytes(),
        |bytes: &Vec<u8>| Ok(BitVector::from_bytes(bytes)),
    )
}

/// A byte encoding for strings: widens `string(...)` over pluggable charsets.
pub trait Charset {
    fn encode(&self, s: &str) -> Attempt<Vec<u8>>;
    fn decode(&self, bytes: &[u8]) -> Attempt<String>;
}

pub struct Utf8;

impl Charset for Utf8 {
    fn encode(&self, s: &str) -> Attempt<Vec<u8>> {
        Ok(s.as_bytes().to_vec())
    }
    fn decode(&self, bytes: &[u8]) -> Attempt<String> {
        String::from_utf8(bytes.to_vec()).map_err(|_| Error::new(ErrorKind::CharsetFailure))
    }
}

pub struct Ascii;

impl Charset for Ascii {
    fn encode(&self, s: &str) -> Attempt<Vec<u8>> {
        if s.is_ascii() {
            Ok(s.as_bytes().to_vec())
        } else {
            Err(Error::new(ErrorKind::CharsetFailure))
        }
    }
    fn decode(&self, bytes: &[u8]) -> Attempt<String> {
        if bytes.is_ascii() {
            Ok(bytes.iter().map(|&b| b as char).collect())
        } else {
            Err(Error::new(ErrorKind::CharsetFailure))
        }
    }
}

/// Consumes the entire remaining buffer as bytes, decoded via `charset`;
/// encodes the string's byte representation with no length prefix.
pub fn string(charset: impl Charset + 'static) -> Codec<String> {
    let charset = Rc::new(charset);
    let enc_cs = charset.clone();
    let dec_cs = charset;
    Codec::new(
        SizeBound::unknown(),
        move |s: &String| Ok(BitVector::from_bytes(&enc_cs.encode(s)?)),
        move |bits: &BitVector| {
            let bytes = bits.to_bytes()?;
            let s = dec_cs.decode(&bytes)?;
            Ok(DecodeResult::new(s, BitVector::empty()))
        },
    )
}

pub fn utf8() -> Codec<String> {
    string(Utf8)
}

pub fn ascii() -> Codec<String> {
    string(Ascii)
}

/// 128-bit value, big-endian; this crate's in-house fixed-size identifier
/// type (no `uuid` crate dependency — see `DESIGN.md`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Uuid(pub [u8; 16]);

impl std::fmt::Display for Uuid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

pub fn uuid() -> Codec<Uuid> {
    Codec::new(
        SizeBound::exact(128),
        |value: &Uuid| Ok(BitVector::from_bytes(&value.0)),
        |bits: &BitVector| {
            if bits.size() < 128 {
                return Err(Error::insufficient_bits(128, bits.size(), vec![]));
            }
            let bytes = bits.take(128).to_bytes().expect("128 bits is byte-aligned");
            let mut arr = [0u8; 16];
            arr.copy_from_slice(&bytes);
            Ok(DecodeResult::new(Uuid(arr), bits.drop(128)))
        },
    )
}

/// Zero-bit codec: always encodes to empty, always decodes `a`.
pub fn provide<A: Clone + 'static>(a: A) -> Codec<A> {
    Codec::new(
        SizeBound::exact(0),
        move |_: &A| Ok(BitVector::empty()),
        move |bits: &BitVector| Ok(DecodeResult::new(a.clone(), bits.clone())),
    )
}

/// Skips `n` bits on decode; writes `n` zero bits on encode.
pub fn ignore(n: u64) -> Codec<()> {
    Codec::new(
        SizeBound::exact(n),
        move |_: &()| Ok(BitVector::low(n)),
        move |bits: &BitVector| {
            if bits.size() < n {
                return Err(Error::insufficient_bits(n, bits.size(), vec![]));
            }
            Ok(DecodeResult::new((), bits.drop(n)))
        },
    )
}

/// Encode emits exactly `expected`; decode consumes and verifies equality.
pub fn constant(expected: BitVector) -> Codec<()> {
    let n = expected.size();
    let enc_bits = expected.clone();
    Codec::new(
        SizeBound::exact(n),
        move |_: &()| Ok(enc_bits.clone()),
        move |bits: &BitVector| {
            if bits.size() < n {
                return Err(Error::insufficient_bits(n, bits.size(), vec![]));
            }
            if bits.take(n) == expected {
                Ok(DecodeResult::new((), bits.drop(n)))
            } else {
                Err(Error::new(ErrorKind::ConstantMismatch))
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uint8_round_trip() {
        let c = uint8();
        let bits = c.encode(&200).unwrap();
        assert_eq!(bits.to_hex(), "c8");
        let r = c.decode(&bits).unwrap();
        assert_eq!(r.value, 200);
        assert!(r.remainder.is_empty());
    }

    #[test]
    fn uint_out_of_range_high_bits() {
        let c = uint(4);
        assert!(c.encode(&16).is_err());
        assert!(c.encode(&15).is_ok());
    }

    #[test]
    fn int8_two_complement() {
        let c = int8();
        assert_eq!(c.encode(&-1).unwrap().to_hex(), "ff");
        assert_eq!(c.encode(&127).unwrap().to_hex(), "7f");
        assert_eq!(c.encode(&-128).unwrap().to_hex(), "80");
        assert_eq!(c.decode(&BitVector::from_hex("ff").unwrap()).unwrap().value, -1);
        assert_eq!(c.decode(&BitVector::from_hex("80").unwrap()).unwrap().value, -128);
    }

    #[test]
    fn le_byte_order_round_trips() {
        let c = uint16_le();
        let bits = c.encode(&0x0102).unwrap();
        assert_eq!(bits.to_hex(), "0201");
        assert_eq!(c.decode(&bits).unwrap().value, 0x0102);

        let ci = int32_le();
        let bits = ci.encode(&0x01020304).unwrap();
        assert_eq!(bits.to_hex(), "04030201");
        assert_eq!(ci.decode(&bits).unwrap().value, 0x01020304);
    }

    #[test]
    fn int_le_round_trips_values_whose_swapped_bytes_have_the_top_bit_set() {
        let c16 = int16_le();
        assert_eq!(c16.encode(&200).unwrap().to_hex(), "c800");
        assert_eq!(c16.decode(&BitVector::from_hex("c800").unwrap()).unwrap().value, 200);
        assert_eq!(c16.encode(&-1).unwrap().to_hex(), "ffff");
        assert_eq!(c16.decode(&BitVector::from_hex("ffff").unwrap()).unwrap().value, -1);

        let c8 = int8_le();
        assert_eq!(c8.encode(&-1).unwrap().to_hex(), "ff");
        assert_eq!(c8.decode(&BitVector::from_hex("ff").unwrap()).unwrap().value, -1);
    }

    #[test]
    fn arbitrary_width_uint() {
        let c = uint(12);
        let bits = c.encode(&0xabc).unwrap();
        assert_eq!(bits.size(), 12);
        assert_eq!(bits.to_hex(), "abc");
        assert_eq!(c.decode(&bits).unwrap().value, 0xabc);
    }

    #[test]
    fn float_round_trip() {
        let c = float32();
        let bits = c.encode(&1.5f32).unwrap();
        assert_eq!(c.decode(&bits).unwrap().value, 1.5f32);
        let cd = float64_le();
        let bits = cd.encode(&2.25f64).unwrap();
        assert_eq!(cd.decode(&bits).unwrap().value, 2.25f64);
    }

    #[test]
    fn bool_codecs() {
        let c = bool_codec();
        assert_eq!(c.encode(&true).unwrap().to_bin(), "1");
        assert_eq!(c.encode(&false).unwrap().to_bin(), "0");
        let c4 = bool_n(4);
        assert_eq!(c4.encode(&true).unwrap().to_bin(), "1111");
        assert_eq!(c4.decode(&BitVector::from_bin("0010").unwrap()).unwrap().value, true);
        assert_eq!(c4.decode(&BitVector::from_bin("0000").unwrap()).unwrap().value, false);
    }

    #[test]
    fn bits_n_rejects_wrong_size_on_encode() {
        let c = bits_n(8);
        assert!(c.encode(&BitVector::from_bin("101").unwrap()).is_err());
        assert!(c.encode(&BitVector::from_bin("10101010").unwrap()).is_ok());
    }

    #[test]
    fn bytes_roundtrip() {
        let c = bytes_n(2);
        let bits = c.encode(&vec![0xab, 0xcd]).unwrap();
        assert_eq!(bits.to_hex(), "abcd");
        assert_eq!(c.decode(&bits).unwrap().value, vec![0xab, 0xcd]);
    }

    #[test]
    fn utf8_string_consumes_remainder() {
        let c = utf8();
        let bits = c.encode(&"test".to_string()).unwrap();
        assert_eq!(bits.to_hex(), "74657374");
        let r = c.decode(&bits).unwrap();
        assert_eq!(r.value, "test");
        assert!(r.remainder.is_empty());
    }

    #[test]
    fn ascii_rejects_non_ascii() {
        let c = ascii();
        assert!(c.encode(&"héllo".to_string()).is_err());
        assert!(c.encode(&"hello".to_string()).is_ok());
    }

    #[test]
    fn provide_ignores_input_and_consumes_nothing() {
        let c = provide(42u64);
        assert!(c.encode(&999).unwrap().is_empty());
        let bits = BitVector::from_hex("ff").unwrap();
        let r = c.decode(&bits).unwrap();
        assert_eq!(r.value, 42);
        assert_eq!(r.remainder, bits);
    }

    #[test]
    fn ignore_writes_zero_and_skips() {
        let c = ignore(8);
        assert_eq!(c.encode(&()).unwrap().to_hex(), "00");
        let r = c.decode(&BitVector::from_hex("ffaa").unwrap()).unwrap();
        assert_eq!(r.value, ());
        assert_eq!(r.remainder.to_hex(), "aa");
    }

    #[test]
    fn constant_checks_equality() {
        let c = constant(BitVector::from_hex("abcd").unwrap());
        assert_eq!(c.encode(&()).unwrap().to_hex(), "abcd");
        assert!(c.decode(&BitVector::from_hex("abcd00").unwrap()).is_ok());
        assert!(c.decode(&BitVector::from_hex("abce00").unwrap()).is_err());
    }

    #[test]
    fn uuid_round_trip() {
        let c = uuid();
        let id = Uuid([1; 16]);
        let bits = c.encode(&id).unwrap();
        assert_eq!(bits.size(), 128);
        assert_eq!(c.decode(&bits).unwrap().value, id);
    }
}
