//! Integration tests for the round-trip and algebraic laws every codec is
//! expected to preserve, driven through the public `bitcodec` API.

use bitcodec::prelude::*;

fn assert_round_trips<A: Clone + std::fmt::Debug + PartialEq + 'static>(c: &Codec<A>, a: A, tail: BitVector) {
    let encoded = c.encode(&a).unwrap();
    let combined = encoded.concat(&tail);
    let r = c.decode(&combined).unwrap();
    assert_eq!(r.value, a);
    assert_eq!(r.remainder, tail);
}

#[test]
fn round_trip_law_holds_across_combinators() {
    let _ = env_logger::try_init();
    assert_round_trips(&uint8(), 200u64, BitVector::from_hex("abcd").unwrap());
    assert_round_trips(&int16(), -12345i64, BitVector::empty());
    assert_round_trips(&utf8(), "hello".to_string(), BitVector::empty());

    let tuple_codec = uint8().append(uint16());
    assert_round_trips(&tuple_codec, (1u64, 2u64), BitVector::from_bin("101").unwrap());

    let framed = fixed_size_bytes(4, bytes_n(3));
    assert_round_trips(&framed, vec![1, 2, 3], BitVector::from_hex("ff").unwrap());
}

#[test]
fn remainder_is_never_over_consumed() {
    let c = uint16();
    let bits = c.encode(&0x1234).unwrap();
    let extra = BitVector::from_hex("deadbeef").unwrap();
    let r = c.decode(&bits.concat(&extra)).unwrap();
    assert_eq!(r.remainder, extra);
}

#[test]
fn size_bound_brackets_actual_encoded_size() {
    let c = uint24();
    let bound = c.size_bound();
    let encoded = c.encode(&0xabcdef).unwrap();
    assert!(bound.lower <= encoded.size());
    if let Some(upper) = bound.upper {
        assert!(encoded.size() <= upper);
    }

    let rep = repeated(uint8());
    let bound = rep.size_bound();
    let encoded = rep.encode(&vec![1, 2, 3, 4]).unwrap();
    assert!(bound.lower <= encoded.size());
}

#[test]
fn complete_is_idempotent() {
    let once = bits_n(8).complete();
    let twice = bits_n(8).complete().complete();
    let bits = BitVector::from_hex("00112233").unwrap();
    assert_eq!(once.decode(&bits).unwrap_err().to_string(), twice.decode(&bits).unwrap_err().to_string());
}

#[test]
fn xmap_identity_is_behaviorally_transparent() {
    let c = uint8();
    let id = c.xmap(|a: &u64| *a, |b: &u64| *b);
    let a = 77u64;
    assert_eq!(c.encode(&a).unwrap(), id.encode(&a).unwrap());
    let bits = BitVector::from_hex("2a").unwrap();
    assert_eq!(c.decode(&bits).unwrap().value, id.decode(&bits).unwrap().value);
}

#[test]
fn bitvector_concat_take_drop_laws() {
    let a = BitVector::from_bytes(&[0x12, 0x34]);
    let b = BitVector::from_bytes(&[0x56]);
    let ab = a.concat(&b);
    assert_eq!(ab.take(a.size()), a);
    assert_eq!(ab.drop(a.size()), b);
    assert_eq!(a.concat(&BitVector::empty()), a);
    assert_eq!(BitVector::empty().concat(&a), a);
}

#[test]
fn hex_round_trip_for_byte_aligned_vectors() {
    let a = BitVector::from_bytes(&[0xde, 0xad, 0xbe, 0xef]);
    assert_eq!(BitVector::from_hex(&a.to_hex()).unwrap(), a);
}

#[test]
fn discriminated_union_round_trips_every_case() {
    #[derive(Debug, Clone, PartialEq)]
    enum Tag {
        Flag(bool),
        Count(u64),
    }

    let c = discriminated::<u64, Tag>()
        .by(uint8())
        .typecase(
            0,
            bool_codec().exmap(
                |b: &bool| Ok(Tag::Flag(*b)),
                |t: &Tag| match t {
                    Tag::Flag(b) => Ok(*b),
                    _ => Err(Error::msg("not a flag")),
                },
            ),
        )
        .typecase(
            1,
            uint32().exmap(
                |n: &u64| Ok(Tag::Count(*n)),
                |t: &Tag| match t {
                    Tag::Count(n) => Ok(*n),
                    _ => Err(Error::msg("not a count")),
                },
            ),
        )
        .build();

    for value in [Tag::Flag(true), Tag::Flag(false), Tag::Count(42)] {
        let bits = c.encode(&value).unwrap();
        assert_eq!(c.decode(&bits).unwrap().value, value);
    }
}

#[test]
fn variable_size_framing_round_trips_nested_vectors() {
    let inner = list_of_n(uint8(), uint16());
    let c = variable_size_bytes(uint16(), inner, 0);
    let bits = c.encode(&vec![1, 2, 3]).unwrap();
    let r = c.decode(&bits).unwrap();
    assert_eq!(r.value, vec![1, 2, 3]);
    assert!(r.remainder.is_empty());
}

#[test]
fn adapters_checksum_and_cipher_compose_with_framing() {
    let framed = fixed_size_bytes(2, uint16());
    let signed_codec = signed(AdditiveChecksum, framed);
    let bits = signed_codec.encode(&0x0102).unwrap();
    assert_eq!(signed_codec.decode(&bits).unwrap().value, 0x0102);
}
