use std::collections::BTreeMap;

use mimic::codec::{annotated_mich_to_array, mich_array_to_mich};
use mimic::micheline::TypePrim;
use mimic::value::{Address, Bytes, Duration, Entrypoint, Int, Nat, Or, Rational, Tez, TezUnit};
use mimic::{Decode, DecodeError, Encode, Micheline, MichelineType, ValidationError};
use num_bigint::BigUint;

fn roundtrip<T: Encode + Decode + PartialEq + std::fmt::Debug>(val: T) {
    let node = val.encode();
    let back = T::decode(&node).unwrap();
    assert_eq!(back, val);
    assert_eq!(back.encode(), node);
}

#[test]
fn nat_literals() {
    let big = "123456789012345678901234567890123456789012345678901234567890";
    let n: Nat = big.parse().unwrap();
    assert_eq!(n.to_string(), big);
    assert_eq!(Nat::decode(&n.encode()), Ok(n.clone()));
    assert_eq!(n.encode(), Micheline::nat(big.parse::<BigUint>().unwrap()));
    assert!(matches!("-1".parse::<Nat>(), Err(ValidationError::NegativeNat(_))));
    assert!(Nat::try_from(-1.0f64).is_err());
}

#[test]
fn nat_minus_narrows_to_int() {
    let diff: Int = Nat::from(5u32).minus(&Nat::from(7u32));
    assert_eq!(diff, Int::from(-2));
}

#[test]
fn rational_percent() {
    let r: Rational = "5.4464%".parse().unwrap();
    assert_eq!(r.to_string(), "0.054464");
    assert_eq!(
        r.encode_json().to_string(),
        r#"{"prim":"Pair","args":[{"int":"851"},{"int":"15625"}]}"#
    );
}

#[test]
fn rational_long_expansion() {
    let r = Rational::new(
        "99999999999999999999999956456456456999999999".parse::<num_bigint::BigInt>().unwrap(),
        "999999999999956456456456999999999".parse::<num_bigint::BigInt>().unwrap(),
    )
    .unwrap();
    assert_eq!(r.to_string(), "100000000000.00435435435425664606");
    let [num, den] = mimic::codec::unpair_n::<2>(&r.encode()).unwrap();
    assert!(num.as_int().is_ok() && den.as_int().is_ok());
}

#[test]
fn tez_units() {
    assert!(Tez::parse("1.5", TezUnit::Mutez).is_err());
    let one = Tez::parse("1", TezUnit::Tez).unwrap();
    assert_eq!(one.encode_json().to_string(), r#"{"int":"1000000"}"#);
    assert_eq!(
        Tez::parse("1.5", TezUnit::Tez).unwrap().to_mutez(),
        &num_bigint::BigInt::from(1_500_000)
    );
    assert!(matches!(
        Tez::parse("-1", TezUnit::Tez),
        Err(ValidationError::NegativeTez(_))
    ));
}

#[test]
fn right_comb_and_annotations() {
    let (a, b, c) = (Micheline::int(1), Micheline::string("b"), Micheline::unit());
    assert_eq!(
        mich_array_to_mich(vec![a.clone(), b.clone(), c.clone()]),
        Micheline::pair(a.clone(), Micheline::pair(b, c))
    );
    let err = annotated_mich_to_array(&a, &MichelineType::prim(TypePrim::int));
    assert!(matches!(err, Err(DecodeError::Unannotated(_))));
}

#[test]
fn booleans_and_unknown_prims() {
    let f = Micheline::from_json_str(r#"{"prim":"False"}"#).unwrap();
    assert_eq!(bool::decode(&f), Ok(false));
    assert!(matches!(
        Micheline::from_json_str(r#"{"prim":"Foo"}"#),
        Err(DecodeError::UnknownPrim(_))
    ));
    assert!(bool::decode_json(&serde_json::json!({"prim": "Foo"})).is_err());
}

#[test]
fn domain_roundtrips() {
    roundtrip(Nat::from(0u32));
    roundtrip(Int::from(-42));
    roundtrip(Rational::new(-3, 4).unwrap());
    roundtrip(Tez::from_mutez(-7));
    roundtrip(Duration::from_seconds(788_645));
    roundtrip(Bytes::from_raw(&[1, 2, 3]));
    roundtrip(Address::new("tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb"));
    roundtrip(Entrypoint::new(Address::new("KT1BEqzn5Wx8uJrZNvuS9DVHmLvG9td3fDLi"), "mint"));
    roundtrip(Some(Or::<Nat, String>::Right("r".to_owned())));
    roundtrip(vec![(true, ()), (false, ())]);
    roundtrip(
        [(Nat::from(1u32), "one".to_owned()), (Nat::from(2u32), "two".to_owned())]
            .into_iter()
            .collect::<BTreeMap<_, _>>(),
    );
}

#[test]
fn rational_decodes_unreduced() {
    let node = Micheline::pair(Micheline::int(2), Micheline::int(4));
    let r = Rational::decode(&node).unwrap();
    assert_eq!(r.encode(), Micheline::pair(Micheline::int(1), Micheline::int(2)));
    assert!(Rational::decode(&Micheline::pair(Micheline::int(1), Micheline::int(0))).is_err());
}
