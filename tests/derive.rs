use mimic::codec::annotated_mich_to_array;
use mimic::value::{Address, Nat, Or, Rational, Tez};
use mimic::{Decode, DecodeError, Encode, Micheline, Typed};

#[derive(Debug, Clone, PartialEq, Encode, Decode, Typed)]
struct Ledger {
    owner: Address,
    frozen: bool,
    total: Nat,
    rate: Option<Rational>,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode, Typed)]
struct Pairwise(Nat, String);

#[derive(Debug, Clone, PartialEq, Encode, Decode, Typed)]
struct Wrapper {
    amount: Tez,
}

#[derive(Debug, Clone, PartialEq, Encode, Decode, Typed)]
struct Marker;

#[derive(Debug, Clone, PartialEq, Encode, Decode, Typed)]
struct Generic<T> {
    left: T,
    right: Or<T, bool>,
}

fn ledger() -> Ledger {
    Ledger {
        owner: Address::new("tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb"),
        frozen: false,
        total: Nat::from(1000u32),
        rate: Some("2.5%".parse().unwrap()),
    }
}

#[test]
fn record_is_right_comb() {
    let node = ledger().encode();
    assert_eq!(
        node.to_string(),
        r#"Pair "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb" (Pair False (Pair 1000 (Some (Pair 1 40))))"#
    );
    assert_eq!(Ledger::decode(&node), Ok(ledger()));
}

#[test]
fn record_type_is_annotated() {
    assert_eq!(
        Ledger::mich_type().to_string(),
        "pair (address %owner) (pair (bool %frozen) (pair (nat %total) (option %rate (pair int nat))))"
    );
    let fields = annotated_mich_to_array(&ledger().encode(), &Ledger::mich_type()).unwrap();
    assert_eq!(fields.len(), 4);
    assert_eq!(fields[2], Micheline::int(1000));
}

#[test]
fn record_accepts_flat_pair() {
    let flat = Micheline::Pair(vec![
        Micheline::string("tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb"),
        Micheline::boolean(false),
        Micheline::int(1000),
        Micheline::some(Micheline::pair(Micheline::int(1), Micheline::int(40))),
    ]);
    assert_eq!(Ledger::decode(&flat), Ok(ledger()));
}

#[test]
fn record_rejects_short_pair() {
    let short = Micheline::pair(Micheline::string("tz1"), Micheline::boolean(true));
    assert!(matches!(Ledger::decode(&short), Err(DecodeError::Arity { .. })));
}

#[test]
fn tuple_struct_is_unannotated() {
    let val = Pairwise(Nat::from(1u32), "x".to_owned());
    assert_eq!(val.encode(), Micheline::pair(Micheline::int(1), Micheline::string("x")));
    assert_eq!(Pairwise::mich_type().to_string(), "pair nat string");
    assert_eq!(Pairwise::decode(&val.encode()), Ok(val));
}

#[test]
fn degenerate_records() {
    let w = Wrapper {
        amount: Tez::from_mutez(5),
    };
    assert_eq!(w.encode(), Micheline::int(5));
    assert_eq!(Wrapper::mich_type().to_string(), "mutez %amount");
    assert_eq!(Wrapper::decode(&Micheline::int(5)), Ok(w));

    assert_eq!(Marker.encode(), Micheline::unit());
    assert_eq!(Marker::mich_type().to_string(), "unit");
    assert_eq!(Marker::decode(&Micheline::unit()), Ok(Marker));
}

#[test]
fn generic_record() {
    let val = Generic {
        left: Nat::from(3u32),
        right: Or::Right(true),
    };
    assert_eq!(
        Generic::<Nat>::mich_type().to_string(),
        "pair (nat %left) (or %right nat bool)"
    );
    assert_eq!(Generic::<Nat>::decode(&val.encode()), Ok(val));
}
