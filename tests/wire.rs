use mimic::micheline::TypePrim;
use mimic::pack::{pack_hex, unpack_hex};
use mimic::value::Nat;
use mimic::{
    expr_micheline_to_json, json_micheline_to_expr, pack, Encode, ExprError, Micheline,
    MichelineType,
};
use serde_json::json;

#[test]
fn pack_nat() {
    assert_eq!(pack(&Nat::from(2u32).encode()), Ok(vec![0x05, 0x00, 0x02]));
}

#[test]
fn expression_text_to_json_and_back() {
    assert_eq!(expr_micheline_to_json("{ DROP }").unwrap(), json!([{"prim": "DROP"}]));
    assert_eq!(json_micheline_to_expr(&json!([{"prim": "DROP"}])).unwrap(), "{DROP}");
    assert_eq!(
        expr_micheline_to_json(r#"Pair 5 (Some "a")"#).unwrap(),
        json!({"prim": "Pair", "args": [{"int": "5"}, {"prim": "Some", "args": [{"string": "a"}]}]})
    );
    assert!(matches!(
        expr_micheline_to_json("Pair (1"),
        Err(ExprError::Parse { .. })
    ));
}

#[test]
fn json_key_order() {
    let ty = MichelineType::pair(
        MichelineType::prim(TypePrim::nat).with_field("a"),
        MichelineType::prim(TypePrim::string).with_field("b"),
    )
    .with_annots([":storage"]);
    assert_eq!(
        ty.to_json_string(),
        r#"{"prim":"pair","args":[{"prim":"nat","annots":["%a"]},{"prim":"string","annots":["%b"]}],"annots":[":storage"]}"#
    );
    assert_eq!(ty.to_string(), "pair :storage (nat %a) (string %b)");
    assert_eq!(MichelineType::from_json(&ty.to_json()), Ok(ty.clone()));
    assert_eq!(MichelineType::from_expr(&ty.to_string()).unwrap(), ty);
}

#[test]
fn serde_integration() {
    let node = Micheline::some(Micheline::bytes("cafe"));
    let text = serde_json::to_string(&node).unwrap();
    assert_eq!(text, r#"{"prim":"Some","args":[{"bytes":"cafe"}]}"#);
    let back: Micheline = serde_json::from_str(&text).unwrap();
    assert_eq!(back, node);
    assert!(serde_json::from_str::<Micheline>(r#"{"prim":"Some"}"#).is_err());
}

#[test]
fn hex_pack_forms() {
    let node = Micheline::Pair(vec![Micheline::int(1), Micheline::string("x"), Micheline::unit()]);
    let hex = pack_hex(&node).unwrap();
    assert!(hex.starts_with("0509"));
    assert_eq!(unpack_hex(&hex), Ok(node));
}
