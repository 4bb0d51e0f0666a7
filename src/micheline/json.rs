//! JSON wire format for Micheline values and types
//!
//! The shape of Micheline JSON is dictated by the node RPC and the client
//! libraries built on it, and is reproduced exactly:
//!
//! * literals are single-key objects: `{"int":"5"}`, `{"string":"a"}`, `{"bytes":"00ff"}`
//! * applications are objects with a `prim` key, and optional `args` and `annots`
//!   keys, serialized in that order
//! * sequences are arrays
//!
//! Serialization is streamed directly through `serde`. Deserialization goes
//! through [`serde_json::Value`], so that the closed-variant invariants
//! (known primitive names, arities, literal well-formedness) can be checked
//! on the whole object before any node is constructed.

use num_bigint::BigInt;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use crate::conv::error::{DecodeError, DecodeResult};

use super::prim::{self, PrimKind};
use super::ty::{Annots, MichelineType};
use super::Micheline;

/// Integer argument of a sapling type, serialized as an `int` literal
struct MemoSize(u16);

impl Serialize for MemoSize {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("int", &self.0.to_string())?;
        map.end()
    }
}

impl Serialize for Micheline {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Micheline::Seq(elems) => serializer.collect_seq(elems),
            Micheline::Int(i) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("int", &i.to_string())?;
                map.end()
            }
            Micheline::String(s) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("string", s)?;
                map.end()
            }
            Micheline::Bytes(hex) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("bytes", hex)?;
                map.end()
            }
            Micheline::Prim(p) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("prim", p.name())?;
                map.end()
            }
            Micheline::Single(p, arg) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("prim", p.name())?;
                map.serialize_entry("args", std::slice::from_ref(arg.as_ref()))?;
                map.end()
            }
            Micheline::Pair(args) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("prim", prim::PAIR)?;
                map.serialize_entry("args", args)?;
                map.end()
            }
            Micheline::Elt(key, val) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("prim", prim::ELT)?;
                map.serialize_entry("args", &[key.as_ref(), val.as_ref()])?;
                map.end()
            }
        }
    }
}

impl Serialize for MichelineType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let annots = self.annots_raw();
        let has_args = !matches!(self, MichelineType::Prim { .. });
        let len = 1 + usize::from(has_args) + usize::from(annots.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("prim", self.prim_name())?;
        match self {
            MichelineType::Prim { .. } => {}
            MichelineType::Unary { arg, .. } => {
                map.serialize_entry("args", std::slice::from_ref(arg.as_ref()))?;
            }
            MichelineType::Binary { args, .. } => {
                map.serialize_entry("args", &[&args.0, &args.1])?;
            }
            MichelineType::Sapling { memo_size, .. } => {
                map.serialize_entry("args", &[MemoSize(*memo_size)])?;
            }
            MichelineType::Pair { args, .. } => {
                map.serialize_entry("args", args)?;
            }
        }
        if let Some(annots) = annots {
            map.serialize_entry("annots", annots)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Micheline {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Micheline::from_json(&value).map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for MichelineType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        MichelineType::from_json(&value).map_err(serde::de::Error::custom)
    }
}

fn json_err(msg: impl Into<String>) -> DecodeError {
    let msg = msg.into();
    log::debug!("rejected Micheline JSON: {msg}");
    DecodeError::Json(msg)
}

/// Checks that an object has no keys outside of `allowed`
fn check_keys(obj: &Map<String, Value>, allowed: &[&str]) -> DecodeResult<()> {
    match obj.keys().find(|k| !allowed.contains(&k.as_str())) {
        Some(key) => Err(json_err(format!("unexpected key `{key}`"))),
        None => Ok(()),
    }
}

fn literal<'a>(obj: &'a Map<String, Value>, key: &str) -> DecodeResult<&'a str> {
    check_keys(obj, &[key])?;
    obj[key]
        .as_str()
        .ok_or_else(|| json_err(format!("`{key}` literal must be a JSON string")))
}

fn parse_int(text: &str) -> DecodeResult<BigInt> {
    if !super::is_canonical_int(text) {
        return Err(json_err(format!("`{text}` is not a canonical decimal integer")));
    }
    text.parse::<BigInt>()
        .map_err(|_| json_err(format!("`{text}` is not a decimal integer")))
}

fn args_of(obj: &Map<String, Value>) -> DecodeResult<&[Value]> {
    match obj.get("args") {
        None => Ok(&[]),
        Some(Value::Array(args)) => Ok(args.as_slice()),
        Some(_) => Err(json_err("`args` must be a JSON array")),
    }
}

fn annots_of(obj: &Map<String, Value>) -> DecodeResult<Annots> {
    match obj.get("annots") {
        None => Ok(None),
        Some(Value::Array(annots)) => annots
            .iter()
            .map(|a| {
                a.as_str()
                    .map(str::to_owned)
                    .ok_or_else(|| json_err("annotations must be JSON strings"))
            })
            .collect::<DecodeResult<Vec<String>>>()
            .map(Some),
        Some(_) => Err(json_err("`annots` must be a JSON array")),
    }
}

fn lookup_prim(obj: &Map<String, Value>) -> DecodeResult<PrimKind> {
    let name = obj["prim"]
        .as_str()
        .ok_or_else(|| json_err("`prim` must be a JSON string"))?;
    prim::by_name(name).ok_or_else(|| {
        log::debug!("unknown primitive `{name}`");
        DecodeError::UnknownPrim(name.to_owned())
    })
}

fn exact_args(kind: PrimKind, args: &[Value], n: usize) -> DecodeResult<()> {
    if args.len() == n {
        Ok(())
    } else {
        Err(DecodeError::arity(kind.name(), n, args.len()))
    }
}

impl Micheline {
    /// Converts this value into its JSON wire form
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Micheline::Seq(elems) => Value::Array(elems.iter().map(Micheline::to_json).collect()),
            Micheline::Int(i) => serde_json::json!({ "int": i.to_string() }),
            Micheline::String(s) => serde_json::json!({ "string": s }),
            Micheline::Bytes(hex) => serde_json::json!({ "bytes": hex }),
            Micheline::Prim(p) => serde_json::json!({ "prim": p.name() }),
            Micheline::Single(p, arg) => {
                serde_json::json!({ "prim": p.name(), "args": [arg.to_json()] })
            }
            Micheline::Pair(args) => serde_json::json!({
                "prim": prim::PAIR,
                "args": args.iter().map(Micheline::to_json).collect::<Vec<_>>(),
            }),
            Micheline::Elt(key, val) => {
                serde_json::json!({ "prim": prim::ELT, "args": [key.to_json(), val.to_json()] })
            }
        }
    }

    /// Interprets a JSON document as a Micheline value
    ///
    /// # Errors
    ///
    /// Fails with [`DecodeError::UnknownPrim`] on primitive names outside of
    /// the closed data set, with [`DecodeError::Arity`] when a constructor
    /// has the wrong number of arguments, and with [`DecodeError::Json`] for
    /// any other structural defect (including type primitives in value position).
    pub fn from_json(value: &Value) -> DecodeResult<Self> {
        match value {
            Value::Array(elems) => elems
                .iter()
                .map(Micheline::from_json)
                .collect::<DecodeResult<Vec<_>>>()
                .map(Micheline::Seq),
            Value::Object(obj) if obj.contains_key("int") => {
                parse_int(literal(obj, "int")?).map(Micheline::Int)
            }
            Value::Object(obj) if obj.contains_key("string") => {
                literal(obj, "string").map(Micheline::string)
            }
            Value::Object(obj) if obj.contains_key("bytes") => {
                literal(obj, "bytes").map(Micheline::bytes)
            }
            Value::Object(obj) if obj.contains_key("prim") => {
                check_keys(obj, &["prim", "args", "annots"])?;
                let kind = lookup_prim(obj)?;
                if annots_of(obj)?.is_some_and(|annots| !annots.is_empty()) {
                    return Err(json_err(format!("annotations on data constructor `{kind}`")));
                }
                let args = args_of(obj)?;
                match kind {
                    PrimKind::Nullary(p) => {
                        exact_args(kind, args, 0)?;
                        Ok(Micheline::Prim(p))
                    }
                    PrimKind::Unary(p) => {
                        exact_args(kind, args, 1)?;
                        Ok(Micheline::Single(p, Box::new(Micheline::from_json(&args[0])?)))
                    }
                    PrimKind::Elt => {
                        exact_args(kind, args, 2)?;
                        Ok(Micheline::elt(
                            Micheline::from_json(&args[0])?,
                            Micheline::from_json(&args[1])?,
                        ))
                    }
                    PrimKind::Pair => Micheline::try_pair(
                        args.iter()
                            .map(Micheline::from_json)
                            .collect::<DecodeResult<Vec<_>>>()?,
                    ),
                    other => Err(json_err(format!("type primitive `{other}` in value position"))),
                }
            }
            other => Err(json_err(format!("not a Micheline node: {other}"))),
        }
    }

    /// Parses a JSON string as a Micheline value
    pub fn from_json_str(text: &str) -> DecodeResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        Micheline::from_json(&value)
    }

    /// Renders this value as compact JSON text, with keys in wire order
    #[must_use]
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

impl MichelineType {
    /// Converts this type into its JSON wire form
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut obj = Map::new();
        obj.insert("prim".into(), Value::from(self.prim_name()));
        let args: Option<Vec<Value>> = match self {
            MichelineType::Prim { .. } => None,
            MichelineType::Unary { arg, .. } => Some(vec![arg.to_json()]),
            MichelineType::Binary { args, .. } => Some(vec![args.0.to_json(), args.1.to_json()]),
            MichelineType::Sapling { memo_size, .. } => {
                Some(vec![serde_json::json!({ "int": memo_size.to_string() })])
            }
            MichelineType::Pair { args, .. } => {
                Some(args.iter().map(MichelineType::to_json).collect())
            }
        };
        if let Some(args) = args {
            obj.insert("args".into(), Value::Array(args));
        }
        if let Some(annots) = self.annots_raw() {
            obj.insert(
                "annots".into(),
                Value::Array(annots.iter().cloned().map(Value::String).collect()),
            );
        }
        Value::Object(obj)
    }

    /// Interprets a JSON document as a Micheline type
    pub fn from_json(value: &Value) -> DecodeResult<Self> {
        let obj = match value {
            Value::Object(obj) if obj.contains_key("prim") => obj,
            other => return Err(json_err(format!("not a Micheline type node: {other}"))),
        };
        check_keys(obj, &["prim", "args", "annots"])?;
        let kind = lookup_prim(obj)?;
        let annots = annots_of(obj)?;
        let args = args_of(obj)?;
        let ty = match kind {
            PrimKind::Type(prim) => {
                exact_args(kind, args, 0)?;
                MichelineType::Prim { prim, annots }
            }
            PrimKind::UnaryType(prim) => {
                exact_args(kind, args, 1)?;
                MichelineType::Unary {
                    prim,
                    arg: Box::new(MichelineType::from_json(&args[0])?),
                    annots,
                }
            }
            PrimKind::BinaryType(prim) => {
                exact_args(kind, args, 2)?;
                MichelineType::Binary {
                    prim,
                    args: Box::new((
                        MichelineType::from_json(&args[0])?,
                        MichelineType::from_json(&args[1])?,
                    )),
                    annots,
                }
            }
            PrimKind::SaplingType(prim) => {
                exact_args(kind, args, 1)?;
                let memo = match &args[0] {
                    Value::Object(obj) if obj.contains_key("int") => literal(obj, "int")?,
                    other => return Err(json_err(format!("memo size must be an int, found {other}"))),
                };
                let memo_size = u16::try_from(parse_int(memo)?)
                    .map_err(|_| json_err(format!("memo size `{memo}` out of range")))?;
                MichelineType::Sapling {
                    prim,
                    memo_size,
                    annots,
                }
            }
            PrimKind::PairType => {
                let components = args
                    .iter()
                    .map(MichelineType::from_json)
                    .collect::<DecodeResult<Vec<_>>>()?;
                let mut pair = MichelineType::try_pair(components)?;
                if let MichelineType::Pair { annots: slot, .. } = &mut pair {
                    *slot = annots;
                }
                pair
            }
            other => return Err(json_err(format!("data primitive `{other}` in type position"))),
        };
        Ok(ty)
    }

    /// Parses a JSON string as a Micheline type
    pub fn from_json_str(text: &str) -> DecodeResult<Self> {
        let value: Value = serde_json::from_str(text)?;
        MichelineType::from_json(&value)
    }

    /// Renders this type as compact JSON text, with keys in wire order
    #[must_use]
    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::micheline::prim::TypePrim;

    #[test]
    fn value_wire_shape() {
        let pair = Micheline::pair(Micheline::int(5), Micheline::int(1));
        assert_eq!(
            serde_json::to_string(&pair).unwrap(),
            r#"{"prim":"Pair","args":[{"int":"5"},{"int":"1"}]}"#
        );
        assert_eq!(pair.to_json_string(), r#"{"prim":"Pair","args":[{"int":"5"},{"int":"1"}]}"#);
        assert_eq!(serde_json::to_string(&Micheline::unit()).unwrap(), r#"{"prim":"Unit"}"#);
        assert_eq!(
            serde_json::to_string(&Micheline::seq([Micheline::string("a")])).unwrap(),
            r#"[{"string":"a"}]"#
        );
    }

    #[test]
    fn type_wire_shape() {
        let ty = MichelineType::option(MichelineType::prim_annot(TypePrim::nat, Vec::<String>::new()))
            .with_annots(Vec::<String>::new());
        let expected = r#"{"prim":"option","args":[{"prim":"nat","annots":[]}],"annots":[]}"#;
        assert_eq!(serde_json::to_string(&ty).unwrap(), expected);
        assert_eq!(ty.to_json_string(), expected);
        assert_eq!(MichelineType::from_json_str(expected).unwrap(), ty);
    }

    #[test]
    fn event_type_shape() {
        let text = r#"{"prim":"pair","args":[{"prim":"nat","annots":["%a"]},{"prim":"string","annots":["%b"]}]}"#;
        let ty = MichelineType::from_json_str(text).unwrap();
        assert_eq!(
            ty,
            MichelineType::pair(
                MichelineType::prim(TypePrim::nat).with_field("a"),
                MichelineType::prim(TypePrim::string).with_field("b"),
            )
        );
        assert_eq!(serde_json::to_string(&ty).unwrap(), text);
    }

    #[test]
    fn sapling_memo() {
        let ty = MichelineType::from_json_str(r#"{"prim":"sapling_state","args":[{"int":"8"}]}"#).unwrap();
        assert_eq!(ty, MichelineType::sapling(crate::micheline::SaplingTypePrim::sapling_state, 8));
        assert!(MichelineType::from_json_str(r#"{"prim":"sapling_state","args":[{"int":"70000"}]}"#).is_err());
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(
            Micheline::from_json_str(r#"{"prim":"Foo"}"#),
            Err(DecodeError::UnknownPrim("Foo".into()))
        );
        assert!(matches!(
            Micheline::from_json_str(r#"{"prim":"Some","args":[]}"#),
            Err(DecodeError::Arity { expected: 1, actual: 0, .. })
        ));
        assert!(Micheline::from_json_str(r#"{"prim":"Pair","args":[{"int":"1"}]}"#).is_err());
        assert!(Micheline::from_json_str(r#"{"int":"12a"}"#).is_err());
        assert!(Micheline::from_json_str(r#"{"int":5}"#).is_err());
        assert!(Micheline::from_json_str(r#"{"prim":"nat"}"#).is_err());
        assert!(MichelineType::from_json_str(r#"{"prim":"Pair","args":[]}"#).is_err());
    }

    #[test]
    fn false_decodes() {
        let node: Micheline = serde_json::from_str(r#"{"prim":"False"}"#).unwrap();
        assert_eq!(node.as_bool(), Ok(false));
    }

    #[test]
    fn big_int_literal() {
        let text = r#"{"int":"-99999999999999999999999999999999"}"#;
        let node = Micheline::from_json_str(text).unwrap();
        assert_eq!(node.to_json_string(), text);
    }

    #[test]
    fn int_literals_are_canonical() {
        for text in ["0", "7", "-7", "1000", "-99999999999999999999"] {
            let json = format!(r#"{{"int":"{text}"}}"#);
            assert_eq!(Micheline::from_json_str(&json).unwrap().to_json_string(), json);
        }
        for text in ["1_000", "+5", "007", "-0", "-", "", " 5", "5 ", "0x10", "1e3"] {
            let json = format!(r#"{{"int":"{text}"}}"#);
            assert!(
                matches!(Micheline::from_json_str(&json), Err(DecodeError::Json(_))),
                "accepted `{text}`"
            );
        }
        let memo = r#"{"prim":"sapling_state","args":[{"int":"+8"}]}"#;
        assert!(MichelineType::from_json_str(memo).is_err());
    }
}
