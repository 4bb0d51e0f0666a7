//! Free-standing builders and readers over the Micheline model
//!
//! The functions in this module are the building blocks that generated
//! contract bindings are written against: `*_to_mich` functions construct
//! Micheline data and type nodes, `mich_to_*` functions read them back,
//! and the structural helpers translate between right-comb pairs and the
//! flat component lists that records are made of.
//!
//! Container builders take the element encoder as a closure rather than
//! requiring [`Encode`], so that callers may encode the same Rust type in
//! more than one way (e.g. a `String` that is really an address).
//!
//! # Comb equivalence
//!
//! A flat `Pair a b c` and the right comb `Pair a (Pair b c)` denote the
//! same value. [`unpair`] and [`unpair_n`] accept either form, or any mix of
//! the two, and [`mich_array_to_mich`] always produces the nested form.

use chrono::{DateTime, Utc};
use num_bigint::BigInt;

use crate::conv::{Decode, DecodeError, DecodeResult, Encode};
use crate::micheline::{
    prim, BinaryTypePrim, Micheline, MichelineType, TypePrim, UnaryTypePrim,
};
use crate::value::{Bytes, Int, Nat};

/* Type builders */

pub const fn prim_to_mich_type(prim: TypePrim) -> MichelineType {
    MichelineType::prim(prim)
}

pub fn prim_annot_to_mich_type<S: Into<String>>(
    prim: TypePrim,
    annots: impl IntoIterator<Item = S>,
) -> MichelineType {
    MichelineType::prim_annot(prim, annots)
}

/// Builds one of the binary container types (`map`, `big_map`, `or`, `lambda`)
pub fn pair_to_mich_type(prim: BinaryTypePrim, a: MichelineType, b: MichelineType) -> MichelineType {
    MichelineType::binary(prim, a, b)
}

/// Builds a flat n-ary `pair` type
///
/// # Errors
///
/// Fails with [`DecodeError::Arity`] if fewer than two components are given.
pub fn pair_array_to_mich_type(args: Vec<MichelineType>) -> DecodeResult<MichelineType> {
    MichelineType::try_pair(args)
}

pub fn option_to_mich_type(arg: MichelineType) -> MichelineType {
    MichelineType::unary(UnaryTypePrim::option, arg)
}

pub fn list_to_mich_type(arg: MichelineType) -> MichelineType {
    MichelineType::unary(UnaryTypePrim::list, arg)
}

/* Data builders */

pub const fn none_mich() -> Micheline {
    Micheline::none()
}

pub fn string_to_mich(val: impl Into<String>) -> Micheline {
    Micheline::string(val)
}

pub const fn bool_to_mich(val: bool) -> Micheline {
    Micheline::boolean(val)
}

pub fn bigint_to_mich(val: &BigInt) -> Micheline {
    Micheline::Int(val.clone())
}

pub fn date_to_mich(val: &DateTime<Utc>) -> Micheline {
    val.encode()
}

pub fn elt_to_mich(key: Micheline, val: Micheline) -> Micheline {
    Micheline::elt(key, val)
}

/// Builds a flat n-ary `Pair`
///
/// # Errors
///
/// Fails with [`DecodeError::Arity`] if fewer than two components are given.
pub fn pair_to_mich(args: Vec<Micheline>) -> DecodeResult<Micheline> {
    Micheline::try_pair(args)
}

pub fn some_to_mich(val: Micheline) -> Micheline {
    Micheline::some(val)
}

pub fn option_to_mich<T>(val: Option<T>, to_mich: impl FnOnce(T) -> Micheline) -> Micheline {
    match val {
        Some(x) => Micheline::some(to_mich(x)),
        None => Micheline::none(),
    }
}

pub fn list_to_mich<T>(
    elems: impl IntoIterator<Item = T>,
    to_mich: impl FnMut(T) -> Micheline,
) -> Micheline {
    Micheline::Seq(elems.into_iter().map(to_mich).collect())
}

/// Encodes the elements of a set in the iteration order of `elems`
///
/// No sorting is performed. Michelson requires set literals to be sorted
/// by key, so callers holding unordered collections must sort beforehand;
/// collections such as `BTreeSet` already iterate in order.
pub fn set_to_mich<T>(
    elems: impl IntoIterator<Item = T>,
    to_mich: impl FnMut(T) -> Micheline,
) -> Micheline {
    list_to_mich(elems, to_mich)
}

/// Encodes a sequence of map entries as a `Seq` of `Elt` nodes, in the
/// order in which they are given
pub fn map_to_mich<K, V>(
    entries: impl IntoIterator<Item = (K, V)>,
    mut key_to_mich: impl FnMut(K) -> Micheline,
    mut val_to_mich: impl FnMut(V) -> Micheline,
) -> Micheline {
    Micheline::Seq(
        entries
            .into_iter()
            .map(|(k, v)| Micheline::elt(key_to_mich(k), val_to_mich(v)))
            .collect(),
    )
}

/* Readers */

/// Returns the components of a `Pair` node exactly as they are given
pub fn mich_to_pairs(node: &Micheline) -> DecodeResult<Vec<Micheline>> {
    node.as_pair().map(<[Micheline]>::to_vec)
}

pub fn mich_to_string(node: &Micheline) -> DecodeResult<String> {
    node.as_string().map(str::to_owned)
}

pub fn mich_to_bigint(node: &Micheline) -> DecodeResult<BigInt> {
    node.as_int().cloned()
}

pub fn mich_to_int(node: &Micheline) -> DecodeResult<Int> {
    Int::decode(node)
}

pub fn mich_to_nat(node: &Micheline) -> DecodeResult<Nat> {
    Nat::decode(node)
}

pub fn mich_to_bool(node: &Micheline) -> DecodeResult<bool> {
    node.as_bool()
}

pub fn mich_to_date(node: &Micheline) -> DecodeResult<DateTime<Utc>> {
    DateTime::<Utc>::decode(node)
}

pub fn mich_to_bytes(node: &Micheline) -> DecodeResult<Bytes> {
    Bytes::decode(node)
}

pub fn mich_to_option<T>(
    node: &Micheline,
    of_mich: impl FnOnce(&Micheline) -> DecodeResult<T>,
) -> DecodeResult<Option<T>> {
    node.as_option()?.map(of_mich).transpose()
}

pub fn mich_to_list<T>(
    node: &Micheline,
    of_mich: impl FnMut(&Micheline) -> DecodeResult<T>,
) -> DecodeResult<Vec<T>> {
    node.as_seq()?.iter().map(of_mich).collect()
}

/// Reads a `Seq` of `Elt` nodes into key-value pairs, preserving their order
///
/// # Errors
///
/// Fails if the node is not a sequence, if any element is not an `Elt`, or
/// if either decoder fails on any entry.
pub fn mich_to_map<K, V>(
    node: &Micheline,
    mut of_mich: impl FnMut(&Micheline, &Micheline) -> DecodeResult<(K, V)>,
) -> DecodeResult<Vec<(K, V)>> {
    node.as_seq()?
        .iter()
        .map(|elt| {
            let (key, val) = elt.as_elt()?;
            of_mich(key, val)
        })
        .collect()
}

/* Structural helpers */

/// Right-folds a list of components into nested binary `Pair` nodes
///
/// `[a, b, c]` becomes `Pair a (Pair b c)`. A single component is returned
/// unchanged and an empty list yields `Unit`, so that the result is always
/// a well-formed node.
pub fn mich_array_to_mich(mut elems: Vec<Micheline>) -> Micheline {
    let Some(mut acc) = elems.pop() else {
        return Micheline::unit();
    };
    while let Some(prev) = elems.pop() {
        acc = Micheline::pair(prev, acc);
    }
    acc
}

/// Splits a pair node into exactly `n` components
///
/// The node may be a flat n-ary `Pair`, a right comb, or any mix of the two.
/// Surplus components are regrouped into a trailing `Pair`, so that
/// `Pair a b c` read as two components yields `[a, Pair b c]`. For `n == 1`
/// the node itself is the only component.
///
/// # Errors
///
/// Fails with [`DecodeError::Arity`] if the comb holds fewer than `n`
/// components, and with [`DecodeError::UnexpectedNode`] if the node is not
/// a `Pair` at all.
pub fn unpair(node: &Micheline, n: usize) -> DecodeResult<Vec<Micheline>> {
    match n {
        0 => return Err(DecodeError::arity(prim::PAIR, 0, 1)),
        1 => return Ok(vec![node.clone()]),
        _ => {}
    }
    let mut out = Vec::with_capacity(n);
    let mut cur = node.as_pair()?;
    loop {
        let remaining = n - out.len();
        if cur.len() >= remaining {
            let (init, rest) = cur.split_at(remaining - 1);
            out.extend_from_slice(init);
            out.push(match rest {
                [last] => last.clone(),
                _ => Micheline::Pair(rest.to_vec()),
            });
            return Ok(out);
        }
        if let Some((last, init)) = cur.split_last() {
            out.extend_from_slice(init);
            cur = match last {
                Micheline::Pair(args) if args.len() >= 2 => args.as_slice(),
                _ => return Err(DecodeError::arity(prim::PAIR, n, out.len() + 1)),
            };
        }
    }
}

/// Splits a pair node into an array of exactly `N` components
///
/// See [`unpair`] for the accepted shapes.
pub fn unpair_n<const N: usize>(node: &Micheline) -> DecodeResult<[Micheline; N]> {
    let comps = unpair(node, N)?;
    let actual = comps.len();
    comps
        .try_into()
        .map_err(|_| DecodeError::arity(prim::PAIR, N, actual))
}

/// Flattens a value into the list of its annotated components
///
/// The type is walked alongside the value: unannotated `pair` types are
/// descended into, and every annotated component is collected whole,
/// whatever its own shape. The root type is always descended into if it is
/// a pair, even when it carries an annotation of its own.
///
/// # Errors
///
/// Fails with [`DecodeError::Unannotated`] upon reaching an unannotated
/// component that is not a pair, and with [`DecodeError::Arity`] if the
/// value has fewer components than its type.
pub fn annotated_mich_to_array(
    node: &Micheline,
    ty: &MichelineType,
) -> DecodeResult<Vec<Micheline>> {
    let mut out = Vec::new();
    match ty {
        MichelineType::Pair { args, .. } => collect_pair(node, args, &mut out)?,
        _ if ty.is_annotated() => out.push(node.clone()),
        _ => return Err(unannotated(ty)),
    }
    Ok(out)
}

fn collect_annotated(
    node: &Micheline,
    ty: &MichelineType,
    out: &mut Vec<Micheline>,
) -> DecodeResult<()> {
    if ty.is_annotated() {
        log::trace!("collecting component {}", ty.annots().join(" "));
        out.push(node.clone());
        return Ok(());
    }
    match ty {
        MichelineType::Pair { args, .. } => collect_pair(node, args, out),
        _ => Err(unannotated(ty)),
    }
}

fn collect_pair(
    node: &Micheline,
    tys: &[MichelineType],
    out: &mut Vec<Micheline>,
) -> DecodeResult<()> {
    log::trace!("descending into {}-ary pair", tys.len());
    let comps = unpair(node, tys.len())?;
    comps
        .iter()
        .zip(tys)
        .try_for_each(|(comp, ty)| collect_annotated(comp, ty, out))
}

fn unannotated(ty: &MichelineType) -> DecodeError {
    let err = DecodeError::Unannotated(ty.to_string());
    log::debug!("decode failure: {err}");
    err
}

#[cfg(test)]
mod test {
    use super::*;

    fn int(i: i64) -> Micheline {
        Micheline::int(i)
    }

    #[test]
    fn right_fold() {
        assert_eq!(
            mich_array_to_mich(vec![int(1), int(2), int(3)]),
            Micheline::pair(int(1), Micheline::pair(int(2), int(3)))
        );
        assert_eq!(mich_array_to_mich(vec![int(1)]), int(1));
        assert_eq!(mich_array_to_mich(vec![]), Micheline::unit());
    }

    #[test]
    fn unpair_normalizes_combs() {
        let flat = Micheline::Pair(vec![int(1), int(2), int(3), int(4)]);
        let nested = mich_array_to_mich(vec![int(1), int(2), int(3), int(4)]);
        let mixed = Micheline::Pair(vec![int(1), Micheline::Pair(vec![int(2), int(3), int(4)])]);
        for node in [&flat, &nested, &mixed] {
            assert_eq!(unpair_n::<4>(node), Ok([int(1), int(2), int(3), int(4)]));
        }
        assert_eq!(
            unpair_n::<2>(&flat),
            Ok([int(1), Micheline::Pair(vec![int(2), int(3), int(4)])])
        );
        assert_eq!(unpair_n::<1>(&int(7)), Ok([int(7)]));
    }

    #[test]
    fn unpair_too_short() {
        let node = Micheline::pair(int(1), int(2));
        assert_eq!(
            unpair(&node, 3),
            Err(DecodeError::Arity {
                prim: "Pair".into(),
                expected: 3,
                actual: 2
            })
        );
        assert!(matches!(unpair(&int(1), 2), Err(DecodeError::UnexpectedNode { .. })));
    }

    #[test]
    fn annotated_flattening() {
        let ty = MichelineType::pair(
            MichelineType::prim(TypePrim::nat).with_field("a"),
            MichelineType::pair(
                MichelineType::prim(TypePrim::string).with_field("b"),
                MichelineType::option(TypePrim::bool.into()).with_field("c"),
            ),
        );
        let node = Micheline::Pair(vec![
            int(1),
            Micheline::string("x"),
            Micheline::none(),
        ]);
        assert_eq!(
            annotated_mich_to_array(&node, &ty),
            Ok(vec![int(1), Micheline::string("x"), Micheline::none()])
        );
    }

    #[test]
    fn annotated_pair_kept_whole() {
        let inner = MichelineType::pair(TypePrim::nat.into(), TypePrim::nat.into()).with_field("p");
        let ty = MichelineType::pair(inner, MichelineType::prim(TypePrim::int).with_field("q"));
        let node = mich_array_to_mich(vec![int(1), int(2), int(3)]);
        assert_eq!(
            annotated_mich_to_array(&node, &ty),
            Ok(vec![int(1), Micheline::pair(int(2), int(3))])
        );
    }

    #[test]
    fn unannotated_leaf_fails() {
        let ty = MichelineType::pair(TypePrim::nat.into(), TypePrim::int.into());
        let node = Micheline::pair(int(1), int(2));
        assert!(matches!(
            annotated_mich_to_array(&node, &ty),
            Err(DecodeError::Unannotated(_))
        ));
        assert!(annotated_mich_to_array(&int(1), &TypePrim::nat.into()).is_err());
    }

    #[test]
    fn container_builders() {
        assert_eq!(option_to_mich(Some(3), |x| int(x)), Micheline::some(int(3)));
        assert_eq!(option_to_mich(None::<i64>, int), none_mich());
        assert_eq!(list_to_mich([1, 2], int), Micheline::seq([int(1), int(2)]));
        assert_eq!(set_to_mich([2, 1], int), Micheline::seq([int(2), int(1)]));
        assert_eq!(
            map_to_mich([("k", 1)], string_to_mich, int),
            Micheline::seq([elt_to_mich(Micheline::string("k"), int(1))])
        );
        assert!(pair_to_mich(vec![int(1)]).is_err());
        assert_eq!(
            pair_array_to_mich_type(vec![TypePrim::nat.into(), TypePrim::int.into()])
                .map(|ty| ty.to_string()),
            Ok("pair nat int".to_owned())
        );
        assert_eq!(
            pair_to_mich_type(BinaryTypePrim::map, TypePrim::string.into(), TypePrim::nat.into())
                .to_string(),
            "map string nat"
        );
    }

    #[test]
    fn readers() {
        let node = Micheline::seq([
            Micheline::elt(Micheline::string("b"), int(2)),
            Micheline::elt(Micheline::string("a"), int(1)),
        ]);
        let entries = mich_to_map(&node, |k, v| Ok((mich_to_string(k)?, mich_to_nat(v)?)));
        assert_eq!(
            entries,
            Ok(vec![("b".to_owned(), Nat::from(2u32)), ("a".to_owned(), Nat::from(1u32))])
        );
        assert!(mich_to_map(&Micheline::seq([int(1)]), |k, v| Ok((k.clone(), v.clone()))).is_err());
        assert_eq!(mich_to_option(&Micheline::none(), mich_to_bool), Ok(None));
        assert_eq!(mich_to_list(&Micheline::seq([int(5)]), mich_to_bigint), Ok(vec![BigInt::from(5)]));
        assert_eq!(mich_to_pairs(&Micheline::pair(int(1), int(2))), Ok(vec![int(1), int(2)]));
        assert!(mich_to_nat(&int(-1)).is_err());
        assert!(mich_to_int(&Micheline::string("1")).is_err());
    }

    #[test]
    fn dates() {
        let date = mich_to_date(&Micheline::string("2022-01-01T00:00:00Z")).unwrap();
        assert_eq!(date_to_mich(&date), Micheline::string("2022-01-01T00:00:00.000Z"));
        assert_eq!(mich_to_date(&int(1_640_995_200)), Ok(date));
    }
}
