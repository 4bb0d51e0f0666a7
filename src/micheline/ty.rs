//! Micheline type expressions
//!
//! [`MichelineType`] mirrors [`Micheline`](super::Micheline) for the type
//! language: primitive types, single- and two-argument container types, the
//! integer-parameterized sapling types, and n-ary pair types. Every node may
//! carry annotations; field annotations (`%name`) label the components of
//! pair and `or` trees with record-like names.
//!
//! # Annotation presence
//!
//! Client traffic distinguishes between a type node without an `annots`
//! key and one with an empty `annots` list, so annotations are stored as
//! [`Annots`], i.e. `Option<Vec<String>>`, and both forms round-trip
//! exactly through JSON.

use crate::conv::error::{DecodeError, DecodeResult};

use super::prim::{self, BinaryTypePrim, SaplingTypePrim, TypePrim, UnaryTypePrim};

/// Annotation list of a type node; `None` when absent on the wire
pub type Annots = Option<Vec<String>>;

/// Micheline type node
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum MichelineType {
    Prim {
        prim: TypePrim,
        annots: Annots,
    },
    Unary {
        prim: UnaryTypePrim,
        arg: Box<MichelineType>,
        annots: Annots,
    },
    Binary {
        prim: BinaryTypePrim,
        args: Box<(MichelineType, MichelineType)>,
        annots: Annots,
    },
    Sapling {
        prim: SaplingTypePrim,
        memo_size: u16,
        annots: Annots,
    },
    /// N-ary pair type, always holding at least two components
    Pair {
        args: Vec<MichelineType>,
        annots: Annots,
    },
}

impl MichelineType {
    pub const fn prim(prim: TypePrim) -> Self {
        Self::Prim { prim, annots: None }
    }

    /// Primitive type carrying an explicit (possibly empty) annotation list
    pub fn prim_annot<S: Into<String>>(prim: TypePrim, annots: impl IntoIterator<Item = S>) -> Self {
        Self::Prim {
            prim,
            annots: Some(annots.into_iter().map(Into::into).collect()),
        }
    }

    pub fn unary(prim: UnaryTypePrim, arg: MichelineType) -> Self {
        Self::Unary {
            prim,
            arg: Box::new(arg),
            annots: None,
        }
    }

    pub fn option(arg: MichelineType) -> Self {
        Self::unary(UnaryTypePrim::option, arg)
    }

    pub fn list(arg: MichelineType) -> Self {
        Self::unary(UnaryTypePrim::list, arg)
    }

    pub fn set(arg: MichelineType) -> Self {
        Self::unary(UnaryTypePrim::set, arg)
    }

    pub fn contract(arg: MichelineType) -> Self {
        Self::unary(UnaryTypePrim::contract, arg)
    }

    pub fn binary(prim: BinaryTypePrim, lhs: MichelineType, rhs: MichelineType) -> Self {
        Self::Binary {
            prim,
            args: Box::new((lhs, rhs)),
            annots: None,
        }
    }

    pub fn map(key: MichelineType, val: MichelineType) -> Self {
        Self::binary(BinaryTypePrim::map, key, val)
    }

    pub fn big_map(key: MichelineType, val: MichelineType) -> Self {
        Self::binary(BinaryTypePrim::big_map, key, val)
    }

    pub fn or(lhs: MichelineType, rhs: MichelineType) -> Self {
        Self::binary(BinaryTypePrim::or, lhs, rhs)
    }

    pub fn lambda(arg: MichelineType, ret: MichelineType) -> Self {
        Self::binary(BinaryTypePrim::lambda, arg, ret)
    }

    pub const fn sapling(prim: SaplingTypePrim, memo_size: u16) -> Self {
        Self::Sapling {
            prim,
            memo_size,
            annots: None,
        }
    }

    pub fn pair(fst: MichelineType, snd: MichelineType) -> Self {
        Self::Pair {
            args: vec![fst, snd],
            annots: None,
        }
    }

    /// Constructs an n-ary `pair` type, failing if fewer than two
    /// components are provided
    pub fn try_pair(args: Vec<MichelineType>) -> DecodeResult<Self> {
        if args.len() < 2 {
            Err(DecodeError::arity(prim::PAIR_TYPE, 2, args.len()))
        } else {
            Ok(Self::Pair { args, annots: None })
        }
    }

    /// Name of the head primitive of this type
    #[must_use]
    pub fn prim_name(&self) -> &'static str {
        match self {
            MichelineType::Prim { prim, .. } => prim.name(),
            MichelineType::Unary { prim, .. } => prim.name(),
            MichelineType::Binary { prim, .. } => prim.name(),
            MichelineType::Sapling { prim, .. } => prim.name(),
            MichelineType::Pair { .. } => prim::PAIR_TYPE,
        }
    }

    /// Returns the annotation list as stored, distinguishing absence from emptiness
    #[must_use]
    pub fn annots_raw(&self) -> Option<&Vec<String>> {
        match self {
            MichelineType::Prim { annots, .. }
            | MichelineType::Unary { annots, .. }
            | MichelineType::Binary { annots, .. }
            | MichelineType::Sapling { annots, .. }
            | MichelineType::Pair { annots, .. } => annots.as_ref(),
        }
    }

    /// Returns the annotations of this node, empty if there are none
    #[must_use]
    pub fn annots(&self) -> &[String] {
        self.annots_raw().map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn is_annotated(&self) -> bool {
        !self.annots().is_empty()
    }

    /// Returns the name of the first field annotation, without its `%` prefix
    #[must_use]
    pub fn field_name(&self) -> Option<&str> {
        self.annots().iter().find_map(|a| a.strip_prefix('%'))
    }

    /// Replaces the annotation list of this node
    #[must_use]
    pub fn with_annots<S: Into<String>>(mut self, new: impl IntoIterator<Item = S>) -> Self {
        let new: Vec<String> = new.into_iter().map(Into::into).collect();
        match &mut self {
            MichelineType::Prim { annots, .. }
            | MichelineType::Unary { annots, .. }
            | MichelineType::Binary { annots, .. }
            | MichelineType::Sapling { annots, .. }
            | MichelineType::Pair { annots, .. } => *annots = Some(new),
        }
        self
    }

    /// Structural equality that ignores annotations at every level, along
    /// with the distinction between absent and empty annotation lists
    #[must_use]
    pub fn eq_modulo_annots(&self, other: &MichelineType) -> bool {
        match (self, other) {
            (MichelineType::Prim { prim: p, .. }, MichelineType::Prim { prim: q, .. }) => p == q,
            (
                MichelineType::Unary { prim: p, arg: a, .. },
                MichelineType::Unary { prim: q, arg: b, .. },
            ) => p == q && a.eq_modulo_annots(b),
            (
                MichelineType::Binary { prim: p, args: a, .. },
                MichelineType::Binary { prim: q, args: b, .. },
            ) => p == q && a.0.eq_modulo_annots(&b.0) && a.1.eq_modulo_annots(&b.1),
            (
                MichelineType::Sapling { prim: p, memo_size: m, .. },
                MichelineType::Sapling { prim: q, memo_size: n, .. },
            ) => p == q && m == n,
            (MichelineType::Pair { args: a, .. }, MichelineType::Pair { args: b, .. }) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_modulo_annots(y))
            }
            _ => false,
        }
    }

    /// Appends a `%name` field annotation to this node
    #[must_use]
    pub fn with_field(self, name: &str) -> Self {
        let mut annots: Vec<String> = self.annots().to_vec();
        annots.push(format!("%{name}"));
        self.with_annots(annots)
    }
}

impl From<TypePrim> for MichelineType {
    fn from(prim: TypePrim) -> Self {
        Self::prim(prim)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn annotations() {
        let ty = MichelineType::prim(TypePrim::nat);
        assert_eq!(ty.annots_raw(), None);
        assert!(!ty.is_annotated());
        let ty = ty.with_field("total");
        assert_eq!(ty.annots(), ["%total".to_owned()]);
        assert_eq!(ty.field_name(), Some("total"));
        let empty = MichelineType::prim_annot(TypePrim::nat, Vec::<String>::new());
        assert_eq!(empty.annots_raw(), Some(&vec![]));
        assert_ne!(empty, MichelineType::prim(TypePrim::nat));
    }

    #[test]
    fn equality_modulo_annots() {
        let bare = MichelineType::map(TypePrim::nat.into(), TypePrim::string.into());
        let annotated = MichelineType::map(
            MichelineType::prim_annot(TypePrim::nat, Vec::<String>::new()),
            MichelineType::prim(TypePrim::string).with_field("v"),
        )
        .with_annots([":ledger"]);
        assert_ne!(bare, annotated);
        assert!(bare.eq_modulo_annots(&annotated));
        assert!(annotated.eq_modulo_annots(&bare));
        let other = MichelineType::map(TypePrim::nat.into(), TypePrim::bytes.into());
        assert!(!bare.eq_modulo_annots(&other));
        let flat = MichelineType::try_pair(vec![MichelineType::prim(TypePrim::nat); 3]).unwrap();
        let nested = MichelineType::pair(TypePrim::nat.into(), TypePrim::nat.into());
        assert!(!flat.eq_modulo_annots(&nested));
    }

    #[test]
    fn pair_arity() {
        assert!(MichelineType::try_pair(vec![TypePrim::nat.into()]).is_err());
        assert_eq!(
            MichelineType::try_pair(vec![TypePrim::nat.into(), TypePrim::int.into()]),
            Ok(MichelineType::pair(TypePrim::nat.into(), TypePrim::int.into()))
        );
    }
}
