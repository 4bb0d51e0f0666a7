//! Closed enumerations of the Michelson primitives representable in this model
//!
//! Each enumeration records both the textual name of a primitive, as it
//! appears in the `prim` field of Micheline JSON and in expression text,
//! and its binary tag as assigned by `michelson_v1_primitives`, which is
//! used by [`crate::pack`].
//!
//! Name and tag lookup go through a pair of tables built once on first use.

use std::collections::HashMap;
use std::fmt::Display;

macro_rules! prim_enum {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => ($text:literal, $code:literal)),* $(,)? }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[allow(non_camel_case_types)]
        pub enum $name {
            $($variant),*
        }

        impl $name {
            /// Every primitive of this class, in declaration order
            pub const ALL: &'static [Self] = &[$(Self::$variant),*];

            /// Name of the primitive as it appears in the `prim` field
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),*
                }
            }

            /// Binary tag of the primitive in packed Micheline
            #[must_use]
            pub const fn code(self) -> u8 {
                match self {
                    $(Self::$variant => $code),*
                }
            }
        }

        impl Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.name())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::conv::error::DecodeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::ALL
                    .iter()
                    .copied()
                    .find(|p| p.name() == s)
                    .ok_or_else(|| crate::conv::error::DecodeError::UnknownPrim(s.to_owned()))
            }
        }
    };
}

prim_enum! {
    /// Data constructors taking no arguments
    Nullary {
        False => ("False", 0x03),
        None => ("None", 0x06),
        True => ("True", 0x0a),
        Unit => ("Unit", 0x0b),
    }
}

prim_enum! {
    /// Data constructors taking exactly one argument
    Unary {
        Left => ("Left", 0x05),
        Right => ("Right", 0x08),
        Some => ("Some", 0x09),
    }
}

prim_enum! {
    /// Type primitives taking no arguments, other than annotations
    TypePrim {
        address => ("address", 0x6e),
        bls12_381_fr => ("bls12_381_fr", 0x82),
        bls12_381_g1 => ("bls12_381_g1", 0x80),
        bls12_381_g2 => ("bls12_381_g2", 0x81),
        bool => ("bool", 0x59),
        bytes => ("bytes", 0x69),
        chain_id => ("chain_id", 0x74),
        chest => ("chest", 0x8d),
        chest_key => ("chest_key", 0x8e),
        int => ("int", 0x5b),
        key => ("key", 0x5c),
        key_hash => ("key_hash", 0x5d),
        mutez => ("mutez", 0x6a),
        nat => ("nat", 0x62),
        never => ("never", 0x78),
        operation => ("operation", 0x6d),
        signature => ("signature", 0x67),
        string => ("string", 0x68),
        timestamp => ("timestamp", 0x6b),
        unit => ("unit", 0x6c),
    }
}

prim_enum! {
    /// Container type primitives with a single type argument
    UnaryTypePrim {
        contract => ("contract", 0x5a),
        list => ("list", 0x5f),
        option => ("option", 0x63),
        set => ("set", 0x66),
        ticket => ("ticket", 0x87),
    }
}

prim_enum! {
    /// Type primitives with exactly two type arguments
    BinaryTypePrim {
        big_map => ("big_map", 0x61),
        lambda => ("lambda", 0x5e),
        map => ("map", 0x60),
        or => ("or", 0x64),
    }
}

prim_enum! {
    /// Type primitives parameterized by an integer memo-size
    SaplingTypePrim {
        sapling_state => ("sapling_state", 0x83),
        sapling_transaction => ("sapling_transaction", 0x96),
    }
}

/// Name of the binary data constructor for pairs
pub const PAIR: &str = "Pair";
/// Name of the binary data constructor for map entries
pub const ELT: &str = "Elt";
/// Name of the n-ary pair type
pub const PAIR_TYPE: &str = "pair";

pub(crate) const PAIR_CODE: u8 = 0x07;
pub(crate) const ELT_CODE: u8 = 0x04;
pub(crate) const PAIR_TYPE_CODE: u8 = 0x65;

/// Classification of any primitive known to this model
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PrimKind {
    Nullary(Nullary),
    Unary(Unary),
    Pair,
    Elt,
    Type(TypePrim),
    UnaryType(UnaryTypePrim),
    BinaryType(BinaryTypePrim),
    SaplingType(SaplingTypePrim),
    PairType,
}

impl PrimKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PrimKind::Nullary(p) => p.name(),
            PrimKind::Unary(p) => p.name(),
            PrimKind::Pair => PAIR,
            PrimKind::Elt => ELT,
            PrimKind::Type(p) => p.name(),
            PrimKind::UnaryType(p) => p.name(),
            PrimKind::BinaryType(p) => p.name(),
            PrimKind::SaplingType(p) => p.name(),
            PrimKind::PairType => PAIR_TYPE,
        }
    }

    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            PrimKind::Nullary(p) => p.code(),
            PrimKind::Unary(p) => p.code(),
            PrimKind::Pair => PAIR_CODE,
            PrimKind::Elt => ELT_CODE,
            PrimKind::Type(p) => p.code(),
            PrimKind::UnaryType(p) => p.code(),
            PrimKind::BinaryType(p) => p.code(),
            PrimKind::SaplingType(p) => p.code(),
            PrimKind::PairType => PAIR_TYPE_CODE,
        }
    }

    /// Returns `true` for the primitives that construct data rather than types
    #[must_use]
    pub const fn is_data(self) -> bool {
        matches!(
            self,
            PrimKind::Nullary(_) | PrimKind::Unary(_) | PrimKind::Pair | PrimKind::Elt
        )
    }

    fn all() -> impl Iterator<Item = PrimKind> {
        Nullary::ALL
            .iter()
            .map(|&p| PrimKind::Nullary(p))
            .chain(Unary::ALL.iter().map(|&p| PrimKind::Unary(p)))
            .chain([PrimKind::Pair, PrimKind::Elt, PrimKind::PairType])
            .chain(TypePrim::ALL.iter().map(|&p| PrimKind::Type(p)))
            .chain(UnaryTypePrim::ALL.iter().map(|&p| PrimKind::UnaryType(p)))
            .chain(BinaryTypePrim::ALL.iter().map(|&p| PrimKind::BinaryType(p)))
            .chain(SaplingTypePrim::ALL.iter().map(|&p| PrimKind::SaplingType(p)))
    }
}

impl Display for PrimKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

lazy_static::lazy_static! {
    static ref BY_NAME: HashMap<&'static str, PrimKind> =
        PrimKind::all().map(|p| (p.name(), p)).collect();
    static ref BY_CODE: HashMap<u8, PrimKind> =
        PrimKind::all().map(|p| (p.code(), p)).collect();
}

/// Looks up a primitive by its textual name
#[must_use]
pub fn by_name(name: &str) -> Option<PrimKind> {
    BY_NAME.get(name).copied()
}

/// Looks up a primitive by its binary tag
#[must_use]
pub fn by_code(code: u8) -> Option<PrimKind> {
    BY_CODE.get(&code).copied()
}
