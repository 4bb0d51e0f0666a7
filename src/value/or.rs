//! Binary sum type corresponding to the Michelson `or` type

use crate::conv::{Decode, DecodeResult, Encode, Typed};
use crate::micheline::{Micheline, MichelineType};

/// A simple binary sum type, encoded as `Left x` or `Right y`
#[derive(Debug, Clone, Eq, PartialOrd, Ord, PartialEq, Hash)]
pub enum Or<L, R> {
    Left(L),
    Right(R),
}

impl<T> Or<T, T> {
    /// For an [Or] that has the same type in both branches, transform a value
    /// inside the [Or] using a supplied function.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Or<U, U> {
        match self {
            Self::Left(x) => Or::Left(f(x)),
            Self::Right(x) => Or::Right(f(x)),
        }
    }
}

impl<T, U> Or<T, U> {
    /// Depending on whether the [Or] contains [Or::Left] or [Or::Right], use
    /// correspondingly either `f` or `g` to transform the value inside.
    pub fn bimap<V, W>(self, f: impl FnOnce(T) -> V, g: impl FnOnce(U) -> W) -> Or<V, W> {
        match self {
            Self::Left(x) => Or::Left(f(x)),
            Self::Right(x) => Or::Right(g(x)),
        }
    }

    pub fn is_left(&self) -> bool {
        matches!(self, Self::Left(_))
    }

    pub fn as_ref(&self) -> Or<&T, &U> {
        match self {
            Self::Left(x) => Or::Left(x),
            Self::Right(x) => Or::Right(x),
        }
    }
}

impl<L: Encode, R: Encode> Encode for Or<L, R> {
    fn encode(&self) -> Micheline {
        match self {
            Or::Left(x) => Micheline::left(x.encode()),
            Or::Right(x) => Micheline::right(x.encode()),
        }
    }
}

impl<L: Decode, R: Decode> Decode for Or<L, R> {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        match node.as_or()? {
            Or::Left(x) => L::decode(x).map(Or::Left),
            Or::Right(x) => R::decode(x).map(Or::Right),
        }
    }
}

impl<L: Typed, R: Typed> Typed for Or<L, R> {
    fn mich_type() -> MichelineType {
        MichelineType::or(L::mich_type(), R::mich_type())
    }
}
