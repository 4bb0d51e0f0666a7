//! Untyped Micheline values
//!
//! [`Micheline`] is the language-neutral representation of Michelson data
//! exchanged with the blockchain client. It is a closed, recursive variant
//! over the literal and constructor forms that occur in contract storage,
//! entrypoint arguments, and big-map contents.
//!
//! # Arity
//!
//! Constructor nodes carry a fixed number of arguments: one for `Some`,
//! `Left`, and `Right`, exactly two for `Elt`, and at least two for `Pair`
//! (an n-ary `Pair` is shorthand for the right comb of its arguments).
//! These invariants are upheld by the constructors in this module and by
//! every parser in the crate (JSON, expression text, packed binary), so that
//! decoders downstream never observe a malformed node.
//!
//! # Accessors
//!
//! The `as_*` accessors extract the payload of a specific variant, and fail
//! with a [`DecodeError`] rather than defaulting when called on a node of
//! a different shape.

use num_bigint::BigInt;

use crate::conv::error::{DecodeError, DecodeResult};
use crate::hexstring::util::{bytes_of_hex, hex_of_bytes};
use crate::value::or::Or;

pub mod expr;
pub mod json;
pub mod prim;
pub mod ty;

pub use prim::{BinaryTypePrim, Nullary, SaplingTypePrim, TypePrim, Unary, UnaryTypePrim};
pub use ty::MichelineType;

/// Maximum nesting depth of a node read from packed bytes or expression text
pub const MAX_DEPTH: usize = 256;

/// Checks that `text` is an integer literal as carried by JSON and
/// expression text: an optional `-` followed by decimal digits, with no
/// leading zero other than `0` itself
pub(crate) fn is_canonical_int(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    match digits.as_bytes() {
        [] => false,
        [b'0'] => digits.len() == text.len(),
        [b'0', ..] => false,
        bytes => bytes.iter().all(u8::is_ascii_digit),
    }
}

/// Untyped Micheline data node
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Micheline {
    /// `True`, `False`, `None`, or `Unit`
    Prim(Nullary),
    String(String),
    /// Hex-encoded byte-string, kept in the textual form it was given in
    Bytes(String),
    Int(BigInt),
    /// `Some`, `Left`, or `Right` applied to its single argument
    Single(Unary, Box<Micheline>),
    /// N-ary pair, always holding at least two components
    Pair(Vec<Micheline>),
    /// Map entry
    Elt(Box<Micheline>, Box<Micheline>),
    Seq(Vec<Micheline>),
}

impl Micheline {
    pub fn int(val: impl Into<BigInt>) -> Self {
        Self::Int(val.into())
    }

    /// Integer literal from a natural number; the non-negativity of the
    /// payload is guaranteed by the argument type
    pub fn nat(val: impl Into<num_bigint::BigUint>) -> Self {
        Self::Int(BigInt::from(val.into()))
    }

    pub fn string(val: impl Into<String>) -> Self {
        Self::String(val.into())
    }

    /// Constructs a byte-string node from its hex-encoded form, without validation
    pub fn bytes(hex: impl Into<String>) -> Self {
        Self::Bytes(hex.into())
    }

    /// Constructs a byte-string node from raw bytes
    pub fn bytes_of(raw: &[u8]) -> Self {
        Self::Bytes(hex_of_bytes(raw))
    }

    pub const fn unit() -> Self {
        Self::Prim(Nullary::Unit)
    }

    pub const fn none() -> Self {
        Self::Prim(Nullary::None)
    }

    pub const fn boolean(val: bool) -> Self {
        Self::Prim(if val { Nullary::True } else { Nullary::False })
    }

    pub fn some(val: Micheline) -> Self {
        Self::Single(Unary::Some, Box::new(val))
    }

    pub fn left(val: Micheline) -> Self {
        Self::Single(Unary::Left, Box::new(val))
    }

    pub fn right(val: Micheline) -> Self {
        Self::Single(Unary::Right, Box::new(val))
    }

    pub fn pair(fst: Micheline, snd: Micheline) -> Self {
        Self::Pair(vec![fst, snd])
    }

    /// Constructs an n-ary `Pair` node, failing if fewer than two
    /// components are provided
    pub fn try_pair(args: Vec<Micheline>) -> DecodeResult<Self> {
        if args.len() < 2 {
            Err(DecodeError::arity(prim::PAIR, 2, args.len()))
        } else {
            Ok(Self::Pair(args))
        }
    }

    pub fn elt(key: Micheline, val: Micheline) -> Self {
        Self::Elt(Box::new(key), Box::new(val))
    }

    pub fn seq(elems: impl IntoIterator<Item = Micheline>) -> Self {
        Self::Seq(elems.into_iter().collect())
    }

    /// Short, human-readable description of the node's tag, used in error reporting
    #[must_use]
    pub fn tag(&self) -> &'static str {
        match self {
            Micheline::Prim(p) => p.name(),
            Micheline::String(_) => "string",
            Micheline::Bytes(_) => "bytes",
            Micheline::Int(_) => "int",
            Micheline::Single(p, _) => p.name(),
            Micheline::Pair(_) => prim::PAIR,
            Micheline::Elt(..) => prim::ELT,
            Micheline::Seq(_) => "sequence",
        }
    }

    pub fn as_int(&self) -> DecodeResult<&BigInt> {
        match self {
            Micheline::Int(i) => Ok(i),
            other => Err(DecodeError::unexpected("int", other)),
        }
    }

    pub fn as_string(&self) -> DecodeResult<&str> {
        match self {
            Micheline::String(s) => Ok(s.as_str()),
            other => Err(DecodeError::unexpected("string", other)),
        }
    }

    /// Returns the hex-encoded payload of a byte-string node
    pub fn as_bytes(&self) -> DecodeResult<&str> {
        match self {
            Micheline::Bytes(hex) => Ok(hex.as_str()),
            other => Err(DecodeError::unexpected("bytes", other)),
        }
    }

    /// Returns the decoded payload of a byte-string node
    pub fn as_raw_bytes(&self) -> DecodeResult<Vec<u8>> {
        let hex = self.as_bytes()?;
        bytes_of_hex(hex).map_err(|err| DecodeError::Invalid(err.into()))
    }

    pub fn as_bool(&self) -> DecodeResult<bool> {
        match self {
            Micheline::Prim(Nullary::True) => Ok(true),
            Micheline::Prim(Nullary::False) => Ok(false),
            other => Err(DecodeError::unexpected("True or False", other)),
        }
    }

    pub fn as_unit(&self) -> DecodeResult<()> {
        match self {
            Micheline::Prim(Nullary::Unit) => Ok(()),
            other => Err(DecodeError::unexpected("Unit", other)),
        }
    }

    /// Returns the components of a `Pair` node, as given (i.e. without comb normalization)
    pub fn as_pair(&self) -> DecodeResult<&[Micheline]> {
        match self {
            Micheline::Pair(args) if args.len() >= 2 => Ok(args.as_slice()),
            Micheline::Pair(args) => Err(DecodeError::arity(prim::PAIR, 2, args.len())),
            other => Err(DecodeError::unexpected("Pair", other)),
        }
    }

    pub fn as_elt(&self) -> DecodeResult<(&Micheline, &Micheline)> {
        match self {
            Micheline::Elt(key, val) => Ok((key, val)),
            other => Err(DecodeError::unexpected("Elt", other)),
        }
    }

    pub fn as_seq(&self) -> DecodeResult<&[Micheline]> {
        match self {
            Micheline::Seq(elems) => Ok(elems.as_slice()),
            other => Err(DecodeError::unexpected("sequence", other)),
        }
    }

    pub fn as_option(&self) -> DecodeResult<Option<&Micheline>> {
        match self {
            Micheline::Prim(Nullary::None) => Ok(None),
            Micheline::Single(Unary::Some, val) => Ok(Some(val)),
            other => Err(DecodeError::unexpected("None or Some", other)),
        }
    }

    pub fn as_or(&self) -> DecodeResult<Or<&Micheline, &Micheline>> {
        match self {
            Micheline::Single(Unary::Left, val) => Ok(Or::Left(val)),
            Micheline::Single(Unary::Right, val) => Ok(Or::Right(val)),
            other => Err(DecodeError::unexpected("Left or Right", other)),
        }
    }
}

impl From<BigInt> for Micheline {
    fn from(x: BigInt) -> Self {
        Micheline::Int(x)
    }
}

impl From<String> for Micheline {
    fn from(x: String) -> Self {
        Micheline::String(x)
    }
}

impl From<&str> for Micheline {
    fn from(s: &str) -> Self {
        Micheline::String(s.to_owned())
    }
}

impl From<bool> for Micheline {
    fn from(x: bool) -> Self {
        Micheline::boolean(x)
    }
}

impl From<()> for Micheline {
    fn from(_: ()) -> Self {
        Micheline::unit()
    }
}

impl From<Vec<Micheline>> for Micheline {
    fn from(elems: Vec<Micheline>) -> Self {
        Micheline::Seq(elems)
    }
}
