//! Core of the Micheline conversion API
//!
//! This module contains definitions for the high-level transcoding traits
//! `Encode` and `Decode`, which are motivationally equivalent to the
//! `Serialize` and `Deserialize` traits defined in `serde`, but target the
//! [`Micheline`] value model rather than an arbitrary data format.
//!
//! Together with [`Typed`], which associates a Micheline type expression
//! with a Rust type, these traits are the capability interface that every
//! domain value in [`crate::value`] implements. Generic code (option, list,
//! and map encoding, big-map key packing, derived records) is written
//! against these bounds rather than by inspecting values at runtime.
//!
//! The sub-module [`target`] offers the byte-sink abstraction used by the
//! binary form of Micheline in [`crate::pack`], and [`error`] defines the
//! failure conditions of decoding.
//!
//! Derive macros for `Encode`, `Decode`, and `Typed` are provided in the
//! sub-crates `encode_derive`, `decode_derive`, and `typed_derive`, which
//! are only relevant within the context of this library.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, SecondsFormat, TimeZone, Utc};
use num_traits::ToPrimitive;

use crate::error::ValidationError;
use crate::micheline::{Micheline, MichelineType, TypePrim};

pub mod error;
pub mod target;
pub mod typed;

pub use error::{DecodeError, DecodeResult};
pub use typed::Typed;

/// Trait for types that have a canonical representation as a Micheline value
///
/// Encoding is total: every value of an implementing type corresponds to
/// exactly one Micheline node, as any validation has already taken place
/// when the value was constructed.
pub trait Encode {
    /// Produces the Micheline representation of this value
    fn encode(&self) -> Micheline;

    /// Produces the Micheline JSON representation of this value
    #[must_use]
    fn encode_json(&self) -> serde_json::Value {
        self.encode().to_json()
    }
}

/// Trait providing the inverse of [`Encode`]
///
/// # Derive Macro
///
/// This crate provides a derive-macro `Decode` that is suitable for
/// implementing `Decode` on record structs, whose fields are read from
/// a right-comb `Pair` in declaration order.
///
/// # Example
///
/// A typical hand-written implementation of `Decode` is provided below:
///
/// ```
/// use mimic::conv::{Decode, DecodeResult};
/// use mimic::micheline::Micheline;
/// use mimic::value::Nat;
///
/// #[derive(Debug, PartialEq)]
/// pub struct Ledger {
///     frozen: bool,
///     total: Nat,
/// }
///
/// impl Decode for Ledger {
///     fn decode(node: &Micheline) -> DecodeResult<Self> {
///         let [frozen, total] = mimic::codec::unpair_n::<2>(node)?;
///         Ok(Self {
///             frozen: bool::decode(&frozen)?,
///             total: Nat::decode(&total)?,
///         })
///     }
/// }
///
/// let node = Micheline::pair(Micheline::boolean(true), Micheline::int(42));
/// assert_eq!(Ledger::decode(&node).unwrap(), Ledger { frozen: true, total: Nat::from(42u32) });
/// ```
pub trait Decode: Sized {
    /// Attempt to interpret a Micheline node as a value of type `Self`
    ///
    /// # Errors
    ///
    /// Returns [`DecodeError::UnexpectedNode`] or [`DecodeError::Arity`] if
    /// the node does not have the shape of an encoded `Self`, and
    /// [`DecodeError::Invalid`] if its payload fails the invariant of `Self`.
    fn decode(node: &Micheline) -> DecodeResult<Self>;

    /// Attempt to interpret a Micheline JSON document as a value of type `Self`
    fn decode_json(value: &serde_json::Value) -> DecodeResult<Self> {
        Self::decode(&Micheline::from_json(value)?)
    }
}

impl Encode for Micheline {
    fn encode(&self) -> Micheline {
        self.clone()
    }
}

impl Decode for Micheline {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        Ok(node.clone())
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode(&self) -> Micheline {
        (**self).encode()
    }
}

impl<T: Encode + ?Sized> Encode for Box<T> {
    fn encode(&self) -> Micheline {
        self.as_ref().encode()
    }
}

impl<T: Decode> Decode for Box<T> {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        T::decode(node).map(Box::new)
    }
}

impl Encode for bool {
    fn encode(&self) -> Micheline {
        Micheline::boolean(*self)
    }
}

impl Decode for bool {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        node.as_bool()
    }
}

impl Encode for () {
    fn encode(&self) -> Micheline {
        Micheline::unit()
    }
}

impl Decode for () {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        node.as_unit()
    }
}

impl Encode for String {
    fn encode(&self) -> Micheline {
        Micheline::string(self.as_str())
    }
}

impl Encode for str {
    fn encode(&self) -> Micheline {
        Micheline::string(self)
    }
}

impl Decode for String {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        node.as_string().map(str::to_owned)
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self) -> Micheline {
        match self {
            Some(val) => Micheline::some(val.encode()),
            None => Micheline::none(),
        }
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        node.as_option()?.map(T::decode).transpose()
    }
}

impl<T: Encode> Encode for Vec<T> {
    fn encode(&self) -> Micheline {
        Micheline::seq(self.iter().map(Encode::encode))
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        node.as_seq()?.iter().map(T::decode).collect()
    }
}

impl<T: Encode> Encode for BTreeSet<T> {
    fn encode(&self) -> Micheline {
        Micheline::seq(self.iter().map(Encode::encode))
    }
}

impl<T: Decode + Ord> Decode for BTreeSet<T> {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        node.as_seq()?.iter().map(T::decode).collect()
    }
}

impl<K: Encode, V: Encode> Encode for BTreeMap<K, V> {
    fn encode(&self) -> Micheline {
        Micheline::seq(
            self.iter()
                .map(|(key, val)| Micheline::elt(key.encode(), val.encode())),
        )
    }
}

impl<K: Decode + Ord, V: Decode> Decode for BTreeMap<K, V> {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        node.as_seq()?
            .iter()
            .map(|elt| {
                let (key, val) = elt.as_elt()?;
                Ok((K::decode(key)?, V::decode(val)?))
            })
            .collect()
    }
}

impl<A: Encode, B: Encode> Encode for (A, B) {
    fn encode(&self) -> Micheline {
        Micheline::pair(self.0.encode(), self.1.encode())
    }
}

impl<A: Decode, B: Decode> Decode for (A, B) {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        let [a, b] = crate::codec::unpair_n::<2>(node)?;
        Ok((A::decode(&a)?, B::decode(&b)?))
    }
}

impl<A: Encode, B: Encode, C: Encode> Encode for (A, B, C) {
    fn encode(&self) -> Micheline {
        Micheline::Pair(vec![self.0.encode(), self.1.encode(), self.2.encode()])
    }
}

impl<A: Decode, B: Decode, C: Decode> Decode for (A, B, C) {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        let [a, b, c] = crate::codec::unpair_n::<3>(node)?;
        Ok((A::decode(&a)?, B::decode(&b)?, C::decode(&c)?))
    }
}

/// Timestamps are written as RFC 3339 strings with millisecond precision,
/// in UTC
impl Encode for DateTime<Utc> {
    fn encode(&self) -> Micheline {
        Micheline::string(self.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

/// Timestamps are read either from RFC 3339 strings or from integer
/// seconds since the Unix epoch, as both forms are returned by the node
impl Decode for DateTime<Utc> {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        match node {
            Micheline::String(s) => DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|_| DecodeError::Invalid(ValidationError::MalformedTimestamp(s.clone()))),
            Micheline::Int(i) => i
                .to_i64()
                .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
                .ok_or_else(|| {
                    DecodeError::Invalid(ValidationError::OutOfRange {
                        what: "timestamp",
                        value: i.to_string(),
                    })
                }),
            other => Err(DecodeError::unexpected("timestamp string or int", other)),
        }
    }
}

impl Typed for DateTime<Utc> {
    fn mich_type() -> MichelineType {
        MichelineType::prim(TypePrim::timestamp)
    }
}
