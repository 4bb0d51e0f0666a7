//! Assorted imports for use in generated contract bindings
//!
//! A binding module typically begins with `use mimic::prelude::*;`, which
//! brings the capability traits (and their derive macros), the Micheline
//! trees, and every domain value type into scope.

pub use crate::codec;
pub use crate::conv::{Decode, DecodeError, DecodeResult, Encode, Typed};
pub use crate::micheline::{Micheline, MichelineType, TypePrim};
pub use crate::value::*;

pub use ::decode_derive::Decode;
pub use ::encode_derive::Encode;
pub use ::typed_derive::Typed;

pub use chrono::{DateTime, Utc};
