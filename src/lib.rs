//! Model for representing and transcoding Michelson values and types
//!
//! # Overview
//!
//! This library is the data layer of machine-generated bindings to Tezos smart
//! contracts. Such bindings need to move values between Rust and the node's
//! JSON representation of Michelson, referred to as *Micheline*, and would
//! normally require a great deal of boilerplate to do so: every storage field,
//! entrypoint argument, and big-map key must be encoded, decoded, and typed.
//!
//! Rather than having the generator write bespoke logic for each contract,
//! `mimic` offers a centralized implementation of the Micheline value and type
//! model, a family of validated domain values, and traits that allow derivable
//! transcoding of records based on a structurally inductive paradigm.
//!
//! The traits [`Encode`], [`Decode`], and [`Typed`] are the keystones of the
//! library. They respectively define the Micheline value of a Rust value, the
//! inverse conversion, and the Micheline type of a Rust type. All three can be
//! derived for record structs, which are represented as right-comb pairs with
//! `%field` annotations.
//!
//! # Layout
//!
//! * [`micheline`]: the untyped [`Micheline`] and [`MichelineType`] trees, their
//!   JSON wire format, and Michelson expression text.
//! * [`value`]: domain values with construction-time validation (naturals,
//!   rationals, tez amounts, durations, opaque byte and string payloads).
//! * [`conv`]: the capability traits and their impls for standard types.
//! * [`codec`]: free-standing builders, readers, and pair-flattening helpers.
//! * [`pack`]: the binary form of Micheline produced by `PACK`.
//! * [`client`]: the read-side interface to a node, and an in-memory mockup.
//!
//! # Example
//!
//! ```
//! use mimic::{Decode, Encode, Typed};
//! use mimic::value::{Nat, Tez};
//!
//! #[derive(Debug, PartialEq, Encode, Decode, Typed)]
//! struct Storage {
//!     owner: String,
//!     balance: Tez,
//!     counter: Nat,
//! }
//!
//! let storage = Storage {
//!     owner: "tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb".to_owned(),
//!     balance: Tez::from_mutez(2_000_000),
//!     counter: Nat::from(7u32),
//! };
//!
//! assert_eq!(
//!     Storage::mich_type().to_string(),
//!     "pair (string %owner) (pair (mutez %balance) (nat %counter))"
//! );
//! let json = storage.encode_json();
//! assert_eq!(Storage::decode_json(&json).unwrap(), storage);
//! ```

extern crate self as mimic;

extern crate decode_derive;
extern crate encode_derive;
extern crate typed_derive;

pub mod client;
pub mod codec;
pub mod conv;
pub mod error;
pub mod hexstring;
pub mod micheline;
pub mod pack;
pub mod parse;
pub mod prelude;
pub mod value;
pub mod zarith;

pub use crate::client::{ChainReader, MockupChain, MockupConfig};
pub use crate::conv::{error::DecodeError, target::Target, Decode, DecodeResult, Encode, Typed};
pub use crate::error::{HexConvError, ValidationError, ValidationResult};
pub use crate::hexstring::HexString;
pub use crate::micheline::expr::{expr_micheline_to_json, json_micheline_to_expr, ExprError};
pub use crate::micheline::{Micheline, MichelineType};
pub use crate::pack::{pack, pack_type, unpack, PackError};
pub use crate::parse::{ByteParser, ParseError, ParseResult};

pub use ::decode_derive::Decode;
pub use ::encode_derive::Encode;
pub use ::typed_derive::Typed;
