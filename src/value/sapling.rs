//! Sapling states and transactions
//!
//! Both sapling types are parameterized by a memo size, which is part of
//! their Micheline type. It is carried here as a const parameter, so that
//! values with different memo sizes are distinct Rust types, and so that
//! [`Typed`] can be provided statically.

use crate::conv::{Decode, DecodeResult, Encode, Typed};
use crate::error::ValidationResult;
use crate::micheline::{Micheline, MichelineType, SaplingTypePrim};

use super::int::Nat;
use super::opaque::check_hex;

/// Reference to an on-chain sapling state, by its identifier
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SaplingState<const MEMO: u16> {
    id: Nat,
}

impl<const MEMO: u16> SaplingState<MEMO> {
    pub const fn new(id: Nat) -> Self {
        Self { id }
    }

    pub const fn id(&self) -> &Nat {
        &self.id
    }

    pub const fn memo_size(&self) -> u16 {
        MEMO
    }
}

impl<const MEMO: u16> Encode for SaplingState<MEMO> {
    fn encode(&self) -> Micheline {
        self.id.encode()
    }
}

impl<const MEMO: u16> Decode for SaplingState<MEMO> {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        Nat::decode(node).map(Self::new)
    }
}

impl<const MEMO: u16> Typed for SaplingState<MEMO> {
    fn mich_type() -> MichelineType {
        MichelineType::sapling(SaplingTypePrim::sapling_state, MEMO)
    }
}

/// Serialized sapling transaction, as a hex-encoded payload
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SaplingTransaction<const MEMO: u16>(String);

impl<const MEMO: u16> SaplingTransaction<MEMO> {
    pub fn new(hex: impl Into<String>) -> ValidationResult<Self> {
        let hex = hex.into();
        check_hex(&hex)?;
        Ok(Self(hex))
    }

    #[must_use]
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl<const MEMO: u16> Encode for SaplingTransaction<MEMO> {
    fn encode(&self) -> Micheline {
        Micheline::bytes(self.0.as_str())
    }
}

impl<const MEMO: u16> Decode for SaplingTransaction<MEMO> {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        Ok(Self::new(node.as_bytes()?)?)
    }
}

impl<const MEMO: u16> Typed for SaplingTransaction<MEMO> {
    fn mich_type() -> MichelineType {
        MichelineType::sapling(SaplingTypePrim::sapling_transaction, MEMO)
    }
}
