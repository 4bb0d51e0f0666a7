//! Domain value types
//!
//! Each type in this module owns exactly one validated value, is immutable
//! after construction, and implements [`Encode`](crate::conv::Encode) and
//! [`Decode`](crate::conv::Decode). All but [`Entrypoint`] also implement
//! [`Typed`](crate::conv::Typed). Construction from literals is fallible and
//! reports a [`ValidationError`](crate::error::ValidationError); arithmetic
//! returns fresh values whose type reflects the invariant of the result.

pub mod duration;
pub mod entrypoint;
pub mod int;
pub mod opaque;
pub mod or;
pub mod rational;
pub mod sapling;
pub mod tez;

pub use duration::Duration;
pub use entrypoint::Entrypoint;
pub use int::{Int, Nat};
pub use opaque::{
    Address, Bls12381Fr, Bls12381G1, Bls12381G2, Bytes, ChainId, Chest, ChestKey, Key, KeyHash,
    Signature,
};
pub use or::Or;
pub use rational::Rational;
pub use sapling::{SaplingState, SaplingTransaction};
pub use tez::{Tez, TezUnit};

/// Michelson `unit`, for use where a named type reads better than `()`
pub type Unit = ();

#[cfg(test)]
mod test {
    use super::*;

    fn dummy<T: Send + Sync>() {}

    #[test]
    fn values_threadsafe() {
        dummy::<Int>();
        dummy::<Nat>();
        dummy::<Rational>();
        dummy::<Tez>();
        dummy::<Duration>();
        dummy::<Bytes>();
        dummy::<Entrypoint>();
        dummy::<SaplingState<8>>();
        dummy::<Or<Nat, Address>>();
        dummy::<crate::micheline::Micheline>();
        dummy::<crate::micheline::MichelineType>();
    }
}
