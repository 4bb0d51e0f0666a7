//! Opaque string- and byte-backed values
//!
//! Addresses, keys, signatures, BLS12-381 elements, and timelock chests are
//! carried through the codec without interpretation: the payload given at
//! construction is the payload that is encoded. No base58 validation is
//! performed on string-backed values. Byte-backed values may optionally be
//! checked for well-formed hex at construction, by enabling the `check_hex`
//! feature.

use crate::conv::{Decode, DecodeResult, Encode, Typed};
use crate::error::ValidationResult;
use crate::hexstring::util::{bytes_of_hex, hex_of_bytes};
use crate::micheline::{Micheline, MichelineType, TypePrim};

/// Validates the payload of a byte-backed value, when so configured
pub(crate) fn check_hex(hex: &str) -> ValidationResult<()> {
    cfg_if::cfg_if! {
        if #[cfg(feature = "check_hex")] {
            bytes_of_hex(hex).map(drop).map_err(|err| {
                log::debug!("rejected byte-string payload `{hex}`");
                err.into()
            })
        } else {
            let _ = hex;
            Ok(())
        }
    }
}

macro_rules! opaque_string {
    ($($(#[$meta:meta])* $name:ident => $prim:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
            pub struct $name(String);

            impl $name {
                pub fn new(val: impl Into<String>) -> Self {
                    Self(val.into())
                }

                #[must_use]
                pub fn as_str(&self) -> &str {
                    &self.0
                }

                #[must_use]
                pub fn into_inner(self) -> String {
                    self.0
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl std::str::FromStr for $name {
                type Err = std::convert::Infallible;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Ok(Self::new(s))
                }
            }

            impl From<&str> for $name {
                fn from(s: &str) -> Self {
                    Self::new(s)
                }
            }

            impl Encode for $name {
                fn encode(&self) -> Micheline {
                    Micheline::string(self.0.as_str())
                }
            }

            impl Decode for $name {
                fn decode(node: &Micheline) -> DecodeResult<Self> {
                    node.as_string().map(Self::new)
                }
            }

            impl Typed for $name {
                fn mich_type() -> MichelineType {
                    MichelineType::prim(TypePrim::$prim)
                }
            }
        )*
    };
}

macro_rules! opaque_bytes {
    ($($(#[$meta:meta])* $name:ident => $prim:ident),* $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
            pub struct $name(String);

            impl $name {
                /// Wraps a hex-encoded payload
                pub fn new(hex: impl Into<String>) -> ValidationResult<Self> {
                    let hex = hex.into();
                    check_hex(&hex)?;
                    Ok(Self(hex))
                }

                /// Wraps a raw payload, which is always well-formed
                #[must_use]
                pub fn from_raw(raw: &[u8]) -> Self {
                    Self(hex_of_bytes(raw))
                }

                /// Returns the hex-encoded payload
                #[must_use]
                pub fn as_hex(&self) -> &str {
                    &self.0
                }

                /// Decodes the hex-encoded payload into raw bytes
                pub fn to_raw(&self) -> ValidationResult<Vec<u8>> {
                    Ok(bytes_of_hex(&self.0)?)
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str(&self.0)
                }
            }

            impl std::str::FromStr for $name {
                type Err = crate::error::ValidationError;

                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    Self::new(s)
                }
            }

            impl Encode for $name {
                fn encode(&self) -> Micheline {
                    Micheline::bytes(self.0.as_str())
                }
            }

            impl Decode for $name {
                fn decode(node: &Micheline) -> DecodeResult<Self> {
                    Ok(Self::new(node.as_bytes()?)?)
                }
            }

            impl Typed for $name {
                fn mich_type() -> MichelineType {
                    MichelineType::prim(TypePrim::$prim)
                }
            }
        )*
    };
}

opaque_string! {
    /// Contract or implicit account address (`tz1…`, `KT1…`)
    Address => address,
    /// Public key
    Key => key,
    /// Public key hash
    KeyHash => key_hash,
    Signature => signature,
    ChainId => chain_id,
}

opaque_bytes! {
    /// Arbitrary byte-string
    Bytes => bytes,
    /// Element of the BLS12-381 scalar field
    Bls12381Fr => bls12_381_fr,
    /// Point on the BLS12-381 G1 curve
    Bls12381G1 => bls12_381_g1,
    /// Point on the BLS12-381 G2 curve
    Bls12381G2 => bls12_381_g2,
    /// Timelock-encrypted chest
    Chest => chest,
    ChestKey => chest_key,
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn string_passthrough() {
        let addr = Address::new("tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb");
        assert_eq!(
            addr.encode_json().to_string(),
            r#"{"string":"tz1VSUr8wwNhLAzempoch5d6hLRiTh8Cjcjb"}"#
        );
        assert_eq!(Address::decode(&addr.encode()), Ok(addr));
        assert!(KeyHash::decode(&Micheline::bytes("00")).is_err());
        assert_eq!(ChainId::mich_type().to_string(), "chain_id");
    }

    #[test]
    fn bytes_passthrough() {
        let b = Bytes::from_raw(&[0xca, 0xfe]);
        assert_eq!(b.encode_json().to_string(), r#"{"bytes":"cafe"}"#);
        assert_eq!(Bytes::decode(&b.encode()), Ok(b.clone()));
        assert_eq!(b.to_raw(), Ok(vec![0xca, 0xfe]));
        assert_eq!(Bls12381G1::mich_type().to_string(), "bls12_381_g1");
    }

    #[cfg(feature = "check_hex")]
    #[test]
    fn hex_checked() {
        assert!(Bytes::new("zz").is_err());
        assert!(Chest::decode(&Micheline::bytes("abc")).is_err());
    }

    #[cfg(not(feature = "check_hex"))]
    #[test]
    fn hex_unchecked() {
        let raw = Bytes::new("zz").unwrap();
        assert_eq!(raw.as_hex(), "zz");
        assert!(raw.to_raw().is_err());
    }
}
