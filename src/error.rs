//! General error types
//!
//! This module contains the error types raised when a literal fails
//! the invariant of the domain type it is being converted into, as
//! well as the lower-level failures of hex-string conversion that such
//! validation may surface.
//!
//! Errors arising from the *shape* of a Micheline node, rather than the
//! literal it carries, are defined separately in [`crate::conv::error`].

use std::error::Error;
use std::fmt::{Debug, Display};

/// Error type representing all possible conditions for invalidity
/// encountered when attempting to parse a string-type as a series
/// of hex-encoded bytes.
#[derive(Clone, PartialEq, Eq, Ord, PartialOrd)]
pub enum HexConvError {
    /// Error case for odd-length strings
    OddParity(String),
    /// Error case for strings containing non-hex characters,
    /// i.e. anything not in `[0-9a-fA-F]`.
    NonHex(String),
}

impl Debug for HexConvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OddParity(invalid) => {
                write!(f, "non-even length-parity for string `{}`", invalid)
            }
            Self::NonHex(invalid) => write!(f, "non-hex character found in string `{}`", invalid),
        }
    }
}

impl Display for HexConvError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OddParity(_) => {
                write!(f, "hex-conversion failed on odd-length string")
            }
            Self::NonHex(_) => {
                write!(f, "hex-conversion failed on non-hex character")
            }
        }
    }
}

impl Error for HexConvError {}

/// Enumerated error type for literals that violate the construction-time
/// invariant of a domain value type.
///
/// Each variant carries the offending input in its textual form, as the
/// original literal may have been a string, a floating-point number, or
/// the result of an arithmetic operation.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ValidationError {
    /// Natural numbers cannot be negative
    NegativeNat(String),
    /// Value was required to be integral but has a fractional part
    NotIntegral(String),
    /// Floating-point input was `NaN` or infinite
    NotFinite(String),
    /// Fraction constructed or decoded with a zero denominator
    ZeroDenominator,
    /// String could not be interpreted as a decimal number
    MalformedNumber(String),
    /// String could not be interpreted as a duration literal
    MalformedDuration(String),
    /// String could not be interpreted as an RFC 3339 timestamp
    MalformedTimestamp(String),
    /// Amounts given in whole tez must be non-negative
    NegativeTez(String),
    /// Value does not fit the range of its fixed-width representation
    OutOfRange { what: &'static str, value: String },
    /// Byte-string payload is not valid hex
    Hex(HexConvError),
}

impl From<HexConvError> for ValidationError {
    fn from(err: HexConvError) -> Self {
        Self::Hex(err)
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::NegativeNat(val) => write!(f, "Not an Nat value: {val}"),
            ValidationError::NotIntegral(val) => write!(f, "value {val} is not integral"),
            ValidationError::NotFinite(val) => write!(f, "value {val} is not a finite number"),
            ValidationError::ZeroDenominator => write!(f, "fraction has a zero denominator"),
            ValidationError::MalformedNumber(val) => {
                write!(f, "cannot interpret `{val}` as a decimal number")
            }
            ValidationError::MalformedDuration(val) => {
                write!(f, "cannot interpret `{val}` as a duration literal")
            }
            ValidationError::MalformedTimestamp(val) => {
                write!(f, "cannot interpret `{val}` as an RFC 3339 timestamp")
            }
            ValidationError::NegativeTez(val) => {
                write!(f, "tez amount {val} must be non-negative")
            }
            ValidationError::OutOfRange { what, value } => {
                write!(f, "value {value} out of range for {what}")
            }
            ValidationError::Hex(err) => write!(f, "invalid byte-string payload: {err}"),
        }
    }
}

impl Error for ValidationError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Hex(err) => Some(err),
            _ => None,
        }
    }
}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

#[cfg(test)]
mod test {
    use super::*;

    fn dummy<T: Send + Sync>() {}

    #[test]
    fn validation_error_threadsafe() {
        dummy::<ValidationError>()
    }

    #[test]
    fn negative_nat_message() {
        assert_eq!(
            ValidationError::NegativeNat("-5".into()).to_string(),
            "Not an Nat value: -5"
        );
    }
}
