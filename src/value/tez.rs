//! Amounts of tez, held as an integral number of mutez

use std::fmt::Display;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::Signed;

use crate::conv::{Decode, DecodeResult, Encode, Typed};
use crate::error::{ValidationError, ValidationResult};
use crate::micheline::{Micheline, MichelineType, TypePrim};

use super::int::Nat;
use super::rational::Rational;

/// Number of mutez in one tez
pub const MUTEZ_PER_TEZ: u32 = 1_000_000;

/// Unit in which a tez amount literal is expressed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TezUnit {
    #[default]
    Tez,
    Mutez,
}

/// Currency amount
///
/// Amounts given in [`TezUnit::Mutez`] must be integral. Amounts given in
/// [`TezUnit::Tez`] must be non-negative, and are scaled by one million
/// and rounded down to a whole number of mutez.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Tez {
    mutez: BigInt,
}

impl Tez {
    /// Constructs an amount from an exact value in the given unit
    pub fn new(amount: &Rational, unit: TezUnit) -> ValidationResult<Self> {
        match unit {
            TezUnit::Mutez => {
                if amount.is_integer() {
                    Ok(Self::from_mutez(amount.numerator().into_inner()))
                } else {
                    Err(ValidationError::NotIntegral(amount.to_string()))
                }
            }
            TezUnit::Tez => {
                if amount.numerator().is_negative() {
                    return Err(ValidationError::NegativeTez(amount.to_string()));
                }
                let scaled = amount.times(&Rational::from(i64::from(MUTEZ_PER_TEZ)));
                Ok(Self::from_mutez(scaled.floor().into_inner()))
            }
        }
    }

    /// Parses a decimal literal in the given unit
    ///
    /// # Examples
    ///
    /// ```
    /// # use mimic::value::{Tez, TezUnit};
    /// let amount = Tez::parse("1.5", TezUnit::Tez).unwrap();
    /// assert_eq!(amount, Tez::from_mutez(1_500_000));
    /// assert!(Tez::parse("1.5", TezUnit::Mutez).is_err());
    /// ```
    pub fn parse(text: &str, unit: TezUnit) -> ValidationResult<Self> {
        Self::new(&text.parse()?, unit)
    }

    pub fn from_f64(amount: f64, unit: TezUnit) -> ValidationResult<Self> {
        Self::new(&Rational::try_from(amount)?, unit)
    }

    pub fn from_mutez(mutez: impl Into<BigInt>) -> Self {
        Self {
            mutez: mutez.into(),
        }
    }

    #[must_use]
    pub fn to_mutez(&self) -> &BigInt {
        &self.mutez
    }

    /// Renders the amount in tez, without trailing fractional zeros
    #[must_use]
    pub fn to_tez_string(&self) -> String {
        let (whole, frac) = self.mutez.magnitude().div_rem(&MUTEZ_PER_TEZ.into());
        let sign = if self.mutez.is_negative() { "-" } else { "" };
        let frac = format!("{:0>6}", frac.to_string());
        let frac = frac.trim_end_matches('0');
        if frac.is_empty() {
            format!("{sign}{whole}")
        } else {
            format!("{sign}{whole}.{frac}")
        }
    }

    #[must_use]
    pub fn plus(&self, other: &Tez) -> Tez {
        Tez::from_mutez(&self.mutez + &other.mutez)
    }

    #[must_use]
    pub fn minus(&self, other: &Tez) -> Tez {
        Tez::from_mutez(&self.mutez - &other.mutez)
    }

    #[must_use]
    pub fn times(&self, factor: &Nat) -> Tez {
        Tez::from_mutez(&self.mutez * BigInt::from(factor.as_inner().clone()))
    }
}

impl std::fmt::Debug for Tez {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Tez({}mutez)", self.mutez)
    }
}

/// Displays the amount in mutez, its canonical integral form
impl Display for Tez {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <BigInt as Display>::fmt(&self.mutez, f)
    }
}

impl Encode for Tez {
    fn encode(&self) -> Micheline {
        Micheline::Int(self.mutez.clone())
    }
}

impl Decode for Tez {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        node.as_int().map(|mutez| Tez::from_mutez(mutez.clone()))
    }
}

impl Typed for Tez {
    fn mich_type() -> MichelineType {
        MichelineType::prim(TypePrim::mutez)
    }
}
