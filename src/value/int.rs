//! Arbitrary-precision integers and naturals
//!
//! [`Int`] and [`Nat`] own a `num-bigint` value and expose only the
//! operations that preserve their invariants. Operations whose result may
//! leave the domain of the receiver are typed accordingly: subtracting two
//! naturals produces an [`Int`], and division of either produces a
//! [`Rational`].
//!
//! Both types accept decimal string and floating-point literals, which must
//! denote an integral value (`"5"`, `"5.0"`, `5.0`), and reject anything
//! else with a [`ValidationError`].

use std::fmt::Display;
use std::str::FromStr;

use num_bigint::{BigInt, BigUint, Sign};
use num_integer::Integer;
use num_traits::{Signed, Zero};

use crate::conv::{Decode, DecodeResult, Encode, Typed};
use crate::error::{ValidationError, ValidationResult};
use crate::micheline::{Micheline, MichelineType, TypePrim};

use super::rational::Rational;

/// Interprets a decimal literal as an integer, rejecting fractional values
fn integral(text: &str) -> ValidationResult<BigInt> {
    let trimmed = text.trim();
    let digits = trimmed.strip_prefix('-').unwrap_or(trimmed);
    if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
        if let Ok(i) = trimmed.parse::<BigInt>() {
            return Ok(i);
        }
    }
    let q: Rational = text.parse()?;
    if q.is_integer() {
        Ok(q.numerator().into_inner())
    } else {
        Err(ValidationError::NotIntegral(text.to_owned()))
    }
}

/// Interprets a floating-point literal as an integer
fn integral_f64(val: f64) -> ValidationResult<BigInt> {
    if !val.is_finite() {
        return Err(ValidationError::NotFinite(val.to_string()));
    }
    if val.fract() != 0.0 {
        return Err(ValidationError::NotIntegral(val.to_string()));
    }
    integral(&val.to_string())
}

/// Arbitrary-precision signed integer
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Default)]
#[repr(transparent)]
pub struct Int(BigInt);

impl Int {
    pub fn new(val: impl Into<BigInt>) -> Self {
        Self(val.into())
    }

    pub fn into_inner(self) -> BigInt {
        self.0
    }

    pub const fn as_inner(&self) -> &BigInt {
        &self.0
    }

    #[must_use]
    pub fn plus(&self, other: &Int) -> Int {
        Int(&self.0 + &other.0)
    }

    #[must_use]
    pub fn minus(&self, other: &Int) -> Int {
        Int(&self.0 - &other.0)
    }

    #[must_use]
    pub fn times(&self, other: &Int) -> Int {
        Int(&self.0 * &other.0)
    }

    /// Exact quotient of `self` by `other`
    ///
    /// # Errors
    ///
    /// Fails with [`ValidationError::ZeroDenominator`] when `other` is zero.
    pub fn div(&self, other: &Int) -> ValidationResult<Rational> {
        Rational::new(self.0.clone(), other.0.clone())
    }

    #[must_use]
    pub fn abs(&self) -> Nat {
        Nat(self.0.magnitude().clone())
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0.is_negative()
    }

    /// Converts to a natural number, failing on negative values
    pub fn to_nat(&self) -> ValidationResult<Nat> {
        Nat::try_from(self.0.clone())
    }
}

impl std::fmt::Debug for Int {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\u{2124}({})", &self.0)
    }
}

impl Display for Int {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <BigInt as Display>::fmt(&self.0, f)
    }
}

impl FromStr for Int {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        integral(s).map(Int)
    }
}

impl TryFrom<f64> for Int {
    type Error = ValidationError;

    fn try_from(val: f64) -> Result<Self, Self::Error> {
        integral_f64(val).map(Int)
    }
}

impl From<BigInt> for Int {
    fn from(val: BigInt) -> Self {
        Self(val)
    }
}

impl From<Int> for BigInt {
    fn from(val: Int) -> Self {
        val.0
    }
}

impl From<Nat> for Int {
    fn from(val: Nat) -> Self {
        Self(BigInt::from(val.0))
    }
}

/// Arbitrary-precision natural number
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Default)]
#[repr(transparent)]
pub struct Nat(BigUint);

impl Nat {
    pub const fn new(nat: BigUint) -> Self {
        Self(nat)
    }

    pub fn into_inner(self) -> BigUint {
        self.0
    }

    pub const fn as_inner(&self) -> &BigUint {
        &self.0
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[must_use]
    pub fn plus(&self, other: &Nat) -> Nat {
        Nat(&self.0 + &other.0)
    }

    /// Difference of two naturals, which may be negative
    #[must_use]
    pub fn minus(&self, other: &Nat) -> Int {
        Int(BigInt::from(self.0.clone()) - BigInt::from(other.0.clone()))
    }

    #[must_use]
    pub fn times(&self, other: &Nat) -> Nat {
        Nat(&self.0 * &other.0)
    }

    /// Exact quotient of `self` by `other`
    pub fn div(&self, other: &Nat) -> ValidationResult<Rational> {
        Rational::new(BigInt::from(self.0.clone()), BigInt::from(other.0.clone()))
    }

    /// Euclidean division, returning quotient and remainder
    ///
    /// # Errors
    ///
    /// Fails with [`ValidationError::ZeroDenominator`] when `other` is zero.
    pub fn ediv(&self, other: &Nat) -> ValidationResult<(Nat, Nat)> {
        if other.is_zero() {
            return Err(ValidationError::ZeroDenominator);
        }
        let (q, r) = self.0.div_rem(&other.0);
        Ok((Nat(q), Nat(r)))
    }
}

impl std::fmt::Debug for Nat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, r#"ℕ({})"#, &self.0)
    }
}

impl Display for Nat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        <BigUint as Display>::fmt(&self.0, f)
    }
}

impl TryFrom<BigInt> for Nat {
    type Error = ValidationError;

    fn try_from(val: BigInt) -> Result<Self, Self::Error> {
        match val.to_biguint() {
            Some(nat) => Ok(Self(nat)),
            None => Err(ValidationError::NegativeNat(val.to_string())),
        }
    }
}

impl FromStr for Nat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Nat::try_from(integral(s)?)
    }
}

impl TryFrom<f64> for Nat {
    type Error = ValidationError;

    fn try_from(val: f64) -> Result<Self, Self::Error> {
        Nat::try_from(integral_f64(val)?)
    }
}

impl From<BigUint> for Nat {
    fn from(value: BigUint) -> Self {
        Self(value)
    }
}

impl From<Nat> for BigUint {
    fn from(val: Nat) -> Self {
        val.0
    }
}

macro_rules! impl_from_prim {
    ($target:ident: $($src:ty),*) => {
        $(
            impl From<$src> for $target {
                fn from(val: $src) -> Self {
                    Self(val.into())
                }
            }
        )*
    };
}

impl_from_prim!(Int: i8, i16, i32, i64, i128, u8, u16, u32, u64, u128);
impl_from_prim!(Nat: u8, u16, u32, u64, u128);

macro_rules! impl_coerce {
    ($source:ident => $($dst:ty),*) => {
        $(
            impl TryFrom<&$source> for $dst {
                type Error = ValidationError;

                fn try_from(val: &$source) -> Result<$dst, Self::Error> {
                    <$dst>::try_from(&val.0).map_err(|_| ValidationError::OutOfRange {
                        what: stringify!($dst),
                        value: val.0.to_string(),
                    })
                }
            }
        )*
    };
}

impl_coerce!(Int => i32, i64, u64);
impl_coerce!(Nat => u32, u64, usize);

impl Encode for Int {
    fn encode(&self) -> Micheline {
        Micheline::Int(self.0.clone())
    }
}

impl Decode for Int {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        node.as_int().map(|i| Int(i.clone()))
    }
}

impl Typed for Int {
    fn mich_type() -> MichelineType {
        MichelineType::prim(TypePrim::int)
    }
}

impl Encode for Nat {
    fn encode(&self) -> Micheline {
        Micheline::Int(BigInt::from_biguint(Sign::Plus, self.0.clone()))
    }
}

impl Decode for Nat {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        Ok(Nat::try_from(node.as_int()?.clone())?)
    }
}

impl Typed for Nat {
    fn mich_type() -> MichelineType {
        MichelineType::prim(TypePrim::nat)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn nat_validation() {
        assert_eq!("5".parse::<Nat>(), Ok(Nat::from(5u32)));
        assert_eq!("5.0".parse::<Nat>(), Ok(Nat::from(5u32)));
        assert_eq!(
            "-5".parse::<Nat>(),
            Err(ValidationError::NegativeNat("-5".into()))
        );
        assert!(matches!("5.5".parse::<Nat>(), Err(ValidationError::NotIntegral(_))));
        assert!(matches!(Nat::try_from(1.5), Err(ValidationError::NotIntegral(_))));
        assert!(matches!(Nat::try_from(f64::NAN), Err(ValidationError::NotFinite(_))));
        assert_eq!(Nat::try_from(12.0), Ok(Nat::from(12u32)));
        assert!(matches!("1_000".parse::<Nat>(), Err(ValidationError::MalformedNumber(_))));
        assert!("1_000".parse::<Int>().is_err());
        assert_eq!("-0042".parse::<Int>(), Ok(Int::from(-42)));
    }

    #[test]
    fn nat_minus_narrows() {
        let diff: Int = Nat::from(5u32).minus(&Nat::from(7u32));
        assert_eq!(diff, Int::from(-2));
        assert!(diff.to_nat().is_err());
        assert_eq!(diff.abs(), Nat::from(2u32));
    }

    #[test]
    fn int_arith() {
        let a = Int::from(7);
        let b = Int::from(-3);
        assert_eq!(a.plus(&b), Int::from(4));
        assert_eq!(a.minus(&b), Int::from(10));
        assert_eq!(a.times(&b), Int::from(-21));
        assert_eq!(a.div(&b).unwrap().to_string(), "-2.33333333333333333333");
        assert_eq!(a.div(&Int::from(0)), Err(ValidationError::ZeroDenominator));
        assert!(b < a);
    }

    #[test]
    fn nat_ediv() {
        assert_eq!(
            Nat::from(17u32).ediv(&Nat::from(5u32)),
            Ok((Nat::from(3u32), Nat::from(2u32)))
        );
        assert!(Nat::from(1u32).ediv(&Nat::default()).is_err());
    }

    #[test]
    fn codec() {
        let n = Nat::from(42u32);
        assert_eq!(n.encode_json().to_string(), r#"{"int":"42"}"#);
        assert_eq!(Nat::decode(&n.encode()), Ok(n));
        assert!(Nat::decode(&Micheline::int(-1)).is_err());
        assert!(Int::decode(&Micheline::string("1")).is_err());
        assert_eq!(format!("{:?}", Int::from(-1)), "ℤ(-1)");
        assert_eq!(u64::try_from(&Nat::from(9u32)), Ok(9));
    }
}
