//! Exact rational numbers
//!
//! A [`Rational`] is held as a fraction of two big integers, always reduced
//! to lowest terms with a strictly positive denominator, so that structural
//! equality coincides with numeric equality and the Micheline encoding
//! `Pair numerator denominator` is canonical.
//!
//! # Literals
//!
//! Decimal strings are parsed exactly, with an optional sign, fractional
//! part, and exponent (`"-1.25"`, `"3e-2"`). A trailing `%` divides the
//! value by one hundred, so that `"5.4464%"` is exactly `851/15625`.
//! Floating-point inputs are first rendered in their shortest round-trip
//! decimal form, which is then parsed as above; `5.4464_f64` is therefore
//! `3404/625`, rather than the binary fraction closest to it.
//!
//! # Display
//!
//! Values are rendered as a decimal expansion rounded half away from zero
//! at twenty fractional digits, with trailing zeros (and a trailing point)
//! removed.

use std::cmp::Ordering;
use std::fmt::Display;
use std::str::FromStr;

use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::{One, Signed, Zero};

use crate::conv::{Decode, DecodeResult, Encode, Typed};
use crate::error::{ValidationError, ValidationResult};
use crate::micheline::{Micheline, MichelineType, TypePrim};

use super::int::{Int, Nat};

/// Number of fractional digits retained when displaying a rational
pub const DISPLAY_PRECISION: u32 = 20;

/// Largest decimal exponent accepted in a literal
const MAX_EXPONENT: u32 = 1024;

/// Exact fraction in lowest terms
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Rational {
    num: BigInt,
    den: BigInt,
}

fn pow10(exp: u32) -> BigInt {
    num_traits::pow(BigInt::from(10u8), exp as usize)
}

impl Rational {
    /// Constructs the fraction `num / den`, reduced to lowest terms
    ///
    /// # Errors
    ///
    /// Fails with [`ValidationError::ZeroDenominator`] when `den` is zero.
    pub fn new(num: impl Into<BigInt>, den: impl Into<BigInt>) -> ValidationResult<Self> {
        let (num, den) = (num.into(), den.into());
        if den.is_zero() {
            return Err(ValidationError::ZeroDenominator);
        }
        let gcd = num.gcd(&den);
        let (mut num, mut den) = (num / &gcd, den / &gcd);
        if den.is_negative() {
            num = -num;
            den = -den;
        }
        Ok(Self { num, den })
    }

    /// Reduces `num / den` where `den` is a product of denominators, and
    /// hence strictly positive
    fn from_parts(num: BigInt, den: BigInt) -> Self {
        debug_assert!(den.is_positive());
        let gcd = num.gcd(&den);
        Self {
            num: num / &gcd,
            den: den / gcd,
        }
    }

    #[must_use]
    pub fn zero() -> Self {
        Self {
            num: BigInt::zero(),
            den: BigInt::one(),
        }
    }

    #[must_use]
    pub fn numerator(&self) -> Int {
        Int::new(self.num.clone())
    }

    #[must_use]
    pub fn denominator(&self) -> Nat {
        Nat::new(self.den.magnitude().clone())
    }

    #[must_use]
    pub fn is_integer(&self) -> bool {
        self.den.is_one()
    }

    #[must_use]
    pub fn plus(&self, other: &Rational) -> Rational {
        Self::from_parts(
            &self.num * &other.den + &other.num * &self.den,
            &self.den * &other.den,
        )
    }

    #[must_use]
    pub fn minus(&self, other: &Rational) -> Rational {
        Self::from_parts(
            &self.num * &other.den - &other.num * &self.den,
            &self.den * &other.den,
        )
    }

    #[must_use]
    pub fn times(&self, other: &Rational) -> Rational {
        Self::from_parts(&self.num * &other.num, &self.den * &other.den)
    }

    /// Exact quotient of `self` by `other`
    ///
    /// # Errors
    ///
    /// Fails with [`ValidationError::ZeroDenominator`] when `other` is zero.
    pub fn div(&self, other: &Rational) -> ValidationResult<Rational> {
        Self::new(&self.num * &other.den, &self.den * &other.num)
    }

    /// Largest integer not greater than `self`
    #[must_use]
    pub fn floor(&self) -> Int {
        Int::new(self.num.div_floor(&self.den))
    }

    /// Smallest integer not less than `self`
    #[must_use]
    pub fn ceil(&self) -> Int {
        Int::new(-(-&self.num).div_floor(&self.den))
    }

    /// Parses an unsigned decimal mantissa with optional exponent
    fn parse_decimal(text: &str, body: &str) -> ValidationResult<(BigInt, BigInt)> {
        let malformed = || ValidationError::MalformedNumber(text.to_owned());

        let (mantissa, exponent) = match body.find(['e', 'E']) {
            Some(ix) => (&body[..ix], Some(&body[ix + 1..])),
            None => (body, None),
        };
        let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
        let digits_only = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if int_part.len() + frac_part.len() == 0 || !digits_only(int_part) || !digits_only(frac_part) {
            return Err(malformed());
        }

        let digits = format!("{int_part}{frac_part}");
        let mut num: BigInt = digits.parse().map_err(|_| malformed())?;
        let frac_len = u32::try_from(frac_part.len()).map_err(|_| malformed())?;
        let mut den = pow10(frac_len);

        if let Some(exp) = exponent {
            let exp: i64 = exp.parse().map_err(|_| malformed())?;
            let magnitude = u32::try_from(exp.unsigned_abs())
                .ok()
                .filter(|m| *m <= MAX_EXPONENT)
                .ok_or_else(|| ValidationError::OutOfRange {
                    what: "decimal exponent",
                    value: exp.to_string(),
                })?;
            if exp >= 0 {
                num *= pow10(magnitude);
            } else {
                den *= pow10(magnitude);
            }
        }
        Ok((num, den))
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::zero()
    }
}

impl FromStr for Rational {
    type Err = ValidationError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let trimmed = text.trim();
        let (body, percent) = match trimmed.strip_suffix('%') {
            Some(body) => (body.trim_end(), true),
            None => (trimmed, false),
        };
        let (negative, body) = match body.as_bytes().first() {
            Some(b'-') => (true, &body[1..]),
            Some(b'+') => (false, &body[1..]),
            _ => (false, body),
        };
        let (mut num, mut den) = Self::parse_decimal(text, body)?;
        if negative {
            num = -num;
        }
        if percent {
            den *= 100;
        }
        Self::new(num, den)
    }
}

impl TryFrom<f64> for Rational {
    type Error = ValidationError;

    fn try_from(val: f64) -> Result<Self, Self::Error> {
        if !val.is_finite() {
            return Err(ValidationError::NotFinite(val.to_string()));
        }
        val.to_string().parse()
    }
}

impl From<Int> for Rational {
    fn from(val: Int) -> Self {
        Self {
            num: val.into_inner(),
            den: BigInt::one(),
        }
    }
}

impl From<Nat> for Rational {
    fn from(val: Nat) -> Self {
        Self::from(Int::from(val))
    }
}

impl From<i64> for Rational {
    fn from(val: i64) -> Self {
        Self::from(Int::from(val))
    }
}

impl PartialOrd for Rational {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Rational {
    fn cmp(&self, other: &Self) -> Ordering {
        // denominators are positive, so cross-multiplication preserves order
        (&self.num * &other.den).cmp(&(&other.num * &self.den))
    }
}

impl std::fmt::Debug for Rational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\u{211a}({}/{})", self.num, self.den)
    }
}

impl Display for Rational {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let scale = pow10(DISPLAY_PRECISION);
        let (mut q, r) = (self.num.magnitude() * scale.magnitude()).div_rem(self.den.magnitude());
        if r * 2u8 >= *self.den.magnitude() {
            q += 1u8;
        }
        let mut digits = q.to_string();
        let width = DISPLAY_PRECISION as usize + 1;
        if digits.len() < width {
            digits.insert_str(0, &"0".repeat(width - digits.len()));
        }
        let (int_part, frac_part) = digits.split_at(digits.len() - DISPLAY_PRECISION as usize);
        let frac_part = frac_part.trim_end_matches('0');
        let negative = self.num.is_negative() && !q.is_zero();
        if negative {
            f.write_str("-")?;
        }
        f.write_str(int_part)?;
        if !frac_part.is_empty() {
            write!(f, ".{frac_part}")?;
        }
        Ok(())
    }
}

impl Encode for Rational {
    fn encode(&self) -> Micheline {
        Micheline::pair(Micheline::Int(self.num.clone()), Micheline::Int(self.den.clone()))
    }
}

impl Decode for Rational {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        let [num, den] = crate::codec::unpair_n::<2>(node)?;
        Ok(Rational::new(num.as_int()?.clone(), den.as_int()?.clone())?)
    }
}

impl Typed for Rational {
    fn mich_type() -> MichelineType {
        MichelineType::pair(
            MichelineType::prim(TypePrim::int),
            MichelineType::prim(TypePrim::nat),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn q(text: &str) -> Rational {
        text.parse().unwrap()
    }

    #[test]
    fn display() {
        assert_eq!(q("5").to_string(), "5");
        assert_eq!(Rational::try_from(5.0).unwrap().to_string(), "5");
        assert_eq!(Rational::try_from(5.4464).unwrap().to_string(), "5.4464");
        assert_eq!(q("5.4464").to_string(), "5.4464");
        assert_eq!(q("5.4464%").to_string(), "0.054464");
        let big = Rational::new(
            "99999999999999999999999956456456456999999999".parse::<BigInt>().unwrap(),
            "999999999999956456456456999999999".parse::<BigInt>().unwrap(),
        )
        .unwrap();
        assert_eq!(big.to_string(), "100000000000.00435435435425664606");
        assert_eq!(q("-0.5").to_string(), "-0.5");
        assert_eq!(Rational::new(2, 3).unwrap().to_string(), "0.66666666666666666667");
        assert_eq!(q("-1e-30").to_string(), "0");
    }

    #[test]
    fn encoding() {
        let pair = |n: &str, d: &str| format!(r#"{{"prim":"Pair","args":[{{"int":"{n}"}},{{"int":"{d}"}}]}}"#);
        assert_eq!(q("5").encode_json().to_string(), pair("5", "1"));
        assert_eq!(Rational::try_from(5.4464).unwrap().encode_json().to_string(), pair("3404", "625"));
        assert_eq!(q("5.4464%").encode_json().to_string(), pair("851", "15625"));
        assert_eq!(Rational::new(4, -6).unwrap().encode_json().to_string(), pair("-2", "3"));
    }

    #[test]
    fn decoding() {
        let half = Rational::new(1, 2).unwrap();
        assert_eq!(Rational::decode(&half.encode()), Ok(half.clone()));
        let unreduced = Micheline::pair(Micheline::int(2), Micheline::int(4));
        assert_eq!(Rational::decode(&unreduced), Ok(half));
        assert!(Rational::decode(&Micheline::pair(Micheline::int(1), Micheline::int(0))).is_err());
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "%", "1.2.3", "abc", "--1", "1e", "0x10", ". "] {
            assert!(bad.parse::<Rational>().is_err(), "accepted `{bad}`");
        }
        assert_eq!(Rational::new(1, 0), Err(ValidationError::ZeroDenominator));
        assert!(matches!(Rational::try_from(f64::INFINITY), Err(ValidationError::NotFinite(_))));
        assert!(matches!("1e5000".parse::<Rational>(), Err(ValidationError::OutOfRange { .. })));
    }

    #[test]
    fn arithmetic() {
        let a = q("1.5");
        let b = q("0.25");
        assert_eq!(a.plus(&b), q("1.75"));
        assert_eq!(a.minus(&b), q("1.25"));
        assert_eq!(a.times(&b), q("0.375"));
        assert_eq!(a.div(&b), Ok(q("6")));
        assert_eq!(a.div(&Rational::zero()), Err(ValidationError::ZeroDenominator));
        assert_eq!(q("-1.5").floor(), Int::from(-2));
        assert_eq!(q("-1.5").ceil(), Int::from(-1));
        assert_eq!(q("1.5").ceil(), Int::from(2));
        assert!(q("0.3") < q("0.34"));
        assert!(q("-2") < q("-1.5"));
        assert_eq!(q("3e2"), Rational::from(300i64));
    }

    #[test]
    fn arithmetic_reduces() {
        let third = Rational::new(1, 3).unwrap();
        let sum = third.plus(&third).plus(&third);
        assert_eq!(sum, Rational::from(1i64));
        assert!(sum.is_integer());
        let zero = q("0.5").minus(&q("0.5"));
        assert_eq!(zero, Rational::zero());
        assert_eq!(zero.denominator(), Nat::from(1u32));
        let neg = q("-0.5").times(&q("0.5"));
        assert_eq!((neg.numerator(), neg.denominator()), (Int::from(-1), Nat::from(4u32)));
    }
}
