//! Variable-length binary encoding of arbitrary-precision integers
//!
//! Integers in packed Micheline are written in the `zarith` format: the
//! first byte holds a continuation bit, the sign bit, and the six
//! least-significant bits of the magnitude; every following byte holds a
//! continuation bit and the next seven bits. The final byte is the first
//! one whose high bit is clear.

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::Zero;

use crate::conv::target::Target;
use crate::parse::{ByteParser, ParseResult, TokenError};

/// Appends the zarith encoding of `val` to `buf`, returning the number of
/// bytes written
pub fn write_z<U: Target>(val: &BigInt, buf: &mut U) -> usize {
    buf.push_all(&serialize_z(val)) + buf.resolve_zero()
}

/// Reads a single zarith-encoded integer
///
/// # Errors
///
/// Fails if the buffer ends before the final byte, or if the encoding has a
/// redundant all-zero trailing group.
pub fn read_z(p: &mut ByteParser<'_>) -> ParseResult<BigInt> {
    let bytes = p.take_self_terminating(|byte| byte & 0x80 == 0)?;
    deserialize_z(bytes)
}

/// Number of bytes in the zarith encoding of `val`
#[must_use]
pub fn z_len(val: &BigInt) -> usize {
    match val.bits() as usize {
        0..=6 => 1,
        n => 1 + num_integer::Integer::div_ceil(&(n - 6), &7),
    }
}

fn serialize_z(val: &BigInt) -> Vec<u8> {
    let (sign, mut abs) = (val.sign(), val.magnitude().clone());

    // Shifting left by one aligns the base-128 digits so that every digit
    // after the first holds seven bits of the magnitude, with the first
    // holding six (once shifted back down)
    abs <<= 1u8;
    let mut ret = abs.to_radix_le(0x80);
    if ret.is_empty() {
        ret.push(0);
    }

    ret[0] >>= 1u8;
    if sign == Sign::Minus {
        ret[0] |= 0x40;
    }

    let last = ret.len() - 1;
    for byte in &mut ret[..last] {
        *byte |= 0x80;
    }
    ret
}

fn deserialize_z(bytes: &[u8]) -> ParseResult<BigInt> {
    let Some((&first, rest)) = bytes.split_first() else {
        return Err(TokenError::NonTerminating(Vec::new()).into());
    };
    if bytes.len() > 1 && bytes[bytes.len() - 1] == 0 {
        return Err(TokenError::NonCanonical(bytes.to_vec()).into());
    }

    let sign = if first & 0x40 == 0 { Sign::Plus } else { Sign::Minus };
    let lo7: Vec<u8> = rest.iter().map(|b| b & 0x7f).collect();
    let mut abs = if lo7.is_empty() {
        BigUint::zero()
    } else {
        BigUint::from_radix_le(&lo7, 0x80).unwrap_or_default()
    };
    abs <<= 6u8;
    abs |= BigUint::from(first & 0x3f);
    Ok(BigInt::from_biguint(sign, abs))
}

#[cfg(test)]
mod test {
    use super::*;

    fn z(i: i64) -> BigInt {
        BigInt::from(i)
    }

    fn bytes_of(i: i64) -> Vec<u8> {
        let mut buf = Vec::new();
        let n = write_z(&z(i), &mut buf);
        assert_eq!(n, buf.len());
        assert_eq!(n, z_len(&z(i)));
        buf
    }

    #[test]
    fn known_encodings() {
        assert_eq!(bytes_of(0), [0x00]);
        assert_eq!(bytes_of(2), [0x02]);
        assert_eq!(bytes_of(-1), [0x41]);
        assert_eq!(bytes_of(63), [0x3f]);
        assert_eq!(bytes_of(64), [0x80, 0x01]);
        assert_eq!(bytes_of(-64), [0xc0, 0x01]);
        assert_eq!(bytes_of(1000), [0xa8, 0x0f]);
    }

    #[test]
    fn reads_back() {
        for i in [0, 1, -1, 63, 64, -65, 8191, 1_000_000, -987_654_321_012] {
            let buf = bytes_of(i);
            let mut p = ByteParser::new(&buf);
            assert_eq!(read_z(&mut p), Ok(z(i)));
            assert!(p.is_empty());
        }
    }

    #[test]
    fn rejects_malformed() {
        assert!(read_z(&mut ByteParser::new(&[0x80, 0x80])).is_err());
        assert!(matches!(
            read_z(&mut ByteParser::new(&[0x81, 0x00])),
            Err(crate::parse::ParseError::Token(TokenError::NonCanonical(_)))
        ));
    }
}
