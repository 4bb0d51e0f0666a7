//! Validated conversion to and from hex-encoded strings
//!
//! # Background
//!
//! Micheline byte-string literals, as well as the packed form of any value
//! that is handed to a big-map lookup, travel as *hex-strings*: strings of
//! ASCII characters matching `([0-9a-fA-F]{2})*`, where each aligned pair of
//! characters encodes a single byte (`"deadbeef" ~ [0xde, 0xad, 0xbe, 0xef]`).
//! Neither lower nor upper case is enforced when parsing, but this module
//! only ever produces lower-case output.
//!
//! # `HexString`
//!
//! [`HexString`] is an owned byte-buffer that is parsed from and displayed as
//! hex. `From` conversions are always binary-based, and parsing from text
//! goes through the fallible [`HexString::from_hex`] (or `FromStr`), so that
//! there is never any ambiguity as to whether a string is taken as raw bytes
//! or as their hex encoding.

use crate::error::HexConvError;

pub mod util {
    use crate::error::HexConvError;
    use std::fmt::Write;

    /// Formats a sequence of bytes into an undelimited lower-case hexadecimal `String`
    ///
    /// # Examples
    ///
    /// ```
    /// # use mimic::hexstring::util::hex_of_bytes;
    /// assert_eq!(hex_of_bytes(&[0xde, 0xad, 0xbe, 0xef]), String::from("deadbeef"));
    /// ```
    #[must_use]
    #[inline]
    pub fn hex_of_bytes(bytes: &[u8]) -> String {
        bytes
            .iter()
            .fold(String::with_capacity(bytes.len() * 2), |mut hex, byte| {
                // writing to a String cannot fail
                let _ = write!(&mut hex, "{byte:02x}");
                hex
            })
    }

    /// Attempt to parse a hexadecimally encoded string, returning either
    /// a `Vec<u8>` holding the decoded bytes or an error containing the invalid
    /// string.
    ///
    /// # Errors
    ///
    /// If `src` has odd length, returns [`HexConvError::OddParity`].
    ///
    /// Otherwise, if `src` contains any character that is not a valid
    /// hexadecimal digit (case-insensitive), returns [`HexConvError::NonHex`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use mimic::hexstring::util::bytes_of_hex;
    /// assert_eq!(Ok(vec![0xde, 0xad, 0xbe, 0xef]), bytes_of_hex("deadbeef"));
    /// ```
    #[inline]
    pub fn bytes_of_hex(src: &str) -> Result<Vec<u8>, HexConvError> {
        let ascii_len = src.len();

        if ascii_len % 2 != 0 {
            return Err(HexConvError::OddParity(src.to_owned()));
        }
        if !src.bytes().all(|c| c.is_ascii_hexdigit()) {
            return Err(HexConvError::NonHex(src.to_owned()));
        }

        let mut dst = Vec::with_capacity(ascii_len / 2);
        for ix in (0..ascii_len).step_by(2) {
            match u8::from_str_radix(&src[ix..ix + 2], 16) {
                Ok(word) => dst.push(word),
                Err(_) => return Err(HexConvError::NonHex(src.to_owned())),
            }
        }
        Ok(dst)
    }

    /// Returns `true` if `src` is a well-formed hex-string
    #[must_use]
    pub fn is_hex(src: &str) -> bool {
        src.len() % 2 == 0 && src.bytes().all(|c| c.is_ascii_hexdigit())
    }
}

/// Byte-buffer that is parsed from, and displayed as, a hex-string
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
#[repr(transparent)]
pub struct HexString {
    bytes: Vec<u8>,
}

impl HexString {
    #[inline]
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.bytes.as_slice()
    }

    /// Destructs a `HexString` into its underlying byte-vector
    #[inline]
    #[must_use]
    pub fn into_vec(self) -> Vec<u8> {
        self.bytes
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the number of bytes (not hex digits) in `self`
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns the lower-case hexadecimal encoding of `self`
    ///
    /// # Examples
    ///
    /// ```
    /// # use mimic::hexstring::HexString;
    /// assert_eq!(HexString::from(vec![0x05, 0x00, 0x02]).to_hex(), "050002");
    /// ```
    #[inline]
    #[must_use]
    pub fn to_hex(&self) -> String {
        util::hex_of_bytes(&self.bytes)
    }

    /// Attempt to parse a hexadecimally encoded string into the sequence of
    /// bytes it represents
    pub fn from_hex<S>(hex: S) -> Result<Self, HexConvError>
    where
        S: AsRef<str>,
    {
        Ok(Self {
            bytes: util::bytes_of_hex(hex.as_ref())?,
        })
    }
}

impl AsRef<[u8]> for HexString {
    fn as_ref(&self) -> &[u8] {
        self.bytes.as_ref()
    }
}

impl std::fmt::Debug for HexString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("HexString").field(&self.to_hex()).finish()
    }
}

impl std::fmt::Display for HexString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<Vec<u8>> for HexString {
    fn from(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }
}

impl From<&[u8]> for HexString {
    fn from(bytes: &[u8]) -> Self {
        Self {
            bytes: bytes.to_vec(),
        }
    }
}

impl From<HexString> for Vec<u8> {
    fn from(val: HexString) -> Self {
        val.bytes
    }
}

impl std::str::FromStr for HexString {
    type Err = HexConvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}
