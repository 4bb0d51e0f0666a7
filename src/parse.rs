//! Cursor over packed byte buffers, and the errors it reports
//!
//! [`ByteParser`] is a forward-only cursor over a borrowed byte-slice, used
//! by [`crate::pack`] to read binary Micheline. Length-prefixed sequences
//! are read through a sub-parser whose window is exactly the prefixed
//! length, so that an element overrunning its enclosing sequence is caught
//! at the boundary rather than silently consuming the bytes that follow.
//!
//! # Layout
//!
//! This module defines the primary type `ParseError` and the alias
//! `ParseResult<T>`, along with the refinements of `ParseError` grouped
//! by provenance.

use std::error::Error;
use std::fmt::{Display, Formatter, Result};
use std::string::FromUtf8Error;

use crate::hexstring::util::hex_of_bytes;

/// Enumeration type over all errors that may be encountered when reading
/// from a [`ByteParser`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Error class encountered when a read would overrun the current window,
    /// or when a window is closed with bytes left unconsumed
    Window(WindowError),
    /// Error class encountered when the bytes read do not form a valid token
    Token(TokenError),
    /// Error class encountered when low-level parsing is successful but the
    /// raw value cannot be converted into its post-parse type
    External(ExternalError),
}

impl Display for ParseError {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ParseError::Window(err) => Display::fmt(err, f),
            ParseError::Token(err) => Display::fmt(err, f),
            ParseError::External(err) => Display::fmt(err, f),
        }
    }
}

impl Error for ParseError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ParseError::Window(err) => Some(err),
            ParseError::Token(err) => Some(err),
            ParseError::External(err) => Some(err),
        }
    }
}

/// Type alias for Result with an error type of [`ParseError`]
pub type ParseResult<T> = std::result::Result<T, ParseError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowError {
    /// Read of `requested` bytes at `offset` would pass the end of the
    /// window, which is `limit` bytes wide
    ConsumeWouldExceedLimit {
        offset: usize,
        requested: usize,
        limit: usize,
    },
    /// Window was closed with unconsumed bytes remaining
    CloseWithResidue { residual: usize },
}

impl From<WindowError> for ParseError {
    fn from(err: WindowError) -> Self {
        Self::Window(err)
    }
}

impl Display for WindowError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match *self {
            WindowError::ConsumeWouldExceedLimit {
                offset,
                requested,
                limit,
            } => {
                write!(
                    f,
                    "cannot increment offset by {requested} bytes (currently at byte {offset} out of limit {limit})"
                )
            }
            WindowError::CloseWithResidue { residual } => {
                write!(f, "cannot close context window with {residual} residual bytes")
            }
        }
    }
}

impl Error for WindowError {}

/// Errors arising from unexpected tokens in the buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Byte could not be interpreted as a discriminant of the named class
    InvalidTag { what: &'static str, byte: u8 },
    /// Supposedly self-terminating byte-sequence failed to terminate before
    /// reaching the end of the window
    NonTerminating(Vec<u8>),
    /// Self-terminating byte-sequence has a redundant trailing group
    NonCanonical(Vec<u8>),
    /// Nested structure exceeds the maximum supported depth
    TooDeep { limit: usize },
}

impl From<TokenError> for ParseError {
    fn from(err: TokenError) -> Self {
        Self::Token(err)
    }
}

impl Display for TokenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::InvalidTag { what, byte } => write!(f, "invalid {what} tag 0x{byte:02x}"),
            Self::NonTerminating(buf) => {
                write!(f, "element failed to terminate: {}", hex_of_bytes(buf))
            }
            Self::NonCanonical(buf) => {
                write!(f, "non-canonical variable-length integer: {}", hex_of_bytes(buf))
            }
            Self::TooDeep { limit } => write!(f, "nesting exceeds maximum depth of {limit}"),
        }
    }
}

impl Error for TokenError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExternalError {
    /// String payload was not valid UTF-8
    UncoercableString(FromUtf8Error),
}

impl From<ExternalError> for ParseError {
    fn from(err: ExternalError) -> Self {
        Self::External(err)
    }
}

impl From<FromUtf8Error> for ParseError {
    fn from(err: FromUtf8Error) -> Self {
        Self::External(ExternalError::UncoercableString(err))
    }
}

impl Display for ExternalError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ExternalError::UncoercableString(err) => {
                write!(f, "string payload is not valid UTF-8: {err}")
            }
        }
    }
}

impl Error for ExternalError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            ExternalError::UncoercableString(err) => Some(err),
        }
    }
}

/// Forward-only cursor over a borrowed byte-slice
#[derive(Debug, Clone)]
pub struct ByteParser<'a> {
    buf: &'a [u8],
    offset: usize,
}

impl<'a> ByteParser<'a> {
    #[must_use]
    pub const fn new(buf: &'a [u8]) -> Self {
        Self { buf, offset: 0 }
    }

    /// Number of bytes consumed so far
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Number of bytes left to consume
    #[must_use]
    pub const fn remainder(&self) -> usize {
        self.buf.len() - self.offset
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remainder() == 0
    }

    /// Consumes and returns the next `nbytes` bytes
    pub fn consume(&mut self, nbytes: usize) -> ParseResult<&'a [u8]> {
        let tgt = self
            .offset
            .checked_add(nbytes)
            .filter(|&tgt| tgt <= self.buf.len())
            .ok_or(WindowError::ConsumeWouldExceedLimit {
                offset: self.offset,
                requested: nbytes,
                limit: self.buf.len(),
            })?;
        let ret = &self.buf[self.offset..tgt];
        self.offset = tgt;
        Ok(ret)
    }

    pub fn get_u8(&mut self) -> ParseResult<u8> {
        let bytes = self.consume(1)?;
        Ok(bytes[0])
    }

    pub fn get_u32(&mut self) -> ParseResult<u32> {
        let mut word = [0u8; 4];
        word.copy_from_slice(self.consume(4)?);
        Ok(u32::from_be_bytes(word))
    }

    /// Consumes bytes up to and including the first one satisfying `is_last`
    pub fn take_self_terminating<F>(&mut self, is_last: F) -> ParseResult<&'a [u8]>
    where
        F: Fn(u8) -> bool,
    {
        let rest = &self.buf[self.offset..];
        match rest.iter().position(|&b| is_last(b)) {
            Some(ix) => self.consume(ix + 1),
            None => Err(TokenError::NonTerminating(rest.to_vec()).into()),
        }
    }

    /// Consumes `nbytes` bytes and returns a parser whose window is exactly
    /// those bytes
    pub fn split(&mut self, nbytes: usize) -> ParseResult<ByteParser<'a>> {
        self.consume(nbytes).map(ByteParser::new)
    }

    /// Consumes a `u32` length prefix followed by that many bytes, returned
    /// as a sub-parser
    pub fn split_dynamic(&mut self) -> ParseResult<ByteParser<'a>> {
        let len = self.get_u32()? as usize;
        self.split(len)
    }

    /// Closes the window, failing if any bytes remain unconsumed
    pub fn finish(self) -> ParseResult<()> {
        match self.remainder() {
            0 => Ok(()),
            residual => Err(WindowError::CloseWithResidue { residual }.into()),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn dummy<T: Send + Sync>() {}

    #[test]
    fn parse_error_threadsafe() {
        dummy::<ParseError>()
    }

    #[test]
    fn windows() {
        let buf = [0x00, 0x00, 0x00, 0x02, 0xab, 0xcd, 0xef];
        let mut p = ByteParser::new(&buf);
        let mut sub = p.split_dynamic().unwrap();
        assert_eq!(sub.get_u8(), Ok(0xab));
        assert_eq!(sub.get_u8(), Ok(0xcd));
        assert!(matches!(
            sub.get_u8(),
            Err(ParseError::Window(WindowError::ConsumeWouldExceedLimit { .. }))
        ));
        assert_eq!(p.offset(), 6);
        assert_eq!(
            p.finish(),
            Err(ParseError::Window(WindowError::CloseWithResidue { residual: 1 }))
        );
    }

    #[test]
    fn self_terminating() {
        let buf = [0x80, 0x81, 0x01, 0x7f];
        let mut p = ByteParser::new(&buf);
        assert_eq!(p.take_self_terminating(|b| b & 0x80 == 0), Ok(&buf[..3]));
        assert_eq!(p.remainder(), 1);
        let mut q = ByteParser::new(&buf[..2]);
        assert!(matches!(
            q.take_self_terminating(|b| b & 0x80 == 0),
            Err(ParseError::Token(TokenError::NonTerminating(_)))
        ));
    }
}
