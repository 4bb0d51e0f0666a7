//! Durations given as `[Nw][Nd][Nh][Nm][Ns]` literals
//!
//! Each component is optional, but at least one must be present, and they
//! must appear in decreasing order of magnitude: `"1w2d3h4m5s"`, `"90m"`,
//! `"2d12h"`. A duration is encoded as the Micheline `int` of its total
//! length in seconds, which is how it is consumed as a timestamp offset.

use std::fmt::Display;
use std::str::FromStr;

use num_traits::ToPrimitive;

use crate::conv::{Decode, DecodeResult, Encode, Typed};
use crate::error::{ValidationError, ValidationResult};
use crate::micheline::{Micheline, MichelineType, TypePrim};

/// Suffixes of duration components and their length in seconds, in the
/// order in which they must appear
const UNITS: [(char, i64); 5] = [
    ('w', 7 * 24 * 3600),
    ('d', 24 * 3600),
    ('h', 3600),
    ('m', 60),
    ('s', 1),
];

/// Length of time with a resolution of one second
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Duration {
    seconds: i64,
}

impl Duration {
    pub const fn from_seconds(seconds: i64) -> Self {
        Self { seconds }
    }

    #[must_use]
    pub const fn to_seconds(&self) -> i64 {
        self.seconds
    }

    /// Sum of two durations
    ///
    /// # Errors
    ///
    /// Fails with [`ValidationError::OutOfRange`] if the total length in seconds
    /// overflows an `i64`.
    pub fn plus(&self, other: &Duration) -> ValidationResult<Duration> {
        self.seconds
            .checked_add(other.seconds)
            .map(Duration::from_seconds)
            .ok_or_else(|| ValidationError::OutOfRange {
                what: "duration",
                value: format!("{self} + {other}"),
            })
    }

    /// Converts into a `chrono` duration, for use as a timestamp offset
    ///
    /// Returns `None` if the duration exceeds the range that `chrono` can represent.
    #[must_use]
    pub fn to_chrono(&self) -> Option<chrono::Duration> {
        chrono::Duration::try_seconds(self.seconds)
    }
}

impl FromStr for Duration {
    type Err = ValidationError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let malformed = || ValidationError::MalformedDuration(text.to_owned());
        let mut rest = text.trim();
        let mut total: i64 = 0;
        let mut seen_any = false;

        for (suffix, scale) in UNITS {
            let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
            if digits == 0 || !rest[digits..].starts_with(suffix) {
                continue;
            }
            let amount: i64 = rest[..digits].parse().map_err(|_| malformed())?;
            total = amount
                .checked_mul(scale)
                .and_then(|secs| total.checked_add(secs))
                .ok_or_else(|| ValidationError::OutOfRange {
                    what: "duration",
                    value: text.to_owned(),
                })?;
            rest = &rest[digits + 1..];
            seen_any = true;
        }

        if seen_any && rest.is_empty() {
            Ok(Duration::from_seconds(total))
        } else {
            Err(malformed())
        }
    }
}

impl std::fmt::Debug for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Duration({self})")
    }
}

/// Displays the duration in its literal form, omitting zero components
impl Display for Duration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.seconds == 0 {
            return f.write_str("0s");
        }
        if self.seconds < 0 {
            f.write_str("-")?;
        }
        let mut rest = self.seconds.unsigned_abs();
        for (suffix, scale) in UNITS {
            let scale = scale.unsigned_abs();
            if rest >= scale {
                write!(f, "{}{suffix}", rest / scale)?;
                rest %= scale;
            }
        }
        Ok(())
    }
}

impl Encode for Duration {
    fn encode(&self) -> Micheline {
        Micheline::int(self.seconds)
    }
}

impl Decode for Duration {
    fn decode(node: &Micheline) -> DecodeResult<Self> {
        let secs = node.as_int()?;
        secs.to_i64().map(Duration::from_seconds).ok_or_else(|| {
            ValidationError::OutOfRange {
                what: "duration",
                value: secs.to_string(),
            }
            .into()
        })
    }
}

impl Typed for Duration {
    fn mich_type() -> MichelineType {
        MichelineType::prim(TypePrim::int)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn literals() {
        assert_eq!("1w2d3h4m5s".parse::<Duration>().map(|d| d.to_seconds()), Ok(788_645));
        assert_eq!("90m".parse::<Duration>(), Ok(Duration::from_seconds(5400)));
        assert_eq!("2d12h".parse::<Duration>().unwrap().to_string(), "2d12h");
        assert_eq!("5400s".parse::<Duration>().unwrap().to_string(), "1h30m");
        for bad in ["", "5", "1s2m", "h", "1x", "1h1h", "-1s"] {
            assert!(
                matches!(bad.parse::<Duration>(), Err(ValidationError::MalformedDuration(_))),
                "accepted `{bad}`"
            );
        }
    }

    #[test]
    fn codec() {
        let d: Duration = "1d".parse().unwrap();
        assert_eq!(d.encode_json().to_string(), r#"{"int":"86400"}"#);
        assert_eq!(Duration::decode(&d.encode()), Ok(d));
        assert_eq!(d.plus(&"1h".parse().unwrap()).map(|d| d.to_seconds()), Ok(90_000));
        assert_eq!(d.to_chrono(), Some(chrono::Duration::days(1)));
        assert_eq!(Duration::from_seconds(i64::MAX).to_chrono(), None);
        assert_eq!(Duration::from_seconds(-60).to_string(), "-1m");
    }
}
