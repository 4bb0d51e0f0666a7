use crate::error::ValidationError;

/// Error type for Micheline nodes whose shape does not match the
/// expectation of the decoder reading them.
///
/// Decoding never recovers locally from any of these conditions; they
/// indicate either a programming error in the caller or malformed data
/// from upstream, and are surfaced as soon as they are encountered.
#[derive(Clone, Debug, PartialEq, Eq)]
#[non_exhaustive]
pub enum DecodeError {
    /// Node carried a different tag than the one the decoder reads
    UnexpectedNode {
        expected: &'static str,
        found: String,
    },
    /// Primitive name is not part of the closed set this model represents
    UnknownPrim(String),
    /// Number of arguments does not match the arity of the node
    Arity {
        prim: String,
        expected: usize,
        actual: usize,
    },
    /// Non-pair component reached without a field annotation to name it
    Unannotated(String),
    /// JSON document does not have the shape of a Micheline node
    Json(String),
    /// Node payload was well-formed but failed domain validation
    Invalid(ValidationError),
}

impl DecodeError {
    pub(crate) fn unexpected(expected: &'static str, found: impl std::fmt::Display) -> Self {
        let err = Self::UnexpectedNode {
            expected,
            found: found.to_string(),
        };
        log::debug!("decode failure: {err}");
        err
    }

    pub(crate) fn arity(prim: impl Into<String>, expected: usize, actual: usize) -> Self {
        Self::Arity {
            prim: prim.into(),
            expected,
            actual,
        }
    }
}

impl From<std::convert::Infallible> for DecodeError {
    fn from(_void: std::convert::Infallible) -> Self {
        match _void {}
    }
}

impl From<ValidationError> for DecodeError {
    fn from(err: ValidationError) -> Self {
        Self::Invalid(err)
    }
}

impl From<serde_json::Error> for DecodeError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err.to_string())
    }
}

impl std::fmt::Display for DecodeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeError::UnexpectedNode { expected, found } => {
                write!(f, "expected {expected} node, found `{found}`")
            }
            DecodeError::UnknownPrim(prim) => {
                write!(f, "unknown primitive `{prim}`")
            }
            DecodeError::Arity {
                prim,
                expected,
                actual,
            } => {
                write!(
                    f,
                    "primitive `{prim}` expects {expected} argument(s), found {actual}"
                )
            }
            DecodeError::Unannotated(found) => {
                write!(f, "cannot flatten unannotated non-pair component `{found}`")
            }
            DecodeError::Json(msg) => {
                write!(f, "malformed Micheline JSON: {msg}")
            }
            DecodeError::Invalid(err) => {
                write!(f, "decoded value failed validation: {err}")
            }
        }
    }
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::Invalid(err) => Some(err),
            _ => None,
        }
    }
}

pub type DecodeResult<T> = std::result::Result<T, DecodeError>;

#[cfg(test)]
mod test {
    fn dummy<T: Send + Sync>() {}

    #[test]
    fn decode_error_threadsafe() {
        dummy::<super::DecodeError>()
    }

    #[test]
    fn validation_is_source() {
        use std::error::Error;
        let err = super::DecodeError::from(crate::error::ValidationError::ZeroDenominator);
        assert!(err.source().is_some());
    }
}
