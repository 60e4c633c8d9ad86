/// Error returned by custom text hooks, propagated unchanged.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Why a literal was rejected by one of the text parsers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseFailure {
    #[error("invalid syntax")]
    Syntax,

    #[error("value out of range")]
    Range,

    #[error("missing unit in duration")]
    MissingUnit,

    #[error("unknown unit {0:?} in duration")]
    UnknownUnit(String),

    #[error("negative duration")]
    Negative,
}

/// Error returned by assignment and path binding.
#[derive(Debug, thiserror::Error)]
pub enum ReflectError {
    #[error("value is not assignable")]
    NotAssignable,

    #[error("cannot parse {raw:?} as {target_type}: {reason}")]
    Parse {
        raw: String,
        target_type: &'static str,
        reason: ParseFailure,
    },

    #[error("unable to convert string {raw:?} to type {target_type}")]
    UnsupportedType { raw: String, target_type: &'static str },

    #[error("value of type {src_type} cannot be converted to type {dst_type}")]
    IncompatibleType {
        src_type: &'static str,
        dst_type: &'static str,
    },

    #[error("cannot assign {actual} elements to {dst_type} of length {expected}")]
    LengthMismatch {
        dst_type: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("no value at path {0:?}")]
    UnknownPath(String),

    /// Error produced by a type's own text hook.
    #[error(transparent)]
    Hook(BoxError),
}

impl ReflectError {
    pub(crate) fn parse(raw: &str, target_type: &'static str, reason: ParseFailure) -> Self {
        Self::Parse {
            raw: raw.to_string(),
            target_type,
            reason,
        }
    }

    pub(crate) fn incompatible(src_type: &'static str, dst_type: &'static str) -> Self {
        Self::IncompatibleType { src_type, dst_type }
    }

    /// The hook error, when this error came from a custom text hook.
    pub fn hook_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            ReflectError::Hook(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}
