use thiserror::Error;

use crate::value::Value;

/// Failure of a single field read or write.
///
/// All variants are recoverable: the script runtime decides whether to abort
/// the running script or substitute a default.  A setter that returns an
/// error must leave its owner untouched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FieldError {
    #[error("unknown field `{key}` on {owner}")]
    UnknownField { owner: &'static str, key: String },

    #[error("field `{field}` on {owner} is read-only")]
    ReadOnlyField {
        owner: &'static str,
        field: &'static str,
    },

    #[error("field `{field}` expects {expected}, got {found}")]
    TypeMismatch {
        field: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("script error: {0}")]
    Script(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl FieldError {
    pub fn mismatch(field: &'static str, expected: &'static str, found: &Value) -> Self {
        FieldError::TypeMismatch {
            field,
            expected,
            found: found.kind(),
        }
    }
}

/// Errors raised while building objects from authored configuration.
///
/// These indicate bad content rather than transient conditions; callers are
/// expected to report them and stop, never to retry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{0} requires a script environment")]
    MissingEnvironment(&'static str),

    #[error("missing required key `{0}`")]
    MissingKey(&'static str),

    #[error("`{key}` must be {expected}, got {found}")]
    Malformed {
        key: &'static str,
        expected: &'static str,
        found: String,
    },

    #[error("unknown widget type `{0}`")]
    UnknownWidgetType(String),

    #[error("unknown gui section `{0}`")]
    UnknownSection(String),

    #[error("could not parse configuration: {0}")]
    Parse(String),
}

impl ConfigError {
    pub fn malformed(key: &'static str, expected: &'static str, found: &Value) -> Self {
        ConfigError::Malformed {
            key,
            expected,
            found: found.kind(),
        }
    }
}

impl From<FieldError> for ConfigError {
    /// Configuration keys are often applied through field setters; a setter
    /// rejection becomes a malformed key.
    fn from(err: FieldError) -> Self {
        match err {
            FieldError::TypeMismatch {
                field,
                expected,
                found,
            } => ConfigError::Malformed {
                key: field,
                expected,
                found,
            },
            FieldError::Config(inner) => inner,
            other => ConfigError::Parse(other.to_string()),
        }
    }
}
