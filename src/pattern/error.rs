use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PatternError {
    #[error("pattern '{pattern}' must start with '/'")]
    MissingLeadingSlash { pattern: String },
    #[error("pattern '{pattern}' opens a parameter inside parameter '{name}' (byte {index})")]
    NestedParameter {
        pattern: String,
        name: String,
        index: usize,
    },
    #[error("pattern '{pattern}' has an unexpected '}}' at byte {index}")]
    UnexpectedClosingBrace { pattern: String, index: usize },
    #[error("pattern '{pattern}' has an unterminated parameter starting at byte {start}")]
    UnterminatedParameter { pattern: String, start: usize },
    #[error("parameter in pattern '{pattern}' is missing a name")]
    ParameterMissingName { pattern: String },
    #[error(
        "parameter name '{name}' in pattern '{pattern}' must start with an alphabetic character or underscore (found '{found}')"
    )]
    ParameterInvalidStart {
        pattern: String,
        name: String,
        found: char,
    },
    #[error(
        "parameter name '{name}' in pattern '{pattern}' contains invalid character '{invalid}'"
    )]
    ParameterInvalidCharacter {
        pattern: String,
        name: String,
        invalid: char,
    },
    #[error("duplicate parameter name '{name}' in pattern '{pattern}'")]
    DuplicateParameter { pattern: String, name: String },
    #[error("regex for parameter '{name}' in pattern '{pattern}' is invalid: {error}")]
    InvalidRegex {
        pattern: String,
        name: String,
        error: String,
    },
}

impl PatternError {
    /// The route pattern that failed to parse.
    pub fn pattern(&self) -> &str {
        match self {
            PatternError::MissingLeadingSlash { pattern }
            | PatternError::NestedParameter { pattern, .. }
            | PatternError::UnexpectedClosingBrace { pattern, .. }
            | PatternError::UnterminatedParameter { pattern, .. }
            | PatternError::ParameterMissingName { pattern }
            | PatternError::ParameterInvalidStart { pattern, .. }
            | PatternError::ParameterInvalidCharacter { pattern, .. }
            | PatternError::DuplicateParameter { pattern, .. }
            | PatternError::InvalidRegex { pattern, .. } => pattern,
        }
    }
}

pub type PatternResult<T> = Result<T, PatternError>;
