use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("dispatch program format {found} is not supported (expected {expected})")]
    VersionMismatch { found: u32, expected: u32 },
    #[error("dispatch program pattern #{index} '{pattern}' does not compile: {error}")]
    InvalidRegex {
        index: usize,
        pattern: String,
        error: String,
    },
    #[error("corrupt dispatch program: {detail}")]
    CorruptProgram { detail: String },
    #[error("failed to decode dispatch program: {0}")]
    Decode(String),
    #[error("failed to encode dispatch program: {0}")]
    Encode(String),
}

pub type CompileResult<T> = Result<T, CompileError>;
