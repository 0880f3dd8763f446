use thiserror::Error;

use crate::enums::HttpMethod;
use crate::pattern::PatternError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    #[error("route tree node requires at least one segment matcher")]
    EmptyMatcherSet,
    #[error("segment matchers must have strictly increasing depths (got {depth} after {previous})")]
    UnorderedMatchers { previous: usize, depth: usize },
    #[error(
        "duplicate route {method} '{pattern}': already registered as '{existing}', rejected '{duplicate}'"
    )]
    DuplicateRoute {
        method: HttpMethod,
        pattern: String,
        existing: String,
        duplicate: String,
    },
    #[error(transparent)]
    Pattern(#[from] PatternError),
}

pub type TreeResult<T> = Result<T, TreeError>;
