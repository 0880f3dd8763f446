use crate::compiler::CompileError;
use crate::dispatcher::{OptionsError, StoreError};
use crate::pattern::PatternError;
use crate::registry::RouteConfigError;
use crate::tree::TreeError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum RouterError {
    #[error(transparent)]
    Pattern(#[from] PatternError),
    #[error(transparent)]
    Tree(#[from] TreeError),
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    RouteConfig(#[from] RouteConfigError),
    #[error(transparent)]
    Options(#[from] OptionsError),
}

impl RouterError {
    /// True for build-time failures that make the route set unusable.
    pub fn is_build_error(&self) -> bool {
        matches!(
            self,
            RouterError::Pattern(_) | RouterError::Tree(_) | RouterError::Compile(_)
        )
    }
}

pub type RouterResult<T> = Result<T, RouterError>;
