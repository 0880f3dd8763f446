use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::path::PathOptions;
use crate::pattern::{DEFAULT_PARAM_PATTERN, compile_segment_regex};
use crate::tree::BuildOptions;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DispatcherOptions {
    /// Regex for parameters without an inline or mapped constraint.
    pub default_param_pattern: String,
    pub strip_query: bool,
    pub ignore_trailing_slash: bool,
    /// Run the tree optimizer before compiling.
    pub optimize: bool,
    /// Log every dispatch outcome at debug level.
    pub debug: bool,
}

impl Default for DispatcherOptions {
    fn default() -> Self {
        Self {
            default_param_pattern: DEFAULT_PARAM_PATTERN.to_string(),
            strip_query: true,
            ignore_trailing_slash: false,
            optimize: true,
            debug: false,
        }
    }
}

impl DispatcherOptions {
    pub fn builder() -> DispatcherOptionsBuilder {
        DispatcherOptionsBuilder::default()
    }

    pub fn validate(&self) -> Result<(), OptionsError> {
        if self.default_param_pattern.is_empty() {
            return Err(OptionsError::EmptyDefaultParamPattern);
        }
        compile_segment_regex(&self.default_param_pattern).map_err(|err| {
            OptionsError::InvalidDefaultParamPattern {
                pattern: self.default_param_pattern.clone(),
                error: err.to_string(),
            }
        })?;
        Ok(())
    }

    pub(crate) fn build_options(&self) -> BuildOptions {
        BuildOptions {
            default_param_pattern: self.default_param_pattern.clone(),
            ignore_trailing_slash: self.ignore_trailing_slash,
        }
    }

    pub(crate) fn path_options(&self) -> PathOptions {
        PathOptions {
            strip_query: self.strip_query,
            ignore_trailing_slash: self.ignore_trailing_slash,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct DispatcherOptionsBuilder {
    options: DispatcherOptions,
}

impl DispatcherOptionsBuilder {
    pub fn default_param_pattern<S: Into<String>>(mut self, pattern: S) -> Self {
        self.options.default_param_pattern = pattern.into();
        self
    }

    pub fn strip_query(mut self, value: bool) -> Self {
        self.options.strip_query = value;
        self
    }

    pub fn ignore_trailing_slash(mut self, value: bool) -> Self {
        self.options.ignore_trailing_slash = value;
        self
    }

    pub fn optimize(mut self, value: bool) -> Self {
        self.options.optimize = value;
        self
    }

    pub fn debug(mut self, value: bool) -> Self {
        self.options.debug = value;
        self
    }

    pub fn build(self) -> Result<DispatcherOptions, OptionsError> {
        let options = self.options;
        options.validate()?;
        Ok(options)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OptionsError {
    #[error("default parameter pattern must not be empty")]
    EmptyDefaultParamPattern,
    #[error("default parameter pattern '{pattern}' is not a valid regex: {error}")]
    InvalidDefaultParamPattern { pattern: String, error: String },
}
