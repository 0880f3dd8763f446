use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteConfigError {
    #[error("route '{pattern}' declares no HTTP methods")]
    EmptyMethods { pattern: String },
    #[error("route '{pattern}' has an empty identifier")]
    EmptyIdentifier { pattern: String },
}
