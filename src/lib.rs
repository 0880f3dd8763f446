//! Route dispatch compiled from URI patterns.
//!
//! Patterns are parsed into segments, grown into a tree keyed by segment
//! count and matcher identity, optimized, and lowered into a flat dispatch
//! program that [`Dispatcher`] builds once and shares across threads.

pub mod compiler;
pub mod dispatcher;
pub mod enums;
pub mod errors;
pub mod matcher;
pub mod path;
pub mod pattern;
pub mod registry;
pub mod tools;
pub mod tree;
pub mod types;

pub use dispatcher::{
    ArtifactStore, Dispatcher, DispatcherOptions, FileArtifactStore, MatchResult,
    MemoryArtifactStore, current_route_identifier,
};
pub use enums::{HttpMethod, MethodSet};
pub use errors::{RouterError, RouterResult};
pub use registry::{Route, RouteBuilder, RouteRegistry};
pub use types::{RouteId, RouteParams};
