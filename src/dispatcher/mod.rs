mod current;
mod fingerprint;
mod options;
mod service;
mod stats;
mod store;

pub use current::current_route_identifier;
pub use fingerprint::fingerprint;
pub use options::{DispatcherOptions, DispatcherOptionsBuilder, OptionsError};
pub use service::{Dispatcher, MatchResult};
pub use stats::CacheStats;
pub use store::{ArtifactStore, FileArtifactStore, MemoryArtifactStore, StoreError};
