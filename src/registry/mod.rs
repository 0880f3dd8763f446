mod error;
mod route;
mod stats;
mod store;

pub use error::RouteConfigError;
pub use route::{Route, RouteBuilder};
pub use stats::RegistryMetrics;
pub use store::RouteRegistry;
