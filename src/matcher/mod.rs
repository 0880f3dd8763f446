mod params;
mod segment_matcher;

pub(crate) use params::captures_to_map;
pub use params::with_param_buffer;
pub use segment_matcher::{MatcherKey, MatcherKind, ParamAliases, SegmentMatcher};
