mod classes;
mod error;
mod lexer;
mod parser;
mod segment;

pub use classes::compile_segment_regex;
pub use error::{PatternError, PatternResult};
pub use parser::{parse_pattern, parse_pattern_default};
pub use segment::{ParamSegment, Segment};

/// Parameter regex used when neither an inline nor a mapped constraint exists.
pub const DEFAULT_PARAM_PATTERN: &str = "[^/]+";
