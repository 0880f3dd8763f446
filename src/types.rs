use std::collections::HashMap;
use std::sync::Arc;

pub use crate::enums::{HttpMethod, MethodSet};

/// Opaque handle returned on a successful match.
pub type RouteId = Arc<str>;
pub type RouteParams = HashMap<String, String>;

pub type ParamOffset = (usize, usize);
