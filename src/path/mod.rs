mod split;

pub use split::{PathOptions, SplitPath, split_path};
