mod hash;

pub use hash::StableHasher;
