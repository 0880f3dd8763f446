use std::hash::Hasher;

use super::DispatcherOptions;
use crate::compiler::PROGRAM_FORMAT_VERSION;
use crate::registry::Route;
use crate::tools::StableHasher;

/// Stable key of a route set: identical inputs give the same key in every
/// process, and any change to patterns, methods, constraints, identifiers,
/// order or compile-relevant options gives a new one.
pub fn fingerprint(routes: &[Route], options: &DispatcherOptions) -> String {
    let mut hasher = StableHasher::new();
    hasher.write_u32(PROGRAM_FORMAT_VERSION);
    hasher.write_str(&options.default_param_pattern);
    hasher.write_u8(u8::from(options.ignore_trailing_slash));
    hasher.write_u8(u8::from(options.optimize));

    hasher.write_usize(routes.len());
    for route in routes {
        hasher.write_str(route.uri_pattern());
        hasher.write_u8(route.methods().bits());
        hasher.write_str(route.identifier());

        let mut constraints: Vec<(&String, &String)> = route.constraints().iter().collect();
        constraints.sort();
        hasher.write_usize(constraints.len());
        for (name, regex) in constraints {
            hasher.write_str(name);
            hasher.write_str(regex);
        }
    }
    format!("{:016x}", hasher.finish())
}
