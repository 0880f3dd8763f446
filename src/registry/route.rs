use std::collections::HashMap;
use std::sync::Arc;

use super::RouteConfigError;
use crate::enums::{HttpMethod, MethodSet};
use crate::types::RouteId;

/// A registered route as handed to the tree builder. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    uri_pattern: String,
    methods: MethodSet,
    constraints: HashMap<String, String>,
    identifier: RouteId,
}

impl Route {
    pub fn builder<P: Into<String>>(uri_pattern: P) -> RouteBuilder {
        RouteBuilder::new(uri_pattern)
    }

    /// Shorthand for a route without constraints.
    pub fn new<P, I>(methods: MethodSet, uri_pattern: P, identifier: I) -> Result<Self, RouteConfigError>
    where
        P: Into<String>,
        I: AsRef<str>,
    {
        RouteBuilder::new(uri_pattern)
            .methods(methods)
            .identifier(identifier)
            .build()
    }

    pub fn uri_pattern(&self) -> &str {
        &self.uri_pattern
    }

    pub fn methods(&self) -> MethodSet {
        self.methods
    }

    pub fn constraints(&self) -> &HashMap<String, String> {
        &self.constraints
    }

    pub fn identifier(&self) -> &RouteId {
        &self.identifier
    }
}

#[derive(Debug, Clone)]
pub struct RouteBuilder {
    uri_pattern: String,
    methods: MethodSet,
    constraints: HashMap<String, String>,
    identifier: Option<RouteId>,
}

impl RouteBuilder {
    pub fn new<P: Into<String>>(uri_pattern: P) -> Self {
        Self {
            uri_pattern: uri_pattern.into(),
            methods: MethodSet::empty(),
            constraints: HashMap::new(),
            identifier: None,
        }
    }

    pub fn method(mut self, method: HttpMethod) -> Self {
        self.methods |= method.as_flag();
        self
    }

    pub fn methods<M: Into<MethodSet>>(mut self, methods: M) -> Self {
        self.methods |= methods.into();
        self
    }

    /// Regex fragment for `name`; an inline `{name:regex}` still wins.
    pub fn constraint<N: Into<String>, R: Into<String>>(mut self, name: N, regex: R) -> Self {
        self.constraints.insert(name.into(), regex.into());
        self
    }

    pub fn constraints(mut self, constraints: HashMap<String, String>) -> Self {
        self.constraints.extend(constraints);
        self
    }

    pub fn identifier<I: AsRef<str>>(mut self, identifier: I) -> Self {
        self.identifier = Some(Arc::from(identifier.as_ref()));
        self
    }

    pub fn build(self) -> Result<Route, RouteConfigError> {
        if self.methods.is_empty() {
            return Err(RouteConfigError::EmptyMethods {
                pattern: self.uri_pattern,
            });
        }
        let identifier = match self.identifier {
            Some(id) if !id.trim().is_empty() => id,
            _ => {
                return Err(RouteConfigError::EmptyIdentifier {
                    pattern: self.uri_pattern,
                });
            }
        };
        Ok(Route {
            uri_pattern: self.uri_pattern,
            methods: self.methods,
            constraints: self.constraints,
            identifier,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_collects_methods_and_constraints() {
        let route = Route::builder("/posts/{id}")
            .method(HttpMethod::Get)
            .method(HttpMethod::Head)
            .constraint("id", "\\d+")
            .identifier("posts.show")
            .build()
            .unwrap();
        assert_eq!(route.methods(), MethodSet::GET | MethodSet::HEAD);
        assert_eq!(route.constraints().get("id").map(String::as_str), Some("\\d+"));
        assert_eq!(route.identifier().as_ref(), "posts.show");
    }

    #[test]
    fn build_rejects_missing_methods() {
        let err = Route::builder("/x").identifier("x").build().unwrap_err();
        assert!(matches!(err, RouteConfigError::EmptyMethods { .. }));
    }

    #[test]
    fn build_rejects_blank_identifier() {
        let err = Route::builder("/x")
            .method(HttpMethod::Get)
            .identifier("  ")
            .build()
            .unwrap_err();
        assert!(matches!(err, RouteConfigError::EmptyIdentifier { .. }));
    }
}
