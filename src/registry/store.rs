use crate::enums::{HttpMethod, MethodSet};
use crate::registry::{RegistryMetrics, Route, RouteBuilder, RouteConfigError};

/// Ordered collection of routes handed to the dispatcher in one piece.
#[derive(Debug, Default, Clone)]
pub struct RouteRegistry {
    routes: Vec<Route>,
    metrics: RegistryMetrics,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, route: Route) -> &Route {
        self.metrics.record_insert(route.methods().bits().count_ones() as usize);
        let index = self.routes.len();
        self.routes.push(route);
        &self.routes[index]
    }

    pub fn add(&mut self, builder: RouteBuilder) -> Result<&Route, RouteConfigError> {
        let route = builder.build()?;
        Ok(self.insert(route))
    }

    pub fn route<M: Into<MethodSet>>(
        &mut self,
        methods: M,
        uri_pattern: &str,
        identifier: &str,
    ) -> Result<&Route, RouteConfigError> {
        self.add(
            RouteBuilder::new(uri_pattern)
                .methods(methods)
                .identifier(identifier),
        )
    }

    pub fn get(&mut self, uri_pattern: &str, identifier: &str) -> Result<&Route, RouteConfigError> {
        self.route(HttpMethod::Get, uri_pattern, identifier)
    }

    pub fn post(&mut self, uri_pattern: &str, identifier: &str) -> Result<&Route, RouteConfigError> {
        self.route(HttpMethod::Post, uri_pattern, identifier)
    }

    pub fn put(&mut self, uri_pattern: &str, identifier: &str) -> Result<&Route, RouteConfigError> {
        self.route(HttpMethod::Put, uri_pattern, identifier)
    }

    pub fn delete(&mut self, uri_pattern: &str, identifier: &str) -> Result<&Route, RouteConfigError> {
        self.route(HttpMethod::Delete, uri_pattern, identifier)
    }

    pub fn patch(&mut self, uri_pattern: &str, identifier: &str) -> Result<&Route, RouteConfigError> {
        self.route(HttpMethod::Patch, uri_pattern, identifier)
    }

    pub fn any(&mut self, uri_pattern: &str, identifier: &str) -> Result<&Route, RouteConfigError> {
        self.route(MethodSet::all(), uri_pattern, identifier)
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn metrics(&self) -> &RegistryMetrics {
        &self.metrics
    }

    pub fn into_routes(self) -> Vec<Route> {
        self.routes
    }
}
