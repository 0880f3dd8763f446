use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{Level, event};

use super::current::{current_route_identifier, set_current_route};
use super::fingerprint::fingerprint;
use super::{ArtifactStore, CacheStats, DispatcherOptions};
use crate::compiler::{CompiledDispatcher, DispatchProgram, Resolution, compile};
use crate::enums::{HttpMethod, MethodSet};
use crate::errors::{RouterError, RouterResult};
use crate::path::{PathOptions, split_path};
use crate::registry::{Route, RouteRegistry};
use crate::tree::{build, optimize};
use crate::types::{RouteId, RouteParams};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchResult {
    Found { route: RouteId, params: RouteParams },
    NotFound,
    MethodNotAllowed { allowed: MethodSet },
}

impl MatchResult {
    pub fn is_found(&self) -> bool {
        matches!(self, MatchResult::Found { .. })
    }

    pub fn route(&self) -> Option<&RouteId> {
        match self {
            MatchResult::Found { route, .. } => Some(route),
            _ => None,
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        match self {
            MatchResult::Found { params, .. } => params.get(name).map(String::as_str),
            _ => None,
        }
    }
}

/// Matches requests against a fixed route set.
///
/// The dispatch program is built on first use (or loaded from the artifact
/// store) exactly once, then shared read-only. A failing build is not
/// retried: the route set is fixed, so every dispatch returns that same
/// error and nothing is ever served.
#[derive(Debug)]
pub struct Dispatcher {
    routes: Vec<Route>,
    options: DispatcherOptions,
    path_options: PathOptions,
    key: String,
    store: Option<Arc<dyn ArtifactStore>>,
    compiled: OnceLock<Result<Arc<CompiledDispatcher>, RouterError>>,
    builds: AtomicUsize,
    cache_stats: CacheStats,
}

impl Dispatcher {
    pub fn new<R: Into<Vec<Route>>>(routes: R, options: DispatcherOptions) -> RouterResult<Self> {
        Self::create(routes.into(), options, None)
    }

    pub fn with_store<R: Into<Vec<Route>>>(
        routes: R,
        options: DispatcherOptions,
        store: Arc<dyn ArtifactStore>,
    ) -> RouterResult<Self> {
        Self::create(routes.into(), options, Some(store))
    }

    pub fn from_registry(registry: RouteRegistry, options: DispatcherOptions) -> RouterResult<Self> {
        Self::create(registry.into_routes(), options, None)
    }

    fn create(
        routes: Vec<Route>,
        options: DispatcherOptions,
        store: Option<Arc<dyn ArtifactStore>>,
    ) -> RouterResult<Self> {
        options.validate()?;
        let key = fingerprint(&routes, &options);
        Ok(Self {
            path_options: options.path_options(),
            routes,
            options,
            key,
            store,
            compiled: OnceLock::new(),
            builds: AtomicUsize::new(0),
            cache_stats: CacheStats::default(),
        })
    }

    #[tracing::instrument(level = "trace", skip(self, method, uri), fields(method = %method, uri = %uri))]
    pub fn dispatch(&self, method: HttpMethod, uri: &str) -> RouterResult<MatchResult> {
        self.dispatch_inner(Some(method), method.as_str(), uri)
    }

    /// Like [`Dispatcher::dispatch`] for a raw method token. Methods outside
    /// [`HttpMethod`] never match an entry.
    pub fn dispatch_str(&self, method: &str, uri: &str) -> RouterResult<MatchResult> {
        self.dispatch_inner(method.parse().ok(), method, uri)
    }

    fn dispatch_inner(
        &self,
        method: Option<HttpMethod>,
        label: &str,
        uri: &str,
    ) -> RouterResult<MatchResult> {
        set_current_route(None);
        let compiled = self.compiled()?;
        let path = split_path(uri, &self.path_options);

        let result = match compiled.resolve(method, &path) {
            Resolution::Found { entry, params } => MatchResult::Found {
                route: entry.route.clone(),
                params,
            },
            Resolution::MethodNotAllowed(allowed) => MatchResult::MethodNotAllowed { allowed },
            Resolution::NotFound => MatchResult::NotFound,
        };

        if let MatchResult::Found { route, .. } = &result {
            set_current_route(Some(route.clone()));
        }
        if self.options.debug {
            event!(Level::DEBUG, method = %label, uri = %uri, outcome = ?result, "dispatch");
        }
        Ok(result)
    }

    /// Forces the build so the first request does not pay for it.
    pub fn warm(&self) -> RouterResult<()> {
        self.compiled().map(|_| ())
    }

    pub fn is_compiled(&self) -> bool {
        matches!(self.compiled.get(), Some(Ok(_)))
    }

    /// Shared handle to the compiled artifact, building it if needed.
    pub fn artifact(&self) -> RouterResult<Arc<CompiledDispatcher>> {
        self.compiled().map(Arc::clone)
    }

    // concurrent first callers block inside `get_or_init` until the single
    // build finishes
    fn compiled(&self) -> RouterResult<&Arc<CompiledDispatcher>> {
        self.compiled
            .get_or_init(|| self.load_or_build().map(Arc::new))
            .as_ref()
            .map_err(RouterError::clone)
    }

    fn load_or_build(&self) -> RouterResult<CompiledDispatcher> {
        if let Some(store) = &self.store {
            if let Some(loaded) = self.load_stored(store.as_ref()) {
                self.cache_stats.record_hit();
                event!(Level::DEBUG, key = %self.key, "dispatch program loaded from store");
                return Ok(loaded);
            }
            self.cache_stats.record_miss();
        }

        let compiled = self.build_pipeline().inspect_err(|err| {
            event!(Level::ERROR, key = %self.key, error = %err, "route compilation failed");
        })?;

        if let Some(store) = &self.store {
            self.persist(store.as_ref(), compiled.program());
        }
        Ok(compiled)
    }

    fn persist(&self, store: &dyn ArtifactStore, program: &DispatchProgram) {
        let json = match program.to_json() {
            Ok(json) => json,
            Err(err) => {
                event!(Level::WARN, key = %self.key, error = %err, "failed to encode dispatch program");
                return;
            }
        };
        if let Err(err) = store.store(&self.key, &json) {
            event!(Level::WARN, key = %self.key, error = %err, "failed to persist dispatch program");
        }
    }

    fn load_stored(&self, store: &dyn ArtifactStore) -> Option<CompiledDispatcher> {
        let data = match store.load(&self.key) {
            Ok(Some(data)) => data,
            Ok(None) => return None,
            Err(err) => {
                event!(Level::WARN, key = %self.key, error = %err, "artifact store unavailable");
                return None;
            }
        };
        match DispatchProgram::from_json(&data).and_then(CompiledDispatcher::from_program) {
            Ok(compiled) => Some(compiled),
            Err(err) => {
                self.cache_stats.record_rejected();
                event!(Level::WARN, key = %self.key, error = %err, "stored dispatch program rejected; rebuilding");
                None
            }
        }
    }

    fn build_pipeline(&self) -> RouterResult<CompiledDispatcher> {
        self.builds.fetch_add(1, Ordering::Relaxed);
        let tree = build(&self.routes, &self.options.build_options())?;
        let tree = if self.options.optimize { optimize(tree) } else { tree };
        let compiled = CompiledDispatcher::from_program(compile(&tree))?;
        event!(Level::DEBUG, key = %self.key, routes = self.routes.len(), "dispatch program built");
        Ok(compiled)
    }

    /// Drops the stored artifact for this route set. Returns whether one
    /// existed.
    pub fn invalidate_artifact(&self) -> RouterResult<bool> {
        match &self.store {
            Some(store) => Ok(store.remove(&self.key)?),
            None => Ok(false),
        }
    }

    /// Times the parse/build/optimize/compile pipeline has run.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    pub fn fingerprint(&self) -> &str {
        &self.key
    }

    pub fn cache_stats(&self) -> &CacheStats {
        &self.cache_stats
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn options(&self) -> &DispatcherOptions {
        &self.options
    }

    /// See [`crate::dispatcher::current_route_identifier`].
    pub fn current_route_identifier(&self) -> Option<RouteId> {
        current_route_identifier()
    }
}
