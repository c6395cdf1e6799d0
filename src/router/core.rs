//! Router core: registration, mounting and dispatch resolution.

use futures::future::BoxFuture;
use http::Method;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::error::RegistrationError;
use super::pattern::PathPattern;
use super::service::{
    split_query, Context, DispatchState, HandlerResult, RouteEntry, RouteMatch, Service,
};
use crate::config::DocumentConfig;
use crate::spec::{Param, Response, RouteSpec, SpecDocument};

/// Path of the built-in specification route.
pub const SPEC_ROUTE: &str = "/spec";

/// Query parameter selecting a single definition on the specification route.
pub const DEFINITION_QUERY: &str = "definition";

#[derive(Clone)]
struct MountEntry {
    prefix: String,
    router: Router,
}

/// Route registry and dispatch resolver.
///
/// Routes are registered per HTTP method and tried in registration order.
/// Every router documents its routes into its own [`SpecDocument`] and serves
/// that document at `/spec`. Other routers can be mounted under a prefix; their
/// routes (including their own `/spec`) become reachable below it.
///
/// Registration is expected to finish before dispatch starts. Cloning a router
/// shares its document and registered handlers.
#[derive(Clone)]
pub struct Router {
    document: Arc<RwLock<SpecDocument>>,
    routes: HashMap<Method, Vec<Arc<RouteEntry>>>,
    mounted: Vec<MountEntry>,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mounts: Vec<&str> = self.mounted.iter().map(|m| m.prefix.as_str()).collect();
        f.debug_struct("Router")
            .field("routes", &self.route_count())
            .field("mounted", &mounts)
            .finish_non_exhaustive()
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    /// Create a router documenting into a default [`SpecDocument`].
    #[must_use]
    pub fn new() -> Self {
        let mut router = Self::empty(SpecDocument::default());
        if let Err(err) = router.register_spec_route() {
            error!(error = %err, "Failed to register specification route");
        }
        router
    }

    /// Create a router whose document is built from `config`.
    ///
    /// # Errors
    ///
    /// Fails when the configuration already seeds a `get` operation at `/spec`.
    pub fn with_config(config: DocumentConfig) -> Result<Self, RegistrationError> {
        let mut router = Self::empty(SpecDocument::new(&config));
        router.register_spec_route()?;
        Ok(router)
    }

    fn empty(document: SpecDocument) -> Self {
        Self {
            document: Arc::new(RwLock::new(document)),
            routes: HashMap::new(),
            mounted: Vec::new(),
        }
    }

    /// Register `handler` for `method` requests matching `path`.
    ///
    /// The template must start with a non-empty segment (`/things`,
    /// `/things/:id`). Captures are written `:name` or `{name}`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError`] for a malformed template or when the
    /// `(path, method)` pair is already registered. Nothing is recorded on error.
    pub fn route<F>(
        &mut self,
        method: Method,
        path: &str,
        handler: F,
    ) -> Result<RouteSpec, RegistrationError>
    where
        F: for<'a> Fn(&'a Context, &'a mut DispatchState) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        let segment = first_segment(path).ok_or_else(|| RegistrationError::InvalidPath {
            path: path.to_string(),
            reason: "missing leading segment".to_string(),
        })?;
        let pattern = PathPattern::compile(path)?;
        let method_key = method.as_str().to_ascii_lowercase();
        let published = self.document.write().add_method(path, &method_key)?;

        let spec = RouteSpec::new(
            Arc::clone(&self.document),
            published.clone(),
            method_key,
            segment,
        );
        let entry = Arc::new(RouteEntry {
            pattern,
            handler: Arc::new(handler),
            spec: spec.clone(),
        });
        self.routes.entry(method.clone()).or_default().push(entry);

        info!(
            method = %method,
            path = %path,
            published = %published,
            "Route registered"
        );
        Ok(spec)
    }

    /// Register a `GET` route. See [`Router::route`].
    ///
    /// # Errors
    ///
    /// See [`Router::route`].
    pub fn get<F>(&mut self, path: &str, handler: F) -> Result<RouteSpec, RegistrationError>
    where
        F: for<'a> Fn(&'a Context, &'a mut DispatchState) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::GET, path, handler)
    }

    /// Register a `POST` route. See [`Router::route`].
    ///
    /// # Errors
    ///
    /// See [`Router::route`].
    pub fn post<F>(&mut self, path: &str, handler: F) -> Result<RouteSpec, RegistrationError>
    where
        F: for<'a> Fn(&'a Context, &'a mut DispatchState) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::POST, path, handler)
    }

    /// Register a `PUT` route. See [`Router::route`].
    ///
    /// # Errors
    ///
    /// See [`Router::route`].
    pub fn put<F>(&mut self, path: &str, handler: F) -> Result<RouteSpec, RegistrationError>
    where
        F: for<'a> Fn(&'a Context, &'a mut DispatchState) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::PUT, path, handler)
    }

    /// Register a `DELETE` route. See [`Router::route`].
    ///
    /// # Errors
    ///
    /// See [`Router::route`].
    pub fn delete<F>(&mut self, path: &str, handler: F) -> Result<RouteSpec, RegistrationError>
    where
        F: for<'a> Fn(&'a Context, &'a mut DispatchState) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::DELETE, path, handler)
    }

    /// Register a `PATCH` route. See [`Router::route`].
    ///
    /// # Errors
    ///
    /// See [`Router::route`].
    pub fn patch<F>(&mut self, path: &str, handler: F) -> Result<RouteSpec, RegistrationError>
    where
        F: for<'a> Fn(&'a Context, &'a mut DispatchState) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::PATCH, path, handler)
    }

    /// Register a `HEAD` route. See [`Router::route`].
    ///
    /// # Errors
    ///
    /// See [`Router::route`].
    pub fn head<F>(&mut self, path: &str, handler: F) -> Result<RouteSpec, RegistrationError>
    where
        F: for<'a> Fn(&'a Context, &'a mut DispatchState) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::HEAD, path, handler)
    }

    /// Register an `OPTIONS` route. See [`Router::route`].
    ///
    /// # Errors
    ///
    /// See [`Router::route`].
    pub fn options<F>(&mut self, path: &str, handler: F) -> Result<RouteSpec, RegistrationError>
    where
        F: for<'a> Fn(&'a Context, &'a mut DispatchState) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::OPTIONS, path, handler)
    }

    /// Register a `TRACE` route. See [`Router::route`].
    ///
    /// # Errors
    ///
    /// See [`Router::route`].
    pub fn trace<F>(&mut self, path: &str, handler: F) -> Result<RouteSpec, RegistrationError>
    where
        F: for<'a> Fn(&'a Context, &'a mut DispatchState) -> BoxFuture<'a, HandlerResult>
            + Send
            + Sync
            + 'static,
    {
        self.route(Method::TRACE, path, handler)
    }

    /// Mount `router` under `prefix`.
    ///
    /// The prefix is normalized to start and end with `/`, so `"test"`,
    /// `"/test"` and `"/test/"` are equivalent. Mounts are tried in mount order
    /// after this router's own routes.
    pub fn mount(&mut self, prefix: &str, router: Router) {
        let trimmed = prefix.trim_matches('/');
        let prefix = if trimmed.is_empty() {
            "/".to_string()
        } else {
            format!("/{trimmed}/")
        };
        info!(prefix = %prefix, routes = router.route_count(), "Router mounted");
        self.mounted.push(MountEntry { prefix, router });
    }

    /// Resolve `path` (optionally carrying a query string) to a service.
    ///
    /// This router's routes for `method` are tried first, in registration order,
    /// then each mounted router with its prefix stripped. The first matching
    /// route wins. `None` means no route matched; producing a 404 is up to the
    /// caller.
    #[must_use]
    pub fn find_service(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let found = self.resolve(method, path);
        if found.is_none() {
            warn!(method = %method, path = %path, "No route matched");
        }
        found
    }

    fn resolve(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        if path.starts_with('/') {
            if let Some(found) = self.match_local(method, path) {
                return Some(found);
            }
        }
        for mount in &self.mounted {
            if path.starts_with(mount.prefix.as_str()) {
                // keep the leading slash of the remainder
                let remainder = &path[mount.prefix.len() - 1..];
                debug!(prefix = %mount.prefix, remainder = %remainder, "Trying mounted router");
                if let Some(found) = mount.router.resolve(method, remainder) {
                    return Some(found);
                }
            }
        }
        None
    }

    fn match_local(&self, method: &Method, path: &str) -> Option<RouteMatch> {
        let entries = self.routes.get(method)?;
        let (base, query) = split_query(path);
        for entry in entries {
            debug!(
                method = %method,
                path = %base,
                template = %entry.pattern.template(),
                "Trying route"
            );
            if let Some(params) = entry.pattern.captures(base) {
                return Some(RouteMatch {
                    params,
                    query,
                    service: Service::new(Arc::clone(entry)),
                });
            }
        }
        None
    }

    /// Normalize `schema` and publish it under `name`.
    pub fn add_definition(&self, name: &str, schema: &Value) {
        self.document.write().add_definition(name, schema);
    }

    /// Set the published `basePath`.
    pub fn set_base_path(&self, base_path: impl Into<String>) {
        self.document.write().set_base_path(base_path);
    }

    /// Snapshot of the full published document.
    #[must_use]
    pub fn spec(&self) -> Value {
        self.document.read().get()
    }

    /// Copy of one published definition.
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<Value> {
        self.document.read().definition(name).cloned()
    }

    /// Number of routes registered directly on this router.
    #[must_use]
    pub fn route_count(&self) -> usize {
        self.routes.values().map(Vec::len).sum()
    }

    fn register_spec_route(&mut self) -> Result<(), RegistrationError> {
        let document = Arc::clone(&self.document);
        self.get(SPEC_ROUTE, move |ctx, _state| {
            let result = {
                let document = document.read();
                match ctx.get_query(DEFINITION_QUERY).filter(|name| !name.is_empty()) {
                    Some(name) => document.definition(name).cloned(),
                    None => Some(document.get()),
                }
            };
            Box::pin(async move { Ok(result) })
        })?
        .params([Param::query(DEFINITION_QUERY).description("Fetch only the requested definition")])
        .on_success([Response::new().description("A swagger specification or definition")]);
        Ok(())
    }
}

/// First non-empty segment of a template that starts with `/`.
fn first_segment(path: &str) -> Option<&str> {
    path.strip_prefix('/')?
        .split('/')
        .next()
        .filter(|segment| !segment.is_empty())
}
