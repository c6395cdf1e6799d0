//! Wrapped handlers and the data they exchange with the transport.
//!
//! A [`Service`] is what [`Router::find_service`](super::Router::find_service)
//! hands back. The transport builds a [`Context`], calls the service with a
//! fresh [`DispatchState`], and turns `state.status` / `state.error` / the
//! returned value into a response.

use futures::future::BoxFuture;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use super::pattern::{ParamVec, PathPattern};
use crate::spec::RouteSpec;

/// Status assigned when a handler returns a value and no success status is declared.
pub const DEFAULT_SUCCESS_STATUS: u16 = 200;

/// Status assigned to a failure that carries none and matches no error rule.
pub const DEFAULT_ERROR_STATUS: u16 = 500;

/// Parsed query string. Repeated keys keep the last value.
pub type QueryMap = HashMap<String, String>;

/// What a handler produces: `Ok(None)` leaves the status untouched.
pub type HandlerResult = Result<Option<Value>, HandlerError>;

/// A registered handler.
///
/// Handlers borrow the request context and the mutable state for the duration
/// of the returned future; the wrapped service awaits it exactly once.
pub type HandlerFn = Arc<
    dyn for<'a> Fn(&'a Context, &'a mut DispatchState) -> BoxFuture<'a, HandlerResult>
        + Send
        + Sync,
>;

/// Request data handed to handlers and show functions.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Parsed request body, if any
    pub body: Option<Value>,
    /// Query string parameters
    pub query: QueryMap,
    /// Path captures in template order
    pub params: ParamVec,
    /// Free-form values the transport wants to pass through
    pub locals: Map<String, Value>,
}

impl Context {
    /// Empty context: no body, empty query
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context seeded with the params and query of a route match
    #[must_use]
    pub fn from_match(matched: &RouteMatch) -> Self {
        Self {
            body: None,
            query: matched.query.clone(),
            params: matched.params.clone(),
            locals: Map::new(),
        }
    }

    /// Attach a request body
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Get a path parameter by name
    #[inline]
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name
    #[inline]
    #[must_use]
    pub fn get_query(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }
}

/// Mutable sink the transport inspects after a service call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchState {
    /// HTTP status chosen by the handler or by post-processing
    pub status: Option<u16>,
    /// Public error body, set when the handler failed
    pub error: Option<Value>,
    /// Free-form values shared between the transport and the handler
    pub locals: Map<String, Value>,
}

impl DispatchState {
    /// Empty state: no status, no error
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// A failure raised by a handler.
///
/// `name` is what string catch rules match against (by prefix). `status`, when
/// set, is used if no error rule claims the failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerError {
    /// Error kind, e.g. `AssertionError`
    pub name: String,
    /// Human readable message
    pub message: String,
    /// Status carried by the failure itself
    pub status: Option<u16>,
    /// Diagnostic trace captured where the failure was raised
    pub stack: Option<String>,
}

impl HandlerError {
    /// Create a failure of the given kind
    #[must_use]
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
            status: None,
            stack: None,
        }
    }

    /// An `AssertionError` failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::new(crate::errors::ASSERTION_ERROR, message)
    }

    /// Fail with an `AssertionError` unless `condition` holds
    ///
    /// # Errors
    ///
    /// Returns the assertion failure when `condition` is false.
    pub fn ensure(condition: bool, message: impl Into<String>) -> Result<(), Self> {
        if condition {
            Ok(())
        } else {
            Err(Self::assertion(message))
        }
    }

    /// Attach a status used when no error rule matches
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Attach a diagnostic trace
    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.stack = Some(stack.into());
        self
    }

    /// The unclassified error body: `{message, stack}`
    #[must_use]
    pub fn default_body(&self) -> Value {
        json!({
            "message": self.message,
            "stack": self.stack,
        })
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.message)
    }
}

impl std::error::Error for HandlerError {}

impl From<anyhow::Error> for HandlerError {
    fn from(err: anyhow::Error) -> Self {
        Self {
            name: "Error".to_string(),
            message: err.to_string(),
            status: None,
            stack: Some(format!("{err:?}")),
        }
    }
}

pub(crate) struct RouteEntry {
    pub(crate) pattern: PathPattern,
    pub(crate) handler: HandlerFn,
    pub(crate) spec: RouteSpec,
}

/// A handler wrapped with success-status normalization and error classification.
#[derive(Clone)]
pub struct Service {
    entry: Arc<RouteEntry>,
}

impl fmt::Debug for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Service")
            .field("template", &self.entry.pattern.template())
            .finish_non_exhaustive()
    }
}

impl Service {
    pub(crate) fn new(entry: Arc<RouteEntry>) -> Self {
        Self { entry }
    }

    /// Specification of the route this service belongs to
    #[must_use]
    pub fn spec(&self) -> &RouteSpec {
        &self.entry.spec
    }

    /// Invoke the handler and post-process its outcome into `state`.
    ///
    /// - A returned value keeps `state.status` only if it is one of the route's
    ///   declared success statuses; otherwise the first declared one is used.
    /// - `Ok(None)` leaves `state` as the handler left it.
    /// - A failure sets `{message, stack}` with the failure's status (or 500), then
    ///   the route's error rules are walked in declaration order, predicates in
    ///   order within each rule, and the first match decides status and body.
    ///
    /// Expected failures never escape; a panic inside a show function does.
    pub async fn call(&self, ctx: &Context, state: &mut DispatchState) -> Option<Value> {
        let outcome = (self.entry.handler)(ctx, state).await;
        match outcome {
            Ok(Some(value)) => {
                let statuses = self.entry.spec.success_statuses();
                let declared = state.status.is_some_and(|status| statuses.contains(&status));
                if !declared {
                    state.status = Some(
                        statuses
                            .first()
                            .copied()
                            .unwrap_or(DEFAULT_SUCCESS_STATUS),
                    );
                }
                Some(value)
            }
            Ok(None) => None,
            Err(err) => {
                self.classify_failure(&err, ctx, state);
                None
            }
        }
    }

    fn classify_failure(&self, err: &HandlerError, ctx: &Context, state: &mut DispatchState) {
        state.status = Some(err.status.unwrap_or(DEFAULT_ERROR_STATUS));
        state.error = Some(err.default_body());

        for rule in self.entry.spec.errors() {
            if rule.catch.iter().any(|catch| catch.matches(err)) {
                debug!(
                    template = %self.entry.pattern.template(),
                    error_name = %err.name,
                    status = rule.status,
                    rule = ?rule.name,
                    "Handler failure caught by error rule"
                );
                state.status = Some(rule.status);
                state.error = Some((rule.show)(err, ctx));
                return;
            }
        }

        warn!(
            template = %self.entry.pattern.template(),
            error_name = %err.name,
            error_message = %err.message,
            status = ?state.status,
            "Handler failure matched no error rule"
        );
    }
}

/// Result of resolving a request path to a service.
#[derive(Debug, Clone)]
pub struct RouteMatch {
    /// Path captures in template order
    pub params: ParamVec,
    /// Parsed query string (empty when the path has none)
    pub query: QueryMap,
    /// The wrapped handler
    pub service: Service,
}

impl RouteMatch {
    /// Get a path parameter by name
    ///
    /// Uses "last write wins" semantics, matching [`Context::get_param`].
    #[inline]
    #[must_use]
    pub fn get_path_param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// Get a query parameter by name
    #[inline]
    #[must_use]
    pub fn get_query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// Convert params to a HashMap
    /// Note: This allocates - use get_path_param() where possible
    #[must_use]
    pub fn params_map(&self) -> HashMap<String, String> {
        self.params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// Build a [`Context`] carrying this match's params and query
    #[must_use]
    pub fn context(&self) -> Context {
        Context::from_match(self)
    }
}

/// Split `path` at the first `?` and parse the remainder as a query string.
///
/// Names and values are form-urlencoded decoded. A path without `?` yields an
/// empty map.
#[must_use]
pub fn split_query(path: &str) -> (&str, QueryMap) {
    match path.find('?') {
        Some(pos) => {
            let query = url::form_urlencoded::parse(path[pos + 1..].as_bytes())
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            (&path[..pos], query)
        }
        None => (path, QueryMap::new()),
    }
}
