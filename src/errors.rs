//! # Error Catalog
//!
//! Declarative list of known error kinds. Each entry is an error [`Response`]
//! carrying a schema, catch predicates and a show function, ready to pass to
//! [`RouteSpec::on_error`](crate::spec::RouteSpec::on_error):
//!
//! ```rust
//! use specrouter::errors::ErrorCatalog;
//! use specrouter::router::Router;
//!
//! let mut router = Router::new();
//! let catalog = ErrorCatalog::builtin();
//! router
//!     .get("/things", |_ctx, _state| Box::pin(async { Ok(None) }))
//!     .expect("route")
//!     .on_error(catalog.get("AssertionError"));
//! ```
//!
//! Entries are looked up by name. Because error responses with an inline
//! schema and a name register that schema as a definition, using a catalog
//! entry also publishes its schema.

use serde_json::{json, Value};
use tracing::debug;

use crate::spec::Response;

/// Name of the built-in assertion failure kind.
pub const ASSERTION_ERROR: &str = "AssertionError";

/// Schema published for [`ASSERTION_ERROR`].
#[must_use]
pub fn assertion_schema() -> Value {
    json!({
        "properties": {
            "name": { "type": "string" },
            "message": { "type": "string" }
        }
    })
}

/// Error response for failed assertions: `{name, message}` body, default 400.
#[must_use]
pub fn assertion() -> Response {
    Response::new()
        .name(ASSERTION_ERROR)
        .schema(assertion_schema())
        .catch_name(ASSERTION_ERROR)
        .show(|err, _ctx| {
            json!({
                "name": ASSERTION_ERROR,
                "message": err.message
            })
        })
}

/// Named collection of error responses.
#[derive(Debug, Clone, Default)]
pub struct ErrorCatalog {
    entries: Vec<Response>,
}

impl ErrorCatalog {
    /// Catalog with no entries
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Catalog with the built-in entries
    #[must_use]
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        catalog.register(assertion());
        catalog
    }

    /// Add or replace an entry; responses without a name are ignored.
    pub fn register(&mut self, response: Response) -> &mut Self {
        let Some(name) = response.response_name().map(str::to_string) else {
            debug!("Ignoring unnamed catalog entry");
            return self;
        };
        self.entries
            .retain(|entry| entry.response_name() != Some(name.as_str()));
        self.entries.push(response);
        self
    }

    /// Entry registered under `name`
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Response> {
        self.entries
            .iter()
            .find(|entry| entry.response_name() == Some(name))
            .cloned()
    }

    /// Entries for each of `names`, in that order, skipping unknown names
    #[must_use]
    pub fn select(&self, names: &[&str]) -> Vec<Response> {
        names.iter().filter_map(|name| self.get(name)).collect()
    }

    /// Registered names in registration order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter_map(Response::response_name)
            .collect()
    }
}
