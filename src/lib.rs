//! # specrouter
//!
//! **specrouter** is a route registry that documents itself. Every handler
//! registered on a [`Router`] also produces an operation in a Swagger 2.0
//! document, and the declarations that shape that document (success statuses,
//! error responses, catch rules) are the same ones used at dispatch time.
//!
//! ## Overview
//!
//! - Path templates (`/things/:id`) are compiled into anchored matchers.
//! - Routers compose: a fully configured router can be mounted under a prefix.
//! - A resolved route is a [`Service`]: the handler wrapped with success-status
//!   normalization and an ordered, first-match-wins error classification.
//! - Informal schema shorthand is normalized into JSON-Schema-shaped
//!   definitions, with unknown keys kept as `x-` extensions.
//! - Every router serves its own document at `/spec`.
//!
//! Sockets, body parsing and response encoding belong to the transport that
//! embeds the router; it calls [`Router::find_service`], invokes the service and
//! turns the resulting [`DispatchState`] into a response.
//!
//! ## Architecture
//!
//! - **[`router`]** - Pattern compilation, registration, mounting, dispatch
//! - **[`spec`]** - Route specifications, schema normalization, the published document
//! - **[`errors`]** - Catalog of reusable error responses
//! - **[`config`]** - Static document configuration (info, schemes, security)
//! - **[`logging`]** - `tracing-subscriber` setup driven by environment variables
//! - **[`cli`]** - The `specrouter` command-line tool
//!
//! ## Example
//!
//! ```rust
//! use futures::executor::block_on;
//! use http::Method;
//! use serde_json::json;
//! use specrouter::errors::ErrorCatalog;
//! use specrouter::spec::{Param, Response};
//! use specrouter::{DispatchState, HandlerError, Router};
//!
//! let catalog = ErrorCatalog::builtin();
//! let mut router = Router::new();
//! router.add_definition("Person", &json!({
//!     "properties": { "name": { "type": "string", "required": true } }
//! }));
//!
//! router
//!     .get("/people/:id", |ctx, _state| {
//!         Box::pin(async move {
//!             let id = ctx.get_param("id").unwrap_or_default();
//!             if id == "0" {
//!                 return Err(HandlerError::assertion("id must not be zero"));
//!             }
//!             Ok(Some(json!({ "name": format!("person {id}") })))
//!         })
//!     })
//!     .expect("route")
//!     .params([Param::path("id").ty("integer")])
//!     .on_success([Response::new().schema_ref("Person")])
//!     .on_error(catalog.get("AssertionError"));
//!
//! let matched = router.find_service(&Method::GET, "/people/0").expect("match");
//! let mut state = DispatchState::new();
//! block_on(matched.service.call(&matched.context(), &mut state));
//! assert_eq!(state.status, Some(400));
//! assert_eq!(
//!     state.error,
//!     Some(json!({ "name": "AssertionError", "message": "id must not be zero" }))
//! );
//! ```

pub mod cli;
pub mod config;
pub mod errors;
pub mod logging;
pub mod router;
pub mod spec;

pub use config::DocumentConfig;
pub use router::{
    Context, DispatchState, HandlerError, HandlerResult, RegistrationError, RouteMatch, Router,
    Service,
};
pub use spec::{Param, ParameterLocation, Response, RouteSpec, SpecDocument};
