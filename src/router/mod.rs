//! # Router Module
//!
//! The router module registers handlers against path templates, composes
//! routers under mount prefixes, and resolves incoming requests to wrapped
//! handlers ready to call.
//!
//! ## Overview
//!
//! The router is responsible for:
//! - Compiling path templates (`/things/:id`) into anchored matchers
//! - Documenting every registration into the router's [`SpecDocument`](crate::spec::SpecDocument)
//! - Matching incoming paths, extracting path parameters and the query string
//! - Wrapping handlers with success-status normalization and error classification
//!
//! ## Architecture
//!
//! 1. **Registration**: `router.get("/things/:id", handler)` validates and
//!    compiles the template, reserves the `(path, method)` slot in the document
//!    and returns a [`RouteSpec`](crate::spec::RouteSpec) for fluent overrides.
//!
//! 2. **Resolution**: [`Router::find_service`] tries the router's own routes in
//!    registration order, then each mounted router with its prefix stripped.
//!
//! 3. **Invocation**: the transport calls [`Service::call`] with a [`Context`]
//!    and a fresh [`DispatchState`], then turns the state into a response.
//!
//! ## Example
//!
//! ```rust
//! use futures::executor::block_on;
//! use http::Method;
//! use serde_json::json;
//! use specrouter::router::{DispatchState, Router};
//!
//! let mut router = Router::new();
//! router
//!     .get("/things/:id", |ctx, _state| {
//!         Box::pin(async move { Ok(Some(json!({ "id": ctx.get_param("id") }))) })
//!     })
//!     .expect("route");
//!
//! let matched = router
//!     .find_service(&Method::GET, "/things/42?verbose=1")
//!     .expect("match");
//! let mut state = DispatchState::new();
//! let body = block_on(matched.service.call(&matched.context(), &mut state));
//! assert_eq!(body, Some(json!({ "id": "42" })));
//! assert_eq!(state.status, Some(200));
//! ```

mod core;
mod error;
mod pattern;
mod service;

pub use core::{Router, DEFINITION_QUERY, SPEC_ROUTE};
pub use error::RegistrationError;
pub use pattern::{to_openapi_path, ParamVec, PathPattern, MAX_INLINE_PARAMS};
pub use service::{
    split_query, Context, DispatchState, HandlerError, HandlerFn, HandlerResult, QueryMap,
    RouteMatch, Service, DEFAULT_ERROR_STATUS, DEFAULT_SUCCESS_STATUS,
};
