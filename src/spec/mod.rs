//! # Spec Module
//!
//! Builds the published Swagger 2.0 document from route declarations.
//!
//! - [`SpecDocument`] owns the info block, security definitions, path table and
//!   named definitions.
//! - [`RouteSpec`] is the fluent handle returned by every route registration.
//! - [`normalize`] turns informal schema shorthand into JSON-Schema-shaped
//!   definitions when they are registered.
//! - [`Param`] and [`Response`] describe parameters and responses; [`CatchRule`]
//!   and [`ErrorRule`] describe how handler failures map to statuses.

mod document;
mod route;
mod schema;
mod types;

pub use document::SpecDocument;
pub use route::{RouteSpec, DEFAULT_SECURITY_SCHEME};
pub use schema::{normalize, EXTENSION_PREFIX};
pub use types::{
    definition_ref, CatchRule, ErrorRule, Param, ParameterLocation, Response, SchemaSource,
    ShowFn, DEFINITIONS_PREFIX, TEMPORAL_TYPES,
};
