use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;

use crate::router::{Context, HandlerError};

/// Pointer prefix for named definitions in the published document.
pub const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Types that are published as `type: string` with the type name as format.
pub const TEMPORAL_TYPES: [&str; 3] = ["date", "datetime", "time"];

/// Build a `$ref` pointer object for a named definition.
#[must_use]
pub fn definition_ref(name: &str) -> Value {
    json!({ "$ref": format!("{DEFINITIONS_PREFIX}{name}") })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParameterLocation {
    Path,
    #[default]
    Query,
    Header,
    Cookie,
    Body,
    FormData,
}

impl ParameterLocation {
    /// Name used in the `in` field of a published parameter
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Path => "path",
            ParameterLocation::Query => "query",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
            ParameterLocation::Body => "body",
            ParameterLocation::FormData => "formData",
        }
    }
}

impl fmt::Display for ParameterLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A schema given either by definition name or inline.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaSource {
    Named(String),
    Inline(Value),
}

impl SchemaSource {
    /// `$ref` pointer for named schemas, the schema itself for inline ones
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self {
            SchemaSource::Named(name) => definition_ref(name),
            SchemaSource::Inline(schema) => schema.clone(),
        }
    }
}

/// Parameter descriptor passed to [`RouteSpec::params`](super::RouteSpec::params).
#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub name: String,
    pub location: ParameterLocation,
    pub description: Option<String>,
    pub required: bool,
    pub ty: Option<String>,
    pub format: Option<String>,
    pub schema: Option<SchemaSource>,
}

impl Param {
    /// Query parameter of type `string`
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: ParameterLocation::Query,
            description: None,
            required: false,
            ty: None,
            format: None,
            schema: None,
        }
    }

    #[must_use]
    pub fn query(name: impl Into<String>) -> Self {
        Self::new(name)
    }

    #[must_use]
    pub fn path(name: impl Into<String>) -> Self {
        Self::new(name).location(ParameterLocation::Path)
    }

    #[must_use]
    pub fn body(name: impl Into<String>) -> Self {
        Self::new(name).location(ParameterLocation::Body)
    }

    #[must_use]
    pub fn header(name: impl Into<String>) -> Self {
        Self::new(name).location(ParameterLocation::Header)
    }

    #[must_use]
    pub fn location(mut self, location: ParameterLocation) -> Self {
        self.location = location;
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Declared type, e.g. `integer`, `array`, `date`
    #[must_use]
    pub fn ty(mut self, ty: impl Into<String>) -> Self {
        self.ty = Some(ty.into());
        self
    }

    #[must_use]
    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Reference a named definition
    #[must_use]
    pub fn schema_ref(mut self, name: impl Into<String>) -> Self {
        self.schema = Some(SchemaSource::Named(name.into()));
        self
    }

    /// Inline schema
    #[must_use]
    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = Some(SchemaSource::Inline(schema));
        self
    }

    /// Published form of this parameter.
    ///
    /// Path parameters are always required. A schema on an `array` parameter
    /// becomes its `items`; temporal types publish as plain strings.
    #[must_use]
    pub fn to_spec(&self) -> Value {
        let mut spec = Map::new();
        spec.insert("in".into(), Value::from(self.location.as_str()));
        spec.insert("name".into(), Value::from(self.name.as_str()));
        spec.insert(
            "description".into(),
            Value::from(self.description.as_deref().unwrap_or_default()),
        );
        spec.insert(
            "required".into(),
            Value::Bool(self.location == ParameterLocation::Path || self.required),
        );

        let ty = self.ty.as_deref();
        match &self.schema {
            Some(schema) if ty == Some("array") => {
                spec.insert("type".into(), Value::from("array"));
                spec.insert("items".into(), schema.to_value());
            }
            Some(schema) => {
                spec.insert("schema".into(), schema.to_value());
            }
            None => {
                let ty = match ty {
                    Some(t) if TEMPORAL_TYPES.contains(&t) => "string",
                    Some(t) => t,
                    None => "string",
                };
                spec.insert("type".into(), Value::from(ty));
            }
        }

        if let Some(format) = &self.format {
            spec.insert("format".into(), Value::from(format.as_str()));
        }
        Value::Object(spec)
    }
}

/// Maps a caught failure and the request context to the public error body.
pub type ShowFn = Arc<dyn Fn(&HandlerError, &Context) -> Value + Send + Sync>;

/// One catch predicate of an error rule.
#[derive(Clone)]
pub enum CatchRule {
    /// Matches failures whose name starts with the given string
    NamePrefix(String),
    /// Matches failures the function accepts
    Predicate(Arc<dyn Fn(&HandlerError) -> bool + Send + Sync>),
}

impl CatchRule {
    #[must_use]
    pub fn name(prefix: impl Into<String>) -> Self {
        CatchRule::NamePrefix(prefix.into())
    }

    #[must_use]
    pub fn when<F>(predicate: F) -> Self
    where
        F: Fn(&HandlerError) -> bool + Send + Sync + 'static,
    {
        CatchRule::Predicate(Arc::new(predicate))
    }

    #[must_use]
    pub fn matches(&self, err: &HandlerError) -> bool {
        match self {
            CatchRule::NamePrefix(prefix) => err.name.starts_with(prefix.as_str()),
            CatchRule::Predicate(predicate) => predicate(err),
        }
    }
}

impl fmt::Debug for CatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatchRule::NamePrefix(prefix) => f.debug_tuple("NamePrefix").field(prefix).finish(),
            CatchRule::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

impl From<&str> for CatchRule {
    fn from(prefix: &str) -> Self {
        CatchRule::NamePrefix(prefix.to_string())
    }
}

/// Response descriptor passed to `on_success` / `on_error`.
///
/// The status defaults to 200 for success responses and 400 for error ones.
/// `show` and `catch` only matter for error responses.
#[derive(Clone, Default)]
pub struct Response {
    pub(crate) status: Option<u16>,
    pub(crate) name: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) schema: Option<SchemaSource>,
    pub(crate) items: Option<String>,
    pub(crate) show: Option<ShowFn>,
    pub(crate) catch: Vec<CatchRule>,
}

impl Response {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Error name; also the definition name when an inline schema is given
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Reference a named definition
    #[must_use]
    pub fn schema_ref(mut self, name: impl Into<String>) -> Self {
        self.schema = Some(SchemaSource::Named(name.into()));
        self
    }

    /// Inline schema, registered as a definition when the response has a name
    #[must_use]
    pub fn schema(mut self, schema: Value) -> Self {
        self.schema = Some(SchemaSource::Inline(schema));
        self
    }

    /// Array of references to a named definition
    #[must_use]
    pub fn items(mut self, name: impl Into<String>) -> Self {
        self.items = Some(name.into());
        self
    }

    #[must_use]
    pub fn show<F>(mut self, show: F) -> Self
    where
        F: Fn(&HandlerError, &Context) -> Value + Send + Sync + 'static,
    {
        self.show = Some(Arc::new(show));
        self
    }

    /// Append a catch predicate
    #[must_use]
    pub fn catch(mut self, rule: impl Into<CatchRule>) -> Self {
        self.catch.push(rule.into());
        self
    }

    /// Append a name-prefix catch predicate
    #[must_use]
    pub fn catch_name(self, prefix: impl Into<String>) -> Self {
        self.catch(CatchRule::name(prefix))
    }

    /// Append a function catch predicate
    #[must_use]
    pub fn catch_when<F>(self, predicate: F) -> Self
    where
        F: Fn(&HandlerError) -> bool + Send + Sync + 'static,
    {
        self.catch(CatchRule::when(predicate))
    }

    /// Error name, if one was declared
    #[must_use]
    pub fn response_name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

impl fmt::Debug for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Response")
            .field("status", &self.status)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("schema", &self.schema)
            .field("items", &self.items)
            .field("catch", &self.catch)
            .finish_non_exhaustive()
    }
}

/// A declared error response as seen by the dispatch wrapper.
#[derive(Clone)]
pub struct ErrorRule {
    pub status: u16,
    pub name: Option<String>,
    pub show: ShowFn,
    pub catch: Vec<CatchRule>,
}

impl fmt::Debug for ErrorRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ErrorRule")
            .field("status", &self.status)
            .field("name", &self.name)
            .field("catch", &self.catch)
            .finish_non_exhaustive()
    }
}
