//! Per-route specification builder.
//!
//! Every registration on a [`Router`](crate::router::Router) returns a
//! [`RouteSpec`]. It owns the documentation fragment for one `(path, method)`
//! pair, keeps the published document in sync on every change, and answers the
//! two questions the dispatch wrapper asks at call time: which statuses count as
//! success, and which error rules apply, in which order.

use parking_lot::RwLock;
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;

use super::document::SpecDocument;
use super::types::{
    definition_ref, CatchRule, ErrorRule, Param, ParameterLocation, Response, SchemaSource,
    ShowFn,
};

/// Security scheme referenced by every route until `security(...)` overrides it.
pub const DEFAULT_SECURITY_SCHEME: &str = "internalApiKey";

const DEFAULT_SUCCESS_STATUS: u16 = 200;
const DEFAULT_ERROR_STATUS: u16 = 400;

/// One entry of `on_success` / `on_error` after normalization.
#[derive(Clone)]
struct ResponseFragment {
    status: u16,
    name: Option<String>,
    spec: Value,
    show: Option<ShowFn>,
    catch: Vec<CatchRule>,
}

struct RouteSpecData {
    path: String,
    method: String,
    fragment: Map<String, Value>,
    on_success: Vec<ResponseFragment>,
    on_error: Vec<ResponseFragment>,
    body_requested: bool,
}

/// Fluent specification handle for one registered route.
///
/// Cloning is cheap and every clone refers to the same route. Configuration is
/// expected to finish before the router starts serving; the dispatch wrapper
/// reads the current state on every call, so late changes are still visible.
#[derive(Clone)]
pub struct RouteSpec {
    data: Arc<RwLock<RouteSpecData>>,
    document: Arc<RwLock<SpecDocument>>,
}

impl fmt::Debug for RouteSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.data.read();
        f.debug_struct("RouteSpec")
            .field("path", &data.path)
            .field("method", &data.method)
            .field("fragment", &data.fragment)
            .finish_non_exhaustive()
    }
}

// Setters publish as they go; callers may drop the returned handle.
#[allow(clippy::must_use_candidate)]
impl RouteSpec {
    /// Create the default documentation for a freshly reserved slot.
    ///
    /// `segment` is the first path segment; it becomes the tag and, with the
    /// method, the title-cased summary.
    pub(crate) fn new(
        document: Arc<RwLock<SpecDocument>>,
        path: String,
        method: String,
        segment: &str,
    ) -> Self {
        let on_success = vec![ResponseFragment {
            status: DEFAULT_SUCCESS_STATUS,
            name: None,
            spec: json!({ "description": "Success" }),
            show: None,
            catch: Vec::new(),
        }];
        let on_error = vec![ResponseFragment {
            status: DEFAULT_ERROR_STATUS,
            name: None,
            spec: json!({ "description": "Error" }),
            show: None,
            catch: Vec::new(),
        }];

        let mut fragment = Map::new();
        fragment.insert("tags".into(), json!([segment]));
        fragment.insert(
            "summary".into(),
            Value::String(title_case(&format!("{method} {segment}"))),
        );
        fragment.insert("description".into(), Value::from(""));
        fragment.insert("responses".into(), merge_responses(&on_success, &on_error));
        fragment.insert(
            "security".into(),
            json!([{ (DEFAULT_SECURITY_SCHEME): [] }]),
        );

        let spec = Self {
            data: Arc::new(RwLock::new(RouteSpecData {
                path,
                method,
                fragment,
                on_success,
                on_error,
                body_requested: false,
            })),
            document,
        };
        spec.publish(&spec.data.read());
        spec
    }

    /// Replace the tags
    pub fn tags<I, S>(self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tags: Vec<Value> = tags.into_iter().map(|t| Value::String(t.into())).collect();
        self.set_field("tags", Value::Array(tags))
    }

    pub fn summary(self, summary: impl Into<String>) -> Self {
        self.set_field("summary", Value::String(summary.into()))
    }

    pub fn description(self, description: impl Into<String>) -> Self {
        self.set_field("description", Value::String(description.into()))
    }

    /// Replace the security requirements, e.g. `json!([])` for a public route
    pub fn security(self, requirements: Value) -> Self {
        self.set_field("security", requirements)
    }

    /// Replace the parameter list
    pub fn params<I>(self, params: I) -> Self
    where
        I: IntoIterator<Item = Param>,
    {
        {
            let mut data = self.data.write();
            let params: Vec<Param> = params.into_iter().collect();
            data.body_requested = params
                .iter()
                .any(|p| p.location == ParameterLocation::Body);
            data.fragment.insert(
                "parameters".into(),
                Value::Array(params.iter().map(Param::to_spec).collect()),
            );
            self.publish(&data);
        }
        self
    }

    /// Replace the success responses (default: `200 Success`)
    pub fn on_success<I>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = Response>,
    {
        {
            let mut data = self.data.write();
            data.on_success = responses
                .into_iter()
                .map(|r| self.to_fragment(r, DEFAULT_SUCCESS_STATUS))
                .collect();
            let merged = merge_responses(&data.on_success, &data.on_error);
            data.fragment.insert("responses".into(), merged);
            self.publish(&data);
        }
        self
    }

    /// Replace the error responses (default: `400 Error`, catching nothing)
    pub fn on_error<I>(self, responses: I) -> Self
    where
        I: IntoIterator<Item = Response>,
    {
        {
            let mut data = self.data.write();
            data.on_error = responses
                .into_iter()
                .map(|r| self.to_fragment(r, DEFAULT_ERROR_STATUS))
                .collect();
            let merged = merge_responses(&data.on_success, &data.on_error);
            data.fragment.insert("responses".into(), merged);
            self.publish(&data);
        }
        self
    }

    /// Declared success statuses in declaration order
    #[must_use]
    pub fn success_statuses(&self) -> Vec<u16> {
        self.data.read().on_success.iter().map(|r| r.status).collect()
    }

    /// Declared error rules in declaration order
    #[must_use]
    pub fn errors(&self) -> Vec<ErrorRule> {
        self.data
            .read()
            .on_error
            .iter()
            .map(|r| ErrorRule {
                status: r.status,
                name: r.name.clone(),
                show: r.show.clone().unwrap_or_else(default_show),
                catch: r.catch.clone(),
            })
            .collect()
    }

    /// Whether any declared parameter is located in the body
    #[must_use]
    pub fn body_requested(&self) -> bool {
        self.data.read().body_requested
    }

    /// Published path (brace form)
    #[must_use]
    pub fn path(&self) -> String {
        self.data.read().path.clone()
    }

    /// Lowercase method
    #[must_use]
    pub fn method(&self) -> String {
        self.data.read().method.clone()
    }

    /// Current documentation fragment
    #[must_use]
    pub fn fragment(&self) -> Value {
        Value::Object(self.data.read().fragment.clone())
    }

    fn set_field(self, key: &str, value: Value) -> Self {
        {
            let mut data = self.data.write();
            data.fragment.insert(key.to_string(), value);
            self.publish(&data);
        }
        self
    }

    fn publish(&self, data: &RouteSpecData) {
        self.document.write().set_operation(
            &data.path,
            &data.method,
            Value::Object(data.fragment.clone()),
        );
    }

    /// Normalize one response descriptor.
    ///
    /// A string schema becomes a `$ref` and names the response. An inline schema
    /// with a name is registered as a definition and referenced; without a name
    /// it is embedded. `items` produces an array of references. Error responses
    /// get a show function and catch list; an empty catch list means "failures
    /// whose name starts with this response's name".
    fn to_fragment(&self, response: Response, default_status: u16) -> ResponseFragment {
        let Response {
            status,
            mut name,
            description,
            schema,
            items,
            show,
            catch,
        } = response;

        let mut spec = Map::new();
        match schema {
            Some(SchemaSource::Named(schema_name)) => {
                spec.insert("schema".into(), definition_ref(&schema_name));
                name.get_or_insert(schema_name);
            }
            Some(SchemaSource::Inline(schema)) => match &name {
                Some(definition) => {
                    self.document.write().add_definition(definition, &schema);
                    spec.insert("schema".into(), definition_ref(definition));
                }
                None => {
                    spec.insert("schema".into(), schema);
                }
            },
            None => {}
        }
        if let Some(items) = items {
            spec.insert(
                "schema".into(),
                json!({ "type": "array", "items": definition_ref(&items) }),
            );
        }
        let fallback = if default_status >= DEFAULT_ERROR_STATUS {
            "Error"
        } else {
            "Success"
        };
        spec.insert(
            "description".into(),
            Value::String(description.unwrap_or_else(|| fallback.to_string())),
        );

        let (show, catch) = if default_status >= DEFAULT_ERROR_STATUS {
            let catch = if catch.is_empty() {
                name.iter().cloned().map(CatchRule::NamePrefix).collect()
            } else {
                catch
            };
            (Some(show.unwrap_or_else(default_show)), catch)
        } else {
            (None, Vec::new())
        };

        ResponseFragment {
            status: status.unwrap_or(default_status),
            name,
            spec: Value::Object(spec),
            show,
            catch,
        }
    }
}

/// Success fragments first, then error fragments; a later status replaces an
/// earlier one.
fn merge_responses(on_success: &[ResponseFragment], on_error: &[ResponseFragment]) -> Value {
    let mut responses = Map::new();
    for fragment in on_success.iter().chain(on_error) {
        responses.insert(fragment.status.to_string(), fragment.spec.clone());
    }
    Value::Object(responses)
}

fn default_show() -> ShowFn {
    Arc::new(|err, _ctx| json!({ "message": err.message }))
}

/// `"get person_records"` → `"Get Person Records"`
pub(super) fn title_case(input: &str) -> String {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut previous_lower = false;
    for c in input.chars() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            previous_lower = false;
            continue;
        }
        if c.is_uppercase() && previous_lower && !current.is_empty() {
            words.push(std::mem::take(&mut current));
        }
        previous_lower = c.is_lowercase() || c.is_numeric();
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }

    words
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
