//! Conversion of informal schema shorthand into JSON-Schema-shaped definitions.
//!
//! Route authors describe entities loosely: a property may carry
//! `required: true`, a domain type such as `date`, or arbitrary bookkeeping keys
//! used elsewhere in their application. [`normalize`] turns that into something a
//! Swagger 2.0 consumer accepts:
//!
//! - keys outside the allow-list for their position get an `x-` prefix instead of
//!   being dropped, so nothing the author wrote is lost;
//! - `required: true` on a property moves into the parent's `required` list;
//! - `date` / `datetime` / `time` become `type: string` with a matching `format`;
//! - nested objects (and arrays of objects) are normalized one level deeper.
//!
//! Normalization is a one-time step at definition registration. Running it
//! again on its own output is not meaningful.

use serde_json::{Map, Value};

use super::types::TEMPORAL_TYPES;

/// Prefix marking a key as a vendor extension.
pub const EXTENSION_PREFIX: &str = "x-";

const ROOT_KEYS: &[&str] = &["properties", "title", "description", "type"];

const NESTED_KEYS: &[&str] = &[
    "properties",
    "title",
    "description",
    "type",
    "schema",
    "items",
];

const PROPERTY_KEYS: &[&str] = &[
    "title",
    "description",
    "type",
    "schema",
    "properties",
    "$ref",
    "maxLength",
    "format",
    "enum",
    "items",
];

const ITEM_KEYS: &[&str] = &["type"];

/// Normalize `schema` as found at nesting `level` (0 for a top-level definition).
///
/// Non-object input is returned unchanged.
#[must_use]
pub fn normalize(schema: &Value, level: usize) -> Value {
    match schema.as_object() {
        Some(source) => Value::Object(normalize_object(source, level)),
        None => schema.clone(),
    }
}

fn normalize_object(source: &Map<String, Value>, level: usize) -> Map<String, Value> {
    let allowed = if level == 0 { ROOT_KEYS } else { NESTED_KEYS };
    let mut definition = Map::with_capacity(source.len() + 1);
    let mut required = Vec::new();

    for (key, value) in source {
        let value = match (key.as_str(), value) {
            ("properties", Value::Object(properties)) => {
                Value::Object(normalize_properties(properties, level, &mut required))
            }
            _ => value.clone(),
        };
        definition.insert(extension_key(key, allowed), value);
    }

    if !required.is_empty() {
        definition.insert(
            "required".to_string(),
            Value::Array(required.into_iter().map(Value::String).collect()),
        );
    }
    definition
}

fn normalize_properties(
    properties: &Map<String, Value>,
    level: usize,
    required: &mut Vec<String>,
) -> Map<String, Value> {
    let mut normalized = Map::with_capacity(properties.len());
    for (name, source) in properties {
        let Some(source) = source.as_object() else {
            normalized.insert(name.clone(), source.clone());
            continue;
        };
        if source.get("required") == Some(&Value::Bool(true)) {
            required.push(name.clone());
        }
        normalized.insert(name.clone(), Value::Object(normalize_property(source, level)));
    }
    normalized
}

fn normalize_property(source: &Map<String, Value>, level: usize) -> Map<String, Value> {
    if type_of(source) == Some("object") {
        let mut nested = source.clone();
        nested.remove("required");
        return normalize_object(&nested, level + 1);
    }

    let mut property = Map::with_capacity(source.len());
    for (key, value) in source {
        if key == "required" {
            continue;
        }
        property.insert(extension_key(key, PROPERTY_KEYS), value.clone());
    }

    if property.contains_key("enum") {
        property.remove("maxLength");
    }

    if let Some(temporal) = type_of(&property)
        .filter(|ty| TEMPORAL_TYPES.contains(ty))
        .map(str::to_string)
    {
        property.insert("format".to_string(), Value::String(temporal));
        property.insert("type".to_string(), Value::from("string"));
    }

    let items = match (type_of(&property), property.get("items")) {
        (Some("array"), Some(Value::Object(items))) => Some(items.clone()),
        _ => None,
    };

    if let Some(items) = items {
        let items = if type_of(&items) == Some("object") {
            normalize_object(&items, level + 1)
        } else {
            items
                .into_iter()
                .map(|(key, value)| (extension_key(&key, ITEM_KEYS), value))
                .collect()
        };
        property.insert("items".to_string(), Value::Object(items));
    } else if let Some(schema) = property.get("schema").filter(|s| is_truthy(s)).cloned() {
        property.remove("schema");
        property.insert(
            format!("{EXTENSION_PREFIX}schema"),
            Value::Object(reference_wrapper(&schema)),
        );
    } else if let Some(reference) = property.remove("$ref") {
        property.insert(format!("{EXTENSION_PREFIX}$ref"), reference);
    }

    property
}

/// Keep only the reference and key of a property-level `schema` object, both as extensions.
fn reference_wrapper(schema: &Value) -> Map<String, Value> {
    let mut wrapper = Map::new();
    // a bare name carries no `$ref` and yields an empty wrapper
    if let Value::Object(schema) = schema {
        if let Some(reference) = schema.get("$ref").filter(|v| is_truthy(v)) {
            wrapper.insert(format!("{EXTENSION_PREFIX}$ref"), reference.clone());
        }
        if let Some(key) = schema.get("key").filter(|v| is_truthy(v)) {
            wrapper.insert(format!("{EXTENSION_PREFIX}key"), key.clone());
        }
    }
    wrapper
}

fn extension_key(key: &str, allowed: &[&str]) -> String {
    if allowed.contains(&key) {
        key.to_string()
    } else {
        format!("{EXTENSION_PREFIX}{key}")
    }
}

fn type_of(schema: &Map<String, Value>) -> Option<&str> {
    schema.get("type").and_then(Value::as_str)
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}
