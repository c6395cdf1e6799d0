use serde_json::{Map, Value};
use tracing::{debug, info};

use super::schema::normalize;
use crate::config::DocumentConfig;
use crate::router::{to_openapi_path, RegistrationError};

/// The published specification: info block, security definitions, path table
/// and normalized definitions.
#[derive(Debug, Clone)]
pub struct SpecDocument {
    root: Map<String, Value>,
    paths: Map<String, Value>,
    definitions: Map<String, Value>,
}

impl Default for SpecDocument {
    fn default() -> Self {
        Self::new(&DocumentConfig::default())
    }
}

impl SpecDocument {
    /// Build an empty document from configuration.
    ///
    /// `paths` and `definitions` found in the configuration's `extra` block seed
    /// the document as-is; they are not normalized.
    #[must_use]
    pub fn new(config: &DocumentConfig) -> Self {
        let mut root = config.root();
        let paths = take_object(&mut root, "paths");
        let definitions = take_object(&mut root, "definitions");
        Self {
            root,
            paths,
            definitions,
        }
    }

    pub fn set_base_path(&mut self, base_path: impl Into<String>) {
        self.root
            .insert("basePath".to_string(), Value::String(base_path.into()));
    }

    /// Normalize `schema` and store it under `name`, replacing any previous
    /// definition of that name.
    pub fn add_definition(&mut self, name: &str, schema: &Value) {
        let normalized = normalize(schema, 0);
        if self
            .definitions
            .insert(name.to_string(), normalized)
            .is_some()
        {
            debug!(definition = %name, "Replaced existing definition");
        } else {
            info!(definition = %name, "Definition registered");
        }
    }

    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&Value> {
        self.definitions.get(name)
    }

    #[must_use]
    pub fn definitions(&self) -> &Map<String, Value> {
        &self.definitions
    }

    /// Reserve the slot for `(template, method)` and return the published path.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateMethod`] if the slot is taken.
    pub fn add_method(&mut self, template: &str, method: &str) -> Result<String, RegistrationError> {
        let path = to_openapi_path(template);
        let methods = self
            .paths
            .entry(path.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !methods.is_object() {
            *methods = Value::Object(Map::new());
        }
        if let Value::Object(methods) = methods {
            if methods.contains_key(method) {
                return Err(RegistrationError::DuplicateMethod {
                    method: method.to_string(),
                    path,
                });
            }
            methods.insert(method.to_string(), Value::Object(Map::new()));
        }
        Ok(path)
    }

    /// Replace the fragment stored for `(path, method)`.
    pub(crate) fn set_operation(&mut self, path: &str, method: &str, fragment: Value) {
        if let Some(Value::Object(methods)) = self.paths.get_mut(path) {
            methods.insert(method.to_string(), fragment);
        }
    }

    /// Operation fragment for a published path and lowercase method
    #[must_use]
    pub fn operation(&self, path: &str, method: &str) -> Option<&Value> {
        self.paths.get(path).and_then(|methods| methods.get(method))
    }

    /// Assemble the full document.
    ///
    /// The result is a snapshot; later registrations do not show up in it.
    #[must_use]
    pub fn get(&self) -> Value {
        let mut document = self.root.clone();
        document.insert("paths".to_string(), Value::Object(self.paths.clone()));
        document.insert(
            "definitions".to_string(),
            Value::Object(self.definitions.clone()),
        );
        Value::Object(document)
    }
}

fn take_object(root: &mut Map<String, Value>, key: &str) -> Map<String, Value> {
    match root.remove(key) {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    }
}
