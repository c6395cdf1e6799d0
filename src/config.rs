//! # Document Configuration Module
//!
//! Supplies the parts of a published specification that do not come from route
//! declarations: the info block, media types, schemes, security definitions and
//! an optional base path.
//!
//! ## Sources
//!
//! - [`DocumentConfig::default()`] - built-in defaults
//! - [`DocumentConfig::load()`] - a YAML, TOML or JSON file, chosen by extension
//! - [`DocumentConfig::from_env()`] - the file named by `SPECROUTER_CONFIG`, or defaults
//!
//! ## Example Configuration
//!
//! ```yaml
//! info:
//!   title: Person Service
//!   description: CRUD over people
//!   version: 1.2.0
//!   contact: Platform Team
//! private: true
//! schemes: [https]
//! base_path: /api
//! extra:
//!   info:
//!     x-audience: internal
//! ```
//!
//! Everything under `extra` is deep-merged over the generated root. `paths` and
//! `definitions` found there seed the document.

use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::env;
use std::path::Path;

/// Environment variable naming a configuration file for [`DocumentConfig::from_env`].
pub const CONFIG_ENV: &str = "SPECROUTER_CONFIG";

/// Info block of the published document.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct InfoConfig {
    pub title: String,
    pub description: Option<String>,
    pub version: String,
    /// Contact name
    pub contact: Option<String>,
    /// License name; ignored when the document is private
    pub license: Option<String>,
}

impl Default for InfoConfig {
    fn default() -> Self {
        Self {
            title: "Api".to_string(),
            description: None,
            version: "1.0.0".to_string(),
            contact: None,
            license: None,
        }
    }
}

/// Static configuration of a [`SpecDocument`](crate::spec::SpecDocument).
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct DocumentConfig {
    pub info: InfoConfig,
    /// Publish the license as `Proprietary`
    pub private: bool,
    pub produces: Vec<String>,
    pub schemes: Vec<String>,
    #[serde(alias = "securityDefinitions")]
    pub security_definitions: Map<String, Value>,
    #[serde(alias = "basePath")]
    pub base_path: Option<String>,
    /// Arbitrary document content merged over the generated root
    pub extra: Option<Value>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        let mut security_definitions = Map::new();
        security_definitions.insert(
            crate::spec::DEFAULT_SECURITY_SCHEME.to_string(),
            json!({
                "type": "apiKey",
                "name": "api_key",
                "in": "header"
            }),
        );
        Self {
            info: InfoConfig::default(),
            private: false,
            produces: vec![
                "application/json".to_string(),
                "text/plain; charset=utf-8".to_string(),
            ],
            schemes: vec!["https".to_string()],
            security_definitions,
            base_path: None,
            extra: None,
        }
    }
}

impl DocumentConfig {
    /// Load configuration from a file.
    ///
    /// `.yaml`/`.yml` files are parsed as YAML, `.toml` as TOML, anything else
    /// as JSON.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        let config = match extension {
            "yaml" | "yml" => serde_yaml::from_str(&content)
                .with_context(|| format!("invalid YAML config {}", path.display()))?,
            "toml" => toml::from_str(&content)
                .with_context(|| format!("invalid TOML config {}", path.display()))?,
            _ => serde_json::from_str(&content)
                .with_context(|| format!("invalid JSON config {}", path.display()))?,
        };
        Ok(config)
    }

    /// Load the file named by `SPECROUTER_CONFIG`, or use defaults when unset.
    pub fn from_env() -> Result<Self> {
        match env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// Generated document root, with `extra` merged in.
    #[must_use]
    pub fn root(&self) -> Map<String, Value> {
        let license = if self.private {
            Some("Proprietary".to_string())
        } else {
            self.info.license.clone()
        };

        let mut info = Map::new();
        info.insert("title".to_string(), Value::from(self.info.title.as_str()));
        if let Some(description) = &self.info.description {
            info.insert("description".to_string(), Value::from(description.as_str()));
        }
        info.insert("version".to_string(), Value::from(self.info.version.as_str()));
        if let Some(contact) = &self.info.contact {
            info.insert("contact".to_string(), json!({ "name": contact }));
        }
        if let Some(license) = license {
            info.insert("license".to_string(), json!({ "name": license }));
        }

        let mut root = json!({
            "swagger": "2.0",
            "info": info,
            "produces": self.produces,
            "schemes": self.schemes,
            "securityDefinitions": self.security_definitions,
        });
        if let Some(base_path) = &self.base_path {
            root["basePath"] = Value::String(base_path.clone());
        }
        if let Some(extra) = &self.extra {
            deep_merge(&mut root, extra);
        }

        match root {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }
}

/// Recursively merge `overlay` into `base`; objects merge key by key, anything
/// else replaces.
pub fn deep_merge(base: &mut Value, overlay: &Value) {
    match (base, overlay) {
        (Value::Object(base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}
