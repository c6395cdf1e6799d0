//! Path template compilation.
//!
//! Templates like `/things/:id` are compiled once at registration time into an
//! anchored regex plus the ordered list of capture names. The OpenAPI brace form
//! (`/things/{id}`) is accepted as well, so a template copied straight out of a
//! published document registers the same route.

use regex::Regex;
use smallvec::SmallVec;
use std::sync::Arc;

use super::error::RegistrationError;

/// Maximum number of path/query parameters before heap allocation.
/// Most REST APIs have ≤4 path params (e.g., /users/:id/posts/:postId).
pub const MAX_INLINE_PARAMS: usize = 8;

/// Ordered `(name, value)` captures for one matched path.
///
/// Param names use `Arc<str>` because they come from the compiled pattern and are
/// shared by every match; values are per-request data from the URL.
pub type ParamVec = SmallVec<[(Arc<str>, String); MAX_INLINE_PARAMS]>;

/// A compiled path template.
#[derive(Debug, Clone)]
pub struct PathPattern {
    template: String,
    regex: Regex,
    param_names: Vec<Arc<str>>,
}

impl PathPattern {
    /// Compile a path template into a matcher.
    ///
    /// Segments written as `:name` or `{name}` capture exactly one path segment.
    /// Every other segment is matched literally. A single trailing slash is
    /// optional on both the template and the incoming path.
    ///
    /// # Errors
    ///
    /// Returns an error when a capture has an empty or non-word name, when two
    /// captures share a name, or when the resulting regex fails to compile.
    pub fn compile(template: &str) -> Result<Self, RegistrationError> {
        let mut pattern = String::with_capacity(template.len() + 8);
        pattern.push('^');
        let mut param_names: Vec<Arc<str>> = Vec::with_capacity(template.matches(':').count());

        for segment in template.split('/').filter(|s| !s.is_empty()) {
            match capture_name(segment) {
                Some(name) => {
                    if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
                        return Err(RegistrationError::InvalidPath {
                            path: template.to_string(),
                            reason: format!("capture `{segment}` must be a non-empty word"),
                        });
                    }
                    if param_names.iter().any(|existing| existing.as_ref() == name) {
                        return Err(RegistrationError::DuplicateParam {
                            path: template.to_string(),
                            name: name.to_string(),
                        });
                    }
                    pattern.push_str("/([^/]+)");
                    param_names.push(Arc::from(name));
                }
                None => {
                    pattern.push('/');
                    pattern.push_str(&regex::escape(segment));
                }
            }
        }

        pattern.push_str("/?$");
        let regex = Regex::new(&pattern).map_err(|err| RegistrationError::InvalidPattern {
            path: template.to_string(),
            message: err.to_string(),
        })?;

        Ok(Self {
            template: template.to_string(),
            regex,
            param_names,
        })
    }

    /// The template this pattern was compiled from.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Ordered capture names.
    #[must_use]
    pub fn param_names(&self) -> &[Arc<str>] {
        &self.param_names
    }

    /// Match `path` against the whole pattern.
    ///
    /// Returns the captures in template order, or `None` when the path does not
    /// match. A template without captures yields an empty vector on success.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<ParamVec> {
        let captures = self.regex.captures(path)?;
        let mut params = ParamVec::new();
        for (i, name) in self.param_names.iter().enumerate() {
            if let Some(value) = captures.get(i + 1) {
                params.push((Arc::clone(name), value.as_str().to_string()));
            }
        }
        Some(params)
    }

    /// Whether `path` matches the pattern.
    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }
}

/// Rewrite `:name` captures into the brace form used by published documents.
///
/// Only the documentation path changes; matching keeps using the compiled pattern.
#[must_use]
pub fn to_openapi_path(template: &str) -> String {
    template
        .split('/')
        .map(|segment| match segment.strip_prefix(':') {
            Some(name) => format!("{{{name}}}"),
            None => segment.to_string(),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn capture_name(segment: &str) -> Option<&str> {
    if let Some(name) = segment.strip_prefix(':') {
        return Some(name);
    }
    segment.strip_prefix('{').and_then(|rest| rest.strip_suffix('}'))
}
