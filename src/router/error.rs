use std::fmt;

/// Route registration error
///
/// Returned by the per-verb registration methods on [`Router`](super::Router).
/// These are setup-time failures: a service is expected to stop during startup
/// rather than serve with a partially registered route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The template does not start with a non-empty segment, or a capture is malformed
    InvalidPath {
        /// The rejected template
        path: String,
        /// What is wrong with it
        reason: String,
    },
    /// The `(path, method)` pair already has a route
    DuplicateMethod {
        /// Lowercase method name
        method: String,
        /// Path in published (brace) form
        path: String,
    },
    /// Two captures in one template share a name
    DuplicateParam {
        /// The rejected template
        path: String,
        /// The repeated capture name
        name: String,
    },
    /// The compiled regex was rejected
    InvalidPattern {
        /// The rejected template
        path: String,
        /// Message from the regex compiler
        message: String,
    },
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::InvalidPath { path, reason } => {
                write!(
                    f,
                    "Path {path} should be in format /path or /path/anything: {reason}"
                )
            }
            RegistrationError::DuplicateMethod { method, path } => {
                write!(f, "Method {method} already defined for path {path}")
            }
            RegistrationError::DuplicateParam { path, name } => {
                write!(f, "Path {path} declares capture `{name}` more than once")
            }
            RegistrationError::InvalidPattern { path, message } => {
                write!(f, "Path {path} did not compile to a matcher: {message}")
            }
        }
    }
}

impl std::error::Error for RegistrationError {}
