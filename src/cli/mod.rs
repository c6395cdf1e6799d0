//! # CLI Module
//!
//! Command-line utilities for working with route documentation outside a
//! running service.
//!
//! ## Commands
//!
//! ### `normalize`
//!
//! Normalize an informal schema file the same way
//! [`SpecDocument::add_definition`](crate::spec::SpecDocument::add_definition)
//! does, and print the result:
//!
//! ```bash
//! specrouter normalize --schema person.yaml --format yaml
//! ```
//!
//! ### `spec`
//!
//! Print the document a router built from a configuration file would publish
//! before any application routes are registered, optionally with definitions:
//!
//! ```bash
//! specrouter spec --config service.yaml --definition Person=person.yaml
//! ```
//!
//! Without `--config` the file named by `SPECROUTER_CONFIG` is used, or the
//! built-in defaults.

mod commands;

pub use commands::{execute, load_schema, render, run_cli, Cli, Commands, OutputFormat};
