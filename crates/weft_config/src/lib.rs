//! Parsing and validation of `weft.toml` project configuration files.
//!
//! The configuration names the design description to load and tunes which
//! elaboration checks run and how diagnostics are reported.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
