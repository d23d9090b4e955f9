//! Parsing and validation of `quire.toml` project configuration files.
//!
//! The file is optional: a project without one builds `*.rst` sources from the
//! project directory into `_build/` using `_cache/` for incremental state.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, load_config_or_default, CONFIG_FILE};
pub use resolve::{resolve_paths, ResolvedPaths};
pub use types::*;
