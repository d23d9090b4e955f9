//! Configuration file loading and validation.

use crate::error::ConfigError;
use crate::types::ProjectConfig;
use std::ffi::OsString;
use std::io;
use std::path::{Component, Path};

/// Name of the configuration file inside a project directory.
pub const CONFIG_FILE: &str = "quire.toml";

/// Loads and validates `<project_dir>/quire.toml`.
pub fn load_config(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    let content = std::fs::read_to_string(project_dir.join(CONFIG_FILE))?;
    load_config_from_str(&content)
}

/// Like [`load_config`], but a missing `quire.toml` yields the default configuration.
///
/// Any other read failure and any malformed content are still errors.
pub fn load_config_or_default(project_dir: &Path) -> Result<ProjectConfig, ConfigError> {
    match std::fs::read_to_string(project_dir.join(CONFIG_FILE)) {
        Ok(content) => load_config_from_str(&content),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(ProjectConfig::default()),
        Err(e) => Err(e.into()),
    }
}

/// Parses and validates a `quire.toml` configuration from a string.
pub fn load_config_from_str(content: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.build.source_extension.is_empty() {
        return Err(ConfigError::ValidationError(
            "build.source_extension must not be empty".to_string(),
        ));
    }
    if config.build.output_extension.is_empty() {
        return Err(ConfigError::ValidationError(
            "build.output_extension must not be empty".to_string(),
        ));
    }

    // `clean` removes the build and cache directories outright.
    let src = LexicalPath::new(&config.paths.src);
    let build = LexicalPath::new(&config.paths.build);
    let cache = LexicalPath::new(&config.paths.cache);
    if build.contains(&src) {
        return Err(ConfigError::ValidationError(format!(
            "paths.build ('{}') must not be or contain paths.src ('{}')",
            config.paths.build, config.paths.src
        )));
    }
    if cache.contains(&src) {
        return Err(ConfigError::ValidationError(format!(
            "paths.cache ('{}') must not be or contain paths.src ('{}')",
            config.paths.cache, config.paths.src
        )));
    }
    if build.contains(&cache) || cache.contains(&build) {
        return Err(ConfigError::ValidationError(
            "paths.build and paths.cache must not overlap".to_string(),
        ));
    }
    Ok(())
}

/// A configured directory with `.` dropped and `..` folded lexically.
///
/// `..` components that climb above the project directory are kept as a count.
#[derive(Debug, PartialEq, Eq)]
struct LexicalPath {
    absolute: bool,
    ups: usize,
    parts: Vec<OsString>,
}

impl LexicalPath {
    fn new(raw: &str) -> Self {
        let mut path = Self {
            absolute: false,
            ups: 0,
            parts: Vec::new(),
        };
        for component in Path::new(raw.trim()).components() {
            match component {
                Component::Prefix(_) | Component::RootDir => path.absolute = true,
                Component::CurDir => {}
                Component::ParentDir => {
                    if path.parts.pop().is_none() && !path.absolute {
                        path.ups += 1;
                    }
                }
                Component::Normal(name) => path.parts.push(name.to_os_string()),
            }
        }
        path
    }

    /// Returns `true` if `other` is this directory or lies beneath it.
    fn contains(&self, other: &LexicalPath) -> bool {
        if self.absolute != other.absolute {
            return false;
        }
        if self.parts.is_empty() {
            // `..`, `../..`: an ancestor of everything that climbs no higher.
            return other.ups <= self.ups;
        }
        self.ups == other.ups && other.parts.starts_with(&self.parts)
    }
}
