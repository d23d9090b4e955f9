//! Configuration types deserialized from `quire.toml`.

use serde::{Deserialize, Deserializer};

/// The top-level project configuration parsed from `quire.toml`.
///
/// Every section is optional; [`ProjectConfig::default`] is what a project
/// without a configuration file builds with.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectConfig {
    /// Project metadata.
    #[serde(default)]
    pub project: ProjectMeta,
    /// Source, build and cache directory locations.
    #[serde(default)]
    pub paths: PathsConfig,
    /// Source and output file naming.
    #[serde(default)]
    pub build: BuildConfig,
}

/// Project metadata.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectMeta {
    /// Display name. Falls back to the project directory name.
    pub name: Option<String>,
}

/// Directory layout, relative to the project directory.
#[derive(Debug, Deserialize)]
pub struct PathsConfig {
    /// Directory scanned for source documents.
    #[serde(default = "default_src")]
    pub src: String,
    /// Directory receiving linked output files. Removed by `clean`.
    #[serde(default = "default_build")]
    pub build: String,
    /// Directory holding the persistent cache store. Removed by `clean`.
    #[serde(default = "default_cache")]
    pub cache: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            src: default_src(),
            build: default_build(),
            cache: default_cache(),
        }
    }
}

fn default_src() -> String {
    ".".to_string()
}

fn default_build() -> String {
    "_build".to_string()
}

fn default_cache() -> String {
    "_cache".to_string()
}

/// File naming for sources and outputs.
#[derive(Debug, Deserialize)]
pub struct BuildConfig {
    /// Extension of source documents, without the leading dot.
    #[serde(default = "default_source_ext", deserialize_with = "deserialize_extension")]
    pub source_extension: String,
    /// Extension of linked outputs, without the leading dot.
    #[serde(default = "default_output_ext", deserialize_with = "deserialize_extension")]
    pub output_extension: String,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            source_extension: default_source_ext(),
            output_extension: default_output_ext(),
        }
    }
}

fn default_source_ext() -> String {
    "rst".to_string()
}

fn default_output_ext() -> String {
    "html".to_string()
}

/// Accepts `"rst"` and `".rst"` alike.
fn deserialize_extension<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(raw.trim().trim_start_matches('.').to_string())
}
