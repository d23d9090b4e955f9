//! Resolution of configured paths against a project directory.

use crate::types::ProjectConfig;
use std::path::{Path, PathBuf};

/// Absolute-or-project-relative locations and naming for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPaths {
    /// Display name of the project.
    pub name: String,
    /// Directory scanned for sources.
    pub src_dir: PathBuf,
    /// Directory receiving outputs.
    pub build_dir: PathBuf,
    /// Directory holding the cache store.
    pub cache_dir: PathBuf,
    /// Source extension, without the dot.
    pub source_extension: String,
    /// Output extension, without the dot.
    pub output_extension: String,
}

/// Joins the configured directories onto `project_dir` and fills in the project name.
///
/// Absolute paths in the configuration are kept as they are.
pub fn resolve_paths(config: &ProjectConfig, project_dir: &Path) -> ResolvedPaths {
    let name = config.project.name.clone().unwrap_or_else(|| {
        project_dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "project".to_string())
    });

    ResolvedPaths {
        name,
        src_dir: project_dir.join(&config.paths.src),
        build_dir: project_dir.join(&config.paths.build),
        cache_dir: project_dir.join(&config.paths.cache),
        source_extension: config.build.source_extension.clone(),
        output_extension: config.build.output_extension.clone(),
    }
}
