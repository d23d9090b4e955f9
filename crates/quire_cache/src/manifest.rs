//! On-disk manifest of code timestamps and target dependency lists.
//!
//! Stored as `manifest.json` in the cache directory.

use std::collections::BTreeMap;
use std::path::Path;

use quire_common::{CodeKey, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Name of the manifest file within the cache directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Serialized state of the cache store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheManifest {
    /// Version of the tool that wrote this manifest. Invalidated on change.
    pub quire_version: String,

    /// Last-write time of each piece of cached code, keyed by kind then name.
    pub code_timestamps: BTreeMap<String, BTreeMap<String, Timestamp>>,

    /// Code each target was assembled from, in assembly order.
    pub dependencies: BTreeMap<String, Vec<CodeKey>>,
}

impl CacheManifest {
    /// Creates an empty manifest for the given tool version.
    pub fn new(quire_version: &str) -> Self {
        Self {
            quire_version: quire_version.to_string(),
            ..Self::default()
        }
    }

    /// Loads the manifest from the cache directory.
    ///
    /// Returns `None` if the file doesn't exist or can't be parsed.
    pub fn load(cache_dir: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(cache_dir.join(MANIFEST_FILE)).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Saves the manifest, creating the cache directory if needed.
    pub fn save(&self, cache_dir: &Path) -> Result<(), CacheError> {
        std::fs::create_dir_all(cache_dir).map_err(|e| CacheError::Io {
            path: cache_dir.to_path_buf(),
            source: e,
        })?;
        let path = cache_dir.join(MANIFEST_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        std::fs::write(&path, json).map_err(|e| CacheError::Io { path, source: e })
    }

    /// Returns `true` if this manifest was produced by a compatible version.
    pub fn is_compatible(&self, current_version: &str) -> bool {
        self.quire_version == current_version
    }
}
