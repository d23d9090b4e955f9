//! The cache store consulted by staleness checks and written by code.

use std::collections::{BTreeSet, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use quire_common::{CodeKey, Timestamp};

use crate::artifact::ArtifactStore;
use crate::error::CacheError;
use crate::manifest::{CacheManifest, MANIFEST_FILE};

/// Persistent key/value store of code timestamps and per-target dependency lists.
///
/// Lookups return `None` (or an empty list) for anything never recorded, so a
/// deleted or unreadable cache simply makes every artifact look absent.
/// Mutations stay in memory until [`CacheStore::save`] is called; code
/// payloads written through [`CacheStore::write_code`] go to disk immediately.
pub struct CacheStore {
    cache_dir: PathBuf,
    manifest: CacheManifest,
    artifacts: ArtifactStore,
    quire_version: String,
}

impl CacheStore {
    /// Loads the store from `cache_dir`, or starts empty.
    ///
    /// A manifest that is missing, unparsable, or written by another version
    /// is discarded.
    pub fn load(cache_dir: &Path, quire_version: &str) -> Self {
        let manifest = match CacheManifest::load(cache_dir) {
            Some(m) if m.is_compatible(quire_version) => m,
            Some(m) => {
                tracing::warn!(
                    found = %m.quire_version,
                    expected = %quire_version,
                    "discarding cache written by another version"
                );
                CacheManifest::new(quire_version)
            }
            None => {
                if cache_dir.join(MANIFEST_FILE).exists() {
                    tracing::warn!(dir = %cache_dir.display(), "discarding unreadable cache manifest");
                }
                CacheManifest::new(quire_version)
            }
        };

        Self {
            cache_dir: cache_dir.to_path_buf(),
            manifest,
            artifacts: ArtifactStore::new(cache_dir),
            quire_version: quire_version.to_string(),
        }
    }

    /// Creates an empty store for `cache_dir` without reading anything from disk.
    pub fn empty(cache_dir: &Path, quire_version: &str) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
            manifest: CacheManifest::new(quire_version),
            artifacts: ArtifactStore::new(cache_dir),
            quire_version: quire_version.to_string(),
        }
    }

    /// Returns the directory this store persists into.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Returns when the code `(kind, name)` was last written, if ever.
    pub fn get_code_timestamp(&self, kind: &str, name: &str) -> Option<Timestamp> {
        self.manifest.code_timestamps.get(kind)?.get(name).copied()
    }

    /// Records the last-write time of the code `(kind, name)`, replacing any previous value.
    pub fn record_code_timestamp(&mut self, kind: &str, name: &str, timestamp: Timestamp) {
        self.manifest
            .code_timestamps
            .entry(kind.to_string())
            .or_default()
            .insert(name.to_string(), timestamp);
    }

    /// Returns the code `target` was assembled from, in assembly order.
    ///
    /// Empty if the target was never built.
    pub fn get_dependencies(&self, target: &str) -> &[CodeKey] {
        self.manifest
            .dependencies
            .get(target)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Returns the recorded dependencies of `target` followed by those of every
    /// dependency that is itself a target, breadth-first, without duplicates.
    ///
    /// A document that includes another which includes a third depends on all
    /// three even though only the first two appear in its own list.
    pub fn dependency_closure(&self, target: &str) -> Vec<CodeKey> {
        let mut closure: Vec<CodeKey> = Vec::new();
        let mut visited: HashSet<&str> = HashSet::new();
        let mut pending: VecDeque<&str> = VecDeque::from([target]);

        while let Some(next) = pending.pop_front() {
            if !visited.insert(next) {
                continue;
            }
            for key in self.get_dependencies(next) {
                if !closure.contains(key) {
                    closure.push(key.clone());
                }
                pending.push_back(&key.name);
            }
        }
        closure
    }

    /// Replaces the dependency list of `target` wholesale.
    pub fn set_dependencies(&mut self, target: &str, dependencies: Vec<CodeKey>) {
        self.manifest
            .dependencies
            .insert(target.to_string(), dependencies);
    }

    /// Writes the payload of `key` to the artifact store.
    ///
    /// Returns the artifact's modification time, which callers record with
    /// [`CacheStore::record_code_timestamp`].
    pub fn write_code(&self, key: &CodeKey, payload: &[u8]) -> Result<Timestamp, CacheError> {
        self.artifacts
            .write_artifact(key, payload, &self.quire_version)
    }

    /// Reads the payload of `key`, or `None` if it is missing or corrupt.
    pub fn read_code(&self, key: &CodeKey) -> Option<Vec<u8>> {
        self.artifacts.read_artifact(key)
    }

    /// Returns `true` if the payload of `key` is present and passes its integrity check.
    pub fn has_code(&self, key: &CodeKey) -> bool {
        self.read_code(key).is_some()
    }

    /// Forgets every code of `kind` whose name is not in `live`, along with the
    /// dependency list of the target of that name, and deletes its artifact.
    ///
    /// Returns how many codes were dropped. The manifest is not saved.
    pub fn prune(&mut self, kind: &str, live: &BTreeSet<String>) -> Result<usize, CacheError> {
        let dead: Vec<String> = self
            .manifest
            .code_timestamps
            .get(kind)
            .map(|names| names.keys().filter(|n| !live.contains(*n)).cloned().collect())
            .unwrap_or_default();

        for name in &dead {
            self.artifacts.remove_artifact(&CodeKey::new(kind, name))?;
            if let Some(names) = self.manifest.code_timestamps.get_mut(kind) {
                names.remove(name);
            }
            self.manifest.dependencies.remove(name);
            tracing::info!(kind, name = %name, "pruned cached code");
        }
        Ok(dead.len())
    }

    /// Number of `(kind, name)` entries with a recorded timestamp.
    pub fn timestamp_count(&self) -> usize {
        self.manifest.code_timestamps.values().map(|m| m.len()).sum()
    }

    /// Number of targets with a recorded dependency list.
    pub fn dependency_count(&self) -> usize {
        self.manifest.dependencies.len()
    }

    /// Flushes the manifest to `<cache_dir>/manifest.json`.
    pub fn save(&self) -> Result<(), CacheError> {
        self.manifest.save(&self.cache_dir)
    }
}
