//! Checksummed binary storage for cached code payloads.
//!
//! Each payload is stored at `<cache_dir>/code/<kind>/<name>.bin`, prefixed by a
//! header holding magic bytes, a format version and a payload checksum.

use std::path::{Path, PathBuf};

use quire_common::{Checksum, CodeKey, Timestamp};
use serde::{Deserialize, Serialize};

use crate::error::CacheError;

/// Magic bytes identifying a Quire code artifact.
const ARTIFACT_MAGIC: [u8; 4] = *b"QUIR";

/// Current artifact format version. Increment on breaking changes to
/// the header layout.
const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Subdirectory of the cache holding code artifacts.
const CODE_SUBDIR: &str = "code";

/// File extension of code artifacts.
const ARTIFACT_EXT: &str = "bin";

/// Header prepended to every cached artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHeader {
    /// Magic bytes: must be `b"QUIR"`.
    pub magic: [u8; 4],

    /// Artifact format version.
    pub format_version: u32,

    /// Tool version that produced this artifact.
    pub quire_version: String,

    /// Content hash of the payload.
    pub checksum: Checksum,
}

/// Reads and writes code payloads under a cache directory.
pub struct ArtifactStore {
    cache_dir: PathBuf,
}

impl ArtifactStore {
    /// Creates a new artifact store rooted at the given cache directory.
    pub fn new(cache_dir: &Path) -> Self {
        Self {
            cache_dir: cache_dir.to_path_buf(),
        }
    }

    /// Returns the file path of the artifact for `key`.
    pub fn artifact_path(&self, key: &CodeKey) -> PathBuf {
        self.cache_dir
            .join(CODE_SUBDIR)
            .join(&key.kind)
            .join(format!("{}.{ARTIFACT_EXT}", key.name))
    }

    /// Writes the payload for `key`, replacing any previous artifact.
    ///
    /// Returns the modification time of the written file.
    pub fn write_artifact(
        &self,
        key: &CodeKey,
        data: &[u8],
        quire_version: &str,
    ) -> Result<Timestamp, CacheError> {
        let path = self.artifact_path(key);
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(|e| CacheError::Io {
                path: dir.to_path_buf(),
                source: e,
            })?;
        }

        let header = ArtifactHeader {
            magic: ARTIFACT_MAGIC,
            format_version: ARTIFACT_FORMAT_VERSION,
            quire_version: quire_version.to_string(),
            checksum: Checksum::of(data),
        };
        let header_bytes = bincode::serde::encode_to_vec(&header, bincode::config::standard())
            .map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;

        // 4-byte header length (little-endian) + header + payload
        let header_len = header_bytes.len() as u32;
        let mut output = Vec::with_capacity(4 + header_bytes.len() + data.len());
        output.extend_from_slice(&header_len.to_le_bytes());
        output.extend_from_slice(&header_bytes);
        output.extend_from_slice(data);

        std::fs::write(&path, &output).map_err(|e| CacheError::Io {
            path: path.clone(),
            source: e,
        })?;
        Timestamp::of_path(&path).map_err(|e| CacheError::Io { path, source: e })
    }

    /// Reads the payload for `key`, validating its header.
    ///
    /// Returns `None` if the file doesn't exist, the header is invalid, the
    /// format version doesn't match, or the checksum doesn't verify.
    pub fn read_artifact(&self, key: &CodeKey) -> Option<Vec<u8>> {
        let raw = std::fs::read(self.artifact_path(key)).ok()?;
        if raw.len() < 4 {
            return None;
        }

        let header_len = u32::from_le_bytes(raw[..4].try_into().ok()?) as usize;
        if raw.len() < 4 + header_len {
            return None;
        }

        let (header, _): (ArtifactHeader, usize) =
            bincode::serde::decode_from_slice(&raw[4..4 + header_len], bincode::config::standard())
                .ok()?;
        if header.magic != ARTIFACT_MAGIC || header.format_version != ARTIFACT_FORMAT_VERSION {
            return None;
        }

        let payload = &raw[4 + header_len..];
        if Checksum::of(payload) != header.checksum {
            return None;
        }
        Some(payload.to_vec())
    }

    /// Deletes the artifact for `key`. An artifact that was never written is fine.
    pub fn remove_artifact(&self, key: &CodeKey) -> Result<(), CacheError> {
        let path = self.artifact_path(key);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CacheError::Io { path, source: e }),
        }
    }
}
