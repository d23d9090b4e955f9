//! Payload checksums for cached artifacts.

use serde::{Deserialize, Serialize};

/// XXH3-64 digest of an artifact payload.
///
/// Only ever compared for equality: a mismatch means the payload was truncated
/// or edited, and the artifact reads as absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Checksum(u64);

impl Checksum {
    /// Checksums `payload`.
    pub fn of(payload: &[u8]) -> Self {
        Self(xxhash_rust::xxh3::xxh3_64(payload))
    }
}
