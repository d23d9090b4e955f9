//! Filesystem modification timestamps.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// A point in time as reported by the filesystem, in nanoseconds since the Unix epoch.
///
/// Every staleness decision compares two `Timestamp`s taken from the same
/// clock (file modification times), so the ordering is meaningful even on
/// filesystems that coalesce writes to a coarse resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Creates a timestamp from raw nanoseconds since the Unix epoch.
    pub const fn from_nanos(nanos: u64) -> Self {
        Self(nanos)
    }

    /// Returns the raw nanoseconds since the Unix epoch.
    pub const fn as_nanos(self) -> u64 {
        self.0
    }

    /// Converts a [`SystemTime`]. Times before the epoch clamp to zero.
    pub fn from_system_time(time: SystemTime) -> Self {
        let nanos = time
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            .unwrap_or(0);
        Self(nanos)
    }

    /// Converts back into a [`SystemTime`].
    pub fn to_system_time(self) -> SystemTime {
        UNIX_EPOCH + Duration::from_nanos(self.0)
    }

    /// Reads the last-modified time of the file at `path`.
    pub fn of_path(path: &Path) -> io::Result<Self> {
        let modified = std::fs::metadata(path)?.modified()?;
        Ok(Self::from_system_time(modified))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secs = self.0 / 1_000_000_000;
        let nanos = self.0 % 1_000_000_000;
        write!(f, "{secs}.{nanos:09}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_time_roundtrip_is_exact() {
        let t = UNIX_EPOCH + Duration::new(1_700_000_000, 123_456_789);
        let ts = Timestamp::from_system_time(t);
        assert_eq!(ts.as_nanos(), 1_700_000_000_123_456_789);
        assert_eq!(ts.to_system_time(), t);
    }

    #[test]
    fn pre_epoch_clamps_to_zero() {
        let t = UNIX_EPOCH - Duration::from_secs(10);
        assert_eq!(Timestamp::from_system_time(t), Timestamp::from_nanos(0));
    }

    #[test]
    fn ordering_follows_nanos() {
        assert!(Timestamp::from_nanos(5) < Timestamp::from_nanos(6));
        assert_eq!(Timestamp::from_nanos(7), Timestamp::from_nanos(7));
    }

    #[test]
    fn display_seconds_and_fraction() {
        assert_eq!(Timestamp::from_nanos(1_500_000_000).to_string(), "1.500000000");
    }

    #[test]
    fn serializes_as_bare_number() {
        let json = serde_json::to_string(&Timestamp::from_nanos(42)).unwrap();
        assert_eq!(json, "42");
    }

    #[test]
    fn of_path_reads_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.rst");
        std::fs::write(&path, "Title\n=====\n").unwrap();
        let when = UNIX_EPOCH + Duration::from_secs(1_600_000_000);
        std::fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(when)
            .unwrap();
        assert_eq!(
            Timestamp::of_path(&path).unwrap(),
            Timestamp::from_system_time(when)
        );
    }

    #[test]
    fn of_path_missing_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let err = Timestamp::of_path(&dir.path().join("gone.rst")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
