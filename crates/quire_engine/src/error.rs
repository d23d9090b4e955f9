//! Error types for build execution.

use std::path::PathBuf;

use quire_cache::CacheError;
use quire_doc::{LinkError, ParseError};

/// Errors that abort a build.
///
/// A cache that is missing or unreadable is never an error; it makes every
/// artifact look absent instead.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    /// The requested target is not one of `build`, `clean`, `rebuild`.
    #[error("unsupported target '{0}' (expected build, clean or rebuild)")]
    UnsupportedTarget(String),

    /// A source file disappeared between being listed and being read.
    #[error("source file not found: {}", path.display())]
    SourceNotFound {
        /// The missing file.
        path: PathBuf,
    },

    /// `clean` was asked to remove a directory holding the sources.
    #[error("refusing to remove {}: it contains the source directory", dir.display())]
    UnsafeClean {
        /// The directory that would have been removed.
        dir: PathBuf,
    },

    /// A source file name is not valid UTF-8 and cannot be mapped to a target.
    #[error("source file name is not valid UTF-8: {}", path.display())]
    NonUtf8FileName {
        /// The offending file.
        path: PathBuf,
    },

    /// A filesystem operation on the source or build tree failed.
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// A source document is malformed.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A target could not be assembled from the cache.
    #[error(transparent)]
    Link(#[from] LinkError),

    /// The cache could not be written.
    #[error(transparent)]
    Cache(#[from] CacheError),
}
