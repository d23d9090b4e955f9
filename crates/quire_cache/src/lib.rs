//! Persistent cache store for incremental document builds.
//!
//! Records, across runs, when each piece of intermediate code was last written
//! and which pieces of code every output target was assembled from. The code
//! payloads themselves live next to the manifest as checksummed binary artifacts.
//!
//! Every read is fail-safe: a missing, corrupt or incompatible cache reads as
//! "absent", which forces a rebuild instead of failing the build.

#![warn(missing_docs)]

pub mod artifact;
pub mod error;
pub mod manifest;
pub mod store;

pub use error::CacheError;
pub use store::CacheStore;
