//! Shared foundational types used across the Quire document build engine.
//!
//! This crate provides filesystem timestamps, the logical kind/name keys under
//! which intermediate code is cached, and checksums for artifact integrity.

#![warn(missing_docs)]

pub mod checksum;
pub mod key;
pub mod timestamp;

pub use checksum::Checksum;
pub use key::{name_prefix, CodeKey};
pub use timestamp::Timestamp;
