//! Document pipeline stages for a reStructuredText subset.
//!
//! # Architecture
//!
//! - **Parser** ([`parser`]): source text to an [`AstDoc`] of block nodes.
//! - **Transformer** ([`transform`]): [`AstDoc`] to [`Code`], a list of rendered
//!   HTML fragments and include placeholders plus the code it depends on.
//! - **Code** ([`code`]): persists itself into a [`quire_cache::CacheStore`].
//! - **Linker** ([`link`]): reassembles a target page from cached code.

#![warn(missing_docs)]

/// Block-level document tree.
pub mod ast;
/// Intermediate code and its cache representation.
pub mod code;
/// Parse and link errors.
pub mod error;
mod inline;
/// Page assembly from cached code.
pub mod link;
/// Line-oriented parser.
pub mod parser;
/// Document tree to code.
pub mod transform;

pub use ast::{AstDoc, Block};
pub use code::{Code, CodeBody, Fragment, DOC_KIND};
pub use error::{LinkError, ParseError};
pub use link::link;
pub use parser::{parse_file, parse_str};
pub use transform::transform;
