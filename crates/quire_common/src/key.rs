//! Logical keys for cached intermediate code.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// The two-part identifier under which an intermediate artifact is cached.
///
/// Decoupled from any physical path: a document `guide.rst` compiles to code
/// keyed `("doc", "guide")` no matter where its source or cache files live.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CodeKey {
    /// Artifact kind, e.g. `"doc"`.
    pub kind: String,
    /// Logical name within the kind.
    pub name: String,
}

impl CodeKey {
    /// Creates a key from a kind and a name.
    pub fn new(kind: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for CodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

/// Returns the logical name of a file: its file name without the last extension.
///
/// `"intro.rst"` and `"src/intro.rst"` both map to `"intro"`. A name without an
/// extension is returned unchanged.
pub fn name_prefix(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string())
}
