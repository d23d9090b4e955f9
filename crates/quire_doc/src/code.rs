use quire_cache::{CacheError, CacheStore};
use quire_common::CodeKey;
use serde::{Deserialize, Serialize};

/// Cache kind under which document code is stored.
pub const DOC_KIND: &str = "doc";

/// One piece of a document's rendered body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Fragment {
    /// A finished line of HTML.
    Html(String),
    /// Placeholder for the body of another document, resolved at link time.
    Include(String),
}

/// The cached payload of a document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBody {
    /// First section title, HTML-escaped, used as the page title.
    pub title: Option<String>,
    /// Body fragments in document order.
    pub fragments: Vec<Fragment>,
}

/// Intermediate code produced from one parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Code {
    /// Cache kind, always [`DOC_KIND`] for documents.
    pub kind: String,
    /// Logical name shared with the source document and its output target.
    pub name: String,
    /// The payload written to the cache.
    pub body: CodeBody,
    /// Code the target named after this code is assembled from, itself first.
    pub dependencies: Vec<CodeKey>,
}

impl Code {
    /// The key this code is cached under.
    pub fn key(&self) -> CodeKey {
        CodeKey::new(&self.kind, &self.name)
    }

    /// Persists the payload, its timestamp and the target's dependency list.
    ///
    /// The dependency list of the target named `self.name` is replaced, not
    /// extended. The caller decides when to [`CacheStore::save`].
    pub fn write_cache(&self, store: &mut CacheStore) -> Result<(), CacheError> {
        let payload = bincode::serde::encode_to_vec(&self.body, bincode::config::standard())
            .map_err(|e| CacheError::Serialization {
                reason: e.to_string(),
            })?;
        let timestamp = store.write_code(&self.key(), &payload)?;
        store.record_code_timestamp(&self.kind, &self.name, timestamp);
        store.set_dependencies(&self.name, self.dependencies.clone());
        Ok(())
    }

    /// Loads a cached payload, or `None` if it is missing or undecodable.
    pub fn read_cache(store: &CacheStore, key: &CodeKey) -> Option<CodeBody> {
        let payload = store.read_code(key)?;
        bincode::serde::decode_from_slice(&payload, bincode::config::standard())
            .ok()
            .map(|(body, _)| body)
    }
}
