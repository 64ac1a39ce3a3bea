use dashmap::DashMap;
use metablox_core::Did;

use crate::document::DidDocument;

/// Pre-fetched DID Documents consulted before any chain lookup.
#[derive(Debug, Default)]
pub struct DocumentCache {
    documents: DashMap<Did, DidDocument>,
}

impl DocumentCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a document under its own DID, returning any previous entry.
    pub fn insert(&self, document: DidDocument) -> Option<DidDocument> {
        self.documents.insert(document.id.clone(), document)
    }

    pub fn get(&self, did: &Did) -> Option<DidDocument> {
        self.documents.get(did).map(|d| d.value().clone())
    }

    pub fn contains(&self, did: &Did) -> bool {
        self.documents.contains_key(did)
    }

    pub fn remove(&self, did: &Did) -> Option<DidDocument> {
        self.documents.remove(did).map(|(_, d)| d)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
