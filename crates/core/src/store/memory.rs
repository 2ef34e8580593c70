//! In-process document store.

use std::collections::HashMap;
use std::sync::RwLock;

use super::types::{Document, DocumentId, DocumentQuery, Order};
use super::{DocumentStore, StoreError};

#[derive(Debug, Clone)]
struct Stored {
    seq: u64,
    doc: Document,
}

#[derive(Debug, Default)]
struct Collections {
    next_seq: u64,
    by_name: HashMap<String, Vec<Stored>>,
}

/// Document store backed by process memory.
///
/// Ties between equal creation timestamps are broken by insertion order,
/// matching [`super::SqliteStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: RwLock<Collections>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the collections that hold at least one document.
    pub fn collections(&self) -> Result<Vec<String>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        let mut names: Vec<String> = inner
            .by_name
            .iter()
            .filter(|(_, docs)| !docs.is_empty())
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        Ok(names)
    }
}

impl DocumentStore for MemoryStore {
    fn save(&self, collection: &str, doc: &mut Document) -> Result<(), StoreError> {
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;

        match doc.id.clone() {
            None => {
                let seq = inner.next_seq;
                inner.next_seq += 1;
                doc.id = Some(DocumentId::generate());
                inner
                    .by_name
                    .entry(collection.to_string())
                    .or_default()
                    .push(Stored { seq, doc: doc.clone() });
            }
            Some(id) => {
                let slot = inner
                    .by_name
                    .get_mut(collection)
                    .and_then(|docs| docs.iter_mut().find(|s| s.doc.id.as_ref() == Some(&id)))
                    .ok_or_else(|| StoreError::NotFound {
                        collection: collection.to_string(),
                        id: id.clone(),
                    })?;
                slot.doc = doc.clone();
            }
        }

        Ok(())
    }

    fn find_by_id(
        &self,
        collection: &str,
        id: &DocumentId,
    ) -> Result<Option<Document>, StoreError> {
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(inner.by_name.get(collection).and_then(|docs| {
            docs.iter().find(|s| s.doc.id.as_ref() == Some(id)).map(|s| s.doc.clone())
        }))
    }

    fn find(
        &self,
        collection: &str,
        query: &DocumentQuery,
    ) -> Result<Vec<Document>, StoreError> {
        query.validate()?;
        let inner = self.inner.read().map_err(|_| StoreError::Poisoned)?;

        let Some(docs) = inner.by_name.get(collection) else {
            return Ok(Vec::new());
        };

        let mut matched: Vec<&Stored> =
            docs.iter().filter(|s| query.matches(&s.doc)).collect();

        matched.sort_by_key(|s| (s.doc.created_at, s.seq));
        if query.order == Order::Newest {
            matched.reverse();
        }

        let limit = query.limit.unwrap_or(usize::MAX);
        Ok(matched.into_iter().take(limit).map(|s| s.doc.clone()).collect())
    }

    fn delete(&self, collection: &str, query: &DocumentQuery) -> Result<usize, StoreError> {
        query.validate()?;
        let mut inner = self.inner.write().map_err(|_| StoreError::Poisoned)?;

        let Some(docs) = inner.by_name.get_mut(collection) else {
            return Ok(0);
        };

        let before = docs.len();
        docs.retain(|s| !query.matches(&s.doc));
        Ok(before - docs.len())
    }
}
