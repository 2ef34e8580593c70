//! A model binds a registered definition to a store.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use thiserror::Error;

use super::registry::ModelDef;
use crate::schema::SchemaError;
use crate::store::{Document, DocumentId, DocumentQuery, DocumentStore, StoreError};

#[derive(Debug, Error)]
pub enum ModelError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("document of kind '{found}' cannot be saved as '{expected}'")]
    KindMismatch { expected: String, found: String },
}

/// Typed access to one collection: defaults, validation and timestamps are
/// applied on save according to the model's schema.
pub struct Model<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    def: Arc<ModelDef>,
}

impl<'a, S: DocumentStore + ?Sized> Model<'a, S> {
    pub fn new(store: &'a S, def: Arc<ModelDef>) -> Self {
        Self { store, def }
    }

    pub fn def(&self) -> &ModelDef {
        &self.def
    }

    pub fn kind(&self) -> &str {
        &self.def.kind
    }

    pub fn collection(&self) -> &str {
        &self.def.collection
    }

    /// An unsaved document of this kind with schema defaults filled in.
    pub fn build(&self) -> Document {
        let mut doc = Document::new(self.def.kind.clone());
        self.def.schema.apply_defaults(&mut doc);
        doc
    }

    /// Build a document from the given fields and save it.
    pub fn create(&self, fields: Map<String, Value>) -> Result<Document, ModelError> {
        let mut doc = self.build();
        doc.fields.extend(fields);
        self.save(&mut doc)?;
        Ok(doc)
    }

    /// Apply defaults, validate and stamp the document, then hand it to the
    /// store. The caller's document is only updated once the store accepts it.
    pub fn save(&self, doc: &mut Document) -> Result<(), ModelError> {
        if doc.kind != self.def.kind {
            return Err(ModelError::KindMismatch {
                expected: self.def.kind.clone(),
                found: doc.kind.clone(),
            });
        }

        let mut staged = doc.clone();
        self.def.schema.apply_defaults(&mut staged);
        self.def.schema.validate(&staged)?;

        if self.def.schema.timestamps() {
            let now = Utc::now();
            if staged.created_at.is_none() {
                staged.created_at = Some(now);
            }
            staged.updated_at = Some(now);
        }

        self.store.save(&self.def.collection, &mut staged)?;
        *doc = staged;
        Ok(())
    }

    pub fn find_by_id(&self, id: &DocumentId) -> Result<Option<Document>, ModelError> {
        Ok(self.store.find_by_id(&self.def.collection, id)?)
    }

    pub fn find(&self, query: &DocumentQuery) -> Result<Vec<Document>, ModelError> {
        Ok(self.store.find(&self.def.collection, query)?)
    }

    pub fn find_one(&self, query: &DocumentQuery) -> Result<Option<Document>, ModelError> {
        Ok(self.store.find_one(&self.def.collection, query)?)
    }

    pub fn delete(&self, query: &DocumentQuery) -> Result<usize, ModelError> {
        Ok(self.store.delete(&self.def.collection, query)?)
    }

    pub fn count(&self, query: &DocumentQuery) -> Result<usize, ModelError> {
        Ok(self.store.count(&self.def.collection, query)?)
    }
}
