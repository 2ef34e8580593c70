//! Resolution of polymorphic relations on read.

use tracing::{debug, warn};

use super::errors::ActivityError;
use super::record::ActivityRecord;
use crate::models::ModelRegistry;
use crate::schema::RelationSchema;
use crate::store::{Document, DocumentId, DocumentStore};

/// An activity with its `subject` and `causer` resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct PopulatedActivity {
    pub record: ActivityRecord,
    pub subject: Option<Document>,
    pub causer: Option<Document>,
}

impl PopulatedActivity {
    pub fn record(&self) -> &ActivityRecord {
        &self.record
    }

    /// The entity the activity was performed on, if any and if it still exists.
    pub fn subject(&self) -> Option<&Document> {
        self.subject.as_ref()
    }

    /// The actor responsible for the activity, if any and if it still exists.
    pub fn causer(&self) -> Option<&Document> {
        self.causer.as_ref()
    }

    pub fn into_record(self) -> ActivityRecord {
        self.record
    }
}

/// Read-path step that resolves relations declared on a schema.
///
/// The target collection of each relation is looked up from the document's
/// kind field through the registry, so it is only known per document.
pub struct Populate<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    registry: &'a ModelRegistry,
}

impl<'a, S: DocumentStore + ?Sized> Populate<'a, S> {
    pub fn new(store: &'a S, registry: &'a ModelRegistry) -> Self {
        Self { store, registry }
    }

    /// Resolve one relation of a document.
    ///
    /// Returns `None` when the reference is unset or points at a document
    /// that no longer exists. An unregistered kind is an error.
    pub fn resolve(
        &self,
        doc: &Document,
        relation: &RelationSchema,
    ) -> Result<Option<Document>, ActivityError> {
        let (Some(kind), Some(id)) =
            (doc.get_str(&relation.kind_field), doc.get_str(&relation.id_field))
        else {
            return Ok(None);
        };

        let collection = self
            .registry
            .collection_for(kind)
            .ok_or_else(|| ActivityError::UnknownKind(kind.to_string()))?;

        debug!(relation = %relation.name, kind, id, collection, "resolving relation");
        let found = self.store.find_by_id(collection, &DocumentId::from(id))?;
        if found.is_none() {
            warn!(relation = %relation.name, kind, id, "dangling reference");
        }
        Ok(found)
    }
}
