//! Activity log service: registration, persistence and populated reads.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info};

use super::errors::ActivityError;
use super::extension::{ACTIVITY_KIND, ActivityLogExtension, ActivityLogOptions, CAUSER, SUBJECT, fields};
use super::populate::{Populate, PopulatedActivity};
use super::record::{ActivityRecord, EntityRef};
use crate::models::{Model, ModelDef, ModelRegistry};
use crate::schema::RecordSchema;
use crate::store::{Document, DocumentId, DocumentQuery, DocumentStore};

type Result<T> = std::result::Result<T, ActivityError>;

/// Activity log bound to a document store.
///
/// Owns the store and the model registry. Every read of the activity
/// collection goes through [`Self::populate`], so callers always get
/// `subject` and `causer` resolved.
pub struct ActivityLog<S: DocumentStore> {
    store: S,
    registry: ModelRegistry,
    model: Arc<ModelDef>,
    options: ActivityLogOptions,
}

impl<S: DocumentStore> ActivityLog<S> {
    /// Register the activity model on an empty base schema.
    pub fn new(store: S, registry: ModelRegistry, options: ActivityLogOptions) -> Result<Self> {
        Self::with_schema(store, registry, options, RecordSchema::new())
    }

    /// Register the activity model on a caller-supplied base schema, which
    /// the activity extension augments.
    pub fn with_schema(
        store: S,
        mut registry: ModelRegistry,
        options: ActivityLogOptions,
        mut base: RecordSchema,
    ) -> Result<Self> {
        base.plugin(&ActivityLogExtension::from(&options));
        let model =
            registry.register(ModelDef::new(ACTIVITY_KIND, options.collection.clone(), base))?;

        debug!(
            collection = %model.collection,
            default_log = %options.default_log_name,
            kinds = registry.len(),
            "activity log registered"
        );

        Ok(Self { store, registry, model, options })
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn schema(&self) -> &RecordSchema {
        &self.model.schema
    }

    pub fn options(&self) -> &ActivityLogOptions {
        &self.options
    }

    pub fn default_log_name(&self) -> &str {
        &self.options.default_log_name
    }

    /// A fresh, unsaved record in the default log.
    pub fn new_activity(&self) -> ActivityRecord {
        ActivityRecord::new(self.options.default_log_name.clone())
    }

    /// Model for a registered entity kind.
    pub fn model(&self, kind: &str) -> Result<Model<'_, S>> {
        Ok(Model::new(&self.store, self.registry.resolve(kind)?))
    }

    /// Model for the activity collection itself. Reads through it are not
    /// populated.
    pub fn activities(&self) -> Model<'_, S> {
        Model::new(&self.store, Arc::clone(&self.model))
    }

    /// Persist a record, inserting it the first time and updating it after.
    ///
    /// On success the record picks up its id, timestamps and defaults.
    /// Fails with [`ActivityError::UnknownKind`] before writing anything when
    /// the subject or causer kind is not registered.
    pub fn save(&self, record: &mut ActivityRecord) -> Result<()> {
        for reference in [record.subject_ref(), record.causer_ref()].into_iter().flatten() {
            if !self.registry.is_known(&reference.kind) {
                return Err(ActivityError::UnknownKind(reference.kind.clone()));
            }
        }

        let mut doc = record.to_document();
        self.activities().save(&mut doc)?;

        debug!(
            id = ?doc.id,
            log = record.log_name(),
            subject = ?record.subject_ref(),
            causer = ?record.causer_ref(),
            "activity saved"
        );

        *record = ActivityRecord::from_document(doc)?;
        Ok(())
    }

    /// Resolve `subject` and `causer` for a record, saved or not.
    pub fn populate(&self, record: ActivityRecord) -> Result<PopulatedActivity> {
        let doc = record.to_document();
        let (subject, causer) = self.resolve_relations(&doc)?;
        Ok(PopulatedActivity { record, subject, causer })
    }

    fn populate_document(&self, doc: Document) -> Result<PopulatedActivity> {
        let (subject, causer) = self.resolve_relations(&doc)?;
        let record = ActivityRecord::from_document(doc)?;
        Ok(PopulatedActivity { record, subject, causer })
    }

    fn resolve_relations(&self, doc: &Document) -> Result<(Option<Document>, Option<Document>)> {
        let populate = Populate::new(&self.store, &self.registry);
        let schema = self.schema();

        let subject = match schema.relation(SUBJECT) {
            Some(relation) => populate.resolve(doc, relation)?,
            None => None,
        };
        let causer = match schema.relation(CAUSER) {
            Some(relation) => populate.resolve(doc, relation)?,
            None => None,
        };
        Ok((subject, causer))
    }

    pub fn find_by_id(&self, id: &DocumentId) -> Result<Option<PopulatedActivity>> {
        self.activities()
            .find_by_id(id)?
            .map(|doc| self.populate_document(doc))
            .transpose()
    }

    pub fn find_one(&self, query: &DocumentQuery) -> Result<Option<PopulatedActivity>> {
        self.activities()
            .find_one(query)?
            .map(|doc| self.populate_document(doc))
            .transpose()
    }

    pub fn find(&self, query: &DocumentQuery) -> Result<Vec<PopulatedActivity>> {
        self.activities()
            .find(query)?
            .into_iter()
            .map(|doc| self.populate_document(doc))
            .collect()
    }

    /// Most recently created activity.
    pub fn latest(&self) -> Result<Option<PopulatedActivity>> {
        self.find_one(&DocumentQuery::new().newest_first())
    }

    /// Activities in a named log, newest first.
    pub fn in_log(&self, log_name: &str) -> Result<Vec<PopulatedActivity>> {
        self.find(&DocumentQuery::new().filter(fields::LOG_NAME, log_name).newest_first())
    }

    /// Activities performed on the given entity, newest first.
    pub fn for_subject(&self, subject: &Document) -> Result<Vec<PopulatedActivity>> {
        let subject = EntityRef::from_document(subject, "for_subject")?;
        self.find(
            &DocumentQuery::new()
                .filter(fields::SUBJECT_TYPE, subject.kind)
                .filter(fields::SUBJECT_ID, subject.id.as_str())
                .newest_first(),
        )
    }

    /// Activities caused by the given entity, newest first.
    pub fn by_causer(&self, causer: &Document) -> Result<Vec<PopulatedActivity>> {
        let causer = EntityRef::from_document(causer, "by_causer")?;
        self.find(
            &DocumentQuery::new()
                .filter(fields::CAUSER_TYPE, causer.kind)
                .filter(fields::CAUSER_ID, causer.id.as_str())
                .newest_first(),
        )
    }

    /// Delete activities created more than `days` days ago.
    ///
    /// A cutoff earlier than the representable range clamps to the earliest
    /// date, which deletes nothing.
    pub fn prune(&self, days: u32) -> Result<usize> {
        let cutoff = Duration::try_days(i64::from(days))
            .and_then(|age| Utc::now().checked_sub_signed(age))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        self.prune_before(cutoff)
    }

    /// Delete activities created before `cutoff`.
    pub fn prune_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let removed = self.activities().delete(&DocumentQuery::new().created_before(cutoff))?;
        info!(removed, %cutoff, "pruned activities");
        Ok(removed)
    }
}
