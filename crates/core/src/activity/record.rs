//! Activity records and their fluent builder.

use std::fmt;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use super::errors::ActivityError;
use super::extension::{ACTIVITY_KIND, CAUSER, SUBJECT, fields};
use super::service::ActivityLog;
use crate::store::{Document, DocumentId, DocumentStore};

type Result<T> = std::result::Result<T, ActivityError>;

/// Reference to a stored entity: its kind name and id.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntityRef {
    pub kind: String,
    pub id: DocumentId,
}

impl EntityRef {
    pub fn new(kind: impl Into<String>, id: impl Into<DocumentId>) -> Self {
        Self { kind: kind.into(), id: id.into() }
    }

    /// Reference a document, which must have been saved and carry a kind.
    pub fn from_document(doc: &Document, method: &'static str) -> Result<Self> {
        if doc.kind.is_empty() {
            return Err(ActivityError::InvalidArgument {
                method,
                reason: "document has no kind".to_string(),
            });
        }
        match &doc.id {
            Some(id) => Ok(Self::new(doc.kind.clone(), id.clone())),
            None => Err(ActivityError::InvalidArgument {
                method,
                reason: format!("{} document has not been saved", doc.kind),
            }),
        }
    }
}

impl fmt::Display for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Argument of [`ActivityRecord::with`]: a whole mapping replaces the
/// properties, a `(key, value)` pair is merged into them.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyUpdate {
    Replace(Map<String, Value>),
    Merge(String, Value),
}

impl From<Map<String, Value>> for PropertyUpdate {
    fn from(properties: Map<String, Value>) -> Self {
        Self::Replace(properties)
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for PropertyUpdate {
    fn from(pairs: [(K, V); N]) -> Self {
        Self::Replace(pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<Value>> From<(K, V)> for PropertyUpdate {
    fn from((key, value): (K, V)) -> Self {
        Self::Merge(key.into(), value.into())
    }
}

/// A single activity log entry.
///
/// Builder methods mutate the record in place and return it so calls chain:
///
/// ```no_run
/// # use activitylog_core::activity::{ActivityLog, ActivityLogOptions};
/// # use activitylog_core::models::ModelRegistry;
/// # use activitylog_core::store::{Document, MemoryStore};
/// # fn main() -> Result<(), activitylog_core::activity::ActivityError> {
/// # let log = ActivityLog::new(MemoryStore::new(), ModelRegistry::new(), ActivityLogOptions::default())?;
/// # let post = Document::new("Post");
/// # let user = Document::new("User");
/// log.new_activity()
///     .performed_on(&post)?
///     .caused_by(&user)?
///     .with_property("ip", "127.0.0.1")
///     .log(&log, "edited post")?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    id: Option<DocumentId>,
    log_name: String,
    description: Option<String>,
    subject: Option<EntityRef>,
    causer: Option<EntityRef>,
    properties: Option<Map<String, Value>>,
    extra: Map<String, Value>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl ActivityRecord {
    /// Create an unsaved record in the given log.
    pub fn new(log_name: impl Into<String>) -> Self {
        Self {
            id: None,
            log_name: log_name.into(),
            description: None,
            subject: None,
            causer: None,
            properties: None,
            extra: Map::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn id(&self) -> Option<&DocumentId> {
        self.id.as_ref()
    }

    pub fn log_name(&self) -> &str {
        &self.log_name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn subject_ref(&self) -> Option<&EntityRef> {
        self.subject.as_ref()
    }

    pub fn subject_id(&self) -> Option<&DocumentId> {
        self.subject.as_ref().map(|r| &r.id)
    }

    pub fn subject_type(&self) -> Option<&str> {
        self.subject.as_ref().map(|r| r.kind.as_str())
    }

    pub fn causer_ref(&self) -> Option<&EntityRef> {
        self.causer.as_ref()
    }

    pub fn causer_id(&self) -> Option<&DocumentId> {
        self.causer.as_ref().map(|r| &r.id)
    }

    pub fn causer_type(&self) -> Option<&str> {
        self.causer.as_ref().map(|r| r.kind.as_str())
    }

    pub fn properties(&self) -> Option<&Map<String, Value>> {
        self.properties.as_ref()
    }

    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.created_at
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// A stored field outside the activity fields (added by a base schema).
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.extra.get(key)
    }

    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Put the record in a named log.
    pub fn use_log(&mut self, log_name: impl Into<String>) -> &mut Self {
        self.log_name = log_name.into();
        self
    }

    /// Alias of [`Self::use_log`].
    pub fn r#use(&mut self, log_name: impl Into<String>) -> &mut Self {
        self.use_log(log_name)
    }

    /// Record the entity the activity was performed on.
    ///
    /// `None` leaves the subject unset. A document that was never saved, or
    /// that has no kind, is rejected and the record is left unchanged.
    pub fn performed_on<'d>(
        &mut self,
        subject: impl Into<Option<&'d Document>>,
    ) -> Result<&mut Self> {
        if let Some(doc) = subject.into() {
            self.subject = Some(EntityRef::from_document(doc, "performed_on")?);
        }
        Ok(self)
    }

    /// Alias of [`Self::performed_on`].
    pub fn on<'d>(&mut self, subject: impl Into<Option<&'d Document>>) -> Result<&mut Self> {
        self.performed_on(subject)
    }

    /// Record who or what caused the activity. Same rules as
    /// [`Self::performed_on`].
    pub fn caused_by<'d>(&mut self, causer: impl Into<Option<&'d Document>>) -> Result<&mut Self> {
        if let Some(doc) = causer.into() {
            self.causer = Some(EntityRef::from_document(doc, "caused_by")?);
        }
        Ok(self)
    }

    /// Alias of [`Self::caused_by`].
    pub fn by<'d>(&mut self, causer: impl Into<Option<&'d Document>>) -> Result<&mut Self> {
        self.caused_by(causer)
    }

    /// Replace the properties wholesale.
    pub fn with_properties<K, V>(&mut self, properties: impl IntoIterator<Item = (K, V)>) -> &mut Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.properties =
            Some(properties.into_iter().map(|(k, v)| (k.into(), v.into())).collect());
        self
    }

    /// Merge one property, creating the mapping if needed.
    pub fn with_property(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.properties.get_or_insert_with(Map::new).insert(key.into(), value.into());
        self
    }

    /// Alias of [`Self::with_properties`] (for a mapping) and
    /// [`Self::with_property`] (for a `(key, value)` pair).
    pub fn with(&mut self, update: impl Into<PropertyUpdate>) -> &mut Self {
        match update.into() {
            PropertyUpdate::Replace(properties) => self.with_properties(properties),
            PropertyUpdate::Merge(key, value) => self.with_property(key, value),
        }
    }

    /// Value of a property.
    ///
    /// Fails with [`ActivityError::PropertiesUnset`] when no properties were
    /// ever set; returns `Ok(None)` when they were but the key is missing.
    pub fn get_extra_property(&self, key: &str) -> Result<Option<&Value>> {
        self.properties
            .as_ref()
            .map(|properties| properties.get(key))
            .ok_or(ActivityError::PropertiesUnset)
    }

    /// Set the description and persist the record.
    ///
    /// The first call inserts the record; later calls update the same
    /// identity. Store failures are returned unchanged.
    pub fn log<S: DocumentStore>(
        &mut self,
        activities: &ActivityLog<S>,
        description: impl Into<String>,
    ) -> Result<&mut Self> {
        self.description = Some(description.into());
        activities.save(self)?;
        Ok(self)
    }

    pub(crate) fn to_document(&self) -> Document {
        let mut doc = Document::new(ACTIVITY_KIND);
        doc.id = self.id.clone();
        doc.created_at = self.created_at;
        doc.updated_at = self.updated_at;
        doc.fields = self.extra.clone();

        doc.set(fields::LOG_NAME, self.log_name.clone());
        if let Some(description) = &self.description {
            doc.set(fields::DESCRIPTION, description.clone());
        }
        if let Some(subject) = &self.subject {
            doc.set(fields::SUBJECT_ID, subject.id.as_str());
            doc.set(fields::SUBJECT_TYPE, subject.kind.clone());
        }
        if let Some(causer) = &self.causer {
            doc.set(fields::CAUSER_ID, causer.id.as_str());
            doc.set(fields::CAUSER_TYPE, causer.kind.clone());
        }
        if let Some(properties) = &self.properties {
            doc.set(fields::PROPERTIES, Value::Object(properties.clone()));
        }
        doc
    }

    pub(crate) fn from_document(mut doc: Document) -> Result<Self> {
        let log_name = match take(&mut doc, fields::LOG_NAME) {
            Some(Value::String(name)) => name,
            Some(other) => {
                return Err(ActivityError::InvalidData(format!("logName is not a string: {}", other)));
            }
            None => return Err(ActivityError::InvalidData("missing logName".to_string())),
        };

        let description = match take(&mut doc, fields::DESCRIPTION) {
            None => None,
            Some(Value::String(d)) => Some(d),
            Some(other) => {
                return Err(ActivityError::InvalidData(format!(
                    "description is not a string: {}",
                    other
                )));
            }
        };

        let subject = take_ref(&mut doc, SUBJECT, fields::SUBJECT_ID, fields::SUBJECT_TYPE)?;
        let causer = take_ref(&mut doc, CAUSER, fields::CAUSER_ID, fields::CAUSER_TYPE)?;

        let properties = match take(&mut doc, fields::PROPERTIES) {
            None => None,
            Some(Value::Object(map)) => Some(map),
            Some(other) => {
                return Err(ActivityError::InvalidData(format!(
                    "properties must be a mapping, got {}",
                    other
                )));
            }
        };

        Ok(Self {
            id: doc.id,
            log_name,
            description,
            subject,
            causer,
            properties,
            extra: doc.fields,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        })
    }
}

/// Remove a field, treating `null` as absent.
fn take(doc: &mut Document, field: &str) -> Option<Value> {
    doc.remove(field).filter(|v| !v.is_null())
}

fn take_ref(
    doc: &mut Document,
    relation: &str,
    id_field: &str,
    kind_field: &str,
) -> Result<Option<EntityRef>> {
    match (take(doc, id_field), take(doc, kind_field)) {
        (None, None) => Ok(None),
        (Some(Value::String(id)), Some(Value::String(kind))) => Ok(Some(EntityRef::new(kind, id))),
        _ => Err(ActivityError::InvalidData(format!(
            "{} reference needs string '{}' and '{}'",
            relation, id_field, kind_field
        ))),
    }
}
