//! Document and query types shared by all stores.

use std::fmt;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::StoreError;

static FIELD_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Opaque identifier of a stored document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// A schemaless record as held by a document store.
///
/// `kind` is the model name the document belongs to (e.g. `"Post"`); the
/// registry maps it to the collection the document lives in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Option<DocumentId>,
    pub kind: String,
    #[serde(default)]
    pub fields: Map<String, Value>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Document {
    /// Create an unsaved document of the given kind.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            id: None,
            kind: kind.into(),
            fields: Map::new(),
            created_at: None,
            updated_at: None,
        }
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(key, value);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.fields.get(key).and_then(Value::as_str)
    }

    /// Whether this document can be referenced: it has been stored and
    /// carries a kind.
    pub fn is_persisted(&self) -> bool {
        self.id.is_some() && !self.kind.is_empty()
    }
}

/// Ordering of query results by creation time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Order {
    #[default]
    Oldest,
    Newest,
}

/// Query over a single collection.
///
/// Filters are equality matches on top-level scalar fields. A `null` filter
/// value matches documents where the field is absent or null.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentQuery {
    pub filters: Vec<(String, Value)>,
    pub created_before: Option<DateTime<Utc>>,
    pub order: Order,
    pub limit: Option<usize>,
}

impl DocumentQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((field.into(), value.into()));
        self
    }

    pub fn created_before(mut self, cutoff: DateTime<Utc>) -> Self {
        self.created_before = Some(cutoff);
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.order = Order::Newest;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check field names and filter values before a store runs the query.
    pub fn validate(&self) -> Result<(), StoreError> {
        for (field, value) in &self.filters {
            if !FIELD_NAME_RE.is_match(field) {
                return Err(StoreError::InvalidQuery(format!(
                    "invalid field name '{}'",
                    field
                )));
            }
            if value.is_object() || value.is_array() {
                return Err(StoreError::InvalidQuery(format!(
                    "filter on '{}' must be a scalar value",
                    field
                )));
            }
        }
        Ok(())
    }

    /// Whether a document satisfies the filters and the creation cutoff.
    pub fn matches(&self, doc: &Document) -> bool {
        let fields_match = self
            .filters
            .iter()
            .all(|(field, expected)| doc.get(field).unwrap_or(&Value::Null) == expected);

        let before_cutoff = match self.created_before {
            Some(cutoff) => doc.created_at.is_some_and(|created| created < cutoff),
            None => true,
        };

        fields_match && before_cutoff
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(DocumentId::generate(), DocumentId::generate());
    }

    #[test]
    fn test_document_is_persisted() {
        let mut doc = Document::new("Post");
        assert!(!doc.is_persisted());

        doc.id = Some(DocumentId::from("p1"));
        assert!(doc.is_persisted());

        doc.kind.clear();
        assert!(!doc.is_persisted());
    }

    #[test]
    fn test_query_matches_filters() {
        let doc = Document::new("Post").with_field("title", "hello").with_field("n", 3);

        assert!(DocumentQuery::new().filter("title", "hello").matches(&doc));
        assert!(!DocumentQuery::new().filter("title", "other").matches(&doc));
        assert!(DocumentQuery::new().filter("n", 3).matches(&doc));
        assert!(DocumentQuery::new().filter("missing", Value::Null).matches(&doc));
    }

    #[test]
    fn test_query_created_before_skips_unstamped() {
        let now = Utc::now();
        let mut doc = Document::new("Post");
        let query = DocumentQuery::new().created_before(now);

        assert!(!query.matches(&doc));

        doc.created_at = Some(now - Duration::days(1));
        assert!(query.matches(&doc));
    }

    #[test]
    fn test_validate_rejects_bad_field_names() {
        let query = DocumentQuery::new().filter("title'; DROP TABLE", "x");
        assert!(matches!(query.validate(), Err(StoreError::InvalidQuery(_))));

        let query = DocumentQuery::new().filter("meta", json!({"a": 1}));
        assert!(matches!(query.validate(), Err(StoreError::InvalidQuery(_))));

        assert!(DocumentQuery::new().filter("logName", "default").validate().is_ok());
    }
}
