//! Registry mapping kind names to their collections and schemas.

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;

use crate::schema::RecordSchema;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("duplicate model definition: {0}")]
    Duplicate(String),

    #[error("unknown model kind: {0}")]
    UnknownKind(String),

    #[error("model kind must not be empty")]
    EmptyKind,
}

/// A registered model: the kind name, the collection holding its documents,
/// and the schema applied when saving them.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDef {
    pub kind: String,
    pub collection: String,
    pub schema: Arc<RecordSchema>,
}

impl ModelDef {
    pub fn new(
        kind: impl Into<String>,
        collection: impl Into<String>,
        schema: RecordSchema,
    ) -> Self {
        Self { kind: kind.into(), collection: collection.into(), schema: Arc::new(schema) }
    }

    /// A model with an empty schema: no defaults, no validation, no timestamps.
    pub fn schemaless(kind: impl Into<String>, collection: impl Into<String>) -> Self {
        Self::new(kind, collection, RecordSchema::new())
    }
}

/// Registry of all known models.
///
/// Polymorphic relations are resolved through it: a stored kind name is looked
/// up here to find the collection the referenced document lives in.
#[derive(Debug, Default, Clone)]
pub struct ModelRegistry {
    models: HashMap<String, Arc<ModelDef>>,
}

impl ModelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry of schemaless models from `(kind, collection)` pairs.
    pub fn from_collections<I, K, C>(pairs: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (K, C)>,
        K: Into<String>,
        C: Into<String>,
    {
        let mut registry = Self::new();
        for (kind, collection) in pairs {
            registry.register(ModelDef::schemaless(kind, collection))?;
        }
        Ok(registry)
    }

    /// Register a model definition.
    pub fn register(&mut self, def: ModelDef) -> Result<Arc<ModelDef>, RegistryError> {
        if def.kind.is_empty() {
            return Err(RegistryError::EmptyKind);
        }
        if self.models.contains_key(&def.kind) {
            return Err(RegistryError::Duplicate(def.kind));
        }

        let def = Arc::new(def);
        self.models.insert(def.kind.clone(), Arc::clone(&def));
        Ok(def)
    }

    /// Get a model definition by kind.
    pub fn get(&self, kind: &str) -> Option<Arc<ModelDef>> {
        self.models.get(kind).cloned()
    }

    /// Like [`Self::get`], failing on unknown kinds.
    pub fn resolve(&self, kind: &str) -> Result<Arc<ModelDef>, RegistryError> {
        self.get(kind).ok_or_else(|| RegistryError::UnknownKind(kind.to_string()))
    }

    /// Collection that holds documents of the given kind.
    pub fn collection_for(&self, kind: &str) -> Option<&str> {
        self.models.get(kind).map(|def| def.collection.as_str())
    }

    pub fn is_known(&self, kind: &str) -> bool {
        self.models.contains_key(kind)
    }

    /// List all registered kinds, sorted.
    pub fn kinds(&self) -> Vec<&str> {
        let mut kinds: Vec<&str> = self.models.keys().map(String::as_str).collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_registry() {
        let registry = ModelRegistry::new();
        assert!(registry.is_empty());
        assert!(!registry.is_known("Post"));
        assert_eq!(registry.collection_for("Post"), None);
    }

    #[test]
    fn test_register_and_lookup() {
        let mut registry = ModelRegistry::new();
        registry.register(ModelDef::schemaless("Post", "posts")).unwrap();

        assert!(registry.is_known("Post"));
        assert_eq!(registry.collection_for("Post"), Some("posts"));
        assert_eq!(registry.resolve("Post").unwrap().collection, "posts");
    }

    #[test]
    fn test_kind_lookup_is_case_sensitive() {
        let registry = ModelRegistry::from_collections([("Post", "posts")]).unwrap();
        assert!(!registry.is_known("post"));
    }

    #[test]
    fn test_duplicate_kind() {
        let mut registry = ModelRegistry::new();
        registry.register(ModelDef::schemaless("Post", "posts")).unwrap();

        let result = registry.register(ModelDef::schemaless("Post", "articles"));
        assert_eq!(result.unwrap_err(), RegistryError::Duplicate("Post".into()));
    }

    #[test]
    fn test_unknown_and_empty_kind() {
        let mut registry = ModelRegistry::new();
        assert_eq!(
            registry.resolve("Ghost").unwrap_err(),
            RegistryError::UnknownKind("Ghost".into())
        );
        assert_eq!(
            registry.register(ModelDef::schemaless("", "x")).unwrap_err(),
            RegistryError::EmptyKind
        );
    }

    #[test]
    fn test_from_collections_lists_kinds() {
        let registry =
            ModelRegistry::from_collections([("User", "users"), ("Post", "posts")]).unwrap();
        assert_eq!(registry.kinds(), vec!["Post", "User"]);
        assert_eq!(registry.len(), 2);
    }
}
