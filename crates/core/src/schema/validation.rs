//! Applying schemas to documents: defaults and validation.

use serde_json::Value;
use thiserror::Error;

use super::types::RecordSchema;
use crate::store::Document;

/// Errors raised when a document does not fit its schema.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SchemaError {
    /// A required field is missing.
    #[error("missing required field: {field}")]
    MissingRequired { field: String },

    /// Field value has wrong type.
    #[error("invalid type for field '{field}': expected {expected}, got {actual}")]
    TypeMismatch { field: String, expected: String, actual: String },

    /// Only one half of a relation's id/kind pair is set.
    #[error("relation '{relation}' needs both '{id_field}' and '{kind_field}' or neither")]
    IncompleteRelation { relation: String, id_field: String, kind_field: String },
}

impl RecordSchema {
    /// Fill in defaults for fields that are absent or null.
    pub fn apply_defaults(&self, doc: &mut Document) {
        for (name, field) in self.fields() {
            let Some(default) = &field.default else {
                continue;
            };
            if doc.get(name).is_none_or(Value::is_null) {
                doc.set(name, default.clone());
            }
        }
    }

    /// Check a document against the field types, required flags and
    /// relation pairs of this schema. Fields not declared are left alone.
    pub fn validate(&self, doc: &Document) -> Result<(), SchemaError> {
        for (name, field) in self.fields() {
            match doc.get(name) {
                None | Some(Value::Null) => {
                    if field.required {
                        return Err(SchemaError::MissingRequired { field: name.to_string() });
                    }
                }
                Some(value) => {
                    if !field.field_type.accepts(value) {
                        return Err(SchemaError::TypeMismatch {
                            field: name.to_string(),
                            expected: field.field_type.to_string(),
                            actual: value_type_name(value).to_string(),
                        });
                    }
                }
            }
        }

        for relation in self.relations() {
            let has_id = doc.get(&relation.id_field).is_some_and(|v| !v.is_null());
            let has_kind = doc.get(&relation.kind_field).is_some_and(|v| !v.is_null());
            if has_id != has_kind {
                return Err(SchemaError::IncompleteRelation {
                    relation: relation.name.clone(),
                    id_field: relation.id_field.clone(),
                    kind_field: relation.kind_field.clone(),
                });
            }
        }

        Ok(())
    }
}

fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "mapping",
    }
}
