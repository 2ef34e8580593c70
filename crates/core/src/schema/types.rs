//! Record schema definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type of a document field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// String value.
    String,
    /// Numeric value (integer or float).
    Number,
    /// Boolean value.
    Boolean,
    /// Opaque document identifier (stored as a string).
    Identifier,
    /// Free-form mapping of string keys to any values.
    Mapping,
    /// RFC 3339 datetime string.
    Datetime,
    /// Anything goes.
    Any,
}

impl FieldType {
    /// Get the display name for this field type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Identifier => "identifier",
            Self::Mapping => "mapping",
            Self::Datetime => "datetime",
            Self::Any => "any",
        }
    }

    /// Whether a non-null value fits this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String | Self::Identifier => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Mapping => value.is_object(),
            Self::Datetime => value
                .as_str()
                .is_some_and(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok()),
            Self::Any => true,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" | "str" => Ok(Self::String),
            "number" | "num" | "int" | "integer" | "float" => Ok(Self::Number),
            "boolean" | "bool" => Ok(Self::Boolean),
            "identifier" | "id" | "objectid" => Ok(Self::Identifier),
            "mapping" | "map" | "object" | "mixed" => Ok(Self::Mapping),
            "datetime" | "timestamp" => Ok(Self::Datetime),
            "any" => Ok(Self::Any),
            _ => Err(format!("unknown field type: {}", s)),
        }
    }
}

/// Schema definition for a single field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSchema {
    #[serde(rename = "type")]
    pub field_type: FieldType,

    #[serde(default)]
    pub required: bool,

    /// Value filled in when the field is absent on save.
    #[serde(default)]
    pub default: Option<Value>,

    #[serde(default)]
    pub description: Option<String>,
}

impl FieldSchema {
    pub fn new(field_type: FieldType) -> Self {
        Self { field_type, required: false, default: None, description: None }
    }

    pub fn with_default(mut self, default: impl Into<Value>) -> Self {
        self.default = Some(default.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A derived relation whose target kind is read from a sibling field.
///
/// The target collection is not known when the schema is defined: at
/// resolution time the value of `kind_field` names the kind, and the value of
/// `id_field` names the document within it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSchema {
    pub name: String,
    pub id_field: String,
    pub kind_field: String,
}

impl RelationSchema {
    pub fn new(
        name: impl Into<String>,
        id_field: impl Into<String>,
        kind_field: impl Into<String>,
    ) -> Self {
        Self { name: name.into(), id_field: id_field.into(), kind_field: kind_field.into() }
    }
}

/// Shape of a record type: its fields, timestamping and derived relations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSchema {
    fields: BTreeMap<String, FieldSchema>,
    timestamps: bool,
    relations: Vec<RelationSchema>,
}

impl RecordSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a field definition.
    pub fn add_field(&mut self, name: impl Into<String>, field: FieldSchema) -> &mut Self {
        self.fields.insert(name.into(), field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldSchema)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    /// Enable or disable automatic `created_at`/`updated_at` stamping.
    pub fn set_timestamps(&mut self, enabled: bool) -> &mut Self {
        self.timestamps = enabled;
        self
    }

    pub fn timestamps(&self) -> bool {
        self.timestamps
    }

    /// Declare a relation. A relation with the same name is replaced.
    pub fn add_relation(&mut self, relation: RelationSchema) -> &mut Self {
        self.relations.retain(|r| r.name != relation.name);
        self.relations.push(relation);
        self
    }

    pub fn relation(&self, name: &str) -> Option<&RelationSchema> {
        self.relations.iter().find(|r| r.name == name)
    }

    pub fn relations(&self) -> &[RelationSchema] {
        &self.relations
    }

    /// Run a plugin against this schema.
    pub fn plugin(&mut self, plugin: &dyn SchemaPlugin) -> &mut Self {
        plugin.apply(self);
        self
    }
}

/// Extension that augments a record schema.
pub trait SchemaPlugin {
    fn apply(&self, schema: &mut RecordSchema);
}
