//! Schema plugin that turns a record type into an activity log.

use crate::config::types::ActivitySettings;
use crate::schema::{FieldSchema, FieldType, RecordSchema, RelationSchema, SchemaPlugin};

/// Kind name activity documents are registered under.
pub const ACTIVITY_KIND: &str = "Activity";

/// Name of the relation to the entity an activity was performed on.
pub const SUBJECT: &str = "subject";

/// Name of the relation to the actor responsible for an activity.
pub const CAUSER: &str = "causer";

/// Stored field names.
pub mod fields {
    pub const LOG_NAME: &str = "logName";
    pub const DESCRIPTION: &str = "description";
    pub const SUBJECT_ID: &str = "subjectId";
    pub const SUBJECT_TYPE: &str = "subjectType";
    pub const CAUSER_ID: &str = "causerId";
    pub const CAUSER_TYPE: &str = "causerType";
    pub const PROPERTIES: &str = "properties";
}

/// Options accepted when registering the activity log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivityLogOptions {
    /// Log name used when a record does not pick one.
    pub default_log_name: String,
    /// Collection activity documents are stored in.
    pub collection: String,
}

impl Default for ActivityLogOptions {
    fn default() -> Self {
        Self { default_log_name: "default".to_string(), collection: "activities".to_string() }
    }
}

impl From<&ActivitySettings> for ActivityLogOptions {
    fn from(settings: &ActivitySettings) -> Self {
        Self {
            default_log_name: settings.default_log_name.clone(),
            collection: settings.collection.clone(),
        }
    }
}

/// Adds the activity fields, timestamps and the `subject`/`causer`
/// relations to a schema.
#[derive(Debug, Clone)]
pub struct ActivityLogExtension {
    default_log_name: String,
}

impl ActivityLogExtension {
    pub fn new(default_log_name: impl Into<String>) -> Self {
        Self { default_log_name: default_log_name.into() }
    }

    pub fn default_log_name(&self) -> &str {
        &self.default_log_name
    }
}

impl From<&ActivityLogOptions> for ActivityLogExtension {
    fn from(options: &ActivityLogOptions) -> Self {
        Self::new(options.default_log_name.clone())
    }
}

impl SchemaPlugin for ActivityLogExtension {
    fn apply(&self, schema: &mut RecordSchema) {
        schema
            .add_field(
                fields::LOG_NAME,
                FieldSchema::new(FieldType::String)
                    .with_default(self.default_log_name.clone())
                    .required(),
            )
            .add_field(fields::DESCRIPTION, FieldSchema::new(FieldType::String))
            .add_field(fields::SUBJECT_ID, FieldSchema::new(FieldType::Identifier))
            .add_field(fields::SUBJECT_TYPE, FieldSchema::new(FieldType::String))
            .add_field(fields::CAUSER_ID, FieldSchema::new(FieldType::Identifier))
            .add_field(fields::CAUSER_TYPE, FieldSchema::new(FieldType::String))
            .add_field(fields::PROPERTIES, FieldSchema::new(FieldType::Mapping))
            .set_timestamps(true)
            .add_relation(RelationSchema::new(SUBJECT, fields::SUBJECT_ID, fields::SUBJECT_TYPE))
            .add_relation(RelationSchema::new(CAUSER, fields::CAUSER_ID, fields::CAUSER_TYPE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_augments_schema() {
        let mut schema = RecordSchema::new();
        schema.add_field("ip", FieldSchema::new(FieldType::String));
        schema.plugin(&ActivityLogExtension::new("audit"));

        assert!(schema.timestamps());
        assert!(schema.field("ip").is_some());
        assert_eq!(
            schema.field(fields::LOG_NAME).unwrap().default,
            Some(serde_json::Value::from("audit"))
        );
        assert_eq!(schema.field(fields::PROPERTIES).unwrap().field_type, FieldType::Mapping);

        let subject = schema.relation(SUBJECT).unwrap();
        assert_eq!(subject.id_field, "subjectId");
        assert_eq!(subject.kind_field, "subjectType");
        assert_eq!(schema.relation(CAUSER).unwrap().kind_field, "causerType");
    }

    #[test]
    fn test_options_default() {
        let options = ActivityLogOptions::default();
        assert_eq!(options.default_log_name, "default");
        assert_eq!(options.collection, "activities");
        assert_eq!(ActivityLogExtension::from(&options).default_log_name(), "default");
    }
}
