//! Record schemas for documents.
//!
//! A [`RecordSchema`] names the fields of a record type, whether the store
//! stamps `created_at`/`updated_at`, and which polymorphic relations can be
//! resolved from it. Plugins implementing [`SchemaPlugin`] augment a base
//! schema; the activity log is one such plugin.

pub mod types;
pub mod validation;

pub use types::{FieldSchema, FieldType, RecordSchema, RelationSchema, SchemaPlugin};
pub use validation::SchemaError;
