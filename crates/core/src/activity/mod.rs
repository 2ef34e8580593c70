//! Activity logging over a document store.
//!
//! [`ActivityLogExtension`] augments a record schema with the activity
//! fields (log name, description, subject and causer references, properties)
//! and timestamps. [`ActivityLog`] registers that schema, persists
//! [`ActivityRecord`]s built with the fluent API, and resolves the
//! polymorphic `subject`/`causer` relations on every read.

mod errors;
mod extension;
mod populate;
mod record;
mod service;

pub use errors::ActivityError;
pub use extension::{
    ACTIVITY_KIND, ActivityLogExtension, ActivityLogOptions, CAUSER, SUBJECT, fields,
};
pub use populate::{Populate, PopulatedActivity};
pub use record::{ActivityRecord, EntityRef, PropertyUpdate};
pub use service::ActivityLog;
