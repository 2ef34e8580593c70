#![allow(clippy::module_name_repetitions)]

//! Activity logging for document-backed models.
//!
//! Records *who* did *what* to *which* entity: each activity carries a log
//! name, a description, polymorphic `subject` and `causer` references and
//! free-form properties, and both references are resolved on every read.

pub mod activity;
pub mod config;
pub mod models;
pub mod schema;
pub mod store;

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
