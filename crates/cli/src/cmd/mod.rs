pub mod add;
pub mod clean;
pub mod common;
pub mod doctor;
pub mod list;
pub mod log;
pub mod output;
pub mod show;
