//! Model definitions and the kind registry.

pub mod model;
pub mod registry;

pub use model::{Model, ModelError};
pub use registry::{ModelDef, ModelRegistry, RegistryError};
