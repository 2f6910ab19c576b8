//! Configuration module
//!
//! Loading and validation of light timing configuration from YAML files and
//! command-line overrides.

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{ConfigLoader, LoadResult, LoadWarning};
pub use schema::*;
pub use validation::{ValidationResult, Validator};
