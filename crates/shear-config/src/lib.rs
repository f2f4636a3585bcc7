//! # shear-config
//!
//! Declarative build configuration for shear: which chunks to build, from
//! which entry specifiers, resolved against which directory.
//!
//! ```json
//! { "chunks": { "app": "./app.js", "admin": "./admin.js" }, "parent": "/project/src/" }
//! ```
//!
//! Configs load from JSON, TOML or the `shear` field of a `package.json`.
//! Chunk order is the document order.

pub mod config;
pub mod discovery;
pub mod error;
pub mod validation;

// Re-export main types
pub use config::*;
pub use error::*;

pub use discovery::{ConfigDiscovery, discover};
pub use validation::{ConfigValidator, SchemaValidator, validate_schema};
