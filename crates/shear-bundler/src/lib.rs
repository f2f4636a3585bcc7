#![cfg_attr(docsrs, feature(doc_cfg))]

//! # shear-bundler
//!
//! Concurrent chunk builds on top of the `shear-graph` foundation.
//!
//! Each declared chunk names one entry module. The bundler builds every
//! chunk's module graph concurrently, and generates each chunk as the
//! concatenation of its modules with unused imports removed.
//!
//! ## Quick Start
//!
//! ```no_run
//! use shear_bundler::BuildOptions;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let result = BuildOptions::chunks([("app", "./app.js"), ("admin", "./admin.js")])
//!     .parent("./src")
//!     .build()
//!     .await?;
//!
//! result.write_to("dist", true)?;
//! # Ok(()) }
//! ```
//!
//! ## From a config file
//!
//! ```no_run
//! use shear_bundler::BuildOptions;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = shear_config::discover()?;
//! let result = BuildOptions::from_config(&config)?.build().await?;
//!
//! for failure in result.failures() {
//!     eprintln!("{failure}");
//! }
//! # Ok(()) }
//! ```
//!
//! ## Logging
//!
//! The crate only emits `tracing` events. With the `logging` feature,
//! `init_logging` installs a compact subscriber, e.g.
//! `init_logging(LogLevel::Debug)` to see every registered module and
//! removed import.

mod build_executor;
pub mod chunk;
pub mod options;
pub mod output;
pub mod runtime;
mod writer;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

use std::sync::Arc;

pub use chunk::Chunk;
pub use options::{BuildOptions, ChunkSpec};
pub use output::{BuildResult, GeneratedChunk};
pub use runtime::BundlerRuntime;

pub use shear_config::{ConfigError, ShearConfig};
pub use shear_graph::{
    GraphError, GraphOptions, GraphStatistics, ModuleGraph, ModuleLocation, NativeRuntime,
    Runtime,
};

/// Error types for shear-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration provided.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Error loading or validating a config file.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A chunk's graph failed to build or generate.
    #[error("Chunk '{name}' failed: {source}")]
    Chunk {
        name: String,
        #[source]
        source: Arc<GraphError>,
    },

    /// One or more chunks failed; each entry is `(chunk name, message)`.
    #[error("{}", format_chunk_failures(.0))]
    ChunksFailed(Vec<(String, String)>),

    /// Generation was requested before the chunk was built.
    #[error("Chunk '{name}' has not been built")]
    NotBuilt { name: String },

    /// No chunk with this name was declared.
    #[error("Unknown chunk: {0}")]
    UnknownChunk(String),

    /// A chunk's build task panicked.
    #[error("Build task for chunk '{name}' panicked: {message}")]
    TaskPanicked { name: String, message: String },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),

    /// File write operation failed.
    #[error("Write failure: {0}")]
    WriteFailure(String),

    /// Output file already exists and overwrite is disabled.
    #[error("Output exists: {0}")]
    OutputExists(String),
}

fn format_chunk_failures(failures: &[(String, String)]) -> String {
    let mut message = format!("Build failed for {} chunk(s):", failures.len());
    for (name, error) in failures {
        message.push_str(&format!("\n  {name}: {error}"));
    }
    message
}

/// Result type for shear-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;
