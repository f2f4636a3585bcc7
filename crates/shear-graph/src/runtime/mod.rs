//! Platform runtime abstraction for shear.
//!
//! The graph builder never touches the filesystem directly. Every source load
//! goes through the [`Runtime`] trait, so hosts can serve modules from disk,
//! from memory, or from anywhere else.

pub mod native;

// Test utilities (available in test builds)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Result type for runtime operations
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors that can occur during runtime operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum RuntimeError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Other runtime error
    #[error("Runtime error: {0}")]
    Other(String),
}

/// Platform runtime trait
///
/// # Example
///
/// ```rust,ignore
/// use shear_graph::runtime::{Runtime, RuntimeError, RuntimeResult};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct MyRuntime;
///
/// #[async_trait]
/// impl Runtime for MyRuntime {
///     async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
///         std::fs::read(path).map_err(|e| RuntimeError::Io(e.to_string()))
///     }
///
///     fn get_cwd(&self) -> RuntimeResult<PathBuf> {
///         Ok(PathBuf::from("/"))
///     }
/// }
/// ```
#[async_trait]
pub trait Runtime: Send + Sync + std::fmt::Debug {
    /// Read the raw bytes of a module
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>>;

    /// Get the current working directory
    ///
    /// Relative base locations handed to the bundler are anchored here.
    fn get_cwd(&self) -> RuntimeResult<PathBuf>;
}
