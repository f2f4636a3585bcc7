//! Test utilities for shear-graph.
//!
//! - `TestRuntime`: an in-memory runtime that records how often each path is
//!   read, so tests can assert that a module was loaded exactly once.

use async_trait::async_trait;
use parking_lot::RwLock;
use path_clean::PathClean;
use rustc_hash::FxHashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::{Runtime, RuntimeError, RuntimeResult};

/// In-memory runtime for tests.
///
/// Files live in a map keyed by normalized absolute path. Optional per-read
/// latency makes concurrent traversals actually interleave.
#[derive(Debug, Clone, Default)]
pub struct TestRuntime {
    files: Arc<RwLock<FxHashMap<PathBuf, Vec<u8>>>>,
    reads: Arc<RwLock<FxHashMap<PathBuf, usize>>>,
    latency: Option<Duration>,
    cwd: PathBuf,
}

impl TestRuntime {
    pub fn new() -> Self {
        Self {
            cwd: PathBuf::from("/"),
            ..Self::default()
        }
    }

    /// Build a runtime from `(path, content)` pairs.
    pub fn with_files<P, C>(files: impl IntoIterator<Item = (P, C)>) -> Self
    where
        P: AsRef<Path>,
        C: Into<Vec<u8>>,
    {
        let runtime = Self::new();
        for (path, content) in files {
            runtime.add_file(path, content);
        }
        runtime
    }

    /// Delay every read by `latency`.
    pub fn latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn add_file(&self, path: impl AsRef<Path>, content: impl Into<Vec<u8>>) {
        self.files
            .write()
            .insert(path.as_ref().clean(), content.into());
    }

    /// Number of times `path` has been read.
    pub fn read_count(&self, path: impl AsRef<Path>) -> usize {
        self.reads
            .read()
            .get(&path.as_ref().clean())
            .copied()
            .unwrap_or(0)
    }

    /// Total number of reads across all paths.
    pub fn total_reads(&self) -> usize {
        self.reads.read().values().sum()
    }
}

#[async_trait]
impl Runtime for TestRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let path = path.clean();
        *self.reads.write().entry(path.clone()).or_insert(0) += 1;

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        self.files
            .read()
            .get(&path)
            .cloned()
            .ok_or(RuntimeError::FileNotFound(path))
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        Ok(self.cwd.clone())
    }
}
