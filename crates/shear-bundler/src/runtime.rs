//! Bundler-specific Runtime implementation
//!
//! `BundlerRuntime` layers in-memory virtual files over another runtime.
//! Virtual files are checked first, then reads fall through to the inner
//! runtime (the filesystem by default).

use async_trait::async_trait;
use parking_lot::RwLock;
use path_clean::PathClean;
use rustc_hash::FxHashMap;
use shear_graph::runtime::{Runtime, RuntimeResult};
use shear_graph::NativeRuntime;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Runtime that serves virtual files before delegating to an inner runtime.
#[derive(Debug)]
pub struct BundlerRuntime {
    /// Virtual files stored in memory, keyed by normalized absolute path
    virtual_files: Arc<RwLock<FxHashMap<PathBuf, Vec<u8>>>>,
    /// Base directory for relative virtual file paths
    cwd: PathBuf,
    inner: Arc<dyn Runtime>,
}

impl BundlerRuntime {
    /// Create a runtime over the native filesystem.
    pub fn new(cwd: impl Into<PathBuf>) -> Self {
        Self::with_inner(cwd, Arc::new(NativeRuntime))
    }

    /// Create a runtime over `inner`.
    pub fn with_inner(cwd: impl Into<PathBuf>, inner: Arc<dyn Runtime>) -> Self {
        Self {
            virtual_files: Arc::new(RwLock::new(FxHashMap::default())),
            cwd: cwd.into(),
            inner,
        }
    }

    /// Add a virtual file to the runtime
    ///
    /// Relative paths are anchored at the runtime's base directory.
    pub fn add_virtual_file(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        let normalized = self.normalize_for_lookup(&path.into());
        self.virtual_files
            .write()
            .insert(normalized, content.into());
    }

    pub fn has_virtual_file(&self, path: &Path) -> bool {
        let normalized = self.normalize_for_lookup(path);
        self.virtual_files.read().contains_key(&normalized)
    }

    /// Normalize a path for virtual file lookup
    ///
    /// "/foo/bar.js" and "./bar.js" (with base /foo) map to the same key.
    fn normalize_for_lookup(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.clean()
        } else {
            self.cwd.join(path).clean()
        }
    }
}

#[async_trait]
impl Runtime for BundlerRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        let normalized = self.normalize_for_lookup(path);
        if let Some(content) = self.virtual_files.read().get(&normalized) {
            return Ok(content.clone());
        }

        self.inner.read_file(&normalized).await
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        Ok(self.cwd.clone())
    }
}
