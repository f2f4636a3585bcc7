//! Shared test utilities for shear-bundler tests

#![allow(dead_code)]

use shear_bundler::{BuildOptions, NativeRuntime, Runtime};
use shear_graph::TestRuntime;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Create a project directory with the given `(relative path, content)` files.
pub fn create_project<'a>(files: impl IntoIterator<Item = (&'a str, &'a str)>) -> TempDir {
    let dir = TempDir::new().expect("temp dir");
    for (path, content) in files {
        let path = dir.path().join(path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create dirs");
        }
        std::fs::write(path, content).expect("write file");
    }
    dir
}

/// Options building the given chunks from an in-memory `/src` tree.
pub fn in_memory_options(
    runtime: TestRuntime,
    chunks: impl IntoIterator<Item = (&'static str, &'static str)>,
) -> BuildOptions {
    BuildOptions::chunks(chunks)
        .parent("/src")
        .runtime(Arc::new(runtime))
}

/// Options building the given chunks from a directory on disk.
pub fn disk_options(
    root: impl AsRef<Path>,
    chunks: impl IntoIterator<Item = (&'static str, &'static str)>,
) -> BuildOptions {
    BuildOptions::chunks(chunks)
        .parent(root.as_ref())
        .runtime(test_native_runtime())
}

pub fn test_native_runtime() -> Arc<dyn Runtime> {
    Arc::new(NativeRuntime)
}
