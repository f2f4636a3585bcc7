//! Build execution.
//!
//! Every declared chunk is built as its own task. Tasks run concurrently,
//! bounded by a semaphore, and never share results: a chunk that fails or
//! panics is recorded in its own slot while its siblings finish normally.

use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;

use futures::FutureExt;
use shear_graph::{GraphOptions, ModuleLocation, NativeRuntime, Runtime};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use crate::chunk::Chunk;
use crate::output::{BuildResult, ChunkState};
use crate::options::BuildOptions;
use crate::runtime::BundlerRuntime;
use crate::{Error, Result};

/// Execute a build with the given (already validated) options.
pub(crate) async fn execute_build(options: BuildOptions) -> Result<BuildResult> {
    let base: Arc<dyn Runtime> = match &options.runtime {
        Some(runtime) => Arc::clone(runtime),
        None => Arc::new(NativeRuntime),
    };

    let parent_dir = resolve_parent(&options, base.as_ref())?;
    let parent = ModuleLocation::directory(&parent_dir).map_err(|e| {
        Error::InvalidConfig(format!(
            "invalid parent directory '{}': {}",
            parent_dir.display(),
            e
        ))
    })?;

    let runtime: Arc<dyn Runtime> = if options.virtual_files.is_empty() {
        base
    } else {
        let layered = BundlerRuntime::with_inner(parent.as_path(), base);
        for (path, content) in &options.virtual_files {
            layered.add_virtual_file(path, content.as_bytes());
        }
        Arc::new(layered)
    };

    let chunks = options
        .chunks
        .iter()
        .map(|spec| Chunk::new(&spec.name, &spec.entry, parent.clone()))
        .collect();

    let states = execute_builds_concurrent(chunks, runtime, &options).await;

    let result = BuildResult {
        chunks: options
            .chunks
            .into_iter()
            .map(|spec| spec.name)
            .zip(states)
            .collect(),
    };
    info!(
        chunks = result.chunks.len(),
        failed = result.failures().len(),
        "Build finished"
    );
    Ok(result)
}

/// Anchor the configured parent at the runtime's working directory.
fn resolve_parent(options: &BuildOptions, runtime: &dyn Runtime) -> Result<PathBuf> {
    if let Some(parent) = &options.parent {
        if parent.is_absolute() {
            return Ok(parent.clone());
        }
    }

    let cwd = runtime
        .get_cwd()
        .map_err(|e| Error::InvalidConfig(format!("Failed to get current directory: {}", e)))?;

    Ok(match &options.parent {
        Some(parent) => cwd.join(parent),
        None => cwd,
    })
}

/// Build chunks concurrently using tokio task spawning.
///
/// Uses `JoinSet` with `Semaphore` for structured concurrency with bounded
/// parallelism. Returned states are in the order of `chunks`.
async fn execute_builds_concurrent(
    chunks: Vec<Chunk>,
    runtime: Arc<dyn Runtime>,
    options: &BuildOptions,
) -> Vec<ChunkState> {
    let max_parallel = options
        .max_parallel_builds
        .unwrap_or_else(|| num_cpus::get().min(8));
    let graph_options = options.graph;

    let mut join_set = JoinSet::new();
    let semaphore = Arc::new(Semaphore::new(max_parallel));
    let mut slots: Vec<Option<ChunkState>> = (0..chunks.len()).map(|_| None).collect();

    for (index, chunk) in chunks.into_iter().enumerate() {
        let permit = Arc::clone(&semaphore);
        let runtime = Arc::clone(&runtime);

        join_set.spawn(async move {
            let Ok(_permit) = permit.acquire_owned().await else {
                return (
                    index,
                    ChunkState::Panicked("build semaphore closed".to_string()),
                );
            };
            let state = AssertUnwindSafe(build_chunk(chunk, runtime, graph_options))
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| ChunkState::Panicked(panic_message(payload.as_ref())));
            (index, state)
        });
    }

    while let Some(res) = join_set.join_next().await {
        match res {
            Ok((index, state)) => slots[index] = Some(state),
            Err(join_err) => warn!(error = %join_err, "Chunk task did not complete"),
        }
    }

    slots
        .into_iter()
        .map(|slot| {
            slot.unwrap_or_else(|| ChunkState::Panicked("build task did not complete".to_string()))
        })
        .collect()
}

async fn build_chunk(
    mut chunk: Chunk,
    runtime: Arc<dyn Runtime>,
    options: GraphOptions,
) -> ChunkState {
    match chunk.build(runtime.as_ref(), options).await {
        Ok(_) => ChunkState::Built(chunk),
        Err(e) => {
            warn!(chunk = %chunk.name(), error = %e, "Chunk build failed");
            ChunkState::Failed(Arc::new(e))
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_messages_are_extracted() {
        let payload: Box<dyn std::any::Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");

        let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");

        let payload: Box<dyn std::any::Any + Send> = Box::new(42_u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }

    #[test]
    fn relative_parent_is_anchored_at_cwd() {
        #[derive(Debug)]
        struct FixedCwd;

        #[async_trait::async_trait]
        impl Runtime for FixedCwd {
            async fn read_file(&self, path: &std::path::Path) -> shear_graph::RuntimeResult<Vec<u8>> {
                Err(shear_graph::RuntimeError::FileNotFound(path.to_path_buf()))
            }

            fn get_cwd(&self) -> shear_graph::RuntimeResult<PathBuf> {
                Ok(PathBuf::from("/work"))
            }
        }

        let options = BuildOptions::new("./a.js").parent("src");
        assert_eq!(
            resolve_parent(&options, &FixedCwd).unwrap(),
            PathBuf::from("/work/src")
        );

        let options = BuildOptions::new("./a.js");
        assert_eq!(
            resolve_parent(&options, &FixedCwd).unwrap(),
            PathBuf::from("/work")
        );

        let options = BuildOptions::new("./a.js").parent("/abs");
        assert_eq!(
            resolve_parent(&options, &FixedCwd).unwrap(),
            PathBuf::from("/abs")
        );
    }
}
