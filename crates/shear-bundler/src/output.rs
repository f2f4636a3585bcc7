use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use shear_graph::{GraphError, ModuleGraph};

use crate::chunk::Chunk;
use crate::{Error, Result};

/// Generated code of one chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedChunk {
    pub name: String,
    pub code: String,
}

impl GeneratedChunk {
    /// Output file name, relative to the output directory.
    pub fn filename(&self) -> String {
        format!("{}.js", self.name)
    }
}

/// How one chunk's build ended.
#[derive(Debug, Clone)]
pub(crate) enum ChunkState {
    Built(Chunk),
    Failed(Arc<GraphError>),
    Panicked(String),
}

/// Result of a build operation.
///
/// Holds every declared chunk in declaration order, built or failed. A
/// failed chunk never blocks its siblings: each can be generated on its own
/// with [`BuildResult::generate_chunk`].
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub(crate) chunks: Vec<(String, ChunkState)>,
}

impl BuildResult {
    /// Chunk names in declaration order.
    pub fn chunk_names(&self) -> impl Iterator<Item = &str> {
        self.chunks.iter().map(|(name, _)| name.as_str())
    }

    /// The built chunk called `name`, if its build succeeded.
    pub fn chunk(&self, name: &str) -> Option<&Chunk> {
        match self.state(name)? {
            ChunkState::Built(chunk) => Some(chunk),
            _ => None,
        }
    }

    /// Module graph of the chunk called `name`, if its build succeeded.
    pub fn graph(&self, name: &str) -> Option<&ModuleGraph> {
        self.chunk(name).and_then(Chunk::graph)
    }

    /// True when every chunk built.
    pub fn is_success(&self) -> bool {
        self.chunks
            .iter()
            .all(|(_, state)| matches!(state, ChunkState::Built(_)))
    }

    /// Errors of the chunks that failed to build, in declaration order.
    pub fn failures(&self) -> Vec<Error> {
        self.chunks
            .iter()
            .filter(|(_, state)| !matches!(state, ChunkState::Built(_)))
            .filter_map(|(name, _)| self.generate_chunk(name).err())
            .collect()
    }

    /// Generate one chunk independently of the others.
    pub fn generate_chunk(&self, name: &str) -> Result<GeneratedChunk> {
        let state = self
            .state(name)
            .ok_or_else(|| Error::UnknownChunk(name.to_string()))?;

        match state {
            ChunkState::Built(chunk) => Ok(GeneratedChunk {
                name: name.to_string(),
                code: chunk.generate()?,
            }),
            ChunkState::Failed(source) => Err(Error::Chunk {
                name: name.to_string(),
                source: Arc::clone(source),
            }),
            ChunkState::Panicked(message) => Err(Error::TaskPanicked {
                name: name.to_string(),
                message: message.clone(),
            }),
        }
    }

    /// Generate every chunk, in declaration order.
    ///
    /// Fails with [`Error::ChunksFailed`] naming each chunk that could not be
    /// built or generated.
    pub fn generate(&self) -> Result<Vec<GeneratedChunk>> {
        let mut generated = Vec::with_capacity(self.chunks.len());
        let mut failures = Vec::new();

        for (name, _) in &self.chunks {
            match self.generate_chunk(name) {
                Ok(chunk) => generated.push(chunk),
                Err(e) => failures.push((name.clone(), e.to_string())),
            }
        }

        if !failures.is_empty() {
            return Err(Error::ChunksFailed(failures));
        }
        Ok(generated)
    }

    /// Generate every chunk and write it to `dir` as `<name>.js`.
    ///
    /// Nothing is written unless every chunk generates.
    pub fn write_to(&self, dir: impl AsRef<Path>, overwrite: bool) -> Result<()> {
        let chunks = self.generate()?;
        crate::writer::write_chunks_to(&chunks, dir.as_ref(), overwrite)
    }

    /// Write output files, overwriting any existing files.
    pub fn write_to_force(&self, dir: impl AsRef<Path>) -> Result<()> {
        self.write_to(dir, true)
    }

    fn state(&self, name: &str) -> Option<&ChunkState> {
        self.chunks
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, state)| state)
    }
}
