use std::path::{Path, PathBuf};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use shear_config::{Entries, ShearConfig};
use shear_graph::{GraphOptions, Runtime};

use crate::output::BuildResult;
use crate::{Error, Result};

/// Upper bound on declared chunks.
const MAX_CHUNKS: usize = 1000;

/// One declared chunk: its output name and entry specifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkSpec {
    pub name: String,
    pub entry: String,
}

/// Configuration options for a build operation.
///
/// Use the builder methods, or construct directly for full control.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Chunks to build, in declaration order.
    pub chunks: Vec<ChunkSpec>,

    /// Directory entry specifiers resolve against.
    ///
    /// Relative paths are anchored at the runtime's working directory; the
    /// default is the working directory itself.
    pub parent: Option<PathBuf>,

    /// Runtime used to load modules (default: `NativeRuntime`).
    pub runtime: Option<Arc<dyn Runtime>>,

    /// Virtual files that don't exist on disk.
    ///
    /// Maps paths (relative ones are anchored at the parent directory) to
    /// their content. They shadow files of the runtime.
    pub virtual_files: FxHashMap<String, String>,

    /// Maximum number of chunks built at once (default: CPU count, max 8).
    pub max_parallel_builds: Option<usize>,

    /// Limits for each chunk's module graph.
    pub graph: GraphOptions,
}

impl BuildOptions {
    /// Build a single chunk, named after the entry's file stem.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use shear_bundler::BuildOptions;
    ///
    /// let options = BuildOptions::new("./src/index.js");
    /// assert_eq!(options.chunks[0].name, "index");
    /// ```
    pub fn new(entry: impl Into<String>) -> Self {
        let entry = entry.into();
        Self::from_specs(vec![ChunkSpec {
            name: entry_to_name(&entry),
            entry,
        }])
    }

    /// Build several named chunks.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use shear_bundler::BuildOptions;
    ///
    /// let options = BuildOptions::chunks([("app", "./app.js"), ("admin", "./admin.js")]);
    /// ```
    pub fn chunks<I, K, V>(chunks: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::from_specs(
            chunks
                .into_iter()
                .map(|(name, entry)| ChunkSpec {
                    name: name.into(),
                    entry: entry.into(),
                })
                .collect(),
        )
    }

    /// Create options from a loaded config.
    pub fn from_config(config: &ShearConfig) -> Result<Self> {
        let mut options = match config.entries()? {
            Entries::Single(input) => Self::new(input),
            Entries::Chunks(chunks) => Self::chunks(chunks.iter()),
        };

        options.parent = config.parent.clone();
        options.max_parallel_builds = config.max_parallel_builds;
        if config.max_modules.is_some() {
            options.graph.max_modules = config.max_modules;
        }
        if let Some(max) = config.max_file_size {
            options.graph.max_file_size = max;
        }
        Ok(options)
    }

    fn from_specs(chunks: Vec<ChunkSpec>) -> Self {
        Self {
            chunks,
            parent: None,
            runtime: None,
            virtual_files: FxHashMap::default(),
            max_parallel_builds: None,
            graph: GraphOptions::default(),
        }
    }

    /// Set the directory entry specifiers resolve against.
    pub fn parent(mut self, dir: impl Into<PathBuf>) -> Self {
        self.parent = Some(dir.into());
        self
    }

    /// Set the runtime for loading modules.
    pub fn runtime(mut self, runtime: Arc<dyn Runtime>) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Add a virtual file.
    pub fn virtual_file(mut self, path: impl Into<String>, content: impl Into<String>) -> Self {
        self.virtual_files.insert(path.into(), content.into());
        self
    }

    pub fn max_parallel_builds(mut self, max: usize) -> Self {
        self.max_parallel_builds = Some(max);
        self
    }

    pub fn max_modules(mut self, max: usize) -> Self {
        self.graph.max_modules = Some(max);
        self
    }

    pub fn max_file_size(mut self, bytes: usize) -> Self {
        self.graph.max_file_size = bytes;
        self
    }

    /// Validate the options.
    ///
    /// Returns an error if there are no chunks, too many chunks, a chunk with
    /// an empty name or entry, duplicate chunk names, or a zero limit.
    pub fn validate(&self) -> Result<()> {
        if self.chunks.is_empty() {
            return Err(Error::InvalidConfig("no chunks to build".into()));
        }

        if self.chunks.len() > MAX_CHUNKS {
            return Err(Error::InvalidConfig(format!(
                "Too many chunks: {} (max {})",
                self.chunks.len(),
                MAX_CHUNKS
            )));
        }

        let mut seen = FxHashSet::default();
        for spec in &self.chunks {
            if spec.name.trim().is_empty() {
                return Err(Error::InvalidConfig("chunk names cannot be empty".into()));
            }
            if spec.entry.trim().is_empty() {
                return Err(Error::InvalidConfig(format!(
                    "chunk '{}' has an empty entry",
                    spec.name
                )));
            }
            if !seen.insert(spec.name.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "duplicate chunk name '{}'",
                    spec.name
                )));
            }
        }

        if self.max_parallel_builds == Some(0) {
            return Err(Error::InvalidConfig(
                "max_parallel_builds must be greater than 0".into(),
            ));
        }
        if self.graph.max_modules == Some(0) {
            return Err(Error::InvalidConfig(
                "max_modules must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Build every chunk.
    ///
    /// Only invalid options fail the call itself. Chunk failures are recorded
    /// in the [`BuildResult`] and surface when generating.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # async fn example() -> shear_bundler::Result<()> {
    /// use shear_bundler::BuildOptions;
    ///
    /// let result = BuildOptions::chunks([("app", "./app.js"), ("admin", "./admin.js")])
    ///     .parent("/project/src")
    ///     .build()
    ///     .await?;
    ///
    /// for chunk in result.generate()? {
    ///     println!("{}: {} bytes", chunk.name, chunk.code.len());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<BuildResult> {
        self.validate()?;
        crate::build_executor::execute_build(self).await
    }
}

/// Extract a chunk name from an entry path.
pub(crate) fn entry_to_name(entry: &str) -> String {
    Path::new(entry)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("index")
        .to_string()
}
