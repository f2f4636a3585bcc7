//! The module graph of one entry point.
//!
//! A [`ModuleGraph`] only exists fully built: [`ModuleGraph::build`] either
//! returns every module reachable from the entry, or an error. Once built the
//! graph is immutable and all queries on it are free of side effects.

mod builder;

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use serde::Serialize;

use crate::edit::EditBuffer;
use crate::error::Result;
use crate::location::ModuleLocation;
use crate::module::Module;
use crate::runtime::Runtime;

use builder::GraphBuilder;

/// Default maximum number of modules in one graph.
pub const DEFAULT_MAX_MODULES: usize = 100_000;

/// Maximum module source size in bytes (10 MB).
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Limits applied while building a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphOptions {
    /// Maximum number of modules to load.
    ///
    /// Default: `DEFAULT_MAX_MODULES` (100,000)
    pub max_modules: Option<usize>,

    /// Maximum size of a single module source in bytes.
    ///
    /// Default: `MAX_FILE_SIZE` (10 MB)
    pub max_file_size: usize,
}

impl Default for GraphOptions {
    fn default() -> Self {
        Self {
            max_modules: Some(DEFAULT_MAX_MODULES),
            max_file_size: MAX_FILE_SIZE,
        }
    }
}

/// Summary numbers for a built graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GraphStatistics {
    pub module_count: usize,
    pub import_count: usize,
    pub unused_import_count: usize,
    /// Bytes of original source dropped by unused-import elimination.
    pub removed_bytes: usize,
}

/// Modules reachable from one entry, keyed by canonical location.
#[derive(Debug, Clone)]
pub struct ModuleGraph {
    entry: ModuleLocation,
    modules: FxHashMap<ModuleLocation, Arc<Module>>,
    dependencies: FxHashMap<ModuleLocation, Vec<ModuleLocation>>,
}

impl ModuleGraph {
    /// Build the graph of `entry`, resolved against `parent`, with default
    /// limits.
    pub async fn build(
        entry: &str,
        parent: &ModuleLocation,
        runtime: &dyn Runtime,
    ) -> Result<Self> {
        Self::build_with_options(entry, parent, runtime, GraphOptions::default()).await
    }

    /// Build the graph of `entry`, resolved against `parent`.
    ///
    /// Dependencies of each module are resolved concurrently. The first error
    /// aborts the whole build and no graph is returned.
    pub async fn build_with_options(
        entry: &str,
        parent: &ModuleLocation,
        runtime: &dyn Runtime,
        options: GraphOptions,
    ) -> Result<Self> {
        let entry = ModuleLocation::resolve(entry, parent)?;
        let graph = GraphBuilder::new(runtime, options).run(entry).await?;

        tracing::info!(
            entry = %graph.entry,
            modules = graph.modules.len(),
            "Built module graph"
        );
        Ok(graph)
    }

    pub fn entry(&self) -> &ModuleLocation {
        &self.entry
    }

    pub fn module(&self, location: &ModuleLocation) -> Option<&Arc<Module>> {
        self.modules.get(location)
    }

    pub fn entry_module(&self) -> Option<&Arc<Module>> {
        self.module(&self.entry)
    }

    pub fn contains(&self, location: &ModuleLocation) -> bool {
        self.modules.contains_key(location)
    }

    /// All modules, in no particular order.
    pub fn modules(&self) -> impl Iterator<Item = &Arc<Module>> {
        self.modules.values()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Resolved dependencies of `location`, deduplicated, in import order.
    pub fn dependencies(&self, location: &ModuleLocation) -> &[ModuleLocation] {
        self.dependencies
            .get(location)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Module locations with every dependency before its dependents.
    ///
    /// The entry comes last. Siblings appear in import order, so the result
    /// is the same on every call for the same graph.
    pub fn topological_order(&self) -> Vec<ModuleLocation> {
        let mut order = Vec::with_capacity(self.modules.len());
        let mut visited: FxHashSet<&ModuleLocation> = FxHashSet::default();
        let mut stack: Vec<(&ModuleLocation, usize)> = vec![(&self.entry, 0)];
        visited.insert(&self.entry);

        while let Some(frame) = stack.last_mut() {
            let deps = self.dependencies(frame.0);
            if let Some(dep) = deps.get(frame.1) {
                frame.1 += 1;
                if visited.insert(dep) {
                    stack.push((dep, 0));
                }
            } else {
                order.push(frame.0.clone());
                stack.pop();
            }
        }

        order
    }

    /// Edited source text of every module, with unused imports removed.
    pub fn unused_imports_by_module(&self) -> Result<FxHashMap<ModuleLocation, String>> {
        self.modules
            .iter()
            .map(|(location, module)| {
                let edited = module.eliminate_unused_imports()?;
                Ok((location.clone(), edited))
            })
            .collect()
    }

    /// Compute a statistics snapshot.
    pub fn statistics(&self) -> Result<GraphStatistics> {
        let mut stats = GraphStatistics {
            module_count: self.modules.len(),
            ..GraphStatistics::default()
        };

        for module in self.modules.values() {
            let unused = module.unused_import_declarations();
            let mut buffer = EditBuffer::new(module.source());
            for decl in &unused {
                buffer.remove_span(decl.span)?;
            }

            stats.import_count += module.imports().len();
            stats.unused_import_count += unused.len();
            stats.removed_bytes += buffer.removed_len();
        }

        Ok(stats)
    }
}
