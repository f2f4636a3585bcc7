//! Concurrent graph construction.
//!
//! Traversal is depth-first; the dependencies of a module are visited
//! concurrently with `try_join_all`. Three pieces of shared state keep that
//! sound:
//!
//! - `in_flight` holds one `OnceCell` per location, so a module reached by
//!   several paths at once is loaded and parsed exactly once and every
//!   requester awaits the same result;
//! - `expanded` lets only the first visitor of a location recurse into its
//!   dependencies;
//! - each visit carries its ancestors, and reaching an ancestor again is a
//!   cycle.
//!
//! Loading never waits on another module's expansion, so shared subtrees
//! cannot deadlock. A cycle whose halves were expanded by different paths is
//! not seen by the ancestor check and is caught by a full search once the
//! traversal is complete.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::{DashMap, DashSet};
use futures::future::{BoxFuture, try_join_all};
use rustc_hash::FxHashMap;
use tokio::sync::OnceCell;

use super::{GraphOptions, ModuleGraph};
use crate::chain::{DependencyChain, find_cycle};
use crate::error::{GraphError, Result};
use crate::location::ModuleLocation;
use crate::module::Module;
use crate::runtime::Runtime;

pub(super) struct GraphBuilder<'r> {
    runtime: &'r dyn Runtime,
    options: GraphOptions,
    modules: DashMap<ModuleLocation, Arc<Module>>,
    dependencies: DashMap<ModuleLocation, Vec<ModuleLocation>>,
    in_flight: DashMap<ModuleLocation, Arc<OnceCell<Arc<Module>>>>,
    expanded: DashSet<ModuleLocation>,
}

impl<'r> GraphBuilder<'r> {
    pub(super) fn new(runtime: &'r dyn Runtime, options: GraphOptions) -> Self {
        Self {
            runtime,
            options,
            modules: DashMap::new(),
            dependencies: DashMap::new(),
            in_flight: DashMap::new(),
            expanded: DashSet::new(),
        }
    }

    /// Traverse from `entry` and freeze the result into a graph.
    pub(super) async fn run(self, entry: ModuleLocation) -> Result<ModuleGraph> {
        self.visit(entry.clone(), Vec::new()).await?;

        let modules: FxHashMap<_, _> = self.modules.into_iter().collect();
        let dependencies: FxHashMap<_, _> = self.dependencies.into_iter().collect();

        if let Some(chain) = find_cycle(std::slice::from_ref(&entry), &dependencies) {
            return Err(GraphError::Cycle { chain });
        }

        Ok(ModuleGraph {
            entry,
            modules,
            dependencies,
        })
    }

    fn visit(
        &self,
        location: ModuleLocation,
        ancestors: Vec<ModuleLocation>,
    ) -> BoxFuture<'_, Result<()>> {
        Box::pin(async move {
            if let Some(pos) = ancestors.iter().position(|a| *a == location) {
                let mut path = ancestors[pos..].to_vec();
                path.push(location);
                return Err(GraphError::Cycle {
                    chain: DependencyChain::new(path),
                });
            }

            let module = self.initialize(&location).await?;

            if !self.expanded.insert(location.clone()) {
                return Ok(());
            }

            let mut deps: Vec<ModuleLocation> = Vec::new();
            for specifier in module.dependency_specifiers() {
                let dep = ModuleLocation::resolve(specifier, &location)?;
                if !deps.contains(&dep) {
                    deps.push(dep);
                }
            }
            self.dependencies.insert(location.clone(), deps.clone());

            let mut path = ancestors;
            path.push(location);
            try_join_all(deps.into_iter().map(|dep| self.visit(dep, path.clone()))).await?;
            Ok(())
        })
    }

    /// Load and parse `location` once, however many paths request it.
    async fn initialize(&self, location: &ModuleLocation) -> Result<Arc<Module>> {
        // The entry guard must be dropped before `len()` or any await.
        let (cell, fresh) = match self.in_flight.entry(location.clone()) {
            Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
            Entry::Vacant(entry) => {
                let cell = Arc::new(OnceCell::new());
                entry.insert(Arc::clone(&cell));
                (cell, true)
            }
        };

        if fresh {
            if let Some(max) = self.options.max_modules {
                let count = self.in_flight.len();
                if count > max {
                    return Err(GraphError::TooManyModules { count, max });
                }
            }
        }

        let module = cell
            .get_or_try_init(|| async {
                let module = Module::load_limited(
                    location.clone(),
                    self.runtime,
                    self.options.max_file_size,
                )
                .await?;
                let module = Arc::new(module);
                self.modules.insert(location.clone(), Arc::clone(&module));
                tracing::debug!(
                    module = %location,
                    imports = module.imports().len(),
                    "Registered module"
                );
                Ok::<_, GraphError>(module)
            })
            .await?;

        Ok(Arc::clone(module))
    }
}
