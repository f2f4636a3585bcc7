//! Dependency chains and cycle detection.
//!
//! A [`DependencyChain`] is one path through the import graph. Cycle errors
//! carry the offending chain so the report reads `a.js -> b.js -> a.js`.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::Serialize;

use crate::location::ModuleLocation;

/// A path of module locations through the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DependencyChain {
    /// The path of module locations, in import order
    pub path: Vec<ModuleLocation>,
    /// Depth of this chain (path length - 1)
    pub depth: usize,
}

impl DependencyChain {
    /// Create a new dependency chain from a path.
    pub fn new(path: Vec<ModuleLocation>) -> Self {
        let depth = path.len().saturating_sub(1);
        Self { path, depth }
    }

    /// First module in the chain.
    pub fn entry_point(&self) -> Option<&ModuleLocation> {
        self.path.first()
    }

    /// Last module in the chain.
    pub fn target(&self) -> Option<&ModuleLocation> {
        self.path.last()
    }

    /// Check if this chain contains a cycle (same module appears twice).
    pub fn has_cycle(&self) -> bool {
        let mut seen = rustc_hash::FxHashSet::default();
        self.path.iter().any(|location| !seen.insert(location))
    }

    pub fn contains(&self, location: &ModuleLocation) -> bool {
        self.path.contains(location)
    }

    /// Format the chain as a human-readable string.
    ///
    /// Example: "/src/a.js -> /src/b.js -> /src/a.js"
    pub fn format_chain(&self) -> String {
        self.path
            .iter()
            .map(ModuleLocation::as_str)
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

impl fmt::Display for DependencyChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_chain())
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

/// Find the first cycle reachable from `roots`.
///
/// Iterative depth-first search with in-progress marking; dependencies are
/// followed in the order given, so the reported cycle is deterministic for a
/// given graph. The returned chain starts and ends with the same location.
pub(crate) fn find_cycle(
    roots: &[ModuleLocation],
    dependencies: &FxHashMap<ModuleLocation, Vec<ModuleLocation>>,
) -> Option<DependencyChain> {
    let mut marks: FxHashMap<&ModuleLocation, Mark> = FxHashMap::default();
    let mut stack: Vec<(&ModuleLocation, usize)> = Vec::new();

    for root in roots {
        if marks.contains_key(root) {
            continue;
        }
        marks.insert(root, Mark::InProgress);
        stack.push((root, 0));

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let deps = dependencies.get(node).map(Vec::as_slice).unwrap_or(&[]);

            let Some(dep) = deps.get(frame.1) else {
                marks.insert(node, Mark::Done);
                stack.pop();
                continue;
            };
            frame.1 += 1;

            match marks.get(dep) {
                Some(Mark::InProgress) => {
                    let start = stack.iter().position(|(n, _)| *n == dep).unwrap_or(0);
                    let mut path: Vec<ModuleLocation> =
                        stack[start..].iter().map(|(n, _)| (*n).clone()).collect();
                    path.push(dep.clone());
                    return Some(DependencyChain::new(path));
                }
                Some(Mark::Done) => {}
                None => {
                    marks.insert(dep, Mark::InProgress);
                    stack.push((dep, 0));
                }
            }
        }
    }

    None
}
