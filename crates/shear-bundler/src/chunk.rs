//! A named output unit built from one entry module.

use std::sync::Arc;

use shear_graph::{GraphError, GraphOptions, ModuleGraph, ModuleLocation, Runtime};

use crate::{Error, Result};

/// One chunk: an entry specifier, the directory it resolves against, and
/// once built, the entry's module graph.
#[derive(Debug, Clone)]
pub struct Chunk {
    name: String,
    entry: String,
    parent: ModuleLocation,
    graph: Option<Arc<ModuleGraph>>,
}

impl Chunk {
    pub fn new(name: impl Into<String>, entry: impl Into<String>, parent: ModuleLocation) -> Self {
        Self {
            name: name.into(),
            entry: entry.into(),
            parent,
            graph: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    pub fn parent(&self) -> &ModuleLocation {
        &self.parent
    }

    /// The built graph, if [`Chunk::build`] has succeeded.
    pub fn graph(&self) -> Option<&ModuleGraph> {
        self.graph.as_deref()
    }

    pub fn is_built(&self) -> bool {
        self.graph.is_some()
    }

    /// Build the entry's module graph.
    ///
    /// On failure the chunk stays unbuilt; no partial graph is kept.
    pub async fn build(
        &mut self,
        runtime: &dyn Runtime,
        options: GraphOptions,
    ) -> std::result::Result<&ModuleGraph, GraphError> {
        let graph =
            ModuleGraph::build_with_options(&self.entry, &self.parent, runtime, options).await?;
        tracing::info!(
            chunk = %self.name,
            modules = graph.len(),
            "Built chunk"
        );
        Ok(&**self.graph.insert(Arc::new(graph)))
    }

    /// Emit the chunk's code.
    ///
    /// Every module's text, with unused imports removed, is emitted in
    /// topological order (dependencies first, entry last) and joined with a
    /// single newline. A chunk of one module with nothing to remove
    /// reproduces that module byte for byte.
    pub fn generate(&self) -> Result<String> {
        let graph = self.graph.as_ref().ok_or_else(|| Error::NotBuilt {
            name: self.name.clone(),
        })?;

        let wrap = |source: GraphError| Error::Chunk {
            name: self.name.clone(),
            source: Arc::new(source),
        };

        let mut edited = graph.unused_imports_by_module().map_err(wrap)?;
        let mut parts = Vec::with_capacity(edited.len());
        for location in graph.topological_order() {
            if let Some(text) = edited.remove(&location) {
                parts.push(text);
            }
        }

        Ok(parts.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shear_graph::TestRuntime;

    fn src() -> ModuleLocation {
        ModuleLocation::directory("/src").unwrap()
    }

    #[tokio::test]
    async fn generate_before_build_fails() {
        let chunk = Chunk::new("main", "./main.js", src());
        assert!(!chunk.is_built());
        assert!(matches!(chunk.generate(), Err(Error::NotBuilt { name }) if name == "main"));
    }

    #[tokio::test]
    async fn single_clean_module_is_reproduced_exactly() {
        let source = "import { a } from './a.js';\n\na();\n";
        let runtime = TestRuntime::with_files([
            ("/src/main.js", source),
            ("/src/a.js", "export function a() {}\n"),
        ]);
        let mut chunk = Chunk::new("main", "./main.js", src());
        chunk.build(&runtime, GraphOptions::default()).await.unwrap();

        assert_eq!(
            chunk.generate().unwrap(),
            format!("export function a() {{}}\n\n{source}")
        );

        let lone = TestRuntime::with_files([("/src/lone.js", "const x = 1;\nlog(x);\n")]);
        let mut chunk = Chunk::new("lone", "./lone.js", src());
        chunk.build(&lone, GraphOptions::default()).await.unwrap();
        assert_eq!(chunk.generate().unwrap(), "const x = 1;\nlog(x);\n");
    }

    #[tokio::test]
    async fn emits_dependencies_before_dependents() {
        let runtime = TestRuntime::with_files([
            ("/src/main.js", "import { x } from './x.js';\nimport { y } from './y.js';\nx();\n"),
            ("/src/x.js", "export function x() {}"),
            ("/src/y.js", "export function y() {}"),
        ]);
        let mut chunk = Chunk::new("main", "./main.js", src());
        chunk.build(&runtime, GraphOptions::default()).await.unwrap();

        assert_eq!(
            chunk.generate().unwrap(),
            "export function x() {}\nexport function y() {}\nimport { x } from './x.js';\n\nx();\n"
        );
    }

    #[tokio::test]
    async fn failed_build_leaves_chunk_unbuilt() {
        let runtime = TestRuntime::with_files([("/src/main.js", "import './missing.js';\n")]);
        let mut chunk = Chunk::new("main", "./main.js", src());

        let err = chunk
            .build(&runtime, GraphOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::Load { .. }));
        assert!(!chunk.is_built());
        assert!(chunk.graph().is_none());
    }
}
