use std::sync::Arc;

use rustc_hash::FxHashSet;
use serde::Serialize;

use crate::edit::{EditBuffer, EditError};
use crate::error::{GraphError, Result};
use crate::import::ImportDeclaration;
use crate::location::ModuleLocation;
use crate::parser::parse_module;
use crate::runtime::{Runtime, RuntimeError};
use crate::span::SourceSpan;

/// A parsed ECMAScript module.
///
/// The source text is immutable once loaded; removing imports produces a new
/// string and leaves the module untouched. Heavy collections are wrapped in
/// `Arc` so cloning a module out of a graph is cheap.
#[derive(Debug, Clone, Serialize)]
pub struct Module {
    location: ModuleLocation,
    #[serde(skip)]
    source: Arc<str>,
    imports: Arc<Vec<ImportDeclaration>>,
    used_callees: Arc<Vec<SourceSpan>>,
}

impl Module {
    /// Parse `source` as the module at `location`.
    pub fn from_source(location: ModuleLocation, source: impl Into<Arc<str>>) -> Result<Self> {
        let source: Arc<str> = source.into();
        let parsed = parse_module(&source).map_err(|source| GraphError::Syntax {
            location: location.clone(),
            source,
        })?;

        Ok(Self {
            location,
            source,
            imports: Arc::new(parsed.imports),
            used_callees: Arc::new(parsed.used_callees),
        })
    }

    /// Load and parse the module at `location` through `runtime`.
    pub async fn load(location: ModuleLocation, runtime: &dyn Runtime) -> Result<Self> {
        Self::load_limited(location, runtime, usize::MAX).await
    }

    /// Like [`Module::load`], rejecting sources larger than `max_size` bytes
    /// before they are decoded or parsed.
    pub(crate) async fn load_limited(
        location: ModuleLocation,
        runtime: &dyn Runtime,
        max_size: usize,
    ) -> Result<Self> {
        let bytes = match runtime.read_file(location.as_path()).await {
            Ok(bytes) => bytes,
            Err(source) => return Err(GraphError::Load { location, source }),
        };

        if bytes.len() > max_size {
            return Err(GraphError::FileTooLarge {
                location,
                size: bytes.len(),
                max: max_size,
            });
        }

        let text = match String::from_utf8(bytes) {
            Ok(text) => text,
            Err(err) => {
                return Err(GraphError::Load {
                    location,
                    source: RuntimeError::Other(format!("source is not valid UTF-8: {err}")),
                });
            }
        };

        tracing::debug!(module = %location, bytes = text.len(), "Loaded module");
        Self::from_source(location, text)
    }

    /// Resolve `specifier` against `parent`, then load and parse it.
    pub async fn initialize(
        specifier: &str,
        parent: &ModuleLocation,
        runtime: &dyn Runtime,
    ) -> Result<Self> {
        let location = ModuleLocation::resolve(specifier, parent)?;
        Self::load(location, runtime).await
    }

    pub fn location(&self) -> &ModuleLocation {
        &self.location
    }

    /// The original, unedited source text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Top-level import declarations in source order.
    pub fn imports(&self) -> &[ImportDeclaration] {
        &self.imports
    }

    /// Spans of identifiers called directly by top-level call statements.
    pub fn used_callees(&self) -> &[SourceSpan] {
        &self.used_callees
    }

    /// Specifier strings of every top-level import, in source order.
    ///
    /// Duplicates are kept; the graph builder deduplicates by resolved
    /// location.
    pub fn dependency_specifiers(&self) -> Vec<&str> {
        self.imports.iter().map(|i| i.source.as_str()).collect()
    }

    /// Import declarations none of whose named bindings is called.
    ///
    /// A binding counts as used only when its local name is textually equal
    /// to the callee of a top-level call statement, parentheses aside. The
    /// local name is compared, not the imported one: `import { a as b }` is
    /// kept alive by `b()` and removed when only `a()` is called.
    /// Declarations without any named binding (default, namespace or bare
    /// side-effect imports) are always reported.
    pub fn unused_import_declarations(&self) -> Vec<&ImportDeclaration> {
        let source = self.source();
        let called: FxHashSet<&str> = self
            .used_callees
            .iter()
            .filter_map(|span| span.text(source))
            .collect();

        self.imports
            .iter()
            .filter(|decl| !decl.local_names(source).any(|name| called.contains(name)))
            .collect()
    }

    /// Source text with `declarations` removed.
    ///
    /// Spans always refer to the original text, so declarations may be given
    /// in any order and may repeat.
    pub fn edited_source(
        &self,
        declarations: &[&ImportDeclaration],
    ) -> std::result::Result<String, EditError> {
        let mut buffer = EditBuffer::new(self.source());
        for decl in declarations {
            buffer.remove_span(decl.span)?;
        }
        Ok(buffer.to_string())
    }

    /// Source text with every unused import declaration removed.
    pub fn eliminate_unused_imports(&self) -> Result<String> {
        let unused = self.unused_import_declarations();
        for decl in &unused {
            tracing::debug!(
                module = %self.location,
                import = %decl.source,
                "Removing unused import"
            );
        }
        Ok(self.edited_source(&unused)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::test_utils::TestRuntime;

    fn module(source: &str) -> Module {
        let location = ModuleLocation::file("/src/main.js").unwrap();
        Module::from_source(location, source).unwrap()
    }

    #[test]
    fn dependency_specifiers_follow_source_order() {
        let m = module(
            r#"import { b } from "./b.js";
import "./side.js";
import { a } from "./a.js";
import { b as again } from "./b.js";
"#,
        );
        assert_eq!(
            m.dependency_specifiers(),
            vec!["./b.js", "./side.js", "./a.js", "./b.js"]
        );
    }

    #[test]
    fn named_import_survives_only_when_called() {
        let source = r#"import { a } from "./a.js";
import { b } from "./b.js";
import { c } from "./c.js";
a();
b();
"#;
        let m = module(source);
        let unused: Vec<&str> = m
            .unused_import_declarations()
            .iter()
            .map(|d| d.source.as_str())
            .collect();
        assert_eq!(unused, vec!["./c.js"]);

        let edited = m.eliminate_unused_imports().unwrap();
        assert_eq!(
            edited,
            "import { a } from \"./a.js\";\nimport { b } from \"./b.js\";\n\na();\nb();\n"
        );
    }

    #[test]
    fn one_called_specifier_keeps_the_whole_declaration() {
        let m = module("import { used, unused } from \"./m.js\";\nused();\n");
        assert!(m.unused_import_declarations().is_empty());
    }

    #[test]
    fn aliased_binding_matches_by_local_name() {
        let m = module("import { helper as run } from \"./m.js\";\nrun();\n");
        assert!(m.unused_import_declarations().is_empty());

        let m = module("import { helper as run } from \"./m.js\";\nhelper();\n");
        assert_eq!(m.unused_import_declarations().len(), 1);
    }

    #[test]
    fn parenthesized_call_keeps_its_import() {
        let source = "import { h } from './h.js';\n(h)();\n";
        let m = module(source);
        assert!(m.unused_import_declarations().is_empty());
        assert_eq!(m.eliminate_unused_imports().unwrap(), source);
    }

    #[test]
    fn non_call_usages_do_not_count() {
        let m = module(
            r#"import { a } from "./a.js";
import { b } from "./b.js";
import { c } from "./c.js";
const x = a();
obj.b();
console.log(c);
"#,
        );
        assert_eq!(m.unused_import_declarations().len(), 3);
    }

    #[test]
    fn declarations_without_named_specifiers_are_removed() {
        let m = module(
            r#"import def from "./d.js";
import * as ns from "./n.js";
import "./side.js";
def();
ns();
"#,
        );
        assert_eq!(m.unused_import_declarations().len(), 3);
        assert_eq!(m.eliminate_unused_imports().unwrap(), "\n\n\ndef();\nns();\n");
    }

    #[test]
    fn zero_unused_imports_is_byte_identical() {
        let source = "import { a } from './a.js'; // keep\n\ta();\r\n";
        let m = module(source);
        assert_eq!(m.eliminate_unused_imports().unwrap(), source);
    }

    #[test]
    fn unused_detection_is_idempotent() {
        let m = module("import { a } from './a.js';\nimport { b } from './b.js';\nb();\n");
        let first: Vec<_> = m.unused_import_declarations().into_iter().cloned().collect();
        let second: Vec<_> = m.unused_import_declarations().into_iter().cloned().collect();
        assert_eq!(first, second);
        assert_eq!(
            m.eliminate_unused_imports().unwrap(),
            m.eliminate_unused_imports().unwrap()
        );
    }

    #[test]
    fn edited_source_accepts_any_order_and_duplicates() {
        let m = module("import { a } from './a.js';\nimport { b } from './b.js';\nx();\n");
        let imports: Vec<&ImportDeclaration> = m.imports().iter().collect();
        let reversed = vec![imports[1], imports[0], imports[1]];
        assert_eq!(m.edited_source(&reversed).unwrap(), "\n\nx();\n");
    }

    #[test]
    fn edited_output_reparses() {
        let m = module("import { a } from './a.js';\nimport { b } from './b.js';\nb();\n");
        let edited = m.eliminate_unused_imports().unwrap();
        let reparsed = module(&edited);
        assert_eq!(reparsed.dependency_specifiers(), vec!["./b.js"]);
        assert!(reparsed.unused_import_declarations().is_empty());
    }

    #[test]
    fn syntax_error_names_the_module() {
        let location = ModuleLocation::file("/src/bad.js").unwrap();
        let err = Module::from_source(location.clone(), "import {").unwrap_err();
        assert!(matches!(&err, GraphError::Syntax { location: l, .. } if *l == location));
        assert_eq!(err.location(), Some(&location));
    }

    #[tokio::test]
    async fn initialize_resolves_loads_and_parses() {
        let runtime = TestRuntime::with_files([("/src/lib/util.js", "export function u() {}")]);
        let parent = ModuleLocation::file("/src/main.js").unwrap();

        let m = Module::initialize("./lib/util.js", &parent, &runtime)
            .await
            .unwrap();
        assert_eq!(m.location().as_str(), "/src/lib/util.js");
        assert!(m.imports().is_empty());
    }

    #[tokio::test]
    async fn initialize_reports_missing_files_as_load_errors() {
        let runtime = TestRuntime::new();
        let parent = ModuleLocation::file("/src/main.js").unwrap();

        let err = Module::initialize("./missing.js", &parent, &runtime)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            GraphError::Load {
                source: RuntimeError::FileNotFound(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn invalid_utf8_is_a_load_error() {
        let runtime = TestRuntime::with_files([("/src/bin.js", vec![0xff, 0xfe, 0x00])]);
        let location = ModuleLocation::file("/src/bin.js").unwrap();

        let err = Module::load(location, &runtime).await.unwrap_err();
        assert!(matches!(
            err,
            GraphError::Load {
                source: RuntimeError::Other(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn oversized_sources_are_rejected_before_parsing() {
        let runtime = TestRuntime::with_files([("/src/big.js", "this is not { valid")]);
        let location = ModuleLocation::file("/src/big.js").unwrap();

        let err = Module::load_limited(location, &runtime, 4).await.unwrap_err();
        assert!(matches!(err, GraphError::FileTooLarge { size: 19, max: 4, .. }));
    }

    #[tokio::test]
    async fn bare_specifiers_fail_resolution() {
        let runtime = TestRuntime::new();
        let parent = ModuleLocation::file("/src/main.js").unwrap();

        let err = Module::initialize("lodash", &parent, &runtime)
            .await
            .unwrap_err();
        assert!(matches!(err, GraphError::Resolution(_)));
        assert_eq!(runtime.total_reads(), 0);
    }
}
