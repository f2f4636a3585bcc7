//! # shear-graph
//!
//! Module graph construction and unused-import elimination for ECMAScript
//! modules.
//!
//! ## Overview
//!
//! Starting from one entry specifier, [`ModuleGraph::build`] resolves every
//! top-level `import` into a canonical [`ModuleLocation`], loads it through a
//! [`Runtime`] and parses it. Each module then reports the import
//! declarations whose named bindings are never called, and produces its
//! source text with those declarations cut out.
//!
//! The usage model is deliberately narrow and purely syntactic:
//!
//! - only named specifiers (`import { a, b as c } from "./m.js"`) can keep a
//!   declaration alive;
//! - a binding is used when its local name is the callee of a top-level call
//!   statement (`a();`), compared by source text;
//! - every other reference is invisible.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use shear_graph::{ModuleGraph, ModuleLocation, NativeRuntime};
//!
//! # async fn run() -> shear_graph::Result<()> {
//! let parent = ModuleLocation::directory("/project/src")?;
//! let graph = ModuleGraph::build("./main.js", &parent, &NativeRuntime).await?;
//!
//! for location in graph.topological_order() {
//!     let module = graph.module(&location).expect("module in graph");
//!     println!("{location}: {}", module.eliminate_unused_imports()?);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Guarantees
//!
//! - Each location is loaded and parsed at most once per build, even when it
//!   is reached through several import paths concurrently.
//! - Import cycles are reported as [`GraphError::Cycle`]; builds on cyclic
//!   input always terminate.
//! - A failed build yields no graph. A built graph is immutable.

pub mod chain;
pub mod edit;
mod error;
pub mod graph;
pub mod import;
pub mod location;
pub mod module;
pub mod parser;
pub mod runtime;
pub mod span;


pub use chain::DependencyChain;
pub use edit::{EditBuffer, EditError};
pub use error::{GraphError, Result};
pub use graph::{DEFAULT_MAX_MODULES, GraphOptions, GraphStatistics, MAX_FILE_SIZE, ModuleGraph};
pub use import::{ImportDeclaration, ImportSpecifier};
pub use location::{ModuleLocation, ResolveError};
pub use module::Module;
pub use parser::SyntaxError;
pub use runtime::native::NativeRuntime;
pub use runtime::{Runtime, RuntimeError, RuntimeResult};
pub use span::SourceSpan;

#[cfg(any(test, feature = "test-utils"))]
pub use runtime::test_utils::TestRuntime;
