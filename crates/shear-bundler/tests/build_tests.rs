//! Tests for concurrent chunk builds.
//!
//! These tests verify that:
//! 1. Chunks come back in declaration order regardless of completion order
//! 2. A failing chunk never affects its siblings
//! 3. `max_parallel_builds` configuration is respected

mod helpers;

use async_trait::async_trait;
use helpers::{in_memory_options, test_native_runtime};
use shear_bundler::{BuildOptions, Error, GraphError, Runtime};
use shear_graph::{RuntimeError, RuntimeResult, TestRuntime};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

fn two_app_tree() -> TestRuntime {
    TestRuntime::with_files([
        ("/src/app.js", "import { render } from './ui.js';\nimport { log } from './log.js';\nrender();\n"),
        ("/src/admin.js", "import { log } from './log.js';\nlog();\n"),
        ("/src/ui.js", "export function render() {}\n"),
        ("/src/log.js", "export function log() {}\n"),
    ])
}

#[tokio::test]
async fn chunks_come_back_in_declaration_order() {
    let runtime = two_app_tree().latency(Duration::from_millis(5));
    let result = in_memory_options(runtime, [("zeta", "./app.js"), ("alpha", "./admin.js")])
        .build()
        .await
        .expect("build");

    assert!(result.is_success());
    assert_eq!(result.chunk_names().collect::<Vec<_>>(), vec!["zeta", "alpha"]);

    let generated = result.generate().expect("generate");
    let names: Vec<&str> = generated.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["zeta", "alpha"]);
}

#[tokio::test]
async fn generated_chunks_drop_unused_imports() {
    let result = in_memory_options(two_app_tree(), [("app", "./app.js"), ("admin", "./admin.js")])
        .build()
        .await
        .expect("build");

    let app = result.generate_chunk("app").expect("app");
    assert_eq!(
        app.code,
        "export function render() {}\n\nexport function log() {}\n\nimport { render } from './ui.js';\n\nrender();\n"
    );
    assert_eq!(app.filename(), "app.js");

    let admin = result.generate_chunk("admin").expect("admin");
    assert_eq!(
        admin.code,
        "export function log() {}\n\nimport { log } from './log.js';\nlog();\n"
    );
}

#[tokio::test]
async fn failing_chunk_does_not_affect_siblings() {
    let runtime = TestRuntime::with_files([
        ("/src/good.js", "import { a } from './a.js';\na();\n"),
        ("/src/a.js", "export function a() {}\n"),
        ("/src/bad.js", "import { b } from './b.js';\nb();\n"),
        ("/src/b.js", "import { a } from './bad.js';\n"),
    ]);

    let result = in_memory_options(runtime, [("bad", "./bad.js"), ("good", "./good.js")])
        .build()
        .await
        .expect("only invalid options fail the call");

    assert!(!result.is_success());
    assert!(result.chunk("bad").is_none());
    assert!(result.graph("good").is_some());

    let good = result.generate_chunk("good").expect("sibling still generates");
    assert!(good.code.ends_with("a();\n"));

    match result.generate_chunk("bad") {
        Err(Error::Chunk { name, source }) => {
            assert_eq!(name, "bad");
            assert!(matches!(*source, GraphError::Cycle { .. }));
        }
        other => panic!("expected chunk error, got {other:?}"),
    }

    match result.generate() {
        Err(Error::ChunksFailed(failures)) => {
            assert_eq!(failures.len(), 1);
            assert_eq!(failures[0].0, "bad");
            assert!(failures[0].1.contains("Circular dependency detected"));
        }
        other => panic!("expected ChunksFailed, got {other:?}"),
    }

    assert_eq!(result.failures().len(), 1);
}

#[tokio::test]
async fn unknown_chunk_is_reported() {
    let result = in_memory_options(two_app_tree(), [("app", "./app.js")])
        .build()
        .await
        .expect("build");
    assert!(matches!(
        result.generate_chunk("nope"),
        Err(Error::UnknownChunk(name)) if name == "nope"
    ));
}

#[tokio::test]
async fn shared_modules_are_built_per_chunk() {
    let runtime = two_app_tree();
    let probe = runtime.clone();
    let result = in_memory_options(runtime, [("app", "./app.js"), ("admin", "./admin.js")])
        .build()
        .await
        .expect("build");

    assert!(result.is_success());
    assert_eq!(probe.read_count("/src/log.js"), 2);
    assert_eq!(probe.read_count("/src/ui.js"), 1);
}

#[tokio::test]
async fn max_parallel_builds_of_one_still_builds_everything() {
    let runtime = two_app_tree().latency(Duration::from_millis(2));
    let result = in_memory_options(runtime, [("app", "./app.js"), ("admin", "./admin.js")])
        .max_parallel_builds(1)
        .build()
        .await
        .expect("build");

    assert!(result.is_success());
    assert_eq!(result.generate().expect("generate").len(), 2);
}

#[tokio::test]
async fn duplicate_chunk_names_fail_before_building() {
    let runtime = two_app_tree();
    let probe = runtime.clone();
    let err = in_memory_options(runtime, [("app", "./app.js"), ("app", "./admin.js")])
        .build()
        .await
        .unwrap_err();

    assert!(matches!(err, Error::InvalidConfig(_)));
    assert_eq!(probe.total_reads(), 0);
}

#[tokio::test]
async fn module_limit_applies_to_each_chunk() {
    let result = in_memory_options(two_app_tree(), [("app", "./app.js"), ("admin", "./admin.js")])
        .max_modules(2)
        .build()
        .await
        .expect("build");

    assert!(result.chunk("admin").is_some());
    assert!(matches!(
        result.generate_chunk("app"),
        Err(Error::Chunk { ref source, .. }) if matches!(**source, GraphError::TooManyModules { .. })
    ));
}

#[tokio::test]
async fn virtual_files_shadow_the_runtime() {
    let result = in_memory_options(two_app_tree(), [("app", "./app.js")])
        .virtual_file("ui.js", "export function render() { /* virtual */ }\n")
        .virtual_file("/src/extra.js", "export function extra() {}\n")
        .build()
        .await
        .expect("build");

    let app = result.generate_chunk("app").expect("app");
    assert!(app.code.starts_with("export function render() { /* virtual */ }\n"));
}

#[derive(Debug)]
struct PanickingRuntime;

#[async_trait]
impl Runtime for PanickingRuntime {
    async fn read_file(&self, path: &Path) -> RuntimeResult<Vec<u8>> {
        if path.ends_with("boom.js") {
            panic!("runtime exploded");
        }
        if path.ends_with("fine.js") {
            return Ok(b"ok();\n".to_vec());
        }
        Err(RuntimeError::FileNotFound(path.to_path_buf()))
    }

    fn get_cwd(&self) -> RuntimeResult<PathBuf> {
        Ok(PathBuf::from("/src"))
    }
}

#[tokio::test]
async fn panicking_chunk_is_reported_by_name() {
    let result = BuildOptions::chunks([("boom", "./boom.js"), ("fine", "./fine.js")])
        .runtime(Arc::new(PanickingRuntime))
        .build()
        .await
        .expect("build");

    assert_eq!(result.generate_chunk("fine").expect("fine").code, "ok();\n");
    match result.generate_chunk("boom") {
        Err(Error::TaskPanicked { name, message }) => {
            assert_eq!(name, "boom");
            assert_eq!(message, "runtime exploded");
        }
        other => panic!("expected panic report, got {other:?}"),
    }
}

#[tokio::test]
async fn relative_parent_resolves_against_runtime_cwd() {
    let result = BuildOptions::new("./fine.js")
        .parent(".")
        .runtime(Arc::new(PanickingRuntime))
        .build()
        .await
        .expect("build");

    let chunk = result.chunk("fine").expect("built");
    assert_eq!(chunk.parent().as_str(), "/src/");
}

#[tokio::test]
async fn missing_entry_on_disk_is_a_chunk_failure() {
    let dir = tempfile::tempdir().expect("tempdir");
    let result = BuildOptions::new("./missing.js")
        .parent(dir.path())
        .runtime(test_native_runtime())
        .build()
        .await
        .expect("build");

    assert!(matches!(
        result.generate_chunk("missing"),
        Err(Error::Chunk { ref source, .. }) if matches!(**source, GraphError::Load { .. })
    ));
}
