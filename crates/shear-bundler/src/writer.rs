//! Writing generated chunks to disk.
//!
//! Every target path is validated to stay inside the output directory.
//! Files are first written next to their targets with a `.tmp` extension and
//! only renamed into place once all of them were written; on any failure the
//! temporary files are removed.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use rustc_hash::FxHashSet;

use crate::output::GeneratedChunk;
use crate::{Error, Result};

pub(crate) fn write_chunks_to(chunks: &[GeneratedChunk], dir: &Path, overwrite: bool) -> Result<()> {
    let dir = normalize_dir(dir)?;

    fs::create_dir_all(&dir).map_err(|e| {
        Error::WriteFailure(format!(
            "Failed to create output directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    let mut operations = Vec::with_capacity(chunks.len());
    let mut targets = FxHashSet::default();
    for chunk in chunks {
        let target = validate_output_path(&dir, &chunk.filename())?;
        // Names like "app" and "./app" clean to the same file.
        if !targets.insert(target.clone()) {
            return Err(Error::InvalidOutputPath(format!(
                "Chunk '{}' writes to '{}', which another chunk already writes",
                chunk.name,
                target.display()
            )));
        }
        if !overwrite && target.exists() {
            return Err(Error::OutputExists(format!(
                "File already exists: '{}'. Use overwrite=true to replace.",
                target.display()
            )));
        }
        operations.push((target, chunk.code.as_bytes()));
    }

    write_files_atomic(&operations)?;
    tracing::debug!(dir = %dir.display(), files = operations.len(), "Wrote chunks");
    Ok(())
}

fn normalize_dir(dir: &Path) -> Result<PathBuf> {
    let cleaned = dir.clean();
    if cleaned.is_absolute() {
        return Ok(cleaned);
    }

    let cwd = std::env::current_dir().map_err(|e| {
        Error::InvalidOutputPath(format!("Failed to get current directory: {}", e))
    })?;
    Ok(cwd.join(cleaned).clean())
}

/// Join `filename` onto `base_dir`, rejecting anything that escapes it.
fn validate_output_path(base_dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }

    let full_path = base_dir.join(Path::new(filename).clean()).clean();
    if !full_path.starts_with(base_dir) || full_path == base_dir {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' escapes output directory '{}'",
            filename,
            base_dir.display()
        )));
    }

    Ok(full_path)
}

fn write_files_atomic(operations: &[(PathBuf, &[u8])]) -> Result<()> {
    let mut temp_files: Vec<(PathBuf, &Path)> = Vec::with_capacity(operations.len());

    for (target, content) in operations {
        if let Some(parent) = target.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                cleanup(&temp_files);
                return Err(Error::WriteFailure(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                )));
            }
        }

        let temp = target.with_extension("js.tmp");
        if let Err(e) = fs::write(&temp, content) {
            cleanup(&temp_files);
            let _ = fs::remove_file(&temp);
            return Err(Error::WriteFailure(format!(
                "Failed to write '{}': {}",
                temp.display(),
                e
            )));
        }
        temp_files.push((temp, target.as_path()));
    }

    for (temp, target) in &temp_files {
        if let Err(e) = fs::rename(temp, target) {
            cleanup(&temp_files);
            return Err(Error::WriteFailure(format!(
                "Failed to move '{}' into place: {}",
                target.display(),
                e
            )));
        }
    }

    Ok(())
}

fn cleanup(temp_files: &[(PathBuf, &Path)]) {
    for (temp, _) in temp_files {
        let _ = fs::remove_file(temp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(name: &str, code: &str) -> GeneratedChunk {
        GeneratedChunk {
            name: name.to_string(),
            code: code.to_string(),
        }
    }

    #[test]
    fn writes_every_chunk() {
        let dir = tempfile::tempdir().unwrap();
        write_chunks_to(
            &[chunk("app", "app();\n"), chunk("pages/home", "home();\n")],
            dir.path(),
            false,
        )
        .unwrap();

        assert_eq!(fs::read_to_string(dir.path().join("app.js")).unwrap(), "app();\n");
        assert_eq!(
            fs::read_to_string(dir.path().join("pages/home.js")).unwrap(),
            "home();\n"
        );
        assert!(!dir.path().join("app.js.tmp").exists());
    }

    #[test]
    fn refuses_to_overwrite_without_permission() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.js"), "old").unwrap();

        let err = write_chunks_to(&[chunk("app", "new")], dir.path(), false).unwrap_err();
        assert!(matches!(err, Error::OutputExists(_)));
        assert_eq!(fs::read_to_string(dir.path().join("app.js")).unwrap(), "old");

        write_chunks_to(&[chunk("app", "new")], dir.path(), true).unwrap();
        assert_eq!(fs::read_to_string(dir.path().join("app.js")).unwrap(), "new");
    }

    #[test]
    fn colliding_targets_are_rejected_before_writing() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("app.js"), "old").unwrap();

        let err = write_chunks_to(
            &[chunk("app", "first"), chunk("./app", "second")],
            dir.path(),
            true,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidOutputPath(_)));
        assert_eq!(fs::read_to_string(dir.path().join("app.js")).unwrap(), "old");
        assert!(!dir.path().join("app.js.tmp").exists());
    }

    #[test]
    fn rejects_traversal() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_chunks_to(&[chunk("../escape", "x")], dir.path(), true).unwrap_err();
        assert!(matches!(err, Error::InvalidOutputPath(_)));
        assert!(!dir.path().parent().unwrap().join("escape.js").exists());
    }
}
