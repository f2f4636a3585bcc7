//! Canonical module locations.
//!
//! A [`ModuleLocation`] is the identity of a module inside a graph. It is
//! stored, hashed and compared purely by its canonical string form: an
//! absolute, `.`/`..`-free path using `/` separators. Richer views (such as
//! [`ModuleLocation::as_path`]) are derived from that string and never used as
//! lookup keys.
//!
//! A location whose canonical string ends in `/` is a *directory base*. It can
//! only act as the parent of a resolution, never as a module.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use path_clean::PathClean;
use serde::Serialize;

/// Errors produced while turning a specifier into a [`ModuleLocation`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The specifier cannot be resolved against its parent.
    #[error("Failed to resolve module '{specifier}' from '{from}': {reason}")]
    Specifier {
        specifier: String,
        from: String,
        reason: String,
    },

    /// A base location must be absolute so that every derived key is canonical.
    #[error("Location must be absolute: {0}")]
    NotAbsolute(PathBuf),
}

/// Canonical identifier of a module.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct ModuleLocation {
    key: Arc<str>,
}

impl ModuleLocation {
    /// Create the location of a module file from an absolute path.
    pub fn file(path: impl AsRef<Path>) -> Result<Self, ResolveError> {
        let path = path.as_ref();
        if !path.is_absolute() {
            return Err(ResolveError::NotAbsolute(path.to_path_buf()));
        }
        Ok(Self::from_clean(&path.clean()))
    }

    /// Create a directory base from an absolute path.
    ///
    /// Specifiers resolved against a directory base are joined onto the
    /// directory itself rather than onto its parent.
    pub fn directory(path: impl AsRef<Path>) -> Result<Self, ResolveError> {
        let path = path.as_ref();
        if !path.is_absolute() {
            return Err(ResolveError::NotAbsolute(path.to_path_buf()));
        }
        let mut key = path_to_key(&path.clean());
        if !key.ends_with('/') {
            key.push('/');
        }
        Ok(Self { key: key.into() })
    }

    /// Resolve `specifier` against `parent`.
    ///
    /// Relative specifiers (`./x.js`, `../x.js`) are joined onto the parent's
    /// directory, absolute specifiers (`/x.js`) are taken as-is. Both are then
    /// normalized. Bare package specifiers are not supported.
    pub fn resolve(specifier: &str, parent: &ModuleLocation) -> Result<Self, ResolveError> {
        let fail = |reason: &str| ResolveError::Specifier {
            specifier: specifier.to_string(),
            from: parent.to_string(),
            reason: reason.to_string(),
        };

        if specifier.trim().is_empty() {
            return Err(fail("specifier is empty"));
        }
        if specifier.contains('\0') {
            return Err(fail("specifier contains a NUL byte"));
        }
        if specifier == "." || specifier == ".." || specifier.ends_with('/') {
            return Err(fail("specifier names a directory, not a module"));
        }

        let candidate = if is_relative(specifier) {
            parent.base_dir().join(specifier)
        } else if specifier.starts_with('/') {
            PathBuf::from(specifier)
        } else {
            return Err(fail(
                "bare specifiers are not supported, use a relative or absolute path",
            ));
        };

        Ok(Self::from_clean(&candidate.clean()))
    }

    /// The canonical string form. This is the identity of the location.
    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Path view of the location, derived from the canonical string.
    pub fn as_path(&self) -> &Path {
        Path::new(&*self.key)
    }

    pub fn is_directory(&self) -> bool {
        self.key.ends_with('/')
    }

    /// Directory that relative specifiers are resolved against.
    fn base_dir(&self) -> &Path {
        if self.is_directory() {
            self.as_path()
        } else {
            self.as_path().parent().unwrap_or(Path::new("/"))
        }
    }

    fn from_clean(path: &Path) -> Self {
        Self {
            key: path_to_key(path).into(),
        }
    }
}

impl fmt::Display for ModuleLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for ModuleLocation {
    fn as_ref(&self) -> &str {
        &self.key
    }
}

fn is_relative(specifier: &str) -> bool {
    specifier.starts_with("./") || specifier.starts_with("../")
}

fn path_to_key(path: &Path) -> String {
    let key = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        key.into_owned()
    } else {
        key.replace(std::path::MAIN_SEPARATOR, "/")
    }
}
