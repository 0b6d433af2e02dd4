// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Include resolution: locating the source text named by `{% include %}`
//! and `{% extends %}`.
//!
//! # Resolver Implementations
//!
//! - [`FileSystemResolver`]: loads templates relative to a root directory
//!   (requires the `filesystem` feature).
//! - [`MemoryResolver`]: loads templates from an in-memory map, the
//!   resolver used by this crate's own tests.
//!
//! Paths are resolved relative to the directory of the including source
//! (see [`IncludeResolver::resolve`]'s `from` parameter), not to the
//! resolver's root.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// A resolved template source: its canonical name and its text.
#[derive(Debug, Clone)]
pub struct ResolvedSource {
    /// The canonical name, used for cycle detection and nested error
    /// tagging.
    pub name: String,
    /// The template source text.
    pub source: String,
}

/// Resolves an include/extends name to source text.
///
/// Implementations must be `Send + Sync`: the evaluator may re-enter the
/// parser recursively (for nested includes) from within a single render.
pub trait IncludeResolver: Send + Sync {
    /// Resolves `name`, relative to `from` (the name of the template doing
    /// the including; empty for the initial `parse`/`parse_file` call).
    ///
    /// Returns `Ok(None)` if no such template exists — the parser turns
    /// that into `ParserError::TemplateNotFound`.
    fn resolve(&self, from: &str, name: &str) -> std::io::Result<Option<ResolvedSource>>;
}

/// Converts a [`Path`] to a forward-slash-separated string, so include
/// names are platform-independent.
#[inline]
pub fn path_to_string<P: AsRef<Path>>(path: P) -> String {
    #[cfg(windows)]
    {
        use std::path::Component;
        let mut result = String::new();
        for (i, component) in path.as_ref().components().enumerate() {
            if i > 0 {
                result.push('/');
            }
            match component {
                Component::Prefix(p) => result.push_str(&p.as_os_str().to_string_lossy()),
                Component::RootDir => result.push('/'),
                Component::CurDir => result.push('.'),
                Component::ParentDir => result.push_str(".."),
                Component::Normal(s) => result.push_str(&s.to_string_lossy()),
            }
        }
        result
    }
    #[cfg(not(windows))]
    {
        path.as_ref().to_string_lossy().to_string()
    }
}

/// Loads templates from a filesystem directory.
#[cfg(feature = "filesystem")]
#[derive(Debug, Clone)]
pub struct FileSystemResolver {
    root: PathBuf,
}

#[cfg(feature = "filesystem")]
impl FileSystemResolver {
    /// Creates a resolver rooted at `root`. Include names are resolved
    /// relative to `from`'s directory, falling back to `root` if that
    /// file doesn't exist there.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileSystemResolver { root: root.into() }
    }
}

#[cfg(feature = "filesystem")]
impl IncludeResolver for FileSystemResolver {
    fn resolve(&self, from: &str, name: &str) -> std::io::Result<Option<ResolvedSource>> {
        let candidate = if from.is_empty() {
            self.root.join(name)
        } else {
            let base = Path::new(from).parent().unwrap_or_else(|| Path::new(""));
            self.root.join(base).join(name)
        };
        let candidate = if candidate.exists() {
            candidate
        } else {
            self.root.join(name)
        };
        if !candidate.exists() {
            return Ok(None);
        }
        let source = std::fs::read_to_string(&candidate)?;
        let name = path_to_string(candidate.strip_prefix(&self.root).unwrap_or(&candidate));
        Ok(Some(ResolvedSource { name, source }))
    }
}

/// Loads templates from an in-memory map, keyed by name.
///
/// This is the resolver this crate's own tests use, and is suitable for
/// WASM hosts or tests in downstream crates that don't want filesystem
/// access.
#[derive(Debug, Clone, Default)]
pub struct MemoryResolver {
    templates: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryResolver {
    /// An empty resolver.
    pub fn new() -> Self {
        MemoryResolver::default()
    }

    /// Registers (or overwrites) a template's source under `name`.
    pub fn insert(&self, name: impl Into<String>, source: impl Into<String>) {
        self.templates
            .lock()
            .unwrap()
            .insert(name.into(), source.into());
    }
}

impl IncludeResolver for MemoryResolver {
    fn resolve(&self, _from: &str, name: &str) -> std::io::Result<Option<ResolvedSource>> {
        Ok(self
            .templates
            .lock()
            .unwrap()
            .get(name)
            .map(|source| ResolvedSource {
                name: name.to_string(),
                source: source.clone(),
            }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_resolver_round_trips() {
        let r = MemoryResolver::new();
        r.insert("a.html", "hi");
        let resolved = r.resolve("", "a.html").unwrap().unwrap();
        assert_eq!(resolved.source, "hi");
        assert!(r.resolve("", "missing.html").unwrap().is_none());
    }

    #[cfg(feature = "filesystem")]
    #[test]
    fn filesystem_resolver_reads_relative_to_root_and_including_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("partials")).unwrap();
        std::fs::write(dir.path().join("index.html"), "root").unwrap();
        std::fs::write(dir.path().join("partials/card.html"), "card").unwrap();

        let r = FileSystemResolver::new(dir.path());
        assert_eq!(r.resolve("", "index.html").unwrap().unwrap().source, "root");
        assert_eq!(
            r.resolve("", "partials/card.html").unwrap().unwrap().source,
            "card"
        );
        assert!(r.resolve("", "missing.html").unwrap().is_none());
    }
}
