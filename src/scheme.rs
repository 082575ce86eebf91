//! Registry of named outer-layout markup files
//!
//! Schemes are loaded from a directory once, cached immutably, and served by
//! name for the lifetime of the process. All marker resolution happens on
//! copies of the markup, never on the cached entries.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Filename extension recognized as a scheme file
const SCHEME_EXTENSION: &str = "html";

/// Errors that can occur while loading schemes
#[derive(Debug, Error)]
pub enum SchemeError {
    #[error("failed to read scheme directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to read scheme file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// A named, cached layout template
///
/// Immutable once loaded; `markup` has line endings normalized to `\n`.
#[derive(Debug, Clone)]
pub struct Scheme {
    pub name: String,
    pub path: PathBuf,
    pub markup: String,
}

/// Registry for loaded schemes
#[derive(Debug, Default)]
pub struct SchemeRegistry {
    schemes: HashMap<String, Scheme>,
}

impl SchemeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every `*.html` file directly inside `directory`
    ///
    /// The scheme name is the filename up to the first dot, so `main.html`
    /// and `main.v2.html` collide; entries are loaded in sorted filename
    /// order and the last one wins. Re-invoking `load` overwrites earlier
    /// entries with the same name.
    pub fn load(&mut self, directory: &Path) -> Result<(), SchemeError> {
        let entries = std::fs::read_dir(directory).map_err(|source| SchemeError::ReadDir {
            path: directory.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.is_file()
                    && path
                        .extension()
                        .is_some_and(|ext| ext == SCHEME_EXTENSION)
            })
            .collect();

        // Directory order is filesystem-dependent; sort for determinism
        paths.sort();

        for path in paths {
            let Some(name) = scheme_name(&path) else {
                continue;
            };
            let content =
                std::fs::read_to_string(&path).map_err(|source| SchemeError::ReadFile {
                    path: path.clone(),
                    source,
                })?;
            self.schemes.insert(
                name.clone(),
                Scheme {
                    name,
                    path,
                    markup: normalize_newlines(&content),
                },
            );
        }

        Ok(())
    }

    /// Get a scheme by name
    pub fn get(&self, name: &str) -> Option<&Scheme> {
        self.schemes.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemes.contains_key(name)
    }

    /// Snapshot of all loaded schemes, sorted by name
    pub fn get_all(&self) -> Vec<&Scheme> {
        let mut all: Vec<&Scheme> = self.schemes.values().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    pub fn len(&self) -> usize {
        self.schemes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemes.is_empty()
    }
}

/// Scheme name: filename text before the first dot
fn scheme_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let name = file_name.split('.').next().unwrap_or(file_name);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Normalize `\r\n` and bare `\r` line endings to `\n`
pub(crate) fn normalize_newlines(content: &str) -> String {
    content.replace("\r\n", "\n").replace('\r', "\n")
}
