//! Corpus discovery and `dectest:` include resolution.
//!
//! A corpus path is either a single `.decTest` file or a directory whose
//! `*.decTest` files are taken in sorted order. Included files resolve next
//! to the file that names them.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// File extension of corpus files.
pub const CORPUS_EXTENSION: &str = "decTest";

/// Failures reading the corpus from disk.
#[derive(Debug, Error)]
pub enum CorpusError {
    /// The path does not exist.
    #[error("{}: file not found", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },
    /// Reading the path failed.
    #[error("{}: I/O error: {source}", path.display())]
    Io {
        /// Path being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },
    /// A file includes itself, directly or through other files.
    #[error("{}: circular include of {}", from.display(), target.display())]
    CircularInclude {
        /// File holding the offending `dectest:` line.
        from: PathBuf,
        /// File that is already being read.
        target: PathBuf,
    },
}

impl CorpusError {
    fn io(path: &Path, source: io::Error) -> Self {
        if source.kind() == io::ErrorKind::NotFound {
            Self::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            Self::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    }
}

/// One corpus file's path and contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusFile {
    /// Path the file was read from.
    pub path: PathBuf,
    /// Full file text.
    pub text: String,
}

impl CorpusFile {
    /// Reads `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError`] when the file cannot be read.
    pub fn load(path: &Path) -> Result<Self, CorpusError> {
        let text = fs::read_to_string(path).map_err(|e| CorpusError::io(path, e))?;
        Ok(Self {
            path: path.to_path_buf(),
            text,
        })
    }

    /// Display name: the file name without directory.
    #[must_use]
    pub fn name(&self) -> String {
        self.path.file_name().map_or_else(
            || self.path.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        )
    }
}

/// Lists the corpus files under `path`.
///
/// A file path is returned as is; a directory yields its `*.decTest` entries
/// sorted by name. Subdirectories are not descended into.
///
/// # Errors
///
/// Returns [`CorpusError`] when `path` is missing or unreadable.
pub fn discover(path: &Path) -> Result<Vec<PathBuf>, CorpusError> {
    let metadata = fs::metadata(path).map_err(|e| CorpusError::io(path, e))?;
    if !metadata.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in fs::read_dir(path).map_err(|e| CorpusError::io(path, e))? {
        let entry = entry.map_err(|e| CorpusError::io(path, e))?;
        let candidate = entry.path();
        if candidate.is_file() && is_corpus_file(&candidate) {
            files.push(candidate);
        }
    }
    files.sort();
    tracing::debug!(dir = %path.display(), files = files.len(), "discovered corpus files");
    Ok(files)
}

fn is_corpus_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(CORPUS_EXTENSION))
}

/// Resolves a `dectest:` target relative to the including file's directory.
///
/// The `.decTest` extension is appended unless the target already has it.
#[must_use]
pub fn resolve_include(target: &str, containing_file: &Path) -> PathBuf {
    let mut include = PathBuf::from(target);
    if !is_corpus_file(&include) {
        include = PathBuf::from(format!("{target}.{CORPUS_EXTENSION}"));
    }

    if include.is_absolute() {
        include
    } else {
        match containing_file.parent() {
            Some(dir) => dir.join(include),
            None => include,
        }
    }
}

/// Files currently open along one include chain.
///
/// Entering a file already on the chain is a cycle; a file may still be
/// included again once its earlier inclusion has finished.
#[derive(Debug, Default)]
pub struct IncludeChain {
    active: HashSet<PathBuf>,
    order: Vec<PathBuf>,
}

impl IncludeChain {
    /// An empty chain.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pushes `path`, included from `from` (or a root when `None`).
    ///
    /// # Errors
    ///
    /// Returns [`CorpusError::CircularInclude`] when `path` is already open,
    /// or [`CorpusError::NotFound`] when it does not exist.
    pub fn enter(&mut self, path: &Path, from: Option<&Path>) -> Result<(), CorpusError> {
        let canonical = path.canonicalize().map_err(|e| CorpusError::io(path, e))?;
        if self.active.contains(&canonical) {
            return Err(CorpusError::CircularInclude {
                from: from.unwrap_or(path).to_path_buf(),
                target: path.to_path_buf(),
            });
        }
        self.active.insert(canonical.clone());
        self.order.push(canonical);
        Ok(())
    }

    /// Pops the innermost file.
    pub fn leave(&mut self) {
        if let Some(canonical) = self.order.pop() {
            self.active.remove(&canonical);
        }
    }

    /// Nesting depth; zero outside any file.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.order.len()
    }
}

#[cfg(test)]
mod tests {
    use super::{discover, resolve_include, CorpusError, CorpusFile, IncludeChain};
    use std::fs;
    use std::path::{Path, PathBuf};

    #[test]
    fn discover_sorts_and_filters_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("subtract.decTest"), "").unwrap();
        fs::write(dir.path().join("add.decTest"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = discover(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["add.decTest", "subtract.decTest"]);
    }

    #[test]
    fn discover_passes_single_file_through() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("abs.decTest");
        fs::write(&file, "").unwrap();
        assert_eq!(discover(&file).unwrap(), vec![file]);
    }

    #[test]
    fn missing_path_is_not_found() {
        let err = discover(Path::new("/definitely/not/here.decTest")).unwrap_err();
        assert!(matches!(err, CorpusError::NotFound { .. }));
        assert!(CorpusFile::load(Path::new("/definitely/not/here.decTest")).is_err());
    }

    #[test]
    fn include_resolves_next_to_parent() {
        let resolved = resolve_include("base", Path::new("corpus/testall.decTest"));
        assert_eq!(resolved, PathBuf::from("corpus/base.decTest"));
        let explicit = resolve_include("abs.decTest", Path::new("corpus/testall.decTest"));
        assert_eq!(explicit, PathBuf::from("corpus/abs.decTest"));
    }

    #[test]
    fn chain_detects_cycles_but_allows_repeats() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.decTest");
        fs::write(&file, "").unwrap();

        let mut chain = IncludeChain::new();
        chain.enter(&file, None).unwrap();
        let err = chain.enter(&file, Some(&file)).unwrap_err();
        assert!(matches!(err, CorpusError::CircularInclude { .. }));
        chain.leave();
        assert_eq!(chain.depth(), 0);
        chain.enter(&file, None).unwrap();
        assert_eq!(chain.depth(), 1);
    }

    #[test]
    fn file_name_is_reported_without_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("add.decTest");
        fs::write(&path, "precision: 9\n").unwrap();
        let file = CorpusFile::load(&path).unwrap();
        assert_eq!(file.name(), "add.decTest");
        assert_eq!(file.text, "precision: 9\n");
    }
}
