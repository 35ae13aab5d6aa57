//! Module repositories: where module text comes from.
//!
//! A [`Repository`] maps a module name to its source text and surface format. Not-found and
//! read failures are distinct: a missing file lets the caller report `MODULE_NOT_FOUND`, while
//! a file that exists but cannot be read aborts that lookup with `READ_ERROR`.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

// ============================================================================
// FORMATS
// ============================================================================

/// Surface syntax of a module document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Compact keyword notation.
    Yang,
    /// XML notation.
    Yin,
}

impl Format {
    /// Guesses the format from content: a leading `<` (after whitespace) means YIN.
    pub fn guess(text: &str) -> Self {
        match text.trim_start().chars().next() {
            Some('<') => Self::Yin,
            _ => Self::Yang,
        }
    }

    pub fn from_extension(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "yang" => Some(Self::Yang),
            "yin" => Some(Self::Yin),
            _ => None,
        }
    }

    pub const fn extension(self) -> &'static str {
        match self {
            Self::Yang => "yang",
            Self::Yin => "yin",
        }
    }
}

/// Raw module text as served by a repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleSource {
    /// Identifies the source to the user (usually a file name).
    pub reference: String,
    pub format: Format,
    pub text: String,
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("module `{name}` not found")]
    NotFound { name: String },
    #[error("{path}: {message}")]
    Read { path: String, message: String },
}

pub trait Repository {
    fn get_module(&self, name: &str) -> Result<ModuleSource, RepositoryError>;
}

// ============================================================================
// FILESYSTEM REPOSITORY
// ============================================================================

/// Searches an ordered list of directories.
///
/// Candidate names are tried in order `<name>.yang`, `<name>.yin`, `<name>`; each candidate is
/// looked for in every directory before moving on to the next candidate.
#[derive(Debug, Clone, Default)]
pub struct FileRepository {
    dirs: Vec<PathBuf>,
}

impl FileRepository {
    /// Builds a repository from an OS path list (`:`-separated on Unix).
    pub fn new(path: &str) -> Self {
        Self {
            dirs: std::env::split_paths(path).collect(),
        }
    }

    pub fn from_dirs<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    fn search_file(&self, filename: &str) -> Option<PathBuf> {
        for dir in &self.dirs {
            let joined = dir.join(filename);
            let candidate = match joined.strip_prefix(".") {
                Ok(stripped) if !stripped.as_os_str().is_empty() => stripped.to_path_buf(),
                _ => joined,
            };
            trace!(path = %candidate.display(), "probing");
            if candidate.is_file() {
                return Some(candidate);
            }
        }
        None
    }
}

impl Repository for FileRepository {
    fn get_module(&self, name: &str) -> Result<ModuleSource, RepositoryError> {
        let candidates = [
            (format!("{name}.yang"), Some(Format::Yang)),
            (format!("{name}.yin"), Some(Format::Yin)),
            (name.to_string(), None),
        ];
        let Some((path, format)) = candidates
            .into_iter()
            .find_map(|(filename, format)| self.search_file(&filename).map(|p| (p, format)))
        else {
            debug!(module = name, "not found in search path");
            return Err(RepositoryError::NotFound {
                name: name.to_string(),
            });
        };

        let reference = path.display().to_string();
        let text = fs::read_to_string(&path).map_err(|e| RepositoryError::Read {
            path: reference.clone(),
            message: e.to_string(),
        })?;
        let format = format.unwrap_or_else(|| Format::guess(&text));
        debug!(module = name, path = %reference, ?format, "found module");

        Ok(ModuleSource {
            reference,
            format,
            text,
        })
    }
}

// ============================================================================
// IN-MEMORY REPOSITORY
// ============================================================================

/// Serves fixed module texts; useful for embedding and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    modules: HashMap<String, ModuleSource>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `text` under `name`, guessing its format.
    pub fn insert(&mut self, name: impl Into<String>, text: impl Into<String>) -> &mut Self {
        let name = name.into();
        let text = text.into();
        let format = Format::guess(&text);
        let reference = format!("{}.{}", name, format.extension());
        self.modules.insert(
            name,
            ModuleSource {
                reference,
                format,
                text,
            },
        );
        self
    }

    pub fn with(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.insert(name, text);
        self
    }
}

impl Repository for MemoryRepository {
    fn get_module(&self, name: &str) -> Result<ModuleSource, RepositoryError> {
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| RepositoryError::NotFound {
                name: name.to_string(),
            })
    }
}
