//! Checker configuration.
//!
//! Loaded from YAML; every field is optional. Command-line flags are applied on top by the
//! CLI. Example:
//!
//! ```yaml
//! level: 2
//! canonical: true
//! path: [modules, vendor/modules]
//! duplicate_exempt: [augment, type, uses]
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::context::DEFAULT_MAX_LEVEL;
use crate::grammar::{GrammarTable, DEFAULT_DUPLICATE_EXEMPT};

/// Environment variable holding extra module directories.
pub const MODPATH_VAR: &str = "YANG_MODPATH";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    #[diagnostic(code(yangcheck::config::read))]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    #[diagnostic(code(yangcheck::config::parse), help("known fields: level, canonical, path, print_error_code, duplicate_exempt"))]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckerConfig {
    /// Reporting ceiling; records with a higher level are recorded but not reported.
    pub level: u8,
    pub canonical: bool,
    /// Module directories, searched before `YANG_MODPATH` and the current directory.
    pub path: Vec<PathBuf>,
    pub print_error_code: bool,
    pub duplicate_exempt: Vec<String>,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            level: DEFAULT_MAX_LEVEL,
            canonical: false,
            path: Vec::new(),
            print_error_code: false,
            duplicate_exempt: DEFAULT_DUPLICATE_EXEMPT
                .iter()
                .map(|kw| kw.to_string())
                .collect(),
        }
    }
}

impl CheckerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_yaml_str(&text).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }

    /// The YANG grammar with this configuration's duplicate exemptions.
    pub fn grammar(&self) -> GrammarTable {
        let mut grammar = GrammarTable::yang();
        grammar.set_duplicate_exempt(self.duplicate_exempt.iter().cloned());
        grammar
    }

    /// Configured directories, then `modpath` entries, then `.`.
    pub fn search_path(&self, modpath: Option<&str>) -> Vec<PathBuf> {
        let mut dirs = self.path.clone();
        if let Some(modpath) = modpath {
            dirs.extend(std::env::split_paths(modpath).filter(|p| !p.as_os_str().is_empty()));
        }
        dirs.push(PathBuf::from("."));
        dirs
    }
}
