//! Input discovery: expands command-line paths into module files.

use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::repository::Format;

/// Recursively scans `root` for `.yang` and `.yin` files, sorted for deterministic order.
pub fn discover_module_files<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root) {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if Format::from_extension(entry.path()).is_none() {
            continue;
        }
        files.push(entry.into_path());
    }
    files.sort();
    Ok(files)
}

/// Files are kept as given; directories are replaced by the module files beneath them.
pub fn expand_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            files.extend(discover_module_files(input)?);
        } else {
            files.push(input.clone());
        }
    }
    Ok(files)
}
