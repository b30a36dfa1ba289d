//! Recursive discovery of `.json` data files.

use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Debug, Error)]
pub enum WalkError {
    #[error("Path not found: {0}")]
    RootNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Cannot walk {root}: {source}")]
    Walk {
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Cannot resolve {path}: {source}")]
    Resolve {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

const DATA_FILE_EXTENSION: &str = "json";

fn is_data_file(path: &Path) -> bool {
    let visible = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| !name.starts_with('.'));
    visible && path.extension().and_then(|e| e.to_str()) == Some(DATA_FILE_EXTENSION)
}

/// Lists every `.json` file under `root`, at any depth, as absolute paths.
/// Symlinks to files are listed like the files themselves; symlinked
/// directories are not descended into.
///
/// Entries are visited in file name order within each directory, so the
/// result is stable across runs and platforms.
pub fn find_json_files(root: &Path) -> Result<Vec<PathBuf>, WalkError> {
    if !root.exists() {
        return Err(WalkError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(WalkError::NotADirectory(root.to_path_buf()));
    }
    let root = root.canonicalize().map_err(|source| WalkError::Resolve {
        path: root.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry.map_err(|source| WalkError::Walk {
            root: root.clone(),
            source,
        })?;
        // Follows symlinks, a dangling one is not a file
        if entry.path().is_file() && is_data_file(entry.path()) {
            files.push(entry.into_path());
        }
    }

    tracing::debug!("Found {} data files under {}", files.len(), root.display());
    Ok(files)
}
