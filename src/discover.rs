use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

const PATCH_EXTENSIONS: [&str; 2] = ["yaml", "yml"];

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("unable to find patch directory: {0}")]
    MissingDirectory(PathBuf),

    #[error("unable to find any patch files (.yaml) in {0}")]
    NoPatchFiles(PathBuf),

    #[error("failed to walk patch directory: {0}")]
    Walk(#[from] walkdir::Error),
}

/// Recursively collect `*.yaml` / `*.yml` files under `dir`, sorted by path.
pub fn discover_patch_files(dir: impl AsRef<Path>) -> Result<Vec<PathBuf>, DiscoverError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(DiscoverError::MissingDirectory(dir.to_path_buf()));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry?;
        let is_patch = entry
            .path()
            .extension()
            .and_then(|s| s.to_str())
            .is_some_and(|ext| PATCH_EXTENSIONS.contains(&ext));
        if entry.file_type().is_file() && is_patch {
            files.push(entry.into_path());
        }
    }
    files.sort();

    if files.is_empty() {
        return Err(DiscoverError::NoPatchFiles(dir.to_path_buf()));
    }
    log::debug!("discovered {} patch file(s) in {}", files.len(), dir.display());
    Ok(files)
}
