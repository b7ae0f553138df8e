use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Pre-flight path checks shared by generation and application.
///
/// Every check runs once, before any file is touched. Nothing here holds a
/// handle, so a file changed by another process between the check and its use
/// is not detected.
#[derive(Error, Debug)]
pub enum SafetyError {
    #[error("unable to find {role} file: {path}")]
    Missing { role: &'static str, path: PathBuf },

    #[error("{role} path exists but is not a regular file: {path}")]
    NotAFile { role: &'static str, path: PathBuf },

    #[error("please select different {first} and {second} files (both are {path})")]
    SameFile {
        first: &'static str,
        second: &'static str,
        path: PathBuf,
    },

    #[error("failed to inspect {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// `path` must exist and be a regular file (symlinks are followed).
pub fn require_file(path: &Path, role: &'static str) -> Result<(), SafetyError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(()),
        Ok(_) => Err(SafetyError::NotAFile {
            role,
            path: path.to_path_buf(),
        }),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Err(SafetyError::Missing {
            role,
            path: path.to_path_buf(),
        }),
        Err(source) => Err(SafetyError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// If `path` exists it must be a regular file. A missing path is fine.
pub fn reject_non_file(path: &Path, role: &'static str) -> Result<(), SafetyError> {
    match fs::metadata(path) {
        Ok(meta) if !meta.is_file() => Err(SafetyError::NotAFile {
            role,
            path: path.to_path_buf(),
        }),
        _ => Ok(()),
    }
}

/// Fail when `other` exists and resolves to the same underlying file as
/// `source` (hard links and symlinks included).
pub fn ensure_distinct(
    source: &Path,
    source_role: &'static str,
    other: &Path,
    other_role: &'static str,
) -> Result<(), SafetyError> {
    if !other.is_file() {
        return Ok(());
    }
    let same = same_file(source, other).map_err(|source_err| SafetyError::Io {
        path: other.to_path_buf(),
        source: source_err,
    })?;
    if same {
        return Err(SafetyError::SameFile {
            first: source_role,
            second: other_role,
            path: other.to_path_buf(),
        });
    }
    Ok(())
}

#[cfg(unix)]
fn same_file(a: &Path, b: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let (a, b) = (fs::metadata(a)?, fs::metadata(b)?);
    Ok(a.dev() == b.dev() && a.ino() == b.ino())
}

#[cfg(not(unix))]
fn same_file(a: &Path, b: &Path) -> io::Result<bool> {
    Ok(a.canonicalize()? == b.canonicalize()?)
}
