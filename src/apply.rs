//! Apply selected patch sets to a copy of an original file.
//!
//! The original is copied to the destination, then each record of each patch
//! set is written in place, in the order given. Overlapping records are
//! last-write-wins. There is no rollback: an I/O failure part-way leaves the
//! destination partially patched.

use crate::patch::PatchSet;
use crate::report::Reporter;
use crate::safety::{self, SafetyError};
use std::fs::{self, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("no destination file specified")]
    DestinationUnspecified,

    #[error(transparent)]
    Safety(#[from] SafetyError),

    #[error("failed to copy {from} to {to}: {source}")]
    Copy {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },

    #[error("failed to write patch '{patch}' at offset {offset:#010x} in {path}: {source}")]
    Write {
        path: PathBuf,
        patch: String,
        offset: u64,
        source: io::Error,
    },

    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// Summary of a successful application.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "ApplyReport should be checked or reported"]
pub struct ApplyReport {
    pub destination: PathBuf,
    pub patch_sets: usize,
    pub records: usize,
    pub bytes_written: u64,
}

/// Copy `original` to `destination` and overwrite the copy with every record
/// of every given patch set.
///
/// Validation happens before the destination is touched: the original must be
/// an existing regular file and the destination, if it exists, must not be the
/// same file. An existing, different destination is overwritten. Failures are
/// also sent to `reporter`.
pub fn apply_patch_sets(
    original: impl AsRef<Path>,
    destination: impl AsRef<Path>,
    patch_sets: &[&PatchSet],
    reporter: &dyn Reporter,
) -> Result<ApplyReport, ApplyError> {
    let result = apply_inner(original.as_ref(), destination.as_ref(), patch_sets, reporter);
    if let Err(err) = &result {
        reporter.error(&err.to_string());
    }
    result
}

fn apply_inner(
    original: &Path,
    destination: &Path,
    patch_sets: &[&PatchSet],
    reporter: &dyn Reporter,
) -> Result<ApplyReport, ApplyError> {
    if destination.as_os_str().is_empty() {
        return Err(ApplyError::DestinationUnspecified);
    }
    safety::require_file(original, "original")?;
    safety::ensure_distinct(original, "original", destination, "new")?;

    fs::copy(original, destination).map_err(|source| ApplyError::Copy {
        from: original.to_path_buf(),
        to: destination.to_path_buf(),
        source,
    })?;

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .open(destination)
        .map_err(|source| ApplyError::Io {
            path: destination.to_path_buf(),
            source,
        })?;

    let mut report = ApplyReport {
        destination: destination.to_path_buf(),
        patch_sets: 0,
        records: 0,
        bytes_written: 0,
    };

    for set in patch_sets {
        reporter.info(&format!("Applying \"{}\"...", set.name()));
        for record in set.records() {
            let write_err = |source: io::Error| ApplyError::Write {
                path: destination.to_path_buf(),
                patch: set.name().to_string(),
                offset: record.offset(),
                source,
            };
            file.seek(SeekFrom::Start(record.offset()))
                .map_err(write_err)?;
            file.write_all(record.payload()).map_err(write_err)?;
            log::debug!("wrote {record}");
            report.records += 1;
            report.bytes_written += record.len() as u64;
        }
        report.patch_sets += 1;
    }

    file.flush().map_err(|source| ApplyError::Io {
        path: destination.to_path_buf(),
        source,
    })?;
    Ok(report)
}
