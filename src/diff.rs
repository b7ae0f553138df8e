//! Block-wise byte diff between an original and a modified file.
//!
//! Both inputs are read in lock-step, fixed-size blocks. Blocks with identical
//! content are skipped without a per-byte scan. Inside a differing block every
//! changed position is recorded, and runs of consecutive changed positions are
//! coalesced into a single [`PatchRecord`]. A position that exists only in the
//! modified input always counts as changed.
//!
//! Only same-offset overwrites (and growth) are expressible, so the modified
//! input must never be shorter than the original.

use crate::record::{PatchRecord, RecordError};
use crate::safety::{self, SafetyError};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_BLOCK_SIZE: usize = 4096;

#[derive(Error, Debug)]
pub enum DiffError {
    #[error(transparent)]
    Safety(#[from] SafetyError),

    #[error(
        "original is larger than modified ({original_len} > {modified_len} bytes), \
         truncation is not supported"
    )]
    Truncation { original_len: u64, modified_len: u64 },

    #[error("modified input ended at offset {offset:#x} before the original did, truncation is not supported")]
    TruncatedDuringRead { offset: u64 },

    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("failed reading {stream} input: {source}")]
    Read {
        stream: &'static str,
        source: io::Error,
    },

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Streams two inputs and reports every changed byte position as maximal
/// contiguous [`PatchRecord`]s, in ascending offset order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffEngine {
    block_size: usize,
}

impl Default for DiffEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffEngine {
    pub fn new() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
        }
    }

    /// Use a different block size. Zero is bumped to one.
    pub fn with_block_size(block_size: usize) -> Self {
        Self {
            block_size: block_size.max(1),
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Diff two files on disk.
    ///
    /// Both must be existing regular files and must not be the same file. The
    /// size precondition is checked up front from metadata and re-checked
    /// while reading.
    pub fn diff_files(
        &self,
        original: impl AsRef<Path>,
        modified: impl AsRef<Path>,
    ) -> Result<Vec<PatchRecord>, DiffError> {
        let original = original.as_ref();
        let modified = modified.as_ref();

        safety::require_file(original, "original")?;
        safety::require_file(modified, "modified")?;
        safety::ensure_distinct(original, "original", modified, "modified")?;

        let original_len = file_len(original)?;
        let modified_len = file_len(modified)?;
        if original_len > modified_len {
            return Err(DiffError::Truncation {
                original_len,
                modified_len,
            });
        }

        let original_file = open(original)?;
        let modified_file = open(modified)?;
        log::info!(
            "diffing {} ({} bytes) against {} ({} bytes)",
            original.display(),
            original_len,
            modified.display(),
            modified_len
        );
        self.diff_readers(original_file, modified_file)
    }

    /// Diff two byte streams.
    pub fn diff_readers<O: Read, M: Read>(
        &self,
        mut original: O,
        mut modified: M,
    ) -> Result<Vec<PatchRecord>, DiffError> {
        let mut original_buf = vec![0u8; self.block_size];
        let mut modified_buf = vec![0u8; self.block_size];
        let mut runs = RunBuilder::default();
        let mut offset: u64 = 0;

        loop {
            let original_len = read_block(&mut original, &mut original_buf).map_err(|source| {
                DiffError::Read {
                    stream: "original",
                    source,
                }
            })?;
            let modified_len = read_block(&mut modified, &mut modified_buf).map_err(|source| {
                DiffError::Read {
                    stream: "modified",
                    source,
                }
            })?;

            if original_len == 0 && modified_len == 0 {
                break;
            }
            if original_len > modified_len {
                return Err(DiffError::TruncatedDuringRead {
                    offset: offset + modified_len as u64,
                });
            }

            let old = &original_buf[..original_len];
            let new = &modified_buf[..modified_len];
            if old != new {
                log::debug!("block at {offset:#010x} differs");
                for (i, &byte) in new.iter().enumerate() {
                    // Past the end of `old` nothing matches.
                    if old.get(i) != Some(&byte) {
                        runs.push(offset + i as u64, byte);
                    }
                }
            }
            offset += modified_len as u64;
        }

        let records = runs.finish()?;
        log::debug!("found {} differing run(s)", records.len());
        Ok(records)
    }

    /// Convenience wrapper for in-memory inputs.
    pub fn diff_bytes(&self, original: &[u8], modified: &[u8]) -> Result<Vec<PatchRecord>, DiffError> {
        if original.len() > modified.len() {
            return Err(DiffError::Truncation {
                original_len: original.len() as u64,
                modified_len: modified.len() as u64,
            });
        }
        self.diff_readers(original, modified)
    }
}

/// Accumulates changed positions into contiguous runs.
#[derive(Default)]
struct RunBuilder {
    runs: Vec<(u64, Vec<u8>)>,
    last: Option<u64>,
}

impl RunBuilder {
    fn push(&mut self, offset: u64, byte: u8) {
        match (self.last, self.runs.last_mut()) {
            (Some(prev), Some((_, payload))) if prev + 1 == offset => payload.push(byte),
            _ => self.runs.push((offset, vec![byte])),
        }
        self.last = Some(offset);
    }

    fn finish(self) -> Result<Vec<PatchRecord>, RecordError> {
        self.runs
            .into_iter()
            .map(|(offset, payload)| PatchRecord::new(offset, payload))
            .collect()
    }
}

/// Fill `buf` as far as the reader allows. Returns fewer than `buf.len()`
/// bytes only at end of input.
fn read_block<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn file_len(path: &Path) -> Result<u64, DiffError> {
    fs::metadata(path)
        .map(|meta| meta.len())
        .map_err(|source| DiffError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn open(path: &Path) -> Result<File, DiffError> {
    File::open(path).map_err(|source| DiffError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(records: &[PatchRecord]) -> Vec<(u64, Vec<u8>)> {
        records
            .iter()
            .map(|r| (r.offset(), r.payload().to_vec()))
            .collect()
    }

    #[test]
    fn test_identical_inputs() {
        let data = vec![7u8; 10_000];
        let records = DiffEngine::new().diff_bytes(&data, &data).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_single_run() {
        let old = [0x00u8, 0x01, 0x02, 0x03, 0x04, 0x05];
        let new = [0x00u8, 0xff, 0xff, 0x03, 0x04, 0x05];
        let records = DiffEngine::new().diff_bytes(&old, &new).unwrap();
        assert_eq!(pairs(&records), vec![(1, vec![0xff, 0xff])]);
    }

    #[test]
    fn test_adjacent_changes_merge() {
        let old = vec![0u8; 20];
        let mut new = old.clone();
        new[10] = 1;
        new[11] = 2;
        new[12] = 3;
        let records = DiffEngine::new().diff_bytes(&old, &new).unwrap();
        assert_eq!(pairs(&records), vec![(10, vec![1, 2, 3])]);
    }

    #[test]
    fn test_gap_separates_runs() {
        let old = vec![0u8; 20];
        let mut new = old.clone();
        new[10] = 1;
        new[12] = 3;
        let records = DiffEngine::new().diff_bytes(&old, &new).unwrap();
        assert_eq!(pairs(&records), vec![(10, vec![1]), (12, vec![3])]);
    }

    #[test]
    fn test_run_spans_block_boundary() {
        let old = vec![0u8; 32];
        let mut new = old.clone();
        for b in &mut new[6..10] {
            *b = 0xaa;
        }
        let records = DiffEngine::with_block_size(8).diff_bytes(&old, &new).unwrap();
        assert_eq!(pairs(&records), vec![(6, vec![0xaa; 4])]);
    }

    #[test]
    fn test_growth_is_a_difference() {
        let old = [1u8, 2, 3];
        let new = [1u8, 2, 3, 0, 0, 9];
        let records = DiffEngine::with_block_size(2).diff_bytes(&old, &new).unwrap();
        // Appended zero bytes still differ from "absent".
        assert_eq!(pairs(&records), vec![(3, vec![0, 0, 9])]);
    }

    #[test]
    fn test_growth_joins_trailing_change() {
        let old = [1u8, 2, 3];
        let new = [1u8, 2, 4, 5];
        let records = DiffEngine::new().diff_bytes(&old, &new).unwrap();
        assert_eq!(pairs(&records), vec![(2, vec![4, 5])]);
    }

    #[test]
    fn test_truncation_rejected() {
        let result = DiffEngine::new().diff_bytes(&[1, 2, 3], &[1, 2]);
        assert!(matches!(
            result,
            Err(DiffError::Truncation {
                original_len: 3,
                modified_len: 2
            })
        ));
    }

    #[test]
    fn test_truncation_detected_while_reading() {
        let result = DiffEngine::with_block_size(4).diff_readers(&[0u8; 10][..], &[0u8; 6][..]);
        assert!(matches!(
            result,
            Err(DiffError::TruncatedDuringRead { offset: 6 })
        ));
    }

    #[test]
    fn test_zero_block_size_is_clamped() {
        assert_eq!(DiffEngine::with_block_size(0).block_size(), 1);
        let records = DiffEngine::with_block_size(0)
            .diff_bytes(&[1, 2, 3], &[1, 9, 3])
            .unwrap();
        assert_eq!(pairs(&records), vec![(1, vec![9])]);
    }

    #[test]
    fn test_diff_files_validation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let old = temp_dir.path().join("old.bin");
        let new = temp_dir.path().join("new.bin");
        std::fs::write(&old, [1u8, 2, 3, 4]).unwrap();

        assert!(matches!(
            DiffEngine::new().diff_files(&old, &new),
            Err(DiffError::Safety(SafetyError::Missing { role: "modified", .. }))
        ));
        assert!(matches!(
            DiffEngine::new().diff_files(&old, &old),
            Err(DiffError::Safety(SafetyError::SameFile { .. }))
        ));

        std::fs::write(&new, [1u8, 2]).unwrap();
        assert!(matches!(
            DiffEngine::new().diff_files(&old, &new),
            Err(DiffError::Truncation { .. })
        ));

        std::fs::write(&new, [1u8, 0, 3, 4, 5]).unwrap();
        let records = DiffEngine::new().diff_files(&old, &new).unwrap();
        assert_eq!(pairs(&records), vec![(1, vec![0]), (4, vec![5])]);
    }
}
