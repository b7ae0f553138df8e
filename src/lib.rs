//! Simple Patcher: generate and selectively apply byte-level patches to
//! executables.
//!
//! # Architecture
//!
//! Every change is a [`PatchRecord`]: an offset plus the bytes to write there.
//! Records are bundled into named [`PatchSet`]s, which are grouped by a
//! free-form `group` label in a [`PatchCatalog`] so front ends can offer bulk
//! selection.
//!
//! - [`diff`] finds the records that turn one file into another.
//! - [`codec`] reads and writes patch definition files (multi-document YAML).
//! - [`apply`] copies an original file and writes the selected records into
//!   the copy.
//!
//! # Limits
//!
//! - Only same-offset overwrites and growth; no truncation, insertion, or
//!   deletion
//! - Overlapping records from different patch sets are last-write-wins
//! - No rollback if a write fails part-way through
//!
//! # Example
//!
//! ```no_run
//! use simple_patcher::{apply_patch_sets, load_from_paths, LogReporter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut catalog = load_from_paths(&["patches/game.yaml"])?;
//! catalog.select_group("ui")?;
//! let report = apply_patch_sets(
//!     "game.exe",
//!     "game-patched.exe",
//!     &catalog.selected(),
//!     &LogReporter,
//! )?;
//! println!("wrote {} bytes", report.bytes_written);
//! # Ok(())
//! # }
//! ```

pub mod apply;
pub mod codec;
pub mod diff;
pub mod discover;
pub mod generate;
pub mod group;
pub mod patch;
pub mod record;
pub mod report;
pub mod safety;

// Re-exports
pub use apply::{apply_patch_sets, ApplyError, ApplyReport};
pub use codec::{
    append_document, decode_documents, decode_str, encode_document, load_from_path,
    load_from_paths, CodecError, HexError, PatchFileError,
};
pub use diff::{DiffEngine, DiffError, DEFAULT_BLOCK_SIZE};
pub use discover::{discover_patch_files, DiscoverError};
pub use generate::{generate_patch, GenerateError, GenerateReport, GenerateRequest};
pub use group::{Group, GroupIndex, Overlap, PatchCatalog, SelectionError};
pub use patch::{PatchMeta, PatchSet, PatchSetError};
pub use record::{PatchRecord, RecordError};
pub use report::{LogReporter, NullReporter, Reporter};
pub use safety::SafetyError;
