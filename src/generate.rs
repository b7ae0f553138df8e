//! Generate a patch document by diffing two files and appending the result to
//! a patch file.

use crate::codec::{append_document, PatchFileError};
use crate::diff::{DiffEngine, DiffError};
use crate::patch::PatchMeta;
use crate::record::PatchRecord;
use crate::report::Reporter;
use crate::safety::{self, SafetyError};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("please provide {0}")]
    EmptyField(&'static str),

    #[error(transparent)]
    Safety(#[from] SafetyError),

    #[error(transparent)]
    Diff(#[from] DiffError),

    #[error(transparent)]
    PatchFile(#[from] PatchFileError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateRequest {
    pub original: PathBuf,
    pub modified: PathBuf,
    pub patch_file: PathBuf,
    pub meta: PatchMeta,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "GenerateReport should be checked or reported"]
pub struct GenerateReport {
    pub patch_file: PathBuf,
    pub records: Vec<PatchRecord>,
}

impl GenerateReport {
    pub fn bytes_changed(&self) -> usize {
        self.records.iter().map(PatchRecord::len).sum()
    }
}

impl GenerateRequest {
    /// Every path and metadata field must be non-empty. The description is
    /// trimmed before it is stored.
    fn validate(&self) -> Result<PatchMeta, GenerateError> {
        let paths = [
            (&self.original, "an original file"),
            (&self.modified, "a new file"),
            (&self.patch_file, "a patch file"),
        ];
        for (path, what) in paths {
            if path.as_os_str().is_empty() {
                return Err(GenerateError::EmptyField(what));
            }
        }

        let meta = PatchMeta {
            name: self.meta.name.trim().to_string(),
            author: self.meta.author.trim().to_string(),
            group: self.meta.group.trim().to_string(),
            description: self.meta.description.trim().to_string(),
        };
        let fields = [
            (&meta.name, "a name"),
            (&meta.author, "an author"),
            (&meta.group, "a group"),
            (&meta.description, "a description"),
        ];
        for (value, what) in fields {
            if value.is_empty() {
                return Err(GenerateError::EmptyField(what));
            }
        }
        Ok(meta)
    }
}

/// Diff `request.original` against `request.modified` and append one document
/// describing the changes to `request.patch_file`.
///
/// All validation (fields, file existence, aliasing, size) happens before the
/// patch file is opened. Failures are also sent to `reporter`.
pub fn generate_patch(
    request: &GenerateRequest,
    engine: &DiffEngine,
    reporter: &dyn Reporter,
) -> Result<GenerateReport, GenerateError> {
    let result = generate_inner(request, engine, reporter);
    if let Err(err) = &result {
        reporter.error(&err.to_string());
    }
    result
}

fn generate_inner(
    request: &GenerateRequest,
    engine: &DiffEngine,
    reporter: &dyn Reporter,
) -> Result<GenerateReport, GenerateError> {
    let meta = request.validate()?;
    safety::reject_non_file(&request.patch_file, "patch")?;

    let records = engine.diff_files(&request.original, &request.modified)?;
    if records.is_empty() {
        log::warn!(
            "{} and {} are identical, writing an empty patch",
            request.original.display(),
            request.modified.display()
        );
    }

    append_document(&request.patch_file, &meta, &records)?;
    reporter.info(&format!(
        "Wrote \"{}\" ({} record(s)) to {}",
        meta.name,
        records.len(),
        request.patch_file.display()
    ));

    Ok(GenerateReport {
        patch_file: request.patch_file.clone(),
        records,
    })
}
