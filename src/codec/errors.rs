use crate::codec::hex::HexError;
use crate::patch::PatchSetError;
use crate::record::RecordError;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors turning patch document text into patch sets (or back).
///
/// Document and entry numbers are 1-based, counted within one text blob.
#[derive(Error, Debug)]
pub enum CodecError {
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),

    #[error("document {document}: expected a mapping of patch fields")]
    NotAMapping { document: usize },

    #[error("document {document}: patch missing these fields: {}", .fields.join(", "))]
    MissingFields {
        document: usize,
        fields: Vec<&'static str>,
    },

    #[error("document {document}: unexpected fields: {}", .fields.join(", "))]
    UnknownFields { document: usize, fields: Vec<String> },

    #[error("document {document}: field '{field}' must be a plain string")]
    NotAString { document: usize, field: String },

    #[error("document {document}: \"patch\" field expected to be a list")]
    NotASequence { document: usize },

    #[error("document {document}, patch entry {entry}: expected a mapping with 'offset' and 'bytes'")]
    EntryNotAMapping { document: usize, entry: usize },

    #[error("document {document}, patch entry {entry}: missing these fields: {}", .fields.join(", "))]
    EntryMissingFields {
        document: usize,
        entry: usize,
        fields: Vec<&'static str>,
    },

    #[error("document {document}, patch entry {entry}: '{field}' must be a hex string, found a {found}")]
    EntryNotAString {
        document: usize,
        entry: usize,
        field: &'static str,
        found: &'static str,
    },

    #[error("document {document}, patch entry {entry}: invalid offset {value:?}: {source}")]
    InvalidOffset {
        document: usize,
        entry: usize,
        value: String,
        source: HexError,
    },

    #[error("document {document}, patch entry {entry}: invalid bytes {value:?}: {source}")]
    InvalidBytes {
        document: usize,
        entry: usize,
        value: String,
        source: HexError,
    },

    #[error("document {document}, patch entry {entry}: {source}")]
    Record {
        document: usize,
        entry: usize,
        source: RecordError,
    },

    #[error("document {document}: {source}")]
    PatchSet {
        document: usize,
        source: PatchSetError,
    },
}

/// A codec or I/O failure tied to the patch file it happened in.
#[derive(Debug)]
pub enum PatchFileError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Codec {
        path: Option<PathBuf>,
        source: CodecError,
    },
}

impl PatchFileError {
    pub(crate) fn with_path(self, path: &Path) -> Self {
        match self {
            PatchFileError::Codec { path: None, source } => PatchFileError::Codec {
                path: Some(path.to_path_buf()),
                source,
            },
            other => other,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            PatchFileError::Io { path, .. } => Some(path),
            PatchFileError::Codec { path, .. } => path.as_deref(),
        }
    }
}

impl From<CodecError> for PatchFileError {
    fn from(source: CodecError) -> Self {
        PatchFileError::Codec { path: None, source }
    }
}

impl fmt::Display for PatchFileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatchFileError::Io { path, source } => {
                write!(f, "I/O error on patch file {}: {}", path.display(), source)
            }
            PatchFileError::Codec { path, source } => match path {
                Some(path) => write!(f, "invalid patch file ({}): {}", path.display(), source),
                None => write!(f, "invalid patch file: {}", source),
            },
        }
    }
}

impl std::error::Error for PatchFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PatchFileError::Io { source, .. } => Some(source),
            PatchFileError::Codec { source, .. } => Some(source),
        }
    }
}
