use crate::codec::errors::{CodecError, PatchFileError};
use crate::codec::hex::{format_bytes, format_offset};
use crate::patch::PatchMeta;
use crate::record::PatchRecord;
use serde::Serialize;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

#[derive(Serialize)]
struct Document<'a> {
    name: &'a str,
    author: &'a str,
    group: &'a str,
    description: &'a str,
    patch: Vec<Entry>,
}

#[derive(Serialize)]
struct Entry {
    offset: String,
    bytes: String,
}

/// Render one self-contained document, starting with an explicit `---`.
pub fn encode_document(meta: &PatchMeta, records: &[PatchRecord]) -> Result<String, CodecError> {
    let document = Document {
        name: &meta.name,
        author: &meta.author,
        group: &meta.group,
        description: &meta.description,
        patch: records
            .iter()
            .map(|record| Entry {
                offset: format_offset(record.offset()),
                bytes: format_bytes(record.payload()),
            })
            .collect(),
    };
    let body = serde_yaml_ng::to_string(&document)?;
    Ok(format!("---\n{body}"))
}

/// Append one document to `path`, creating the file if needed.
///
/// Existing content is never read or rewritten; a blank line separates the new
/// document from whatever came before.
pub fn append_document(
    path: impl AsRef<Path>,
    meta: &PatchMeta,
    records: &[PatchRecord],
) -> Result<(), PatchFileError> {
    let path = path.as_ref();
    let text = encode_document(meta, records).map_err(|e| PatchFileError::from(e).with_path(path))?;

    let io_err = |source: std::io::Error| PatchFileError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(io_err)?;
    file.write_all(b"\n").map_err(io_err)?;
    file.write_all(text.as_bytes()).map_err(io_err)?;
    file.flush().map_err(io_err)?;

    log::info!(
        "appended patch '{}' ({} record(s)) to {}",
        meta.name,
        records.len(),
        path.display()
    );
    Ok(())
}
