use crate::codec::errors::{CodecError, PatchFileError};
use crate::codec::hex::{parse_bytes, parse_offset};
use crate::group::PatchCatalog;
use crate::patch::{PatchMeta, PatchSet};
use crate::record::PatchRecord;
use serde::Deserialize;
use serde_yaml_ng::{Mapping, Value};
use std::fs;
use std::path::Path;

const REQUIRED_FIELDS: [&str; 5] = ["name", "author", "group", "description", "patch"];
const ENTRY_FIELDS: [&str; 2] = ["offset", "bytes"];

/// Decode every document in one text blob, in order.
///
/// Empty documents (a bare `---`, or an empty blob) produce nothing. The first
/// malformed document aborts the whole decode.
pub fn decode_str(input: &str) -> Result<Vec<PatchSet>, CodecError> {
    let mut patch_sets = Vec::new();
    for (index, document) in serde_yaml_ng::Deserializer::from_str(input).enumerate() {
        let value = Value::deserialize(document)?;
        if value.is_null() {
            continue;
        }
        patch_sets.push(decode_document(index + 1, &value)?);
    }
    Ok(patch_sets)
}

/// Decode several blobs and fold the result into a catalog grouped by `group`.
pub fn decode_documents<S: AsRef<str>>(blobs: &[S]) -> Result<PatchCatalog, CodecError> {
    let mut patch_sets = Vec::new();
    for blob in blobs {
        patch_sets.extend(decode_str(blob.as_ref())?);
    }
    Ok(PatchCatalog::from_patch_sets(patch_sets))
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<Vec<PatchSet>, PatchFileError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|source| PatchFileError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let patch_sets = decode_str(&contents)
        .map_err(|source| PatchFileError::from(source).with_path(path))?;
    log::debug!(
        "loaded {} patch set(s) from {}",
        patch_sets.len(),
        path.display()
    );
    Ok(patch_sets)
}

/// Load every file in order and merge them into one catalog. All-or-nothing.
pub fn load_from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<PatchCatalog, PatchFileError> {
    let mut patch_sets = Vec::new();
    for path in paths {
        patch_sets.extend(load_from_path(path)?);
    }
    Ok(PatchCatalog::from_patch_sets(patch_sets))
}

fn decode_document(document: usize, value: &Value) -> Result<PatchSet, CodecError> {
    let mapping = value
        .as_mapping()
        .ok_or(CodecError::NotAMapping { document })?;

    let missing = missing_fields(mapping, &REQUIRED_FIELDS);
    if !missing.is_empty() {
        return Err(CodecError::MissingFields {
            document,
            fields: missing,
        });
    }

    let unknown: Vec<String> = mapping
        .keys()
        .map(key_text)
        .filter(|key| !REQUIRED_FIELDS.contains(&key.as_str()))
        .collect();
    if !unknown.is_empty() {
        return Err(CodecError::UnknownFields {
            document,
            fields: unknown,
        });
    }

    let field = |name: &str| -> Result<String, CodecError> {
        mapping
            .get(name)
            .and_then(scalar_text)
            .ok_or_else(|| CodecError::NotAString {
                document,
                field: name.to_string(),
            })
    };
    let meta = PatchMeta {
        name: field("name")?,
        author: field("author")?,
        group: field("group")?,
        description: field("description")?,
    };

    let entries: &[Value] = match mapping.get("patch") {
        Some(Value::Sequence(entries)) => entries.as_slice(),
        // `patch:` with nothing after it
        Some(Value::Null) => &[],
        _ => return Err(CodecError::NotASequence { document }),
    };

    let records = entries
        .iter()
        .enumerate()
        .map(|(index, entry)| decode_entry(document, index + 1, entry))
        .collect::<Result<Vec<_>, _>>()?;

    PatchSet::new(meta, records).map_err(|source| CodecError::PatchSet { document, source })
}

fn decode_entry(document: usize, entry: usize, value: &Value) -> Result<PatchRecord, CodecError> {
    let mapping = value
        .as_mapping()
        .ok_or(CodecError::EntryNotAMapping { document, entry })?;

    let missing = missing_fields(mapping, &ENTRY_FIELDS);
    if !missing.is_empty() {
        return Err(CodecError::EntryMissingFields {
            document,
            entry,
            fields: missing,
        });
    }

    let offset_text = entry_text(mapping, "offset", document, entry)?;
    let offset = parse_offset(offset_text).map_err(|source| CodecError::InvalidOffset {
        document,
        entry,
        value: offset_text.to_string(),
        source,
    })?;

    let bytes_text = entry_text(mapping, "bytes", document, entry)?;
    let payload = parse_bytes(bytes_text).map_err(|source| CodecError::InvalidBytes {
        document,
        entry,
        value: bytes_text.to_string(),
        source,
    })?;

    PatchRecord::new(offset, payload).map_err(|source| CodecError::Record {
        document,
        entry,
        source,
    })
}

fn missing_fields(mapping: &Mapping, required: &[&'static str]) -> Vec<&'static str> {
    required
        .iter()
        .copied()
        .filter(|field| !mapping.contains_key(*field))
        .collect()
}

fn key_text(key: &Value) -> String {
    scalar_text(key).unwrap_or_else(|| format!("{key:?}"))
}

/// Hex fields must arrive as YAML strings. An unquoted `0x10` or `1000` is
/// already a number by the time it gets here and its digits are lost.
fn entry_text<'a>(
    mapping: &'a Mapping,
    field: &'static str,
    document: usize,
    entry: usize,
) -> Result<&'a str, CodecError> {
    match mapping.get(field) {
        Some(Value::String(text)) => Ok(text.as_str()),
        other => Err(CodecError::EntryNotAString {
            document,
            entry,
            field,
            found: other.map_or("missing value", value_kind),
        }),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "list",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged value",
    }
}

/// Metadata scalars. Unquoted numbers and booleans are kept as their parsed
/// value's text.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some(String::new()),
        _ => None,
    }
}
