use std::fmt;
use thiserror::Error;

/// The atomic edit unit: overwrite `payload.len()` bytes starting at `offset`.
///
/// Every higher-level operation (diff output, parsed patch documents,
/// application) is expressed in terms of this primitive. Records are
/// immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PatchRecord {
    offset: u64,
    payload: Vec<u8>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    #[error("patch record at offset {offset:#010x} has an empty payload")]
    EmptyPayload { offset: u64 },

    #[error("patch record at offset {offset:#x} with {len} bytes overflows the address space")]
    Overflow { offset: u64, len: usize },
}

impl PatchRecord {
    /// Create a record, rejecting empty payloads and ranges that would wrap.
    pub fn new(offset: u64, payload: impl Into<Vec<u8>>) -> Result<Self, RecordError> {
        let payload = payload.into();
        if payload.is_empty() {
            return Err(RecordError::EmptyPayload { offset });
        }
        if offset.checked_add(payload.len() as u64).is_none() {
            return Err(RecordError::Overflow {
                offset,
                len: payload.len(),
            });
        }
        Ok(Self { offset, payload })
    }

    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Number of bytes this record overwrites. Never zero.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Always false; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Exclusive end offset of the overwritten range.
    pub fn end(&self) -> u64 {
        self.offset + self.payload.len() as u64
    }

    /// True when the byte ranges of `self` and `other` share at least one offset.
    pub fn overlaps(&self, other: &PatchRecord) -> bool {
        self.offset < other.end() && other.offset < self.end()
    }

    pub fn into_parts(self) -> (u64, Vec<u8>) {
        (self.offset, self.payload)
    }
}

impl fmt::Display for PatchRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}:", self.offset)?;
        for byte in &self.payload {
            write!(f, " {byte:02x}")?;
        }
        Ok(())
    }
}
