use crate::record::PatchRecord;
use std::fmt;
use thiserror::Error;

/// Descriptive fields shared by every patch set.
///
/// All four are required when a set is built; there is no defaulted field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchMeta {
    pub name: String,
    pub author: String,
    pub group: String,
    pub description: String,
}

impl PatchMeta {
    pub fn new(
        name: impl Into<String>,
        author: impl Into<String>,
        group: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            author: author.into(),
            group: group.into(),
            description: description.into(),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchSetError {
    #[error("patch set field '{field}' must not be empty")]
    EmptyField { field: &'static str },
}

/// A named, authored collection of records representing one logical change.
///
/// `selected` is the only state that changes after construction; it is set by
/// whichever front end decides what to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchSet {
    meta: PatchMeta,
    records: Vec<PatchRecord>,
    selected: bool,
}

impl PatchSet {
    /// Build a patch set. `name` and `group` must be non-empty; `group` is the
    /// key used to partition sets for bulk selection.
    pub fn new(meta: PatchMeta, records: Vec<PatchRecord>) -> Result<Self, PatchSetError> {
        if meta.name.trim().is_empty() {
            return Err(PatchSetError::EmptyField { field: "name" });
        }
        if meta.group.trim().is_empty() {
            return Err(PatchSetError::EmptyField { field: "group" });
        }
        if records.is_empty() {
            log::warn!("patch set '{}' has no records", meta.name);
        }
        Ok(Self {
            meta,
            records,
            selected: false,
        })
    }

    pub fn meta(&self) -> &PatchMeta {
        &self.meta
    }

    pub fn name(&self) -> &str {
        &self.meta.name
    }

    pub fn author(&self) -> &str {
        &self.meta.author
    }

    pub fn group(&self) -> &str {
        &self.meta.group
    }

    pub fn description(&self) -> &str {
        &self.meta.description
    }

    pub fn records(&self) -> &[PatchRecord] {
        &self.records
    }

    pub fn selected(&self) -> bool {
        self.selected
    }

    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    /// Total number of bytes this set overwrites.
    pub fn byte_count(&self) -> usize {
        self.records.iter().map(PatchRecord::len).sum()
    }

    /// Pairs of records (one from each set) whose ranges overlap.
    pub fn overlapping_records<'a>(
        &'a self,
        other: &'a PatchSet,
    ) -> Vec<(&'a PatchRecord, &'a PatchRecord)> {
        self.records
            .iter()
            .flat_map(|ours| {
                other
                    .records
                    .iter()
                    .filter(move |theirs| ours.overlaps(theirs))
                    .map(move |theirs| (ours, theirs))
            })
            .collect()
    }
}

impl fmt::Display for PatchSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Patch:")?;
        writeln!(f, " name: {}", self.meta.name)?;
        writeln!(f, " description: {}", self.meta.description)?;
        writeln!(f, " author: {}", self.meta.author)?;
        writeln!(f, " group: {}", self.meta.group)?;
        write!(f, " records: {}", self.records.len())?;
        for record in &self.records {
            write!(f, "\n  {record}")?;
        }
        Ok(())
    }
}
