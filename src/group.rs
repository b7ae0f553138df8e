//! Grouping and selection of loaded patch sets.
//!
//! The catalog owns every [`PatchSet`] in load order. The [`GroupIndex`] maps
//! each group name (in order of first appearance) to positions in that flat
//! list, so both views always refer to the same sets and share their
//! `selected` flags.

use crate::patch::PatchSet;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("specified group \"{0}\" was not found")]
    UnknownGroup(String),

    #[error("specified patch \"{0}\" was not found")]
    UnknownPatch(String),

    #[error("no patch set at position {position} (catalog holds {len})")]
    UnknownPosition { position: usize, len: usize },
}

/// One group: its name and the catalog positions of its members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Group {
    name: String,
    members: Vec<usize>,
}

impl Group {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupIndex {
    groups: Vec<Group>,
}

impl GroupIndex {
    /// Fold patch sets by group, keeping first-seen group order and
    /// in-group load order.
    pub fn build(patch_sets: &[PatchSet]) -> Self {
        let mut groups: Vec<Group> = Vec::new();
        for (position, set) in patch_sets.iter().enumerate() {
            match groups.iter_mut().find(|g| g.name == set.group()) {
                Some(group) => group.members.push(position),
                None => groups.push(Group {
                    name: set.group().to_string(),
                    members: vec![position],
                }),
            }
        }
        Self { groups }
    }

    pub fn get(&self, name: &str) -> Option<&Group> {
        self.groups.iter().find(|g| g.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Two selected patch sets that write to at least one common offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlap<'a> {
    pub first: &'a PatchSet,
    pub second: &'a PatchSet,
    pub start: u64,
    pub end: u64,
}

#[derive(Debug, Clone, Default)]
pub struct PatchCatalog {
    patch_sets: Vec<PatchSet>,
    index: GroupIndex,
}

impl PatchCatalog {
    pub fn from_patch_sets(patch_sets: Vec<PatchSet>) -> Self {
        let index = GroupIndex::build(&patch_sets);
        Self { patch_sets, index }
    }

    pub fn patch_sets(&self) -> &[PatchSet] {
        &self.patch_sets
    }

    pub fn index(&self) -> &GroupIndex {
        &self.index
    }

    pub fn len(&self) -> usize {
        self.patch_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patch_sets.is_empty()
    }

    /// Members of `name` in load order, or `None` for an unknown group.
    pub fn group<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a PatchSet> + 'a> {
        let group = self.index.get(name)?;
        Some(group.members.iter().map(move |&i| &self.patch_sets[i]))
    }

    /// Every group with its members, in group order.
    pub fn groups(&self) -> impl Iterator<Item = (&str, Vec<&PatchSet>)> {
        self.index.iter().map(move |group| {
            let members: Vec<&PatchSet> =
                group.members.iter().map(|&i| &self.patch_sets[i]).collect();
            (group.name.as_str(), members)
        })
    }

    /// Mark every member of a group as selected. Returns how many were marked.
    pub fn select_group(&mut self, name: &str) -> Result<usize, SelectionError> {
        let group = self
            .index
            .get(name)
            .ok_or_else(|| SelectionError::UnknownGroup(name.to_string()))?;
        for &i in &group.members {
            self.patch_sets[i].set_selected(true);
            log::debug!("{} -> selected", self.patch_sets[i].name());
        }
        Ok(group.members.len())
    }

    /// Mark every patch set called `name` as selected. Names are not required
    /// to be unique across groups.
    pub fn select_patch(&mut self, name: &str) -> Result<usize, SelectionError> {
        let mut count = 0;
        for set in self.patch_sets.iter_mut().filter(|s| s.name() == name) {
            set.set_selected(true);
            count += 1;
        }
        if count == 0 {
            return Err(SelectionError::UnknownPatch(name.to_string()));
        }
        Ok(count)
    }

    /// Set the flag on the patch set at `position` in [`Self::patch_sets`].
    pub fn set_selected(&mut self, position: usize, selected: bool) -> Result<(), SelectionError> {
        let len = self.patch_sets.len();
        let set = self
            .patch_sets
            .get_mut(position)
            .ok_or(SelectionError::UnknownPosition { position, len })?;
        set.set_selected(selected);
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        for set in &mut self.patch_sets {
            set.set_selected(false);
        }
    }

    /// Selected patch sets in group order, then in-group order. This is the
    /// order they are applied in.
    pub fn selected(&self) -> Vec<&PatchSet> {
        self.index
            .iter()
            .flat_map(|group| group.members.iter())
            .map(|&i| &self.patch_sets[i])
            .filter(|set| set.selected())
            .collect()
    }

    /// Overlapping writes between distinct selected patch sets. Application is
    /// last-write-wins; this only reports the collisions.
    pub fn overlaps(&self) -> Vec<Overlap<'_>> {
        let selected = self.selected();
        let mut overlaps = Vec::new();
        for (i, &first) in selected.iter().enumerate() {
            for &second in &selected[i + 1..] {
                for (a, b) in first.overlapping_records(second) {
                    overlaps.push(Overlap {
                        first,
                        second,
                        start: a.offset().max(b.offset()),
                        end: a.end().min(b.end()),
                    });
                }
            }
        }
        overlaps
    }
}
