//! Staff roster: the set of identities whose check-ins count.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::model::StaffId;

/// Outcome of a roster mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RosterChange {
    Added,
    AlreadyPresent,
    /// Reported for absent members too; removal is idempotent.
    Removed,
}

/// Insertion-ordered set of staff identities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Roster(IndexSet<StaffId>);

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: StaffId) -> RosterChange {
        if self.0.insert(id) {
            RosterChange::Added
        } else {
            RosterChange::AlreadyPresent
        }
    }

    /// Returns `Removed` whether or not `id` was a member. Use
    /// [`Roster::contains`] beforehand if the distinction matters.
    pub fn remove(&mut self, id: &StaffId) -> RosterChange {
        // shift_remove keeps the report order stable for everyone else
        self.0.shift_remove(id);
        RosterChange::Removed
    }

    pub fn contains(&self, id: &StaffId) -> bool {
        self.0.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StaffId> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<StaffId> for Roster {
    fn from_iter<T: IntoIterator<Item = StaffId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
