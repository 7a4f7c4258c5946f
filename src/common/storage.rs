use std::fmt::Display;

use crate::{constraint::Constraint, proof::ClauseId};

/// A reference to a stored constraint. We use this instead of normal references
/// to avoid issues with the borrow checker. Slots are never reused, so a
/// reference to a removed constraint can only ever be detected as gone.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct ClauseRef {
    index: u32,
}

impl ClauseRef {
    pub fn from_index(index: usize) -> Self {
        ClauseRef {
            index: index as u32,
        }
    }

    pub fn to_index(self) -> usize {
        self.index as usize
    }
}

impl Display for ClauseRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "c{}", self.index)
    }
}

/// A constraint together with the bookkeeping shared by every kind.
#[derive(Debug)]
pub struct ClauseData {
    pub constraint: Constraint,
    pub activity: f64,
    pub learnt: bool,
    /// Id of the clause in the proof log, if proof logging is enabled.
    pub proof_id: Option<ClauseId>,
}

impl ClauseData {
    pub fn original(constraint: Constraint, proof_id: Option<ClauseId>) -> Self {
        ClauseData {
            constraint,
            activity: 0.0,
            learnt: false,
            proof_id,
        }
    }

    pub fn learnt(constraint: Constraint, proof_id: Option<ClauseId>) -> Self {
        ClauseData {
            constraint,
            activity: 0.0,
            learnt: true,
            proof_id,
        }
    }
}

/// Arena owning every stored constraint of a solver.
#[derive(Debug, Default)]
pub struct ClauseStorage {
    slots: Vec<Option<ClauseData>>,
    live: usize,
}

impl ClauseStorage {
    pub fn insert(&mut self, data: ClauseData) -> ClauseRef {
        let clause = ClauseRef::from_index(self.slots.len());
        self.slots.push(Some(data));
        self.live += 1;
        clause
    }

    /// Retrieve the constraint associated with the reference. If it has been
    /// removed None is returned.
    pub fn get(&self, clause: ClauseRef) -> Option<&ClauseData> {
        self.slots.get(clause.to_index()).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, clause: ClauseRef) -> Option<&mut ClauseData> {
        self.slots.get_mut(clause.to_index()).and_then(Option::as_mut)
    }

    /// Like [`ClauseStorage::get`], for references which must still be live.
    pub fn data(&self, clause: ClauseRef) -> &ClauseData {
        self.get(clause)
            .unwrap_or_else(|| panic!("dangling clause reference {}", clause))
    }

    pub fn data_mut(&mut self, clause: ClauseRef) -> &mut ClauseData {
        self.get_mut(clause)
            .unwrap_or_else(|| panic!("dangling clause reference {}", clause))
    }

    pub fn contains(&self, clause: ClauseRef) -> bool {
        self.get(clause).is_some()
    }

    pub fn remove(&mut self, clause: ClauseRef) -> Option<ClauseData> {
        let removed = self.slots.get_mut(clause.to_index()).and_then(Option::take);
        if removed.is_some() {
            self.live -= 1;
        }
        removed
    }

    /// Number of constraints currently stored.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn clauses(&self) -> impl Iterator<Item = (ClauseRef, &ClauseData)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|data| (ClauseRef::from_index(i), data)))
    }
}
