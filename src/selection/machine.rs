// src/selection/machine.rs
// =============================================================================
// The set of users the person has picked, with a maximum size.
//
// Two flavours:
// - SinglePhase: picking a user makes it active right away
// - TwoPhase: picks go into `staged` first; `submit_staged()` copies them
//   to `committed`, which is what the repository view shows
//
// In both flavours:
// - Adding the same user twice does nothing
// - Adding when full is refused and nothing changes
// - Removing a user takes it out of staged AND committed
//
// States:
//   Empty --add--> Staging --add...--> Full
//     ^              |                  |
//     +----remove----+------remove------+
// =============================================================================

use tracing::debug;

use crate::github::Entity;

pub const DEFAULT_MAX_SELECTED: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    SinglePhase,
    TwoPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionState {
    Empty,
    Staging,
    Full,
}

// What happened when we tried to add a user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    AlreadySelected,
    AtCapacity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    mode: SelectionMode,
    max: usize,
    staged: Vec<Entity>,
    committed: Vec<Entity>,
}

impl Selection {
    pub fn new(mode: SelectionMode, max: usize) -> Self {
        Self {
            mode,
            max,
            staged: Vec::new(),
            committed: Vec::new(),
        }
    }

    // Rebuilds a single-phase selection from a saved list
    //
    // Duplicates are dropped and the list is cut to `max`, so a hand-edited
    // snapshot can't break the invariants
    pub fn restore(entities: Vec<Entity>, max: usize) -> Self {
        let mut selection = Self::new(SelectionMode::SinglePhase, max);
        for entity in entities {
            selection.add(entity);
        }
        selection
    }

    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn staged(&self) -> &[Entity] {
        &self.staged
    }

    pub fn committed(&self) -> &[Entity] {
        &self.committed
    }

    pub fn contains(&self, id: u64) -> bool {
        self.staged.iter().any(|e| e.id == id)
    }

    pub fn is_full(&self) -> bool {
        self.staged.len() >= self.max
    }

    pub fn state(&self) -> SelectionState {
        match self.staged.len() {
            0 => SelectionState::Empty,
            n if n >= self.max => SelectionState::Full,
            _ => SelectionState::Staging,
        }
    }

    pub fn add(&mut self, entity: Entity) -> AddOutcome {
        if self.contains(entity.id) {
            return AddOutcome::AlreadySelected;
        }
        if self.is_full() {
            debug!(login = %entity.login, max = self.max, "selection full, ignoring add");
            return AddOutcome::AtCapacity;
        }

        debug!(login = %entity.login, "selected");
        if self.mode == SelectionMode::SinglePhase {
            self.committed.push(entity.clone());
        }
        self.staged.push(entity);
        AddOutcome::Added
    }

    // Returns true if the user was selected (in either list)
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.staged.len() + self.committed.len();
        self.staged.retain(|e| e.id != id);
        self.committed.retain(|e| e.id != id);
        before != self.staged.len() + self.committed.len()
    }

    // Two-phase only: make the staged list the active one
    //
    // Returns false when there was nothing new to commit
    pub fn submit_staged(&mut self) -> bool {
        if self.mode == SelectionMode::SinglePhase || self.committed == self.staged {
            return false;
        }
        self.committed = self.staged.clone();
        debug!(count = self.committed.len(), "submitted staged selection");
        true
    }
}
