// src/selection/mod.rs
// =============================================================================
// The users the person has picked.
//
// Submodules:
// - machine: The selection rules (max size, no duplicates, staged/committed)
// - snapshot: Saving and restoring the selection as a JSON file
// =============================================================================

mod machine;
mod snapshot;

pub use machine::{AddOutcome, Selection, SelectionMode, SelectionState, DEFAULT_MAX_SELECTED};
pub use snapshot::{load_selection, save_selection, SnapshotStore};
