// src/explorer/mod.rs
// =============================================================================
// The explorer ties search, selection and repository loading together.
//
// Submodules:
// - state: QueryState and SectionState (what the screen should show)
// - controller: Explorer, which owns all of that state
// =============================================================================

mod controller;
mod state;

pub use controller::{Explorer, ExplorerOptions};
pub use state::SectionState;
