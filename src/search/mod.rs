// src/search/mod.rs
// =============================================================================
// Everything between "the user typed something" and "here are the rows to
// pick from".
//
// Submodules:
// - validation: Rejects bad queries before any request is made
// - suggestions: Filters and caps the autocomplete list
// - dropdown: Arrow-key / Enter / Escape handling for that list
// =============================================================================

mod dropdown;
mod suggestions;
mod validation;

pub use dropdown::{Dropdown, Key};
pub use suggestions::{Suggestion, SuggestionEngine};
pub use validation::validate_query;
