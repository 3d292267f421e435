// src/debounce/mod.rs
// =============================================================================
// Input debouncing.
//
// Submodules:
// - timer: CancellableTimer, a schedule/cancel one-shot timer
// - debouncer: Debouncer, which turns bursts of input into one query
// =============================================================================

mod debouncer;
mod timer;

pub use debouncer::{ClearPolicy, Debouncer, Settled, DEFAULT_DEBOUNCE};
