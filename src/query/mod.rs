// src/query/mod.rs
// =============================================================================
// Request caching for GitHub calls.
//
// Submodules:
// - key: QueryKey, which identifies a request by operation + parameters
// - cache: QueryCache, the de-duplicating cache itself
// =============================================================================

mod cache;
mod key;

pub use cache::{QueryCache, QueryStatus};
pub use key::QueryKey;
