// src/explorer/state.rs
// =============================================================================
// Small state types the explorer hands to whoever draws the screen.
//
// - QueryState: what's in the text field vs. what we're actually searching
// - SectionState: the one state a fetch-backed section is in right now
// =============================================================================

use std::sync::Arc;

use crate::github::GithubError;
use crate::query::QueryStatus;

// `committed` lags behind `raw` by the debounce delay and is always trimmed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryState {
    raw: String,
    committed: String,
}

impl QueryState {
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn set_raw(&mut self, raw: &str) {
        self.raw = raw.to_string();
    }

    pub fn commit(&mut self, query: &str) {
        self.committed = query.trim().to_string();
    }

    pub fn clear(&mut self) {
        self.raw.clear();
        self.committed.clear();
    }
}

/// What a section (suggestions, one user's repositories) should show.
///
/// Loading, Failed, Empty and Loaded never overlap; Idle means no request
/// was made because its precondition didn't hold.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionState<T> {
    Idle,
    Loading,
    Failed(GithubError),
    Empty,
    Loaded(T),
}

impl<R> From<QueryStatus<Vec<R>>> for SectionState<Arc<Vec<R>>> {
    fn from(status: QueryStatus<Vec<R>>) -> Self {
        match status {
            QueryStatus::Idle => SectionState::Idle,
            QueryStatus::Loading => SectionState::Loading,
            QueryStatus::Failed(error) => SectionState::Failed(error),
            QueryStatus::Ready(items) if items.is_empty() => SectionState::Empty,
            QueryStatus::Ready(items) => SectionState::Loaded(items),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_trims() {
        let mut state = QueryState::default();
        state.set_raw("  octo ");
        assert_eq!(state.committed(), "");
        state.commit("  octo ");
        assert_eq!(state.raw(), "  octo ");
        assert_eq!(state.committed(), "octo");

        state.clear();
        assert_eq!(state, QueryState::default());
    }

    #[test]
    fn test_empty_result_is_empty_state() {
        let state: SectionState<Arc<Vec<u32>>> = QueryStatus::Ready(Arc::new(vec![])).into();
        assert_eq!(state, SectionState::Empty);

        let state: SectionState<Arc<Vec<u32>>> = QueryStatus::Ready(Arc::new(vec![1])).into();
        assert!(matches!(state, SectionState::Loaded(_)));

        let state: SectionState<Arc<Vec<u32>>> = QueryStatus::Failed(GithubError::NotFound).into();
        assert_eq!(state, SectionState::Failed(GithubError::NotFound));
    }
}
