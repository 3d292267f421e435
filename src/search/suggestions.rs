// src/search/suggestions.rs
// =============================================================================
// Turns search results into the short autocomplete list the user picks from.
//
// Steps, in order:
// 1. Too-short query -> empty list
// 2. Keep candidates whose label or value contains the query (any case)
// 3. Drop anything that is already selected
// 4. Keep at most `max_suggestions`, in the order GitHub returned them
//
// The engine is a pure function of its inputs: same inputs, same output.
// =============================================================================

use std::collections::HashSet;

use serde::Serialize;

use crate::github::Entity;

/// One row of the autocomplete dropdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub id: u64,
    pub label: String,
    pub subtitle: String,
    pub avatar: String,
    pub value: String,
}

impl From<&Entity> for Suggestion {
    fn from(entity: &Entity) -> Self {
        Suggestion {
            id: entity.id,
            label: entity.login.clone(),
            subtitle: entity.kind.label().to_string(),
            avatar: entity.avatar_url.clone(),
            value: entity.login.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SuggestionEngine {
    pub max_suggestions: usize,
    pub min_query_length: usize,
}

impl SuggestionEngine {
    pub fn new(max_suggestions: usize, min_query_length: usize) -> Self {
        Self { max_suggestions, min_query_length }
    }

    // A query is worth searching for once it has enough characters
    pub fn is_query_valid(&self, query: &str) -> bool {
        query.trim().chars().count() >= self.min_query_length
    }

    pub fn filter(
        &self,
        query: &str,
        candidates: &[Suggestion],
        selected_ids: &HashSet<u64>,
    ) -> Vec<Suggestion> {
        if !self.is_query_valid(query) {
            return Vec::new();
        }

        let needle = query.trim().to_lowercase();

        candidates
            .iter()
            .filter(|s| {
                s.label.to_lowercase().contains(&needle) || s.value.to_lowercase().contains(&needle)
            })
            .filter(|s| !selected_ids.contains(&s.id))
            .take(self.max_suggestions)
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::fixtures::entity;

    fn candidates(logins: &[(u64, &str)]) -> Vec<Suggestion> {
        logins.iter().map(|(id, login)| Suggestion::from(&entity(*id, login))).collect()
    }

    #[test]
    fn test_projection() {
        let suggestion = Suggestion::from(&entity(1, "octocat"));
        assert_eq!(suggestion.id, 1);
        assert_eq!(suggestion.label, "octocat");
        assert_eq!(suggestion.value, "octocat");
        assert_eq!(suggestion.subtitle, "User");
    }

    #[test]
    fn test_short_query_gives_nothing() {
        let engine = SuggestionEngine::new(5, 2);
        let list = candidates(&[(1, "octocat")]);
        assert!(engine.filter("o", &list, &HashSet::new()).is_empty());
        assert!(engine.filter("  o  ", &list, &HashSet::new()).is_empty());
    }

    #[test]
    fn test_case_insensitive_match_keeps_order() {
        let engine = SuggestionEngine::new(5, 2);
        let list = candidates(&[(1, "octocat"), (3, "rustacean"), (2, "OctoDog")]);
        let result = engine.filter(" OCTO ", &list, &HashSet::new());
        let ids: Vec<u64> = result.iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_selected_are_excluded() {
        let engine = SuggestionEngine::new(5, 2);
        let list = candidates(&[(1, "octocat"), (2, "octodog")]);
        let selected: HashSet<u64> = [1].into_iter().collect();
        let result = engine.filter("octo", &list, &selected);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].label, "octodog");
    }

    #[test]
    fn test_capped_at_max() {
        let engine = SuggestionEngine::new(2, 2);
        let list = candidates(&[(1, "octo1"), (2, "octo2"), (3, "octo3")]);
        let result = engine.filter("octo", &list, &HashSet::new());
        assert_eq!(result.len(), 2);
        assert_eq!(result, engine.filter("octo", &list, &HashSet::new()));
    }
}
