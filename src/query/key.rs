// src/query/key.rs
// =============================================================================
// Cache keys: one variant per API operation, carrying that call's parameters.
//
// Two requests share a cache entry only when both the operation and every
// parameter match, so "octo" page 1 and "octo" page 2 never collide.
// =============================================================================

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    UserSearch { query: String, page: u32, per_page: u32 },
    UserSuggestions { query: String, limit: u32 },
    UserDetails { username: String },
    UserRepositories { username: String },
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueryKey::UserSearch { query, page, per_page } => {
                write!(f, "github/users/search/{}?page={}&per_page={}", query, page, per_page)
            }
            QueryKey::UserSuggestions { query, limit } => {
                write!(f, "github/users/suggestions/{}?limit={}", query, limit)
            }
            QueryKey::UserDetails { username } => write!(f, "github/users/{}", username),
            QueryKey::UserRepositories { username } => {
                write!(f, "github/repositories/user/{}", username)
            }
        }
    }
}
