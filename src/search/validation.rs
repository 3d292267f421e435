// src/search/validation.rs
// =============================================================================
// Checks a search query before it's allowed anywhere near the network.
//
// Rules:
// - Not empty (after trimming)
// - At most 100 characters
// - Only letters, digits, whitespace, '-' and '_'
//
// GitHub logins only use letters, digits and '-', so anything else can't
// match a user anyway and would just waste a rate-limited call.
// =============================================================================

use crate::github::GithubError;

pub const MAX_QUERY_LENGTH: usize = 100;

// Returns the trimmed query, or a Validation error explaining what's wrong
pub fn validate_query(raw: &str) -> Result<&str, GithubError> {
    let query = raw.trim();

    if query.is_empty() {
        return Err(GithubError::Validation("Search query is required".to_string()));
    }

    if query.chars().count() > MAX_QUERY_LENGTH {
        return Err(GithubError::Validation(format!(
            "Search query must be less than {} characters",
            MAX_QUERY_LENGTH
        )));
    }

    if !query.chars().all(is_allowed_char) {
        return Err(GithubError::Validation(
            "Search query contains invalid characters".to_string(),
        ));
    }

    Ok(query)
}

fn is_allowed_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c.is_whitespace() || c == '-' || c == '_'
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_query_is_trimmed() {
        assert_eq!(validate_query("  octo-cat_1 "), Ok("octo-cat_1"));
    }

    #[test]
    fn test_empty_query() {
        assert_eq!(
            validate_query("   "),
            Err(GithubError::Validation("Search query is required".to_string()))
        );
    }

    #[test]
    fn test_too_long_query() {
        let long = "a".repeat(101);
        assert!(matches!(validate_query(&long), Err(GithubError::Validation(_))));
        assert!(validate_query(&"a".repeat(100)).is_ok());
    }

    #[test]
    fn test_invalid_characters() {
        for query in ["octo?cat", "a/b", "user@example", "ünïcode"] {
            assert_eq!(
                validate_query(query),
                Err(GithubError::Validation(
                    "Search query contains invalid characters".to_string()
                )),
                "{} should be rejected",
                query
            );
        }
    }
}
