// src/github/error.rs
// =============================================================================
// The error type for everything that talks to (or guards) the GitHub API.
//
// Every failure ends up as one of four variants:
// - RateLimited: GitHub says we used up our request quota
// - NotFound: the user or resource doesn't exist
// - Transport: any other bad status code, or the network itself failed
// - Validation: the search text was rejected before we sent anything
//
// The enum is Clone because one in-flight request can have several waiters
// in the query cache, and each of them gets its own copy of the error.
// =============================================================================

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GithubError {
    /// Request quota exhausted (403 with no remaining calls, or 429)
    #[error("API rate limit exceeded. Please try again later.")]
    RateLimited,

    /// 404 from the API
    #[error("Resource not found.")]
    NotFound,

    /// Any other non-2xx status (status is Some) or a network/decoding
    /// failure (status is None)
    #[error("{message}")]
    Transport {
        status: Option<u16>,
        message: String,
    },

    /// Local input check failed, no request was made
    #[error("{0}")]
    Validation(String),
}

impl GithubError {
    // Builds a Transport error for a non-success HTTP status
    pub fn from_status(status: StatusCode) -> Self {
        GithubError::Transport {
            status: Some(status.as_u16()),
            message: format!("GitHub API error: {}", status.as_u16()),
        }
    }

    // Builds a Transport error for a failure that never produced a status
    pub fn network(cause: impl std::fmt::Display) -> Self {
        GithubError::Transport {
            status: None,
            message: format!("Network error occurred: {}", cause),
        }
    }
}

impl From<reqwest::Error> for GithubError {
    fn from(error: reqwest::Error) -> Self {
        match error.status() {
            Some(status) => GithubError::from_status(status),
            None => GithubError::network(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_are_user_facing() {
        assert_eq!(
            GithubError::RateLimited.to_string(),
            "API rate limit exceeded. Please try again later."
        );
        assert_eq!(GithubError::NotFound.to_string(), "Resource not found.");
        assert_eq!(
            GithubError::from_status(StatusCode::BAD_GATEWAY).to_string(),
            "GitHub API error: 502"
        );
    }

    #[test]
    fn test_network_error_has_no_status() {
        let error = GithubError::network("connection refused");
        assert_eq!(
            error,
            GithubError::Transport {
                status: None,
                message: "Network error occurred: connection refused".to_string(),
            }
        );
    }
}
