// src/github/mod.rs
// =============================================================================
// This module is our window onto the GitHub REST API.
//
// Submodules:
// - types: The JSON shapes (users, repositories, search results)
// - error: GithubError, the one error type every API call returns
// - client: The HTTP client and the DirectoryApi trait it implements
//
// Nothing outside this module builds URLs or looks at status codes.
// =============================================================================

mod client;
mod error;
mod types;

pub use client::{DirectoryApi, GithubClient};
pub use error::GithubError;
pub use types::{Entity, Repository, SearchUsersResponse};

#[cfg(test)]
pub(crate) use types::fixtures;
