// src/github/client.rs
// =============================================================================
// This module talks to the GitHub REST API.
//
// Endpoints we use:
// - GET /search/users?q=...&page=...&per_page=...   (autocomplete + search)
// - GET /users/{username}                          (profile details)
// - GET /users/{username}/repos?...&sort=updated   (repository cards)
//
// Every response goes through one place (get_json) so that status codes are
// turned into GithubError the same way for all endpoints.
//
// Rust concepts:
// - Traits: DirectoryApi lets the rest of the app (and tests) swap in a fake
// - async_trait: async functions inside a trait
// - Generics: get_json<T> works for any type serde can deserialize
// =============================================================================

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, ACCEPT};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use super::error::GithubError;
use super::types::{Entity, Repository, SearchUsersResponse};

// GitHub refuses requests that don't identify themselves
const USER_AGENT: &str = concat!("repos-hub/", env!("CARGO_PKG_VERSION"));

// Header GitHub uses to tell us how many calls we have left
const RATE_LIMIT_REMAINING: &str = "x-ratelimit-remaining";

/// The operations the explorer needs from a user/repository directory.
#[async_trait]
pub trait DirectoryApi: Send + Sync {
    async fn search_entities(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchUsersResponse, GithubError>;

    async fn get_entity(&self, username: &str) -> Result<Entity, GithubError>;

    async fn get_repositories(
        &self,
        username: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Repository>, GithubError>;
}

// HTTP implementation of DirectoryApi
#[derive(Debug, Clone)]
pub struct GithubClient {
    http: Client,
    base_url: Url,
}

impl GithubClient {
    // Creates a client for the given API root (e.g. "https://api.github.com")
    //
    // The timeout applies to each request as a whole
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, GithubError> {
        // Url::join treats the last path segment as a "file" unless the
        // path ends with '/', so make sure it does
        let mut normalized = base_url.to_string();
        if !normalized.ends_with('/') {
            normalized.push('/');
        }

        let base_url = Url::parse(&normalized).map_err(|e| GithubError::Transport {
            status: None,
            message: format!("Invalid API URL '{}': {}", base_url, e),
        })?;

        let http = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(GithubError::network)?;

        Ok(Self { http, base_url })
    }

    // Appends path segments to the base URL
    //
    // path_segments_mut() percent-encodes each segment, so a username can
    // never smuggle in an extra "/" or "?"
    fn endpoint(&self, segments: &[&str]) -> Result<Url, GithubError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| GithubError::network("API URL cannot have a path"))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, GithubError> {
        debug!(%url, "GET");

        let response = self
            .http
            .get(url.clone())
            .header(ACCEPT, "application/vnd.github+json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = map_status(status, response.headers());
            warn!(%url, status = status.as_u16(), %error, "GitHub request failed");
            return Err(error);
        }

        // A body that doesn't parse carries no error status, so this becomes
        // a Transport error with status None
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl DirectoryApi for GithubClient {
    async fn search_entities(
        &self,
        query: &str,
        page: u32,
        per_page: u32,
    ) -> Result<SearchUsersResponse, GithubError> {
        let mut url = self.endpoint(&["search", "users"])?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &per_page.to_string());

        self.get_json(url).await
    }

    async fn get_entity(&self, username: &str) -> Result<Entity, GithubError> {
        let url = self.endpoint(&["users", username])?;
        self.get_json(url).await
    }

    async fn get_repositories(
        &self,
        username: &str,
        page: u32,
        per_page: u32,
    ) -> Result<Vec<Repository>, GithubError> {
        let mut url = self.endpoint(&["users", username, "repos"])?;
        url.query_pairs_mut()
            .append_pair("page", &page.to_string())
            .append_pair("per_page", &per_page.to_string())
            .append_pair("sort", "updated");

        self.get_json(url).await
    }
}

// Turns a non-success status into our error type
//
// 403 is ambiguous on GitHub: it means "quota used up" when the remaining
// counter is 0, but also "forbidden" for other reasons. A 403 without the
// counter header is treated as rate limiting, like the web app did.
fn map_status(status: StatusCode, headers: &HeaderMap) -> GithubError {
    match status {
        StatusCode::TOO_MANY_REQUESTS => GithubError::RateLimited,
        StatusCode::FORBIDDEN => {
            let remaining = headers
                .get(RATE_LIMIT_REMAINING)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok());

            match remaining {
                Some(0) | None => GithubError::RateLimited,
                Some(_) => GithubError::from_status(status),
            }
        }
        StatusCode::NOT_FOUND => GithubError::NotFound,
        _ => GithubError::from_status(status),
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a trait for the API?
//    - The query cache and the explorer only need "something that can search
//      users and list repositories"
//    - Tests plug in a fake that returns canned data and counts calls
//    - No network needed to test the interesting logic
//
// 2. What is DeserializeOwned?
//    - A serde trait bound meaning "can be built from JSON without borrowing
//      from the input"
//    - Needed because the response body is dropped after parsing
//
// 3. Why map_err everywhere?
//    - reqwest and url have their own error types
//    - map_err converts them into GithubError so callers only see one type
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GithubClient {
        GithubClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_map_status_403_exhausted() {
        let mut headers = HeaderMap::new();
        headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from_static("0"));
        assert_eq!(map_status(StatusCode::FORBIDDEN, &headers), GithubError::RateLimited);
    }

    #[test]
    fn test_map_status_403_with_quota_left() {
        let mut headers = HeaderMap::new();
        headers.insert(RATE_LIMIT_REMAINING, HeaderValue::from_static("42"));
        assert_eq!(
            map_status(StatusCode::FORBIDDEN, &headers),
            GithubError::Transport {
                status: Some(403),
                message: "GitHub API error: 403".to_string(),
            }
        );
    }

    #[test]
    fn test_map_status_other_codes() {
        let headers = HeaderMap::new();
        assert_eq!(map_status(StatusCode::FORBIDDEN, &headers), GithubError::RateLimited);
        assert_eq!(map_status(StatusCode::TOO_MANY_REQUESTS, &headers), GithubError::RateLimited);
        assert_eq!(map_status(StatusCode::NOT_FOUND, &headers), GithubError::NotFound);
        assert!(matches!(
            map_status(StatusCode::INTERNAL_SERVER_ERROR, &headers),
            GithubError::Transport { status: Some(500), .. }
        ));
    }

    #[test]
    fn test_endpoint_encodes_username() {
        let client = GithubClient::new("https://api.github.com", Duration::from_secs(1)).unwrap();
        let url = client.endpoint(&["users", "a b/c", "repos"]).unwrap();
        assert_eq!(url.as_str(), "https://api.github.com/users/a%20b%2Fc/repos");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = GithubClient::new("https://ghe.example.com/api/v3", Duration::from_secs(1)).unwrap();
        let url = client.endpoint(&["users", "octocat"]).unwrap();
        assert_eq!(url.as_str(), "https://ghe.example.com/api/v3/users/octocat");
    }

    #[tokio::test]
    async fn test_search_entities_sends_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/users"))
            .and(query_param("q", "octo"))
            .and(query_param("page", "1"))
            .and(query_param("per_page", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "total_count": 2,
                "incomplete_results": false,
                "items": [
                    {"id": 1, "login": "octocat", "avatar_url": "a", "html_url": "h", "type": "User"},
                    {"id": 2, "login": "octodog", "avatar_url": "a", "html_url": "h", "type": "User"}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server).search_entities("octo", 1, 5).await.unwrap();
        let logins: Vec<_> = response.items.iter().map(|e| e.login.as_str()).collect();
        assert_eq!(logins, vec!["octocat", "octodog"]);
    }

    #[tokio::test]
    async fn test_repositories_404_is_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/octocat/repos"))
            .and(query_param("sort", "updated"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let result = client_for(&server).get_repositories("octocat", 1, 30).await;
        assert_eq!(result, Err(GithubError::NotFound));
    }

    #[tokio::test]
    async fn test_rate_limit_from_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/octocat"))
            .respond_with(ResponseTemplate::new(403).insert_header(RATE_LIMIT_REMAINING, "0"))
            .mount(&server)
            .await;

        let result = client_for(&server).get_entity("octocat").await;
        assert_eq!(result, Err(GithubError::RateLimited));
    }

    #[tokio::test]
    async fn test_bad_body_is_transport_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/octocat"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let result = client_for(&server).get_entity("octocat").await;
        assert!(matches!(result, Err(GithubError::Transport { status: None, .. })));
    }
}
