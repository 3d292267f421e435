// src/github/types.rs
// =============================================================================
// The shapes of the JSON documents GitHub sends back.
//
// We only declare the fields we actually use. serde ignores the rest of the
// (very large) payloads, so new fields on GitHub's side never break us.
//
// Rust concepts:
// - Derive macros: Serialize/Deserialize generate the JSON code for us
// - Option<T>: For fields GitHub may leave out or send as null
// - #[serde(rename = ...)]: When the JSON name isn't a valid Rust name
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// A GitHub account can be a person or an organization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    User,
    Organization,
    // GitHub also has "Bot" and may add more; we treat them as users
    #[serde(other)]
    Other,
}

impl EntityKind {
    pub fn label(&self) -> &'static str {
        match self {
            EntityKind::Organization => "Organization",
            EntityKind::User | EntityKind::Other => "User",
        }
    }
}

/// A user or organization record.
///
/// Search results only fill in the first five fields. The optional ones come
/// from `GET /users/{username}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: u64,
    pub login: String,
    pub avatar_url: String,
    pub html_url: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_repos: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following: Option<u32>,
}

impl Entity {
    // The name to show people: their real name if set, else the login
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.login)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Repository {
    pub id: u64,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub html_url: String,
    pub language: Option<String>,
    pub stargazers_count: u32,
    pub forks_count: u32,
    #[serde(default)]
    pub topics: Vec<String>,
    pub updated_at: DateTime<Utc>,
    #[serde(default = "default_visibility")]
    pub visibility: String,
}

fn default_visibility() -> String {
    "public".to_string()
}

// Body of GET /search/users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchUsersResponse {
    pub total_count: u64,
    pub incomplete_results: bool,
    pub items: Vec<Entity>,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    // Small constructor so tests don't repeat the whole struct literal
    pub fn entity(id: u64, login: &str) -> Entity {
        Entity {
            id,
            login: login.to_string(),
            avatar_url: format!("https://avatars.githubusercontent.com/u/{}", id),
            html_url: format!("https://github.com/{}", login),
            kind: EntityKind::User,
            name: None,
            bio: None,
            location: None,
            public_repos: None,
            followers: None,
            following: None,
        }
    }

    pub fn repository(id: u64, name: &str) -> Repository {
        Repository {
            id,
            name: name.to_string(),
            full_name: format!("octocat/{}", name),
            description: None,
            html_url: format!("https://github.com/octocat/{}", name),
            language: Some("Rust".to_string()),
            stargazers_count: 3,
            forks_count: 1,
            topics: vec![],
            updated_at: DateTime::parse_from_rfc3339("2024-05-01T12:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
            visibility: "public".to_string(),
        }
    }
}
