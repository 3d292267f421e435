// src/output.rs
// =============================================================================
// Everything that prints to the terminal lives here.
//
// Each fetch-backed section prints exactly one of:
// - a loading line
// - an error line (with a hint on how to retry)
// - an "empty" line
// - the data itself, as a table
//
// Column widths are fixed, long values are cut with "..." so rows line up.
// =============================================================================

use std::sync::Arc;

use anyhow::Result;
use serde::Serialize;

use crate::explorer::SectionState;
use crate::github::{Entity, Repository};
use crate::search::Suggestion;

// Prints any serializable value as pretty JSON
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_users_table(users: &[Entity], total_count: u64) {
    println!("{:<30} {:<14} {:<50}", "LOGIN", "TYPE", "PROFILE");
    println!("{}", "=".repeat(94));

    for user in users {
        println!(
            "{:<30} {:<14} {:<50}",
            truncate(&user.login, 30),
            user.kind.label(),
            truncate(&user.html_url, 50)
        );
    }

    println!();
    println!("📊 Showing {} of {} user(s)", users.len(), total_count);
}

pub fn print_user_details(user: &Entity) {
    println!("👤 {} ({})", user.display_name(), user.login);
    println!("   Type:      {}", user.kind.label());
    if let Some(bio) = &user.bio {
        println!("   Bio:       {}", bio);
    }
    if let Some(location) = &user.location {
        println!("   Location:  {}", location);
    }
    if let Some(repos) = user.public_repos {
        println!("   Repos:     {}", repos);
    }
    if let (Some(followers), Some(following)) = (user.followers, user.following) {
        println!("   Followers: {}  Following: {}", followers, following);
    }
    println!("   Profile:   {}", user.html_url);
}

pub fn print_repository_table(repos: &[Repository]) {
    println!(
        "{:<32} {:<12} {:>7} {:>6} {:<11} {:<40}",
        "NAME", "LANGUAGE", "STARS", "FORKS", "UPDATED", "DESCRIPTION"
    );
    println!("{}", "=".repeat(113));

    for repo in repos {
        println!(
            "{:<32} {:<12} {:>7} {:>6} {:<11} {:<40}",
            truncate(&repo.name, 32),
            truncate(repo.language.as_deref().unwrap_or("-"), 12),
            repo.stargazers_count,
            repo.forks_count,
            repo.updated_at.format("%Y-%m-%d"),
            truncate(repo.description.as_deref().unwrap_or(""), 40)
        );
        if !repo.topics.is_empty() {
            println!("{:<32} 🏷️  {}", "", repo.topics.join(", "));
        }
    }
}

// One user's repository section, in whatever state it is in
pub fn print_repository_section(login: &str, state: &SectionState<Arc<Vec<Repository>>>) {
    println!("\n📦 {}", login);
    match state {
        SectionState::Idle => {}
        SectionState::Loading => println!("   ⏳ Loading repositories..."),
        SectionState::Failed(error) => {
            println!("   ❌ Failed to load repositories for {}: {}", login, error);
            println!("   Type :retry {} to try again", login);
        }
        SectionState::Empty => println!("   No public repositories found for {}", login),
        SectionState::Loaded(repos) => {
            println!("   {} repositor{}", repos.len(), if repos.len() == 1 { "y" } else { "ies" });
            print_repository_table(repos);
        }
    }
}

// The autocomplete dropdown; the highlighted row gets an arrow
pub fn print_suggestions(
    state: &SectionState<Vec<Suggestion>>,
    highlighted: Option<usize>,
    min_query_length: usize,
) {
    match state {
        SectionState::Idle => {
            println!("   Type at least {} characters to search", min_query_length)
        }
        SectionState::Loading => println!("   ⏳ Searching..."),
        SectionState::Failed(error) => {
            println!("   ❌ {}", error);
            println!("   Type :retry to try again");
        }
        SectionState::Empty => println!("   No users found"),
        SectionState::Loaded(rows) => {
            for (i, row) in rows.iter().enumerate() {
                let marker = if Some(i) == highlighted { "▶" } else { " " };
                println!("  {} {}. {:<30} {}", marker, i + 1, row.label, row.subtitle);
            }
        }
    }
}

// Shortens `text` to at most `max` characters, ending in "..." if cut
//
// Counts chars, not bytes, so multi-byte text is never split mid-character
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text() {
        assert_eq!(truncate("octocat", 10), "octocat");
    }

    #[test]
    fn test_truncate_long_text() {
        assert_eq!(truncate("a-very-long-repository-name", 10), "a-very-...");
    }

    #[test]
    fn test_truncate_multibyte() {
        assert_eq!(truncate("ñññññññ", 5), "ññ...");
    }
}
