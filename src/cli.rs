// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Subcommands:
// - search: One-off user search, printed as a table or JSON
// - user: Profile details for one user
// - repos: Repositories of one user
// - explore: Interactive session with autocomplete and a selection list
//
// Global flags (--config, --api-url, --verbose) work with every subcommand.
// =============================================================================

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "repos-hub",
    version,
    about = "Explore GitHub users and their repositories from the terminal",
    long_about = "repos-hub searches GitHub users with debounced autocomplete, lets you pick up to \
                  five of them, and shows their most recently updated repositories."
)]
pub struct Cli {
    /// Path to a TOML config file
    ///
    /// Defaults to <config dir>/repos-hub/config.toml when that file exists
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the GitHub API root (e.g. for GitHub Enterprise)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Log debug output to stderr (RUST_LOG overrides this)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search GitHub users
    ///
    /// Example: repos-hub search octo --per-page 5
    Search {
        /// Text to search for (letters, digits, spaces, '-' and '_')
        query: String,

        /// Result page to fetch
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Results per page (defaults to the config value)
        #[arg(long)]
        per_page: Option<u32>,

        /// Output results in JSON format instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one user's profile
    ///
    /// Example: repos-hub user octocat
    User {
        username: String,

        #[arg(long)]
        json: bool,
    },

    /// List a user's most recently updated repositories
    ///
    /// Example: repos-hub repos octocat --json
    Repos {
        username: String,

        #[arg(long)]
        json: bool,
    },

    /// Interactive explorer: type to search, pick users, browse repositories
    ///
    /// Type text to search. Commands start with ':' (:help lists them).
    Explore {
        /// Stage picks and only show them after :submit
        ///
        /// Without this flag picks are active at once and saved between runs
        #[arg(long)]
        two_phase: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_with_globals() {
        let cli = Cli::try_parse_from([
            "repos-hub", "search", "octo", "--per-page", "5", "--api-url", "http://localhost:9999", "-v",
        ])
        .unwrap();

        assert!(cli.verbose);
        assert_eq!(cli.api_url.as_deref(), Some("http://localhost:9999"));
        match cli.command {
            Commands::Search { query, page, per_page, json } => {
                assert_eq!(query, "octo");
                assert_eq!(page, 1);
                assert_eq!(per_page, Some(5));
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_explore() {
        let cli = Cli::try_parse_from(["repos-hub", "explore", "--two-phase"]).unwrap();
        assert!(matches!(cli.command, Commands::Explore { two_phase: true }));
    }

    #[test]
    fn test_repos_requires_username() {
        assert!(Cli::try_parse_from(["repos-hub", "repos"]).is_err());
    }
}
