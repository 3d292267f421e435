// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (to stderr, so it never mixes with table/JSON output)
// 3. Load the config file and apply command-line overrides
// 4. Dispatch to the appropriate subcommand handler
// 5. Exit with proper code (0 = success, 1 = GitHub said no, 2 = error)
//
// Rust concepts used:
// - async/await: Every GitHub call is a network request
// - Arc: The explorer shares one client with its background prefetches
// - match: Pattern matching to handle different subcommands
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli;           // src/cli.rs - command-line parsing
mod config;        // src/config.rs - settings file
mod debounce;      // src/debounce/ - waiting for the user to stop typing
mod explorer;      // src/explorer/ - search + selection + repositories
mod github;        // src/github/ - GitHub REST API client
mod output;        // src/output.rs - tables and JSON
mod query;         // src/query/ - request cache
mod search;        // src/search/ - validation and autocomplete
mod selection;     // src/selection/ - picked users
mod session;       // src/session.rs - the interactive explorer loop

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
use config::Config;
use explorer::{Explorer, ExplorerOptions};
use github::{DirectoryApi, Entity, GithubClient, GithubError, SearchUsersResponse};
use query::{QueryCache, QueryKey};
use selection::{SelectionMode, SnapshotStore};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            error!(error = %format!("{:#}", e), "fatal");
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// RUST_LOG wins when set; otherwise warnings only, or debug with -v
fn init_logging(verbose: bool) {
    let default = if verbose { "repos_hub=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// Returns:
//   Ok(0) = success
//   Ok(1) = the request was rejected (bad query, not found, rate limited...)
//   Err   = anything unexpected (bad config, I/O error)
async fn run(cli: Cli) -> Result<i32> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(api_url) = cli.api_url {
        config.api_base_url = api_url;
    }
    debug!(?config, "configuration loaded");

    let client = GithubClient::new(&config.api_base_url, config.request_timeout())?;

    match cli.command {
        Commands::Search { query, page, per_page, json } => {
            let per_page = per_page.unwrap_or(config.per_page);
            handle_search(&client, config.stale_time(), &query, page, per_page, json).await
        }
        Commands::User { username, json } => {
            handle_user(&client, config.stale_time(), &username, json).await
        }
        Commands::Repos { username, json } => {
            handle_repos(&client, &username, config.repos_per_page, json).await
        }
        Commands::Explore { two_phase } => handle_explore(client, &config, two_phase).await,
    }
}

// Handles the 'search' subcommand
//
// Goes through the same keyed cache as the explorer, so the request shows
// up in the debug log under its QueryKey
async fn handle_search(
    client: &GithubClient,
    stale_time: Duration,
    query: &str,
    page: u32,
    per_page: u32,
    json: bool,
) -> Result<i32> {
    // Reject bad input before spending a request on it
    let query = match search::validate_query(query) {
        Ok(query) => query,
        Err(e) => return Ok(report_error(&e)),
    };

    println!("🔍 Searching GitHub users for '{}'", query);

    let cache: QueryCache<SearchUsersResponse> = QueryCache::new(stale_time);
    let key = QueryKey::UserSearch { query: query.to_string(), page, per_page };
    let client = client.clone();
    let text = query.to_string();
    let fetcher = move || async move { client.search_entities(&text, page, per_page).await };

    let response = match cache.fetch(key, fetcher).await {
        Ok(response) => response,
        Err(e) => return Ok(report_error(&e)),
    };

    if json {
        output::print_json(response.as_ref())?;
    } else if response.items.is_empty() {
        println!("No users found");
    } else {
        output::print_users_table(&response.items, response.total_count);
    }
    Ok(0)
}

// Handles the 'user' subcommand
async fn handle_user(
    client: &GithubClient,
    stale_time: Duration,
    username: &str,
    json: bool,
) -> Result<i32> {
    let username = username.trim().to_string();
    let cache: QueryCache<Entity> = QueryCache::new(stale_time);
    let key = QueryKey::UserDetails { username: username.clone() };
    let client = client.clone();
    let fetcher = move || async move { client.get_entity(&username).await };

    let user = match cache.fetch(key, fetcher).await {
        Ok(user) => user,
        Err(e) => return Ok(report_error(&e)),
    };

    if json {
        output::print_json(user.as_ref())?;
    } else {
        output::print_user_details(&user);
    }
    Ok(0)
}

// Handles the 'repos' subcommand
async fn handle_repos(
    client: &GithubClient,
    username: &str,
    per_page: u32,
    json: bool,
) -> Result<i32> {
    let username = username.trim();
    let repos = match client.get_repositories(username, 1, per_page).await {
        Ok(repos) => repos,
        Err(e) => return Ok(report_error(&e)),
    };

    if json {
        output::print_json(&repos)?;
    } else if repos.is_empty() {
        println!("No public repositories found for {}", username);
    } else {
        println!("📦 {} repositor{} for {}\n", repos.len(), if repos.len() == 1 { "y" } else { "ies" }, username);
        output::print_repository_table(&repos);
    }
    Ok(0)
}

// Handles the 'explore' subcommand
//
// Single-phase sessions remember the selection between runs; two-phase
// sessions always start empty
async fn handle_explore(client: GithubClient, config: &Config, two_phase: bool) -> Result<i32> {
    let mode = if two_phase { SelectionMode::TwoPhase } else { SelectionMode::SinglePhase };

    let store = match mode {
        SelectionMode::SinglePhase => {
            let store = SnapshotStore::new(config.snapshot_path());
            debug!(path = %store.path().display(), "selection snapshot");
            Some(store)
        }
        SelectionMode::TwoPhase => None,
    };

    let options = ExplorerOptions::from_config(config, mode);
    let mut explorer = Explorer::new(Arc::new(client), options, store);

    session::run(&mut explorer, config.min_query_length).await?;
    Ok(0)
}

// Prints a GitHub error for the user and returns exit code 1
fn report_error(error: &GithubError) -> i32 {
    eprintln!("❌ {}", error);
    1
}
