// src/session.rs
// =============================================================================
// The interactive `explore` session.
//
// Each line you type is one of:
// - plain text: the new contents of the search field (debounced, so the
//   suggestions appear once you stop typing)
// - a command starting with ':' (see HELP below)
//
// Two things can happen at any time, and we wait for both at once with
// tokio::select!:
// - a new line arrives on stdin
// - the debouncer settles on a query, and we print the suggestions
// =============================================================================

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::explorer::{Explorer, SectionState};
use crate::github::DirectoryApi;
use crate::output;
use crate::search::Key;
use crate::selection::{AddOutcome, SelectionMode, SelectionState};

const HELP: &str = "\
Type text to search users. Commands:
  :down / :up     move the highlight in the suggestion list
  :enter          pick the highlighted suggestion
  :esc            close the suggestion list
  :pick N         pick suggestion number N
  :rm LOGIN       remove a selected user
  :submit         show repositories for the staged users (two-phase mode)
  :repos          show repositories for the active users
  :retry [LOGIN]  retry the suggestions, or LOGIN's repositories
  :list           show the current selection
  :quit           leave";

// Whether the session should keep going after a line
#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

// A parsed input line
#[derive(Debug, PartialEq, Eq)]
enum Command {
    Input(String),
    Key(Key),
    Enter,
    Pick(usize),
    Remove(String),
    Submit,
    Repos,
    Retry(Option<String>),
    List,
    Help,
    Quit,
    Unknown(String),
}

fn parse_line(line: &str) -> Command {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix(':') else {
        return Command::Input(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or("");
    let arg = parts.next().map(str::to_string);

    match (name, arg) {
        ("down", None) => Command::Key(Key::Down),
        ("up", None) => Command::Key(Key::Up),
        ("enter", None) => Command::Enter,
        ("esc", None) => Command::Key(Key::Escape),
        ("pick", Some(n)) => match n.parse::<usize>() {
            Ok(n) if n > 0 => Command::Pick(n - 1),
            _ => Command::Unknown(trimmed.to_string()),
        },
        ("rm", Some(login)) => Command::Remove(login),
        ("submit", None) => Command::Submit,
        ("repos", None) => Command::Repos,
        ("retry", login) => Command::Retry(login),
        ("list", None) => Command::List,
        ("help", _) => Command::Help,
        ("quit" | "q", _) => Command::Quit,
        _ => Command::Unknown(trimmed.to_string()),
    }
}

pub async fn run<A>(explorer: &mut Explorer<A>, min_query_length: usize) -> Result<()>
where
    A: DirectoryApi + 'static,
{
    println!("🔍 repos-hub explorer ({} mode). Type :help for commands.", mode_name(explorer));
    print_selection(explorer);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if handle_command(explorer, parse_line(&line), min_query_length).await == Flow::Quit {
                    break;
                }
            }
            Some(_) = explorer.settled() => {
                let state = explorer.suggestions().await;
                let selected = explorer.selection().staged().len();
                if explorer.dropdown().should_show(explorer.is_query_valid(), selected) {
                    output::print_suggestions(&state, explorer.dropdown().highlighted(), min_query_length);
                }
            }
        }
    }

    println!("👋 Bye");
    Ok(())
}

async fn handle_command<A>(explorer: &mut Explorer<A>, command: Command, min_query_length: usize) -> Flow
where
    A: DirectoryApi + 'static,
{
    match command {
        Command::Input(text) => explorer.input(&text),
        Command::Key(key) => {
            match explorer.handle_key(key) {
                Some(outcome) => report(explorer, outcome),
                None if !explorer.dropdown().is_open() => println!("   (suggestions closed)"),
                None => {
                    let state = explorer.suggestions().await;
                    output::print_suggestions(&state, explorer.dropdown().highlighted(), min_query_length);
                }
            }
        }
        Command::Enter => match explorer.select_highlighted() {
            Some(outcome) => report(explorer, outcome),
            None => println!("   Nothing highlighted. Use :down / :up first"),
        },
        Command::Pick(index) => match explorer.select_suggestion(index) {
            Some(outcome) => report(explorer, outcome),
            None => println!("   No suggestion number {}", index + 1),
        },
        Command::Remove(login) => {
            let id = explorer.find_selected(&login).map(|e| e.id);
            match id {
                Some(id) => {
                    explorer.remove(id);
                    println!("🗑️  Removed {}", login);
                    print_selection(explorer);
                }
                None => println!("   {} is not selected", login),
            }
        }
        Command::Submit => {
            if explorer.submit() {
                show_repositories(explorer).await;
            } else {
                println!("   Nothing new to submit");
            }
        }
        Command::Repos => show_repositories(explorer).await,
        Command::Retry(Some(login)) => {
            let state = explorer.retry_repositories(&login).await;
            output::print_repository_section(&login, &state);
        }
        Command::Retry(None) => {
            let state = explorer.retry_suggestions().await;
            output::print_suggestions(&state, explorer.dropdown().highlighted(), min_query_length);
        }
        Command::List => {
            let query = explorer.query();
            if explorer.is_settling() {
                println!("   Search: '{}' (waiting for you to stop typing)", query.raw());
            } else {
                println!("   Search: '{}'", query.committed());
            }
            print_selection(explorer);
        }
        Command::Help => println!("{}", HELP),
        Command::Quit => return Flow::Quit,
        Command::Unknown(text) => println!("   Unknown command '{}'. Type :help", text),
    }
    Flow::Continue
}

fn report<A>(explorer: &Explorer<A>, outcome: AddOutcome)
where
    A: DirectoryApi + 'static,
{
    match outcome {
        AddOutcome::Added => {
            if let Some(user) = explorer.selection().staged().last() {
                println!("✅ Selected {}", user.login);
            }
            print_selection(explorer);
        }
        AddOutcome::AlreadySelected => println!("   Already selected"),
        AddOutcome::AtCapacity => {}
    }

    if let Some(warning) = explorer.capacity_warning() {
        println!("⚠️  Note: {}", warning);
    }
}

fn print_selection<A>(explorer: &Explorer<A>)
where
    A: DirectoryApi + 'static,
{
    let logins = |users: &[crate::github::Entity]| {
        users.iter().map(|u| u.login.as_str()).collect::<Vec<_>>().join(", ")
    };

    let selection = explorer.selection();
    if selection.state() == SelectionState::Empty && selection.committed().is_empty() {
        println!("   Nobody selected yet");
        return;
    }
    match selection.mode() {
        SelectionMode::SinglePhase => {
            println!("   Selected ({}/{}): {}", selection.staged().len(), selection.max(), logins(selection.staged()));
        }
        SelectionMode::TwoPhase => {
            println!("   Staged ({}/{}): {}", selection.staged().len(), selection.max(), logins(selection.staged()));
            println!("   Active: {}", logins(selection.committed()));
        }
    }
}

async fn show_repositories<A>(explorer: &Explorer<A>)
where
    A: DirectoryApi + 'static,
{
    let users = explorer.active_users().to_vec();
    if users.is_empty() {
        println!("   No active users. Pick someone first.");
        return;
    }

    for user in &users {
        if explorer.repositories_status(&user.login) == SectionState::Loading {
            println!("\n⏳ Still loading repositories for {}...", user.login);
        }
        let state = explorer.repositories(&user.login).await;
        output::print_repository_section(&user.login, &state);
    }
}

fn mode_name<A>(explorer: &Explorer<A>) -> &'static str
where
    A: DirectoryApi + 'static,
{
    match explorer.selection().mode() {
        SelectionMode::SinglePhase => "single-phase",
        SelectionMode::TwoPhase => "two-phase",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_input() {
        assert_eq!(parse_line("octo cat"), Command::Input("octo cat".to_string()));
        assert_eq!(parse_line(""), Command::Input(String::new()));
    }

    #[test]
    fn test_keys() {
        assert_eq!(parse_line(":down"), Command::Key(Key::Down));
        assert_eq!(parse_line(" :enter "), Command::Enter);
        assert_eq!(parse_line(":esc"), Command::Key(Key::Escape));
    }

    #[test]
    fn test_pick_is_one_based() {
        assert_eq!(parse_line(":pick 1"), Command::Pick(0));
        assert_eq!(parse_line(":pick 0"), Command::Unknown(":pick 0".to_string()));
        assert_eq!(parse_line(":pick x"), Command::Unknown(":pick x".to_string()));
    }

    #[test]
    fn test_retry_with_and_without_login() {
        assert_eq!(parse_line(":retry"), Command::Retry(None));
        assert_eq!(parse_line(":retry octocat"), Command::Retry(Some("octocat".to_string())));
    }

    #[test]
    fn test_misc_commands() {
        assert_eq!(parse_line(":rm octocat"), Command::Remove("octocat".to_string()));
        assert_eq!(parse_line(":q"), Command::Quit);
        assert_eq!(parse_line(":rm"), Command::Unknown(":rm".to_string()));
    }
}
