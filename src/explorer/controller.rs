// src/explorer/controller.rs
// =============================================================================
// The explorer: the one place that owns the search text and the selection.
//
// Data flow:
//
//   input() --debounce--> settled() --> suggestions()
//                                          |  (cache -> GitHub)
//                                          v
//                            filtered rows, minus selected users
//                                          |
//   select() / handle_key(Enter) <---------+
//      |-> selection.add()  (max N, no duplicates)
//      |-> prefetch that user's repositories in the background
//      |-> clear the search field
//      '-> save the selection (single-phase mode)
//
//   submit()       -> staged users become the active ones (two-phase mode)
//   repositories() -> one user's repositories, from the cache when possible
//   retry_*()      -> re-send the exact same request after a failure
//
// Nobody else mutates the query or the selection: every change goes through
// a method here, so the invariants are checked in one place.
// =============================================================================

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::state::{QueryState, SectionState};
use crate::config::Config;
use crate::debounce::{ClearPolicy, Debouncer, Settled};
use crate::github::{DirectoryApi, Entity, GithubError, Repository};
use crate::query::{QueryCache, QueryKey};
use crate::search::{validate_query, Dropdown, Key, Suggestion, SuggestionEngine};
use crate::selection::{
    load_selection, save_selection, AddOutcome, Selection, SelectionMode, SnapshotStore,
};

// The knobs the explorer needs, pulled out of Config
#[derive(Debug, Clone)]
pub struct ExplorerOptions {
    pub mode: SelectionMode,
    pub max_selected: usize,
    pub min_query_length: usize,
    pub suggestion_limit: u32,
    pub repos_per_page: u32,
    pub debounce: Duration,
    pub clear_policy: ClearPolicy,
    pub stale_time: Duration,
}

impl ExplorerOptions {
    pub fn from_config(config: &Config, mode: SelectionMode) -> Self {
        Self {
            mode,
            max_selected: config.max_selected,
            min_query_length: config.min_query_length,
            suggestion_limit: config.suggestion_limit,
            repos_per_page: config.repos_per_page,
            debounce: config.debounce(),
            clear_policy: config.clear_policy,
            stale_time: config.stale_time(),
        }
    }
}

pub struct Explorer<A> {
    api: Arc<A>,
    options: ExplorerOptions,
    query: QueryState,
    selection: Selection,
    dropdown: Dropdown,
    engine: SuggestionEngine,
    debouncer: Debouncer,
    settled_rx: mpsc::UnboundedReceiver<Settled>,
    suggestion_cache: QueryCache<Vec<Entity>>,
    repository_cache: QueryCache<Vec<Repository>>,
    store: Option<SnapshotStore>,
    // The rows currently on screen, so a key press can pick one
    visible: Vec<Entity>,
}

impl<A> Explorer<A>
where
    A: DirectoryApi + 'static,
{
    // Creates an explorer; in single-phase mode a saved selection is
    // restored from `store`
    pub fn new(api: Arc<A>, options: ExplorerOptions, store: Option<SnapshotStore>) -> Self {
        let selection = match (options.mode, &store) {
            (SelectionMode::SinglePhase, Some(store)) => {
                load_selection(store, options.max_selected).unwrap_or_else(|e| {
                    warn!(error = %e, "could not restore saved selection, starting empty");
                    Selection::new(SelectionMode::SinglePhase, options.max_selected)
                })
            }
            (mode, _) => Selection::new(mode, options.max_selected),
        };

        let (debouncer, settled_rx) = Debouncer::new(options.debounce, options.clear_policy);

        Self {
            api,
            query: QueryState::default(),
            selection,
            dropdown: Dropdown::new(),
            engine: SuggestionEngine::new(
                options.suggestion_limit as usize,
                options.min_query_length,
            ),
            debouncer,
            settled_rx,
            suggestion_cache: QueryCache::new(options.stale_time),
            repository_cache: QueryCache::new(options.stale_time),
            store,
            visible: Vec::new(),
            options,
        }
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn dropdown(&self) -> &Dropdown {
        &self.dropdown
    }

    // Users whose repositories should be shown
    pub fn active_users(&self) -> &[Entity] {
        self.selection.committed()
    }

    // -------------------------------------------------------------------------
    // Query
    // -------------------------------------------------------------------------

    // Records new text-field contents; the query is committed later
    pub fn input(&mut self, raw: &str) {
        self.query.set_raw(raw);
        self.dropdown.open();
        self.debouncer.push(raw);
    }

    // Waits for the debouncer to settle and applies the value
    //
    // Values overtaken by a later keystroke, Escape or pick are skipped.
    // Returns None only if the debouncer is gone
    pub async fn settled(&mut self) -> Option<String> {
        loop {
            let settled = self.settled_rx.recv().await?;
            if !self.debouncer.is_current(&settled) {
                debug!(query = %settled.value, "dropping overtaken query");
                continue;
            }
            self.commit_query(&settled.value);
            return Some(settled.value);
        }
    }

    pub fn commit_query(&mut self, query: &str) {
        self.query.commit(query);
        self.dropdown.reset_highlight();
    }

    // True while typed text is still waiting out the debounce delay
    pub fn is_settling(&self) -> bool {
        self.debouncer.is_pending()
    }

    pub fn is_query_valid(&self) -> bool {
        self.engine.is_query_valid(self.query.committed())
    }

    // -------------------------------------------------------------------------
    // Suggestions
    // -------------------------------------------------------------------------

    // Autocomplete rows for the committed query
    //
    // Too-short queries are Idle and never reach GitHub. Queries with bad
    // characters fail validation, also without a request.
    pub async fn suggestions(&mut self) -> SectionState<Vec<Suggestion>> {
        self.visible.clear();

        let query = self.query.committed().to_string();
        if !self.engine.is_query_valid(&query) {
            return SectionState::Idle;
        }
        if let Err(error) = validate_query(&query) {
            return SectionState::Failed(error);
        }

        let limit = self.options.suggestion_limit;
        let key = QueryKey::UserSuggestions { query: query.clone(), limit };
        let candidates = match self.fetch_suggestions(key, &query, false).await {
            Ok(candidates) => candidates,
            Err(error) => return SectionState::Failed(error),
        };

        self.show(&query, &candidates)
    }

    // Re-sends the suggestion request for the committed query
    pub async fn retry_suggestions(&mut self) -> SectionState<Vec<Suggestion>> {
        let query = self.query.committed().to_string();
        if self.engine.is_query_valid(&query) && validate_query(&query).is_ok() {
            let key = QueryKey::UserSuggestions {
                query: query.clone(),
                limit: self.options.suggestion_limit,
            };
            if let Err(error) = self.fetch_suggestions(key, &query, true).await {
                return SectionState::Failed(error);
            }
        }
        self.suggestions().await
    }

    async fn fetch_suggestions(
        &self,
        key: QueryKey,
        query: &str,
        force: bool,
    ) -> Result<Arc<Vec<Entity>>, GithubError> {
        let api = Arc::clone(&self.api);
        let query = query.to_string();
        let limit = self.options.suggestion_limit;
        let fetcher = move || async move {
            api.search_entities(&query, 1, limit).await.map(|response| response.items)
        };

        if force {
            self.suggestion_cache.refetch(key, fetcher).await
        } else {
            self.suggestion_cache.fetch(key, fetcher).await
        }
    }

    // Filters the candidates and remembers which entities are on screen
    fn show(&mut self, query: &str, candidates: &[Entity]) -> SectionState<Vec<Suggestion>> {
        let rows: Vec<Suggestion> = candidates.iter().map(Suggestion::from).collect();
        let selected: HashSet<u64> = self.selection.staged().iter().map(|e| e.id).collect();
        let filtered = self.engine.filter(query, &rows, &selected);

        self.visible = filtered
            .iter()
            .filter_map(|row| candidates.iter().find(|e| e.id == row.id).cloned())
            .collect();

        if filtered.is_empty() {
            SectionState::Empty
        } else {
            SectionState::Loaded(filtered)
        }
    }

    // Arrow keys / Enter / Escape on the dropdown
    //
    // Returns the add outcome when Enter picked a row
    pub fn handle_key(&mut self, key: Key) -> Option<AddOutcome> {
        if key == Key::Escape {
            // Escape also abandons a search that hasn't settled yet
            self.debouncer.cancel();
        }
        let index = self.dropdown.handle_key(key, self.visible.len())?;
        self.select_suggestion(index)
    }

    pub fn select_highlighted(&mut self) -> Option<AddOutcome> {
        self.handle_key(Key::Enter)
    }

    // Picks the row at `index` (0-based) of the last suggestions() result
    pub fn select_suggestion(&mut self, index: usize) -> Option<AddOutcome> {
        let entity = self.visible.get(index)?.clone();
        Some(self.select(entity))
    }

    // -------------------------------------------------------------------------
    // Selection
    // -------------------------------------------------------------------------

    pub fn select(&mut self, entity: Entity) -> AddOutcome {
        let login = entity.login.clone();
        let outcome = self.selection.add(entity);

        if outcome == AddOutcome::Added {
            info!(%login, "user selected");
            self.prefetch_repositories(&login);
            self.clear_search();
            self.persist();
        }

        outcome
    }

    // A pick empties the search field, like submitting a form
    fn clear_search(&mut self) {
        self.debouncer.cancel();
        self.query.clear();
        self.visible.clear();
        self.dropdown.close();
    }

    pub fn remove(&mut self, id: u64) -> bool {
        let removed = self.selection.remove(id);
        if removed {
            info!(id, "user removed");
            self.persist();
        }
        removed
    }

    // Finds a selected user by login (case-insensitive, like GitHub)
    pub fn find_selected(&self, login: &str) -> Option<&Entity> {
        self.selection
            .staged()
            .iter()
            .chain(self.selection.committed())
            .find(|e| e.login.eq_ignore_ascii_case(login))
    }

    pub fn submit(&mut self) -> bool {
        self.selection.submit_staged()
    }

    // The banner text shown while the selection is full
    pub fn capacity_warning(&self) -> Option<String> {
        self.selection.is_full().then(|| {
            format!(
                "You can select up to {} users to explore their repositories.",
                self.selection.max()
            )
        })
    }

    fn persist(&self) {
        if self.selection.mode() != SelectionMode::SinglePhase {
            return;
        }
        if let Some(store) = &self.store {
            if let Err(e) = save_selection(store, &self.selection) {
                warn!(error = %e, "could not save selection");
            }
        }
    }

    // -------------------------------------------------------------------------
    // Repositories
    // -------------------------------------------------------------------------

    pub async fn repositories(&self, username: &str) -> SectionState<Arc<Vec<Repository>>> {
        let username = username.trim();
        let key = QueryKey::UserRepositories { username: username.to_string() };
        self.repository_cache
            .fetch_if(!username.is_empty(), key, self.repository_fetcher(username))
            .await
            .into()
    }

    // Current state without waiting, e.g. Loading while a prefetch runs
    pub fn repositories_status(&self, username: &str) -> SectionState<Arc<Vec<Repository>>> {
        let key = QueryKey::UserRepositories { username: username.trim().to_string() };
        self.repository_cache.status(&key).into()
    }

    pub async fn retry_repositories(&self, username: &str) -> SectionState<Arc<Vec<Repository>>> {
        let username = username.trim();
        if username.is_empty() {
            return SectionState::Idle;
        }
        let key = QueryKey::UserRepositories { username: username.to_string() };
        match self.repository_cache.refetch(key, self.repository_fetcher(username)).await {
            Ok(repos) if repos.is_empty() => SectionState::Empty,
            Ok(repos) => SectionState::Loaded(repos),
            Err(error) => SectionState::Failed(error),
        }
    }

    fn prefetch_repositories(&self, username: &str) {
        let key = QueryKey::UserRepositories { username: username.to_string() };
        self.repository_cache.prefetch(key, self.repository_fetcher(username));
    }

    fn repository_fetcher(
        &self,
        username: &str,
    ) -> impl FnOnce() -> futures::future::BoxFuture<'static, Result<Vec<Repository>, GithubError>>
    {
        use futures::FutureExt;

        let api = Arc::clone(&self.api);
        let username = username.to_string();
        let per_page = self.options.repos_per_page;
        move || async move { api.get_repositories(&username, 1, per_page).await }.boxed()
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why is Explorer generic over A?
//    - In the real program A is GithubClient
//    - In tests A is a fake that returns canned users and counts calls
//    - The compiler generates a copy of Explorer for each A we use
//
// 2. What does Arc<A> buy us?
//    - Prefetches run on background tasks that outlive the method call
//    - Each task gets its own Arc clone, so the client stays alive until
//      the last task finishes
//
// 3. What is bool::then?
//    - condition.then(|| value) gives Some(value) if true, None if false
// -----------------------------------------------------------------------------
