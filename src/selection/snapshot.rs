// src/selection/snapshot.rs
// =============================================================================
// Saves the selected users to disk so they survive a restart.
//
// The file is a small JSON key-value document:
//
//   { "github-users-storage": [ { "id": 1, "login": "octocat", ... } ] }
//
// Other keys in the file are left alone, so the same file can hold more
// than one thing later on.
//
// Writes go to a temporary file first and are then renamed over the real
// one, so a crash mid-write never leaves half a JSON document behind.
// =============================================================================

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use super::machine::Selection;
use crate::github::Entity;

/// Key under which the selected users are stored.
pub const STORAGE_KEY: &str = "github-users-storage";

#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    // Reads one key; a missing file or missing key is Ok(None)
    pub fn load(&self, key: &str) -> Result<Option<Value>> {
        let mut document = self.read_document()?;
        Ok(document.remove(key))
    }

    // Writes one key, keeping whatever else is in the file
    //
    // An unreadable file is replaced rather than blocking every save
    pub fn save(&self, key: &str, value: Value) -> Result<()> {
        let mut document = self.read_document().unwrap_or_else(|e| {
            warn!(error = %format!("{:#}", e), "replacing unreadable snapshot file");
            Map::new()
        });
        document.insert(key.to_string(), value);

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let contents = serde_json::to_string_pretty(&Value::Object(document))?;
        fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write {}", tmp.display()))?;
        fs::rename(&tmp, &self.path)
            .with_context(|| format!("Failed to replace {}", self.path.display()))?;

        debug!(path = %self.path.display(), key, "snapshot saved");
        Ok(())
    }

    fn read_document(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let text = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read {}", self.path.display()))?;

        if text.trim().is_empty() {
            return Ok(Map::new());
        }

        match serde_json::from_str::<Value>(&text)
            .with_context(|| format!("{} is not valid JSON", self.path.display()))?
        {
            Value::Object(map) => Ok(map),
            _ => anyhow::bail!("{} does not contain a JSON object", self.path.display()),
        }
    }
}

// Serialize half of the pair: the committed users as a JSON array
pub fn selection_to_snapshot(selection: &Selection) -> Result<Value> {
    Ok(serde_json::to_value(selection.committed())?)
}

// Deserialize half of the pair
pub fn selection_from_snapshot(value: Value, max: usize) -> Result<Selection> {
    let entities: Vec<Entity> =
        serde_json::from_value(value).context("Saved selection has the wrong shape")?;
    Ok(Selection::restore(entities, max))
}

// Loads the saved selection, or an empty one if nothing was saved
pub fn load_selection(store: &SnapshotStore, max: usize) -> Result<Selection> {
    match store.load(STORAGE_KEY)? {
        Some(value) => {
            let selection = selection_from_snapshot(value, max)?;
            info!(count = selection.staged().len(), "restored saved selection");
            Ok(selection)
        }
        None => Ok(Selection::restore(Vec::new(), max)),
    }
}

pub fn save_selection(store: &SnapshotStore, selection: &Selection) -> Result<()> {
    store.save(STORAGE_KEY, selection_to_snapshot(selection)?)
}
