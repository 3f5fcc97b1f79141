//! Preference persistence and filter seeding.
//!
//! Preferences are stored as one JSON blob under [`PREFERENCES_KEY`] in a
//! small key-value store. Reads are forgiving: a missing, unreadable or
//! malformed blob loads as empty preferences.

use crate::catalog::{is_known_category, is_known_source};
use crate::error::{Error, Result};
use crate::models::{Filter, UserPreferences};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{debug, info, instrument, warn};

pub const PREFERENCES_KEY: &str = "userPreferences";

/// Minimal string key-value storage.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Key-value store persisted as a single JSON object on disk.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_all(&self) -> Result<BTreeMap<String, String>> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        serde_json::from_str(&raw).map_err(|e| {
            Error::Storage(format!("{} is not a JSON object: {e}", self.path.display()))
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read_all()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.read_all().unwrap_or_else(|e| {
            warn!(error = %e, "Storage file unreadable; starting a fresh one");
            BTreeMap::new()
        });
        entries.insert(key.to_string(), value.to_string());

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        debug!(path = %self.path.display(), key, "Stored value");
        Ok(())
    }
}

/// In-memory store, useful for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| Error::Storage("memory store poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| Error::Storage("memory store poisoned".to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Seed filters from preferences: the first preferred category and source
/// become the defaults, date range and sort keep theirs.
///
/// This is a one-shot suggestion; the user may override it freely.
pub fn derive_default_filters(prefs: &UserPreferences) -> Filter {
    let mut filter = Filter::default();
    if let Some(category) = prefs.preferred_categories.first() {
        if is_known_category(category) {
            filter.category = category.clone();
        } else {
            warn!(%category, "Ignoring unknown preferred category");
        }
    }
    if let Some(source) = prefs.preferred_sources.first() {
        if is_known_source(source) {
            filter.source = source.clone();
        } else {
            warn!(%source, "Ignoring unknown preferred source");
        }
    }
    filter
}

/// Owns the canonical in-memory preferences and their persisted copy.
#[derive(Debug)]
pub struct PreferenceBridge<S> {
    store: S,
    last_seen: Option<UserPreferences>,
}

impl<S: KeyValueStore> PreferenceBridge<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            last_seen: None,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Read stored preferences; anything unusable loads as empty preferences.
    #[instrument(level = "debug", skip_all)]
    pub fn load(&self) -> UserPreferences {
        let raw = match self.store.get(PREFERENCES_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return UserPreferences::default(),
            Err(e) => {
                warn!(error = %e, "Could not read stored preferences; using defaults");
                return UserPreferences::default();
            }
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(error = %e, "Stored preferences are malformed; using defaults");
            UserPreferences::default()
        })
    }

    #[instrument(level = "info", skip_all)]
    pub fn save(&self, prefs: &UserPreferences) -> Result<()> {
        let json = serde_json::to_string(prefs)?;
        self.store.set(PREFERENCES_KEY, &json)?;
        info!(
            sources = prefs.preferred_sources.len(),
            categories = prefs.preferred_categories.len(),
            authors = prefs.preferred_authors.len(),
            "Saved preferences"
        );
        Ok(())
    }

    pub fn derive_default_filters(&self, prefs: &UserPreferences) -> Filter {
        derive_default_filters(prefs)
    }

    /// Reload the stored copy and return freshly derived filters only when it
    /// differs, by value, from the last copy this bridge saw.
    ///
    /// The first call always reports, seeding the initial filters.
    pub fn sync(&mut self) -> Option<Filter> {
        let current = self.load();
        if self.last_seen.as_ref() == Some(&current) {
            return None;
        }
        debug!("Stored preferences changed; re-deriving filters");
        let filter = derive_default_filters(&current);
        self.last_seen = Some(current);
        Some(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{ALL_CATEGORIES, DateRange, NEWSAPI, SortKey};

    fn prefs(categories: &[&str], sources: &[&str]) -> UserPreferences {
        UserPreferences {
            preferred_sources: sources.iter().map(|s| s.to_string()).collect(),
            preferred_categories: categories.iter().map(|s| s.to_string()).collect(),
            preferred_authors: Vec::new(),
        }
    }

    #[test]
    fn test_derive_default_filters() {
        let filter = derive_default_filters(&prefs(&["Technology", "Health"], &[NEWSAPI]));
        assert_eq!(filter.category, "Technology");
        assert_eq!(filter.source, NEWSAPI);
        assert_eq!(filter.date_range, DateRange::AllTime);
        assert_eq!(filter.sort_by, SortKey::DateNewest);
    }

    #[test]
    fn test_derive_from_empty_preferences_is_default() {
        assert_eq!(derive_default_filters(&UserPreferences::default()), Filter::default());
    }

    #[test]
    fn test_derive_ignores_unknown_labels() {
        let filter = derive_default_filters(&prefs(&["Astrology"], &[]));
        assert_eq!(filter.category, ALL_CATEGORIES);
    }

    #[test]
    fn test_round_trip_through_memory_store() {
        let bridge = PreferenceBridge::new(MemoryStore::default());
        assert_eq!(bridge.load(), UserPreferences::default());

        let mut saved = prefs(&["Science"], &["The Guardian"]);
        saved.add_author("Jane Doe");
        bridge.save(&saved).unwrap();
        assert_eq!(bridge.load(), saved);

        let raw = bridge.store().get(PREFERENCES_KEY).unwrap().unwrap();
        assert!(raw.contains("\"preferredAuthors\":[\"Jane Doe\"]"));
    }

    #[test]
    fn test_corrupted_blob_loads_as_empty() {
        let store = MemoryStore::default();
        store.set(PREFERENCES_KEY, "{not json").unwrap();
        let bridge = PreferenceBridge::new(store);
        assert_eq!(bridge.load(), UserPreferences::default());
    }

    #[test]
    fn test_sync_only_reports_value_changes() {
        let mut bridge = PreferenceBridge::new(MemoryStore::default());
        assert_eq!(bridge.sync(), Some(Filter::default()));
        assert_eq!(bridge.sync(), None);

        bridge.save(&prefs(&["Sports"], &[])).unwrap();
        let filter = bridge.sync().expect("changed preferences re-derive");
        assert_eq!(filter.category, "Sports");

        // Same content written again is not a change.
        bridge.save(&prefs(&["Sports"], &[])).unwrap();
        assert_eq!(bridge.sync(), None);

        // Reordering is.
        bridge.save(&prefs(&["Health", "Sports"], &[])).unwrap();
        assert_eq!(bridge.sync().unwrap().category, "Health");
    }

    #[test]
    fn test_file_store_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("storage.json");

        let bridge = PreferenceBridge::new(FileStore::new(&path));
        assert_eq!(bridge.store().path(), path.as_path());
        bridge.save(&prefs(&["World"], &[])).unwrap();

        let reopened = PreferenceBridge::new(FileStore::new(&path));
        assert_eq!(reopened.load().preferred_categories, vec!["World"]);
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("storage.json"));
        store.set("theme", "dark").unwrap();
        store.set(PREFERENCES_KEY, "{}").unwrap();
        assert_eq!(store.get("theme").unwrap().as_deref(), Some("dark"));
    }

    #[test]
    fn test_garbage_file_loads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        fs::write(&path, "<<<>>>").unwrap();

        let bridge = PreferenceBridge::new(FileStore::new(&path));
        assert_eq!(bridge.load(), UserPreferences::default());
        assert!(matches!(bridge.store().get(PREFERENCES_KEY), Err(Error::Storage(_))));
    }
}
