use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use thiserror::Error;

pub const PREF_SHOW_LINE_NUMBERS: &str = "show_line_numbers";
pub const PREF_AUTO_SAVE: &str = "auto_save";
pub const PREF_RECENT_FILES: &str = "recent_files";

pub type PreferenceMap = BTreeMap<String, Value>;

#[derive(Error, Debug)]
pub enum PreferencesError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Sent to every subscriber after a preference is set or removed.
#[derive(Debug, Clone, PartialEq)]
pub struct PreferenceChange {
    pub key: String,
    /// `None` when the key was removed.
    pub value: Option<Value>,
}

/// Where preferences live between runs.
pub trait PreferenceStorage {
    fn load(&self) -> Result<PreferenceMap, PreferencesError>;
    fn store(&mut self, values: &PreferenceMap) -> Result<(), PreferencesError>;
}

/// Preferences kept in a pretty-printed JSON object on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `$XDG_CONFIG_HOME/notecomb/preferences.json`, falling back to
    /// `$HOME/.config/notecomb/preferences.json`.
    pub fn default_path() -> Option<PathBuf> {
        let config_home = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;
        Some(config_home.join("notecomb").join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PreferenceStorage for JsonFileStorage {
    fn load(&self) -> Result<PreferenceMap, PreferencesError> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(PreferenceMap::new()),
            Err(err) => Err(err.into()),
        }
    }

    fn store(&mut self, values: &PreferenceMap) -> Result<(), PreferencesError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(values)?)?;
        Ok(())
    }
}

/// Storage that forgets everything when dropped; used by tests and when no
/// config directory can be found.
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    values: PreferenceMap,
}

impl PreferenceStorage for MemoryStorage {
    fn load(&self) -> Result<PreferenceMap, PreferencesError> {
        Ok(self.values.clone())
    }

    fn store(&mut self, values: &PreferenceMap) -> Result<(), PreferencesError> {
        self.values = values.clone();
        Ok(())
    }
}

/// Key/value preferences with change notification.
///
/// Values are JSON so any serde type can be stored. Changes are held in
/// memory until [`Preferences::flush`].
pub struct Preferences {
    values: PreferenceMap,
    storage: Box<dyn PreferenceStorage>,
    subscribers: Vec<Sender<PreferenceChange>>,
    dirty: bool,
}

impl Preferences {
    pub fn load(storage: Box<dyn PreferenceStorage>) -> Result<Self, PreferencesError> {
        let values = storage.load()?;
        Ok(Self {
            values,
            storage,
            subscribers: Vec::new(),
            dirty: false,
        })
    }

    pub fn in_memory() -> Self {
        Self {
            values: PreferenceMap::new(),
            storage: Box::new(MemoryStorage::default()),
            subscribers: Vec::new(),
            dirty: false,
        }
    }

    /// The stored value for `key`, or `None` when it is missing or has the
    /// wrong shape.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.values.get(key)?;
        match serde_json::from_value(value.clone()) {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::warn!(key, error = %err, "ignoring malformed preference");
                None
            }
        }
    }

    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.get(key).unwrap_or(default)
    }

    pub fn set<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), PreferencesError> {
        let value = serde_json::to_value(value)?;
        self.values.insert(key.to_string(), value.clone());
        self.dirty = true;
        self.notify(key, Some(value));
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.values.remove(key).is_some();
        if removed {
            self.dirty = true;
            self.notify(key, None);
        }
        removed
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn flush(&mut self) -> Result<(), PreferencesError> {
        if self.dirty {
            self.storage.store(&self.values)?;
            self.dirty = false;
        }
        Ok(())
    }

    pub fn subscribe(&mut self) -> Receiver<PreferenceChange> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    fn notify(&mut self, key: &str, value: Option<Value>) {
        let change = PreferenceChange {
            key: key.to_string(),
            value,
        };
        // Dropped receivers unsubscribe themselves
        self.subscribers
            .retain(|subscriber| subscriber.send(change.clone()).is_ok());
    }
}

impl Default for Preferences {
    fn default() -> Self {
        Self::in_memory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_get_set_with_defaults() {
        let mut prefs = Preferences::in_memory();
        assert!(prefs.get_or(PREF_AUTO_SAVE, true));

        prefs.set(PREF_AUTO_SAVE, &false).unwrap();
        assert!(!prefs.get_or(PREF_AUTO_SAVE, true));

        // Wrong type falls back to the default
        prefs.set(PREF_SHOW_LINE_NUMBERS, &"maybe").unwrap();
        assert!(prefs.get_or(PREF_SHOW_LINE_NUMBERS, true));
    }

    #[test]
    fn test_subscribers_are_notified() {
        let mut prefs = Preferences::in_memory();
        let rx = prefs.subscribe();

        prefs.set(PREF_SHOW_LINE_NUMBERS, &false).unwrap();
        prefs.remove(PREF_SHOW_LINE_NUMBERS);
        prefs.remove("never-set");

        let changes: Vec<PreferenceChange> = rx.try_iter().collect();
        assert_eq!(
            changes,
            vec![
                PreferenceChange {
                    key: PREF_SHOW_LINE_NUMBERS.to_string(),
                    value: Some(json!(false)),
                },
                PreferenceChange {
                    key: PREF_SHOW_LINE_NUMBERS.to_string(),
                    value: None,
                },
            ]
        );
    }

    #[test]
    fn test_dropped_subscriber_is_pruned() {
        let mut prefs = Preferences::in_memory();
        drop(prefs.subscribe());
        let rx = prefs.subscribe();
        prefs.set("k", &1).unwrap();
        assert_eq!(prefs.subscribers.len(), 1);
        assert_eq!(rx.try_recv().unwrap().value, Some(json!(1)));
    }

    #[test]
    fn test_json_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("preferences.json");

        let mut prefs = Preferences::load(Box::new(JsonFileStorage::new(&path))).unwrap();
        assert!(!prefs.contains(PREF_RECENT_FILES));
        prefs.set(PREF_RECENT_FILES, &vec!["/tmp/a.txt"]).unwrap();
        prefs.flush().unwrap();
        assert!(path.exists());

        let reloaded = Preferences::load(Box::new(JsonFileStorage::new(&path))).unwrap();
        let recent: Vec<String> = reloaded.get(PREF_RECENT_FILES).unwrap();
        assert_eq!(recent, vec!["/tmp/a.txt"]);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "{ not json").unwrap();

        let result = Preferences::load(Box::new(JsonFileStorage::new(&path)));
        assert!(matches!(result, Err(PreferencesError::Json(_))));
    }
}
