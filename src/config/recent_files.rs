use super::preferences::{PREF_RECENT_FILES, Preferences, PreferencesError};
use std::path::{Path, PathBuf};

pub const MAX_RECENT_FILES: usize = 8;

/// Most-recent-first list of opened or saved files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecentFiles {
    entries: Vec<PathBuf>,
}

impl RecentFiles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(prefs: &Preferences) -> Self {
        let mut entries: Vec<PathBuf> = prefs.get_or(PREF_RECENT_FILES, Vec::new());
        entries.truncate(MAX_RECENT_FILES);
        Self { entries }
    }

    pub fn store(&self, prefs: &mut Preferences) -> Result<(), PreferencesError> {
        prefs.set(PREF_RECENT_FILES, &self.entries)
    }

    /// Moves `path` to the front, dropping an older entry for the same path
    /// and anything past the cap.
    pub fn push(&mut self, path: &Path) {
        self.entries.retain(|entry| entry != path);
        self.entries.insert(0, path.to_path_buf());
        self.entries.truncate(MAX_RECENT_FILES);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_is_most_recent_first_and_deduplicated() {
        let mut recent = RecentFiles::new();
        recent.push(Path::new("a.txt"));
        recent.push(Path::new("b.txt"));
        recent.push(Path::new("a.txt"));
        assert_eq!(
            recent.entries(),
            &[PathBuf::from("a.txt"), PathBuf::from("b.txt")]
        );
    }

    #[test]
    fn test_capped_at_eight() {
        let mut recent = RecentFiles::new();
        for i in 0..12 {
            recent.push(Path::new(&format!("note{i}.txt")));
        }
        assert_eq!(recent.entries().len(), MAX_RECENT_FILES);
        assert_eq!(recent.entries()[0], PathBuf::from("note11.txt"));
        assert_eq!(recent.entries()[7], PathBuf::from("note4.txt"));
    }

    #[test]
    fn test_store_and_load_through_preferences() {
        let mut prefs = Preferences::in_memory();
        assert!(RecentFiles::load(&prefs).is_empty());

        let mut recent = RecentFiles::new();
        recent.push(Path::new("/notes/todo.txt"));
        recent.store(&mut prefs).unwrap();

        assert_eq!(RecentFiles::load(&prefs), recent);

        recent.clear();
        recent.store(&mut prefs).unwrap();
        assert!(RecentFiles::load(&prefs).is_empty());
    }
}
