use crate::config::{
    PREF_AUTO_SAVE, PREF_SHOW_LINE_NUMBERS, Preferences, PreferencesError, RcConfig, RecentFiles,
};
use crate::document_model::{Document, DocumentError, UndoableDocument};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    #[error(transparent)]
    Preferences(#[from] PreferencesError),

    #[error("No write since last change (add ! to override)")]
    Unsaved,
}

/// The open document together with the settings and history that outlive it.
///
/// Built in two steps: [`Session::new`] wires up preferences, and
/// [`Session::start`] loads the first document. Until `start` has run the
/// session reports itself as not initialized and skips auto-save.
pub struct Session {
    document: UndoableDocument,
    preferences: Preferences,
    recent_files: RecentFiles,
    rc: RcConfig,
    initialized: bool,
    last_auto_save: Instant,
}

impl Session {
    pub fn new(preferences: Preferences, rc: RcConfig) -> Self {
        let recent_files = RecentFiles::load(&preferences);
        Self {
            document: UndoableDocument::default(),
            preferences,
            recent_files,
            rc,
            initialized: false,
            last_auto_save: Instant::now(),
        }
    }

    /// Loads `file` (or an empty document) and marks the session ready.
    pub fn start(&mut self, file: Option<&Path>) -> Result<String, SessionError> {
        let message = match file {
            Some(path) => self.load(path)?,
            None => "[No Name]".to_string(),
        };
        self.initialized = true;
        self.last_auto_save = Instant::now();
        tracing::debug!(file = ?file, "session started");
        Ok(message)
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn document(&self) -> &UndoableDocument {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut UndoableDocument {
        &mut self.document
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.preferences
    }

    pub fn recent_files(&self) -> &[PathBuf] {
        self.recent_files.entries()
    }

    pub fn show_line_numbers(&self) -> bool {
        self.preferences
            .get_or(PREF_SHOW_LINE_NUMBERS, self.rc.show_line_numbers)
    }

    pub fn set_line_numbers(&mut self, show: bool) -> Result<(), SessionError> {
        self.preferences.set(PREF_SHOW_LINE_NUMBERS, &show)?;
        Ok(())
    }

    pub fn auto_save(&self) -> bool {
        self.preferences.get_or(PREF_AUTO_SAVE, self.rc.auto_save)
    }

    pub fn set_auto_save(&mut self, enabled: bool) -> Result<(), SessionError> {
        self.preferences.set(PREF_AUTO_SAVE, &enabled)?;
        Ok(())
    }

    pub fn auto_save_interval(&self) -> Duration {
        Duration::from_secs(self.rc.auto_save_minutes * 60)
    }

    pub fn can_close(&self) -> bool {
        !self.document.is_modified()
    }

    pub fn open(&mut self, path: &Path, force: bool) -> Result<String, SessionError> {
        if !force && !self.can_close() {
            return Err(SessionError::Unsaved);
        }
        self.load(path)
    }

    pub fn new_document(&mut self, force: bool) -> Result<String, SessionError> {
        if !force && !self.can_close() {
            return Err(SessionError::Unsaved);
        }
        self.document.replace_document(Document::new());
        Ok("[No Name]".to_string())
    }

    fn load(&mut self, path: &Path) -> Result<String, SessionError> {
        let message = match Document::open(path) {
            Ok(document) => {
                let message = format!("\"{}\" {}C", path.display(), document.visible_len());
                self.document.replace_document(document);
                message
            }
            // Create new file if it doesn't exist
            Err(DocumentError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                self.document.replace_document(Document::with_filename(path));
                format!("\"{}\" [New File]", path.display())
            }
            Err(err) => return Err(err.into()),
        };
        self.remember(path);
        Ok(message)
    }

    /// Saves to `path`, or to the document's own file name when `None`.
    pub fn save(&mut self, path: Option<PathBuf>) -> Result<String, SessionError> {
        let bytes = match path {
            Some(path) => self.document.save_as(path)?,
            None => self.document.save()?,
        };
        self.last_auto_save = Instant::now();

        let filename = self.document.filename().map(Path::to_path_buf);
        if let Some(filename) = &filename {
            self.remember(filename);
        }
        Ok(format!("\"{}\" {}B written", self.document.display_name(), bytes))
    }

    fn remember(&mut self, path: &Path) {
        self.recent_files.push(path);
        if let Err(err) = self.recent_files.store(&mut self.preferences) {
            tracing::warn!(error = %err, "could not record recent file");
        }
    }

    /// Saves the document if auto-save is on, the interval has passed since
    /// the last save, and there is something named to save.
    pub fn autosave_tick(&mut self, now: Instant) -> Option<Result<usize, SessionError>> {
        if !self.initialized || !self.auto_save() {
            return None;
        }
        if now.saturating_duration_since(self.last_auto_save) < self.auto_save_interval() {
            return None;
        }
        self.last_auto_save = now;

        if !self.document.is_modified() || self.document.filename().is_none() {
            return None;
        }
        tracing::debug!(name = self.document.display_name(), "auto-save");
        Some(self.document.save().map_err(SessionError::from))
    }

    /// Writes preferences back to storage.
    pub fn shutdown(&mut self) -> Result<(), SessionError> {
        self.preferences.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn session() -> Session {
        Session::new(Preferences::in_memory(), RcConfig::default())
    }

    #[test]
    fn test_start_without_file() {
        let mut session = session();
        assert!(!session.is_initialized());
        assert_eq!(session.start(None).unwrap(), "[No Name]");
        assert!(session.is_initialized());
        assert_eq!(session.document().text(), "");
        assert!(session.recent_files().is_empty());
    }

    #[test]
    fn test_start_with_missing_file_creates_named_document() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("new.txt");

        let mut session = session();
        let message = session.start(Some(&path)).unwrap();
        assert!(message.ends_with("[New File]"));
        assert_eq!(session.document().filename(), Some(path.as_path()));
        assert!(!session.document().is_modified());
        assert_eq!(session.recent_files(), &[path]);
    }

    #[test]
    fn test_open_refuses_to_discard_changes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("other.txt");
        fs::write(&path, "other\n").unwrap();

        let mut session = session();
        session.start(None).unwrap();
        session.document_mut().insert(0, "draft").unwrap();

        assert!(matches!(session.open(&path, false), Err(SessionError::Unsaved)));
        assert_eq!(session.document().text(), "draft");
        assert!(matches!(session.new_document(false), Err(SessionError::Unsaved)));

        session.open(&path, true).unwrap();
        assert_eq!(session.document().text(), "other\n");
        assert!(!session.document().can_undo());
    }

    #[test]
    fn test_save_records_recent_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("saved.txt");

        let mut session = session();
        session.start(None).unwrap();
        session.document_mut().insert(0, "text\n").unwrap();
        assert!(matches!(
            session.save(None),
            Err(SessionError::Document(DocumentError::NoFilename))
        ));

        let message = session.save(Some(path.clone())).unwrap();
        assert_eq!(message, "\"saved.txt\" 5B written");
        assert!(session.can_close());
        assert_eq!(fs::read_to_string(&path).unwrap(), "text\n");

        let stored: Vec<PathBuf> = session.preferences().get("recent_files").unwrap();
        assert_eq!(stored, vec![path]);
    }

    #[test]
    fn test_preferences_override_rc_defaults() {
        let rc = RcConfig {
            show_line_numbers: false,
            ..RcConfig::default()
        };
        let mut session = Session::new(Preferences::in_memory(), rc);
        assert!(!session.show_line_numbers());

        session.set_line_numbers(true).unwrap();
        assert!(session.show_line_numbers());
        session.set_auto_save(false).unwrap();
        assert!(!session.auto_save());
    }

    #[test]
    fn test_autosave_waits_for_interval() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("auto.txt");
        let rc = RcConfig {
            auto_save_minutes: 1,
            ..RcConfig::default()
        };

        let mut session = Session::new(Preferences::in_memory(), rc);
        session.start(Some(&path)).unwrap();
        let started = Instant::now();

        // Nothing modified yet
        assert!(session.autosave_tick(started + Duration::from_secs(61)).is_none());

        session.document_mut().insert(0, "auto").unwrap();
        assert!(session.autosave_tick(started + Duration::from_secs(90)).is_none());

        let saved = session.autosave_tick(started + Duration::from_secs(155));
        assert!(matches!(saved, Some(Ok(4))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "auto");
        assert!(session.can_close());
    }

    #[test]
    fn test_autosave_disabled_or_unnamed() {
        let mut session = session();
        session.start(None).unwrap();
        session.document_mut().insert(0, "unnamed").unwrap();
        let later = Instant::now() + Duration::from_secs(3600);
        assert!(session.autosave_tick(later).is_none());

        let dir = tempdir().unwrap();
        let mut session = Session::new(
            Preferences::in_memory(),
            RcConfig {
                auto_save: false,
                ..RcConfig::default()
            },
        );
        session.start(Some(&dir.path().join("off.txt"))).unwrap();
        session.document_mut().insert(0, "x").unwrap();
        assert!(session.autosave_tick(later).is_none());
    }

    #[test]
    fn test_autosave_skipped_before_start() {
        let mut session = session();
        let later = Instant::now() + Duration::from_secs(3600);
        assert!(session.autosave_tick(later).is_none());
    }
}
