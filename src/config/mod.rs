/// Configuration subsystem - Settings and preferences
///
/// This module handles loading settings from .notecombrc files, the persistent
/// key/value preference store, and the recent-files list kept inside it.

pub mod preferences;
pub mod rc;
pub mod recent_files;

// Re-export public interface
pub use preferences::{
    JsonFileStorage, MemoryStorage, PREF_AUTO_SAVE, PREF_RECENT_FILES, PREF_SHOW_LINE_NUMBERS,
    PreferenceChange, PreferenceStorage, Preferences, PreferencesError,
};
pub use rc::{RcConfig, RcLoader};
pub use recent_files::{MAX_RECENT_FILES, RecentFiles};
