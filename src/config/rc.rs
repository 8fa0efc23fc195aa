use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const RC_FILE_NAME: &str = ".notecombrc";

#[derive(Debug, Clone, PartialEq)]
pub struct RcConfig {
    pub show_line_numbers: bool,
    pub auto_save: bool,
    pub auto_save_minutes: u64,
}

impl Default for RcConfig {
    fn default() -> Self {
        Self {
            show_line_numbers: true,
            auto_save: true,
            auto_save_minutes: 5,
        }
    }
}

pub struct RcLoader;

impl RcLoader {
    /// Get the path to the RC file
    /// Looks for .notecombrc in:
    /// 1. Current directory
    /// 2. Home directory (~/.notecombrc)
    pub fn get_rc_path() -> Option<PathBuf> {
        let current_rc = Path::new(RC_FILE_NAME);
        if current_rc.exists() {
            return Some(current_rc.to_path_buf());
        }

        if let Ok(home) = env::var("HOME") {
            let home_rc = Path::new(&home).join(RC_FILE_NAME);
            if home_rc.exists() {
                return Some(home_rc);
            }
        }

        None
    }

    /// Load and parse the RC file found by [`RcLoader::get_rc_path`]
    pub fn load_config() -> RcConfig {
        match Self::get_rc_path() {
            Some(rc_path) => Self::load_from(&rc_path),
            None => RcConfig::default(),
        }
    }

    /// Load a specific RC file; unreadable files yield the defaults
    pub fn load_from(path: &Path) -> RcConfig {
        let mut config = RcConfig::default();
        match fs::read_to_string(path) {
            Ok(content) => Self::parse_config_content(&content, &mut config),
            Err(err) => {
                tracing::warn!(path = %path.display(), error = %err, "could not read rc file");
            }
        }
        config
    }

    /// Parse the content of an RC file
    pub fn parse_config_content(content: &str, config: &mut RcConfig) {
        for line in content.lines() {
            let line = line.trim();

            // Skip empty lines and comments
            if line.is_empty() || line.starts_with('#') || line.starts_with('"') {
                continue;
            }

            Self::parse_config_line(line, config);
        }
    }

    fn parse_config_line(line: &str, config: &mut RcConfig) {
        // Remove inline comments
        let line = match line.find('#') {
            Some(pos) => &line[..pos],
            None => line,
        }
        .trim();

        // Handle "set" commands (vim-style)
        if let Some(stripped) = line.strip_prefix("set ") {
            let setting = stripped.trim();

            if setting == "nu" || setting == "number" {
                config.show_line_numbers = true;
            } else if setting == "nonu" || setting == "nonumber" {
                config.show_line_numbers = false;
            } else if setting == "autosave" {
                config.auto_save = true;
            } else if setting == "noautosave" {
                config.auto_save = false;
            } else if let Some(value) = setting.strip_prefix("autosaveinterval=") {
                Self::apply_interval(value, config);
            } else {
                tracing::debug!(setting, "unknown rc setting");
            }
        }
        // Handle direct key-value pairs
        else if let Some((key, value)) = line.split_once('=') {
            let key = key.trim();
            let value = value.trim();

            match key {
                "linenumbers" | "line_numbers" | "number" => {
                    config.show_line_numbers = Self::parse_flag(value);
                }
                "autosave" | "auto_save" => {
                    config.auto_save = Self::parse_flag(value);
                }
                "autosaveinterval" | "auto_save_minutes" => {
                    Self::apply_interval(value, config);
                }
                _ => tracing::debug!(key, "unknown rc setting"),
            }
        }
    }

    fn parse_flag(value: &str) -> bool {
        value == "true" || value == "1" || value == "yes"
    }

    fn apply_interval(value: &str, config: &mut RcConfig) {
        if let Ok(minutes) = value.trim().parse::<u64>() {
            if (1..=120).contains(&minutes) {
                config.auto_save_minutes = minutes;
            }
        }
    }

    /// Generate a sample RC file content
    pub fn generate_sample_rc() -> String {
        r#"# notecomb configuration file (.notecombrc)
# Lines starting with # or " are comments

# Display settings
set nu                  # Show line numbers (or set nonu to disable)

# Saving
set autosave            # Save modified, named notes periodically (or set noautosave)
set autosaveinterval=5  # Minutes between auto-saves (1-120)

# Alternative key=value syntax:
# line_numbers=true
# auto_save=true
# auto_save_minutes=5
"#
        .to_string()
    }
}
