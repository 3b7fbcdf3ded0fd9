use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::db::DB_FILE;
use crate::error::{ExpenseError, Result};
use crate::register::DEFAULT_PER_PAGE;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub data_dir: String,
    #[serde(default = "default_per_page")]
    pub per_page: usize,
}

fn default_per_page() -> usize {
    DEFAULT_PER_PAGE
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: home().join("Documents").join("expensedesk").to_string_lossy().into_owned(),
            per_page: default_per_page(),
        }
    }
}

fn home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

fn settings_path() -> PathBuf {
    home().join(".config").join("expensedesk").join("settings.json")
}

/// True once `init` has written a settings file.
pub fn settings_exist() -> bool {
    settings_path().exists()
}

/// Missing or unreadable settings fall back to defaults.
pub fn load_settings() -> Settings {
    read_settings(&settings_path()).unwrap_or_default()
}

fn read_settings(path: &Path) -> Option<Settings> {
    let content = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&content) {
        Ok(settings) => Some(settings),
        Err(e) => {
            debug!(path = %path.display(), error = %e, "ignoring corrupt settings");
            None
        }
    }
}

pub fn save_settings(settings: &Settings) -> Result<()> {
    write_settings(&settings_path(), settings)
}

fn write_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| ExpenseError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

pub fn get_data_dir() -> PathBuf {
    PathBuf::from(&load_settings().data_dir)
}

pub fn get_db_path() -> PathBuf {
    get_data_dir().join(DB_FILE)
}

/// `~` and `~/...` expand to the home directory; relative paths are made
/// absolute against the working directory. The path need not exist yet.
pub fn expand_path(raw: &str) -> PathBuf {
    let raw = raw.trim();
    let path = match raw.strip_prefix('~') {
        Some("") => home(),
        Some(rest) if rest.starts_with('/') => home().join(rest.trim_start_matches('/')),
        _ => PathBuf::from(raw),
    };
    if path.is_relative() {
        std::env::current_dir().map(|cwd| cwd.join(&path)).unwrap_or(path)
    } else {
        path
    }
}
