//! Standard paths used by pomo

use std::env;
use std::path::PathBuf;

/// Environment variable that relocates every pomo path under one root
pub const HOME_ENV: &str = "POMO_HOME";

/// Standard pomo paths
#[derive(Debug, Clone)]
pub struct Paths {
    /// Data directory (~/.local/share/pomo)
    pub data: PathBuf,
    /// Config directory (~/.config/pomo)
    pub config: PathBuf,
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}

impl Paths {
    pub fn new() -> Self {
        if let Some(home) = env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
            return Self::rooted(PathBuf::from(home));
        }

        let data = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("~/.local/share"))
            .join("pomo");

        let config = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("pomo");

        Self { data, config }
    }

    /// All paths under a single root directory
    pub fn rooted(root: PathBuf) -> Self {
        Self {
            data: root.join("data"),
            config: root.join("config"),
        }
    }

    /// Persisted duration settings
    pub fn settings_file(&self) -> PathBuf {
        self.config.join("settings.json")
    }

    /// Front-end preferences
    pub fn config_file(&self) -> PathBuf {
        self.config.join("config.toml")
    }

    /// Directory holding the daily completion logs
    pub fn history_dir(&self) -> PathBuf {
        self.data.join("history")
    }
}
