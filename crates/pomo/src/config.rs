//! Front-end configuration (`config.toml`)
//!
//! ```toml
//! log_level = "warn"
//!
//! [notify]
//! desktop = true
//! sound = true
//! backend = "auto"
//!
//! [display]
//! bar_width = 30
//! color = true
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// pomo front-end configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// tracing filter used when RUST_LOG is unset
    pub log_level: String,
    pub notify: NotifyConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Send desktop notifications on completion
    pub desktop: bool,
    /// Ring the bell and ask the backend for a sound
    pub sound: bool,
    /// Backend name, or "auto" to detect
    pub backend: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub bar_width: usize,
    pub color: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            notify: NotifyConfig::default(),
            display: DisplayConfig::default(),
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            desktop: true,
            sound: true,
            backend: "auto".to_string(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            bar_width: 30,
            color: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from file or use defaults
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config from {}", path.display()))
    }
}
