//! Duration settings and their persistence
//!
//! Settings are a flat record of four integers. On disk they are a JSON
//! object that is merged field by field over the defaults: a missing,
//! mistyped or out-of-range field falls back to its default and the rest
//! of the record is kept.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use crate::session::{break_kind, BreakKind, Mode};

pub const DEFAULT_FOCUS_MINUTES: u32 = 25;
pub const DEFAULT_SHORT_BREAK_MINUTES: u32 = 5;
pub const DEFAULT_LONG_BREAK_MINUTES: u32 = 15;
pub const DEFAULT_SESSIONS_BEFORE_LONG_BREAK: u32 = 4;

/// Longest accepted duration for any single period (one day)
pub const MAX_MINUTES: u32 = 24 * 60;

const FOCUS_KEY: &str = "focusTime";
const SHORT_BREAK_KEY: &str = "shortBreak";
const LONG_BREAK_KEY: &str = "longBreak";
const SESSIONS_KEY: &str = "sessionsBeforeLongBreak";

/// Errors from reading or writing the settings record
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Failed to access settings file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize settings: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// User-configurable durations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(rename = "focusTime")]
    pub focus_minutes: u32,
    #[serde(rename = "shortBreak")]
    pub short_break_minutes: u32,
    #[serde(rename = "longBreak")]
    pub long_break_minutes: u32,
    #[serde(rename = "sessionsBeforeLongBreak")]
    pub sessions_before_long_break: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_minutes: DEFAULT_FOCUS_MINUTES,
            short_break_minutes: DEFAULT_SHORT_BREAK_MINUTES,
            long_break_minutes: DEFAULT_LONG_BREAK_MINUTES,
            sessions_before_long_break: DEFAULT_SESSIONS_BEFORE_LONG_BREAK,
        }
    }
}

fn valid_minutes(minutes: u32) -> bool {
    (1..=MAX_MINUTES).contains(&minutes)
}

impl Settings {
    /// Replace every out-of-range minute field with its default
    pub fn validated(self) -> Self {
        let defaults = Self::default();
        let check = |name: &str, value: u32, default: u32| {
            if valid_minutes(value) {
                value
            } else {
                warn!("Invalid {} of {} minutes, using default {}", name, value, default);
                default
            }
        };

        Self {
            focus_minutes: check(FOCUS_KEY, self.focus_minutes, defaults.focus_minutes),
            short_break_minutes: check(
                SHORT_BREAK_KEY,
                self.short_break_minutes,
                defaults.short_break_minutes,
            ),
            long_break_minutes: check(
                LONG_BREAK_KEY,
                self.long_break_minutes,
                defaults.long_break_minutes,
            ),
            sessions_before_long_break: self.sessions_before_long_break,
        }
    }

    /// Build settings from a persisted record, merging over the defaults
    ///
    /// Anything other than a JSON object is treated as no record at all.
    pub fn from_record(record: &Value) -> Option<Self> {
        let map = record.as_object()?;
        let defaults = Self::default();

        Some(Self {
            focus_minutes: minutes_field(map, FOCUS_KEY, defaults.focus_minutes),
            short_break_minutes: minutes_field(map, SHORT_BREAK_KEY, defaults.short_break_minutes),
            long_break_minutes: minutes_field(map, LONG_BREAK_KEY, defaults.long_break_minutes),
            sessions_before_long_break: count_field(
                map,
                SESSIONS_KEY,
                defaults.sessions_before_long_break,
            ),
        })
    }

    /// Target length in seconds of a period in `mode`
    ///
    /// Breaks are long when [`break_kind`] says so for `session_count`.
    pub fn target_seconds(&self, mode: Mode, session_count: u32) -> u32 {
        let minutes = match mode {
            Mode::Focus => self.focus_minutes,
            Mode::Break => match break_kind(session_count, self.sessions_before_long_break) {
                BreakKind::ShortBreak => self.short_break_minutes,
                BreakKind::LongBreak => self.long_break_minutes,
            },
        };
        minutes.saturating_mul(60)
    }

    /// Session count spacing between long breaks
    pub fn long_break_interval(&self) -> u64 {
        u64::from(self.sessions_before_long_break) + 1
    }
}

fn minutes_field(map: &Map<String, Value>, key: &str, default: u32) -> u32 {
    match map.get(key) {
        None => default,
        Some(value) => match value.as_u64().and_then(|v| u32::try_from(v).ok()) {
            Some(minutes) if valid_minutes(minutes) => minutes,
            _ => {
                warn!("Ignoring invalid {} in saved settings: {}", key, value);
                default
            }
        },
    }
}

fn count_field(map: &Map<String, Value>, key: &str, default: u32) -> u32 {
    match map.get(key) {
        None => default,
        Some(value) => match value.as_u64().and_then(|v| u32::try_from(v).ok()) {
            Some(count) => count,
            None => {
                warn!("Ignoring invalid {} in saved settings: {}", key, value);
                default
            }
        },
    }
}

/// Where settings are loaded from and saved to
pub trait SettingsStore {
    /// Load the saved record, or `None` when nothing usable is saved
    fn load(&self) -> Result<Option<Settings>, SettingsError>;

    /// Persist a whole record
    fn save(&self, settings: &Settings) -> Result<(), SettingsError>;
}

/// Load settings from `store`, falling back to defaults on any failure
pub fn load_or_default(store: &dyn SettingsStore) -> Settings {
    match store.load() {
        Ok(Some(settings)) => settings,
        Ok(None) => Settings::default(),
        Err(e) => {
            warn!("{}; using default settings", e);
            Settings::default()
        }
    }
}

/// JSON settings file on disk
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the saved record so defaults apply on the next load
    pub fn clear(&self) -> Result<(), SettingsError> {
        if self.path.exists() {
            fs::remove_file(&self.path).map_err(|source| SettingsError::Io {
                path: self.path.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> Result<Option<Settings>, SettingsError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&self.path).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })?;

        if content.trim().is_empty() {
            return Ok(None);
        }

        match serde_json::from_str::<Value>(&content) {
            Ok(record) => {
                let settings = Settings::from_record(&record);
                if settings.is_none() {
                    warn!("Saved settings in {} are not a record", self.path.display());
                }
                Ok(settings)
            }
            Err(e) => {
                warn!("Unreadable settings in {}: {}", self.path.display(), e);
                Ok(None)
            }
        }
    }

    fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| SettingsError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let content = serde_json::to_string_pretty(settings)?;
        fs::write(&self.path, content).map_err(|source| SettingsError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}
