//! pomo - Focus/break interval timer
//!
//! "Work in rounds, rest on schedule."
//!
//! The heart of the crate is [`SessionController`], a single-threaded state
//! machine that:
//! - counts ticks from an external 1 Hz clock against a target duration
//! - switches between focus and break periods on request
//! - picks short or long breaks from the session counter
//! - hands completion events to notifiers and snapshots to observers
//!
//! Everything around it (the tokio tick source, settings file, desktop
//! notifications, completion log) plugs in through small traits.

pub mod alerts;
pub mod config;
pub mod controller;
pub mod history;
pub mod session;
pub mod settings;
pub mod stats;
pub mod ticker;

pub use config::AppConfig;
pub use controller::{CompletionEvent, Notifier, Observer, SessionController, Snapshot, TickSource};
pub use session::{break_kind, BreakKind, Mode, RemainingTime, RunState, SessionKind, SessionState};
pub use settings::{FileSettingsStore, Settings, SettingsError, SettingsStore};
pub use stats::SessionStats;
