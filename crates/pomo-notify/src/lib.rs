//! pomo-notify - Desktop notifications for pomo
//!
//! Delivers session-complete alerts through whatever the platform offers:
//! macOS (osascript/terminal-notifier), Linux (notify-send/kdialog), WSL,
//! or a plain line on stdout as the last resort.

mod backend;

pub use backend::{Backend, Notification, NotifyError};

use std::io::Write;

/// Default notification title
pub const DEFAULT_TITLE: &str = "Pomodoro Timer";

/// Ring the terminal bell
pub fn bell() {
    let mut stdout = std::io::stdout();
    let _ = stdout.write_all(b"\x07");
    let _ = stdout.flush();
}
