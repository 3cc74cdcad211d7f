//! Session state: modes, break kinds and the timer record
//!
//! Everything here is plain data plus pure functions. Mutation happens only
//! through [`crate::controller::SessionController`].

use pomo_core::format;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::settings::Settings;

/// Whether the timer is counting a focus period or a break
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Focus,
    Break,
}

impl Mode {
    pub fn toggled(self) -> Self {
        match self {
            Mode::Focus => Mode::Break,
            Mode::Break => Mode::Focus,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Focus => "focus",
            Mode::Break => "break",
        }
    }

    /// Word used in the title line ("Work Mode", "Break Mode")
    pub fn label(&self) -> &'static str {
        match self {
            Mode::Focus => "Work",
            Mode::Break => "Break",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BreakKind {
    ShortBreak,
    LongBreak,
}

/// Decide whether the break at `session_count` is a long one
///
/// Long breaks land on multiples of `sessions_before_long_break + 1`, so with
/// the default of 4 the fifth, tenth, ... session counts get a long break.
pub fn break_kind(session_count: u32, sessions_before_long_break: u32) -> BreakKind {
    let divisor = u64::from(sessions_before_long_break) + 1;
    if u64::from(session_count) % divisor == 0 {
        BreakKind::LongBreak
    } else {
        BreakKind::ShortBreak
    }
}

/// Mode refined by break kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionKind {
    Focus,
    ShortBreak,
    LongBreak,
}

impl SessionKind {
    pub fn new(mode: Mode, session_count: u32, sessions_before_long_break: u32) -> Self {
        match mode {
            Mode::Focus => SessionKind::Focus,
            Mode::Break => match break_kind(session_count, sessions_before_long_break) {
                BreakKind::ShortBreak => SessionKind::ShortBreak,
                BreakKind::LongBreak => SessionKind::LongBreak,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Focus => "focus",
            SessionKind::ShortBreak => "short-break",
            SessionKind::LongBreak => "long-break",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            SessionKind::Focus => "Focus Time",
            SessionKind::ShortBreak => "Short Break",
            SessionKind::LongBreak => "Long Break",
        }
    }
}

/// Idle, running or paused; running and paused exclude each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Paused,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "Ready",
            RunState::Running => "Running",
            RunState::Paused => "Paused",
        }
    }
}

/// Time left in the current period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RemainingTime {
    pub minutes: u32,
    pub seconds: u32,
}

impl RemainingTime {
    pub fn from_seconds(total: u32) -> Self {
        Self {
            minutes: total / 60,
            seconds: total % 60,
        }
    }

    pub fn total_seconds(&self) -> u32 {
        self.minutes * 60 + self.seconds
    }
}

impl fmt::Display for RemainingTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format::clock(self.total_seconds()))
    }
}

/// The timer record owned by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    pub(crate) mode: Mode,
    pub(crate) run_state: RunState,
    pub(crate) elapsed_seconds: u32,
    pub(crate) target_seconds: u32,
    pub(crate) session_count: u32,
}

impl SessionState {
    /// Fresh state: idle focus period, first session
    pub fn new(settings: &Settings) -> Self {
        Self {
            mode: Mode::Focus,
            run_state: RunState::Idle,
            elapsed_seconds: 0,
            target_seconds: settings.target_seconds(Mode::Focus, 1),
            session_count: 1,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn is_running(&self) -> bool {
        self.run_state == RunState::Running
    }

    pub fn is_paused(&self) -> bool {
        self.run_state == RunState::Paused
    }

    pub fn elapsed_seconds(&self) -> u32 {
        self.elapsed_seconds
    }

    pub fn target_seconds(&self) -> u32 {
        self.target_seconds
    }

    pub fn session_count(&self) -> u32 {
        self.session_count
    }

    /// Elapsed share of the target, in [0, 1]
    pub fn progress_fraction(&self) -> f64 {
        if self.target_seconds == 0 {
            return 0.0;
        }
        (f64::from(self.elapsed_seconds) / f64::from(self.target_seconds)).min(1.0)
    }

    pub fn remaining_time(&self) -> RemainingTime {
        RemainingTime::from_seconds(self.target_seconds.saturating_sub(self.elapsed_seconds))
    }
}
