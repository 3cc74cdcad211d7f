//! Statistics over completed sessions

use crate::history::CompletedSession;
use crate::session::SessionKind;

/// Aggregated session statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Every completed period, focus and break
    pub total_sessions: u32,
    pub focus_sessions: u32,
    pub short_breaks: u32,
    pub long_breaks: u32,
    /// Total focus time in seconds
    pub focus_seconds: u64,
    /// Total break time in seconds
    pub break_seconds: u64,
}

impl SessionStats {
    pub fn from_sessions(sessions: &[CompletedSession]) -> Self {
        let mut stats = Self::default();
        for s in sessions {
            stats.total_sessions += 1;
            match s.kind {
                SessionKind::Focus => {
                    stats.focus_sessions += 1;
                    stats.focus_seconds += u64::from(s.duration);
                }
                SessionKind::ShortBreak => {
                    stats.short_breaks += 1;
                    stats.break_seconds += u64::from(s.duration);
                }
                SessionKind::LongBreak => {
                    stats.long_breaks += 1;
                    stats.break_seconds += u64::from(s.duration);
                }
            }
        }
        stats
    }

    /// Focus time as (hours, minutes)
    pub fn focus_time(&self) -> (u64, u64) {
        let minutes = self.focus_seconds / 60;
        (minutes / 60, minutes % 60)
    }

    /// Average focus period in minutes
    pub fn average_focus_minutes(&self) -> u64 {
        if self.focus_sessions == 0 {
            return 0;
        }
        self.focus_seconds / 60 / u64::from(self.focus_sessions)
    }
}
