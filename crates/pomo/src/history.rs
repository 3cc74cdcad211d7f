//! Completed session log
//!
//! One JSON line per completed session, one file per day:
//! `<data>/history/sessions-YYYY-MM-DD.jsonl`. The log is write-only from the
//! timer's point of view; only `pomo stats` reads it back.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::controller::{CompletionEvent, Notifier};
use crate::session::SessionKind;

/// A completed session record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedSession {
    /// When the session ended (Unix timestamp)
    pub end: i64,
    pub kind: SessionKind,
    /// Length of the period in seconds
    pub duration: u32,
    /// Session count the period belonged to
    pub session: u32,
}

impl CompletedSession {
    pub fn from_event(event: &CompletionEvent, end: DateTime<Utc>) -> Self {
        Self {
            end: end.timestamp(),
            kind: event.kind,
            duration: event.duration_seconds,
            session: event.session_count,
        }
    }

    pub fn end_time(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.end, 0).unwrap_or_else(Utc::now)
    }
}

/// Daily JSONL files of completed sessions
pub struct SessionLog {
    dir: PathBuf,
}

impl SessionLog {
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create history directory: {}", dir.display()))?;

        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn log_path(&self, date: &NaiveDate) -> PathBuf {
        self.dir.join(format!("sessions-{}.jsonl", date))
    }

    /// Append a record to the log of the day it ended
    pub fn record(&self, session: &CompletedSession) -> Result<()> {
        let path = self.log_path(&session.end_time().date_naive());
        let line = serde_json::to_string(session).context("Failed to serialize session record")?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open session log: {}", path.display()))?;

        writeln!(file, "{}", line)
            .with_context(|| format!("Failed to write to session log: {}", path.display()))
    }

    /// All records for one day; unparseable lines are skipped
    pub fn sessions_for_date(&self, date: &NaiveDate) -> Result<Vec<CompletedSession>> {
        let path = self.log_path(date);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&path)
            .with_context(|| format!("Failed to open session log: {}", path.display()))?;

        let mut sessions = Vec::new();
        for (line_num, line) in BufReader::new(file).lines().enumerate() {
            let line = line
                .with_context(|| format!("Failed to read line {} of session log", line_num + 1))?;
            if line.trim().is_empty() {
                continue;
            }

            match serde_json::from_str::<CompletedSession>(&line) {
                Ok(session) => sessions.push(session),
                Err(e) => warn!(
                    "Skipping line {} of {}: {}",
                    line_num + 1,
                    path.display(),
                    e
                ),
            }
        }

        Ok(sessions)
    }

    /// Records from the last `days` days ending `today`, oldest first
    pub fn sessions_for_days(&self, today: NaiveDate, days: u32) -> Result<Vec<CompletedSession>> {
        let mut all = Vec::new();
        for i in 0..days {
            let date = today - chrono::Duration::days(i64::from(i));
            all.extend(self.sessions_for_date(&date)?);
        }
        all.sort_by_key(|s| s.end);
        Ok(all)
    }
}

/// Notifier that appends every completion to a [`SessionLog`]
pub struct HistoryNotifier {
    log: SessionLog,
}

impl HistoryNotifier {
    pub fn new(log: SessionLog) -> Self {
        Self { log }
    }
}

impl Notifier for HistoryNotifier {
    fn on_session_complete(&mut self, event: &CompletionEvent) {
        let record = CompletedSession::from_event(event, Utc::now());
        if let Err(e) = self.log.record(&record) {
            warn!("Could not record completed session: {:#}", e);
        }
    }
}
