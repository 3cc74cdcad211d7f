//! Notifiers for completed sessions

use pomo_notify::{Backend, Notification};
use tracing::{info, warn};

use crate::controller::{CompletionEvent, Notifier};
use crate::session::Mode;

/// Title and body shown when a session of `event.mode` completes
pub fn completion_notification(event: &CompletionEvent) -> Notification {
    let (title, body) = match event.mode {
        Mode::Focus => (
            "Work Session Complete!",
            "Great work! Time for a well-deserved break!",
        ),
        Mode::Break => (
            "Break Session Complete!",
            "Break time is over! Ready to get back to work?",
        ),
    };

    Notification::new(body).with_title(title)
}

/// Desktop toast plus terminal bell
pub struct DesktopNotifier {
    backend: Backend,
    sound: bool,
}

impl DesktopNotifier {
    pub fn new(backend: Backend, sound: bool) -> Self {
        Self { backend, sound }
    }
}

impl Notifier for DesktopNotifier {
    fn on_session_complete(&mut self, event: &CompletionEvent) {
        let mut notification = completion_notification(event);
        if !self.sound {
            notification = notification.silent();
        }

        if let Err(e) = self.backend.send(&notification) {
            warn!("{} notification failed: {:#}", self.backend.name(), e);
        }

        if self.sound {
            pomo_notify::bell();
        }
    }
}

/// Log line per completion
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn on_session_complete(&mut self, event: &CompletionEvent) {
        info!(
            kind = event.kind.as_str(),
            session = event.session_count,
            long_break = event.was_long_break,
            "Session complete"
        );
    }
}
