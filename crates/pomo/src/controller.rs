//! The session controller: the timer state machine
//!
//! ```text
//! Idle    --start()--> Running
//! Running --pause()--> Paused
//! Paused  --start()--> Running
//! any     --reset()--> Idle
//! Running --tick() reaching target--> complete_session() --> Idle
//! ```
//!
//! The controller never schedules anything itself. A [`TickSource`] is asked
//! to start or stop delivering ticks; [`Notifier`]s hear about completed
//! sessions; [`Observer`]s receive a [`Snapshot`] after every tick and every
//! state change.

use serde::Serialize;
use std::fmt;
use tracing::{debug, info};

use crate::session::{break_kind, BreakKind, Mode, RemainingTime, RunState, SessionKind, SessionState};
use crate::settings::Settings;

/// External 1 Hz clock the controller switches on and off
pub trait TickSource {
    /// (Re)start periodic ticks
    fn start(&mut self);
    /// Stop delivering ticks
    fn stop(&mut self);
}

/// Receives completion events (sound, desktop toast, log line, ...)
pub trait Notifier {
    fn on_session_complete(&mut self, event: &CompletionEvent);
}

/// Receives display state after every change
pub trait Observer {
    fn on_snapshot(&mut self, snapshot: &Snapshot);
}

/// Emitted once per completed session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompletionEvent {
    pub mode: Mode,
    pub was_long_break: bool,
    pub kind: SessionKind,
    /// Session count at the moment of completion, before any increment
    pub session_count: u32,
    /// Length of the period that just ran
    pub duration_seconds: u32,
}

/// Plain display state for presentation layers
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Snapshot {
    pub mode: Mode,
    pub kind: SessionKind,
    pub run_state: RunState,
    pub elapsed_seconds: u32,
    pub target_seconds: u32,
    pub remaining: RemainingTime,
    pub progress: f64,
    pub session_count: u32,
    /// Kind of the break that follows the current focus period
    pub next_break: BreakKind,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} - {} Mode ({})",
            self.remaining,
            self.mode.label(),
            self.run_state.as_str()
        )
    }
}

/// Owns the session state and drives every transition
pub struct SessionController<T: TickSource> {
    settings: Settings,
    state: SessionState,
    ticks: T,
    notifiers: Vec<Box<dyn Notifier>>,
    observers: Vec<Box<dyn Observer>>,
}

impl<T: TickSource> SessionController<T> {
    /// Create an idle controller in focus mode; invalid settings fall back to defaults
    pub fn new(settings: Settings, ticks: T) -> Self {
        let settings = settings.validated();
        Self {
            state: SessionState::new(&settings),
            settings,
            ticks,
            notifiers: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn add_notifier(&mut self, notifier: impl Notifier + 'static) {
        self.notifiers.push(Box::new(notifier));
    }

    pub fn add_observer(&mut self, observer: impl Observer + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Start or resume; no-op while running
    pub fn start(&mut self) {
        if self.state.is_running() {
            return;
        }
        self.state.run_state = RunState::Running;
        self.ticks.start();
        debug!("Started {} at {}s", self.state.mode.as_str(), self.state.elapsed_seconds);
        self.publish();
    }

    /// Pause keeping elapsed time; no-op unless running
    pub fn pause(&mut self) {
        if !self.state.is_running() {
            return;
        }
        self.state.run_state = RunState::Paused;
        self.ticks.stop();
        debug!("Paused {} at {}s", self.state.mode.as_str(), self.state.elapsed_seconds);
        self.publish();
    }

    /// Start when stopped, pause when running
    pub fn toggle(&mut self) {
        if self.state.is_running() {
            self.pause();
        } else {
            self.start();
        }
    }

    /// Back to idle with nothing elapsed; mode and session count are kept
    pub fn reset(&mut self) {
        self.stop_and_clear();
        debug!("Reset {}", self.state.mode.as_str());
        self.publish();
    }

    /// Switch between focus and break, resetting the timer
    pub fn toggle_mode(&mut self) {
        self.state.mode = self.state.mode.toggled();
        self.stop_and_clear();
        self.state.target_seconds = self
            .settings
            .target_seconds(self.state.mode, self.state.session_count);
        debug!(
            "Switched to {} ({}s)",
            self.session_kind().as_str(),
            self.state.target_seconds
        );
        self.publish();
    }

    /// Advance one second; completes the session when the target is reached
    ///
    /// Ticks arriving while not running are ignored.
    pub fn tick(&mut self) {
        if !self.state.is_running() {
            debug!("Ignoring tick while {}", self.state.run_state.as_str());
            return;
        }

        let elapsed = self.state.elapsed_seconds.saturating_add(1);
        if elapsed >= self.state.target_seconds {
            self.state.elapsed_seconds = self.state.target_seconds;
            self.complete_session();
        } else {
            self.state.elapsed_seconds = elapsed;
            self.publish();
        }
    }

    /// Finish the current period and tell every notifier
    pub fn complete_session(&mut self) {
        let kind = self.session_kind();
        let event = CompletionEvent {
            mode: self.state.mode,
            was_long_break: kind == SessionKind::LongBreak,
            kind,
            session_count: self.state.session_count,
            duration_seconds: self.state.target_seconds,
        };

        self.stop_and_clear();
        if self.state.mode == Mode::Focus {
            self.state.session_count += 1;
        }

        info!(
            "Completed {} session #{} ({}s)",
            kind.as_str(),
            event.session_count,
            event.duration_seconds
        );

        for notifier in &mut self.notifiers {
            notifier.on_session_complete(&event);
        }
        self.publish();
    }

    /// Replace the settings record between ticks
    ///
    /// The target follows the new durations. If the time already elapsed
    /// would reach the new target, elapsed starts over without a completion.
    pub fn update_settings(&mut self, settings: Settings) {
        self.settings = settings.validated();
        let target = self
            .settings
            .target_seconds(self.state.mode, self.state.session_count);
        if self.state.elapsed_seconds >= target {
            self.state.elapsed_seconds = 0;
        }
        self.state.target_seconds = target;
        debug!("Settings updated, target now {}s", target);
        self.publish();
    }

    pub fn session_kind(&self) -> SessionKind {
        SessionKind::new(
            self.state.mode,
            self.state.session_count,
            self.settings.sessions_before_long_break,
        )
    }

    pub fn progress_fraction(&self) -> f64 {
        self.state.progress_fraction()
    }

    pub fn remaining_time(&self) -> RemainingTime {
        self.state.remaining_time()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            mode: self.state.mode,
            kind: self.session_kind(),
            run_state: self.state.run_state,
            elapsed_seconds: self.state.elapsed_seconds,
            target_seconds: self.state.target_seconds,
            remaining: self.remaining_time(),
            progress: self.progress_fraction(),
            session_count: self.state.session_count,
            next_break: break_kind(
                self.state.session_count,
                self.settings.sessions_before_long_break,
            ),
        }
    }

    /// Push the current snapshot to every observer
    pub fn publish(&mut self) {
        let snapshot = self.snapshot();
        for observer in &mut self.observers {
            observer.on_snapshot(&snapshot);
        }
    }

    fn stop_and_clear(&mut self) {
        self.state.run_state = RunState::Idle;
        self.state.elapsed_seconds = 0;
        self.ticks.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Debug, Default)]
    struct Clock {
        active: bool,
        starts: u32,
        stops: u32,
    }

    #[derive(Clone, Default)]
    struct FakeTicks(Rc<RefCell<Clock>>);

    impl TickSource for FakeTicks {
        fn start(&mut self) {
            let mut clock = self.0.borrow_mut();
            clock.active = true;
            clock.starts += 1;
        }

        fn stop(&mut self) {
            let mut clock = self.0.borrow_mut();
            clock.active = false;
            clock.stops += 1;
        }
    }

    #[derive(Clone, Default)]
    struct Recorder {
        events: Rc<RefCell<Vec<CompletionEvent>>>,
        snapshots: Rc<RefCell<Vec<Snapshot>>>,
    }

    impl Notifier for Recorder {
        fn on_session_complete(&mut self, event: &CompletionEvent) {
            self.events.borrow_mut().push(*event);
        }
    }

    impl Observer for Recorder {
        fn on_snapshot(&mut self, snapshot: &Snapshot) {
            self.snapshots.borrow_mut().push(*snapshot);
        }
    }

    fn controller(settings: Settings) -> (SessionController<FakeTicks>, FakeTicks, Recorder) {
        let ticks = FakeTicks::default();
        let recorder = Recorder::default();
        let mut c = SessionController::new(settings, ticks.clone());
        c.add_notifier(recorder.clone());
        c.add_observer(recorder.clone());
        (c, ticks, recorder)
    }

    fn assert_bounded(c: &SessionController<FakeTicks>) {
        let s = c.state();
        assert!(s.elapsed_seconds() <= s.target_seconds());
        assert!(s.target_seconds() > 0);
    }

    #[test]
    fn test_start_and_pause() {
        let (mut c, ticks, _) = controller(Settings::default());

        c.start();
        assert!(c.state().is_running());
        assert!(ticks.0.borrow().active);

        c.tick();
        c.tick();
        c.pause();
        assert!(c.state().is_paused());
        assert!(!ticks.0.borrow().active);
        assert_eq!(c.state().elapsed_seconds(), 2);

        c.start();
        assert!(c.state().is_running());
        c.tick();
        assert_eq!(c.state().elapsed_seconds(), 3);
    }

    #[test]
    fn test_redundant_calls_are_noops() {
        let (mut c, ticks, recorder) = controller(Settings::default());

        c.pause();
        assert_eq!(c.state().run_state(), RunState::Idle);

        c.start();
        c.start();
        assert_eq!(ticks.0.borrow().starts, 1);
        // One snapshot for the real start only
        assert_eq!(recorder.snapshots.borrow().len(), 1);
    }

    #[test]
    fn test_toggle() {
        let (mut c, _, _) = controller(Settings::default());
        c.toggle();
        assert!(c.state().is_running());
        c.toggle();
        assert!(c.state().is_paused());
        c.toggle();
        assert!(c.state().is_running());
    }

    #[test]
    fn test_tick_after_reset_is_ignored() {
        let (mut c, ticks, _) = controller(Settings::default());

        c.start();
        for _ in 0..10 {
            c.tick();
        }
        c.reset();
        assert_eq!(c.state().run_state(), RunState::Idle);
        assert_eq!(c.state().elapsed_seconds(), 0);
        assert!(!ticks.0.borrow().active);

        c.tick();
        assert_eq!(c.state().elapsed_seconds(), 0);

        c.start();
        c.tick();
        assert_eq!(c.state().elapsed_seconds(), 1);
    }

    #[test]
    fn test_tick_while_paused_is_ignored() {
        let (mut c, _, _) = controller(Settings::default());
        c.start();
        c.tick();
        c.pause();
        c.tick();
        assert_eq!(c.state().elapsed_seconds(), 1);
    }

    #[test]
    fn test_reset_keeps_mode_and_count() {
        let (mut c, _, _) = controller(Settings {
            focus_minutes: 1,
            ..Settings::default()
        });
        c.start();
        for _ in 0..60 {
            c.tick();
        }
        c.toggle_mode();
        c.start();
        c.tick();
        c.reset();

        assert_eq!(c.state().mode(), Mode::Break);
        assert_eq!(c.state().session_count(), 2);
    }

    #[test]
    fn test_full_focus_session() {
        let (mut c, ticks, recorder) = controller(Settings::default());
        assert_eq!(c.state().target_seconds(), 1500);

        c.start();
        let mut last_progress = 0.0;
        for i in 0..1500 {
            c.tick();
            assert_bounded(&c);
            if i < 1499 {
                assert!(c.progress_fraction() >= last_progress);
                last_progress = c.progress_fraction();
            }
        }

        let events = recorder.events.borrow();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0],
            CompletionEvent {
                mode: Mode::Focus,
                was_long_break: false,
                kind: SessionKind::Focus,
                session_count: 1,
                duration_seconds: 1500,
            }
        );

        assert_eq!(c.state().session_count(), 2);
        assert_eq!(c.state().elapsed_seconds(), 0);
        assert_eq!(c.state().mode(), Mode::Focus);
        assert_eq!(c.state().run_state(), RunState::Idle);
        assert_eq!(c.progress_fraction(), 0.0);
        assert!(!ticks.0.borrow().active);
    }

    #[test]
    fn test_observers_never_see_elapsed_above_target() {
        let (mut c, _, recorder) = controller(Settings {
            focus_minutes: 1,
            ..Settings::default()
        });
        c.start();
        for _ in 0..60 {
            c.tick();
        }

        let snapshots = recorder.snapshots.borrow();
        assert!(snapshots
            .iter()
            .all(|s| s.elapsed_seconds < s.target_seconds));
        let last = snapshots.last().unwrap();
        assert_eq!(last.elapsed_seconds, 0);
        assert_eq!(last.run_state, RunState::Idle);
        assert_eq!(last.session_count, 2);
    }

    #[test]
    fn test_toggle_mode_resets_and_retargets() {
        let (mut c, ticks, _) = controller(Settings::default());
        c.start();
        for _ in 0..300 {
            c.tick();
        }
        assert_eq!(c.state().elapsed_seconds(), 300);
        assert_eq!(c.state().target_seconds(), 1500);

        c.toggle_mode();
        assert_eq!(c.state().mode(), Mode::Break);
        assert_eq!(c.state().elapsed_seconds(), 0);
        assert_eq!(c.state().target_seconds(), 5 * 60);
        assert_eq!(c.state().run_state(), RunState::Idle);
        assert!(!ticks.0.borrow().active);

        c.toggle_mode();
        assert_eq!(c.state().mode(), Mode::Focus);
        assert_eq!(c.state().target_seconds(), 1500);
    }

    #[test]
    fn test_long_break_after_four_sessions() {
        let (mut c, _, recorder) = controller(Settings {
            focus_minutes: 1,
            short_break_minutes: 1,
            long_break_minutes: 2,
            sessions_before_long_break: 4,
        });

        for _ in 0..4 {
            c.start();
            for _ in 0..60 {
                c.tick();
            }
        }
        assert_eq!(c.state().session_count(), 5);

        c.toggle_mode();
        assert_eq!(c.session_kind(), SessionKind::LongBreak);
        assert_eq!(c.state().target_seconds(), 120);

        c.start();
        for _ in 0..120 {
            c.tick();
        }

        let events = recorder.events.borrow();
        assert_eq!(events.len(), 5);
        let last = events.last().unwrap();
        assert_eq!(last.mode, Mode::Break);
        assert!(last.was_long_break);
        assert_eq!(last.kind, SessionKind::LongBreak);
        // Breaks do not advance the count
        assert_eq!(c.state().session_count(), 5);
        assert_eq!(c.state().mode(), Mode::Break);
        assert_eq!(c.state().elapsed_seconds(), 0);
    }

    #[test]
    fn test_zero_focus_minutes_uses_default() {
        let (c, _, _) = controller(Settings {
            focus_minutes: 0,
            ..Settings::default()
        });
        assert_eq!(c.settings().focus_minutes, 25);
        assert_eq!(c.state().target_seconds(), 1500);
        assert_eq!(c.progress_fraction(), 0.0);
    }

    #[test]
    fn test_update_settings_retargets_current_mode() {
        let (mut c, _, _) = controller(Settings::default());
        c.start();
        for _ in 0..90 {
            c.tick();
        }

        c.update_settings(Settings {
            focus_minutes: 50,
            ..Settings::default()
        });
        assert_eq!(c.state().target_seconds(), 3000);
        assert_eq!(c.state().elapsed_seconds(), 90);
        assert!(c.state().is_running());

        c.update_settings(Settings {
            focus_minutes: 1,
            ..Settings::default()
        });
        assert_eq!(c.state().target_seconds(), 60);
        assert_eq!(c.state().elapsed_seconds(), 0);
    }

    #[test]
    fn test_update_settings_during_long_break() {
        let every_break_long = Settings {
            sessions_before_long_break: 0,
            ..Settings::default()
        };
        let (mut c, _, recorder) = controller(every_break_long);
        c.toggle_mode();
        assert_eq!(c.session_kind(), SessionKind::LongBreak);
        assert_eq!(c.state().target_seconds(), 900);

        c.start();
        for _ in 0..120 {
            c.tick();
        }

        c.update_settings(Settings {
            long_break_minutes: 30,
            short_break_minutes: 1,
            ..every_break_long
        });
        assert_eq!(c.state().target_seconds(), 1800);
        assert_eq!(c.state().elapsed_seconds(), 120);

        c.update_settings(Settings {
            long_break_minutes: 2,
            ..every_break_long
        });
        assert_eq!(c.state().target_seconds(), 120);
        assert_eq!(c.state().elapsed_seconds(), 0);
        assert_eq!(c.state().mode(), Mode::Break);
        assert_eq!(c.state().session_count(), 1);
        assert!(c.state().is_running());
        assert!(recorder.events.borrow().is_empty());
        assert_bounded(&c);
    }

    #[test]
    fn test_update_settings_validates() {
        let (mut c, _, recorder) = controller(Settings::default());
        c.update_settings(Settings {
            focus_minutes: 0,
            short_break_minutes: 0,
            ..Settings::default()
        });
        assert_eq!(*c.settings(), Settings::default());
        assert!(recorder.events.borrow().is_empty());
    }

    #[test]
    fn test_snapshot_display() {
        let (mut c, _, _) = controller(Settings::default());
        assert_eq!(c.snapshot().to_string(), "25:00 - Work Mode (Ready)");

        c.start();
        c.tick();
        assert_eq!(c.snapshot().to_string(), "24:59 - Work Mode (Running)");

        c.pause();
        assert_eq!(c.snapshot().to_string(), "24:59 - Work Mode (Paused)");

        c.toggle_mode();
        assert_eq!(c.snapshot().to_string(), "05:00 - Break Mode (Ready)");
    }

    #[test]
    fn test_snapshot_next_break() {
        let (mut c, _, _) = controller(Settings {
            sessions_before_long_break: 1,
            focus_minutes: 1,
            ..Settings::default()
        });
        assert_eq!(c.snapshot().next_break, BreakKind::ShortBreak);

        c.start();
        for _ in 0..60 {
            c.tick();
        }
        assert_eq!(c.snapshot().next_break, BreakKind::LongBreak);
    }
}
