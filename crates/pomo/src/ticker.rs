//! tokio-backed tick source
//!
//! The controller holds a [`WatchTicker`] and flips a watch channel on
//! start/stop. The event loop awaits [`TickGate::wait`], which only resolves
//! while ticking is switched on. Switching on restarts the interval so the
//! first tick lands one full period later.

use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, Instant, Interval, MissedTickBehavior};

use crate::controller::TickSource;

/// Controller side of the tick channel
pub struct WatchTicker {
    tx: watch::Sender<bool>,
}

impl TickSource for WatchTicker {
    fn start(&mut self) {
        self.tx.send_replace(true);
    }

    fn stop(&mut self) {
        self.tx.send_replace(false);
    }
}

/// Event-loop side of the tick channel
pub struct TickGate {
    rx: watch::Receiver<bool>,
    interval: Interval,
    armed: bool,
}

/// Create a connected ticker/gate pair; ticking starts switched off
pub fn channel(period: Duration) -> (WatchTicker, TickGate) {
    let (tx, rx) = watch::channel(false);
    let mut interval = time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let gate = TickGate {
        rx,
        interval,
        armed: false,
    };
    (WatchTicker { tx }, gate)
}

impl TickGate {
    /// Wait for the next tick; pends forever once the ticker is dropped
    pub async fn wait(&mut self) {
        loop {
            // A stop/start pair between two waits still counts as a restart
            let restarted = self.rx.has_changed().unwrap_or(false);
            let running = *self.rx.borrow_and_update();

            if !running {
                self.armed = false;
                if self.rx.changed().await.is_err() {
                    return std::future::pending().await;
                }
                continue;
            }

            if restarted || !self.armed {
                self.interval.reset();
                self.armed = true;
            }

            tokio::select! {
                _ = self.interval.tick() => return,
                changed = self.rx.changed() => {
                    if changed.is_err() {
                        return std::future::pending().await;
                    }
                    self.armed = false;
                }
            }
        }
    }

    #[cfg(test)]
    fn is_active(&self) -> bool {
        *self.rx.borrow()
    }
}
