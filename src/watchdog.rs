// Idle watchdog
//
// The source controller raised a timer-overflow interrupt roughly every
// half second; here the same window is a monotonic deadline comparison so
// tests can inject a fake clock.

use std::time::{Duration, Instant};

pub trait Clock {
    fn now(&self) -> Instant;
}

/// System monotonic clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct MonotonicClock;

impl Clock for MonotonicClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// One-shot idle signal over a free-running window. The countdown runs
/// purely on elapsed time since the last reset, independent of any parse
/// in progress.
pub struct IdleWatchdog<C: Clock> {
    clock: C,
    window: Duration,
    deadline: Instant,
}

impl<C: Clock> IdleWatchdog<C> {
    pub fn new(clock: C, window: Duration) -> Self {
        let deadline = clock.now() + window;
        Self {
            clock,
            window,
            deadline,
        }
    }

    /// Restart the countdown. Called once at startup and after every
    /// completed command.
    pub fn reset(&mut self) {
        self.deadline = self.clock.now() + self.window;
    }

    /// Whether the window elapsed since the last reset or fire, clearing
    /// the signal. Re-arms on fire, so a continued idle period fires
    /// again one window later rather than on every poll.
    pub fn poll_and_clear(&mut self) -> bool {
        let now = self.clock.now();
        if now < self.deadline {
            return false;
        }
        self.deadline = now + self.window;
        true
    }
}
