//! Tick clocks: the elapsed-time source that throttles search.

use std::time::{Duration, Instant};

/// Reports how much of the current tick has been used.
pub trait TickClock {
    /// Time elapsed since the tick began.
    fn elapsed(&self) -> Duration;
}

/// Wall-clock tick timer.
#[derive(Debug, Clone, Copy)]
pub struct InstantClock {
    started: Instant,
}

impl InstantClock {
    /// Begin a tick now.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
        }
    }

    /// Begin the next tick.
    pub fn restart(&mut self) {
        self.started = Instant::now();
    }
}

impl TickClock for InstantClock {
    fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }
}

/// A clock that never runs out. Searches resumed with it run to completion.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unbounded;

impl TickClock for Unbounded {
    fn elapsed(&self) -> Duration {
        Duration::ZERO
    }
}

/// A clock whose tick is always over.
///
/// Forces a suspension after every step.
#[derive(Debug, Clone, Copy, Default)]
pub struct Exhausted;

impl TickClock for Exhausted {
    fn elapsed(&self) -> Duration {
        Duration::MAX
    }
}
