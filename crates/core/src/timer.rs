//! Game timer for frame deltas and total running time.
//!
//! Total time excludes intervals spent stopped, so pausing the simulation
//! does not make the wave field jump forward when it resumes.

use std::time::{Duration, Instant};

/// High-resolution game timer.
#[derive(Debug)]
pub struct Timer {
    base: Instant,
    previous: Instant,
    /// Accumulated time spent stopped.
    paused: Duration,
    /// Set while the timer is stopped.
    stopped_at: Option<Instant>,
    delta: Duration,
}

impl Timer {
    /// Create a new running timer, starting from now.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            base: now,
            previous: now,
            paused: Duration::ZERO,
            stopped_at: None,
            delta: Duration::ZERO,
        }
    }

    /// Advance the timer by one frame and return the frame delta.
    ///
    /// A stopped timer reports a zero delta.
    pub fn tick(&mut self) -> Duration {
        if self.stopped_at.is_some() {
            self.delta = Duration::ZERO;
            return self.delta;
        }
        let now = Instant::now();
        // Instant is monotonic, so this never underflows.
        self.delta = now.saturating_duration_since(self.previous);
        self.previous = now;
        self.delta
    }

    /// Tick and return the delta in seconds.
    pub fn delta_secs(&mut self) -> f32 {
        self.tick().as_secs_f32()
    }

    /// Delta recorded by the most recent [`tick`](Self::tick).
    pub fn last_delta(&self) -> Duration {
        self.delta
    }

    /// Total running time since the last reset, not counting stopped time.
    pub fn total(&self) -> Duration {
        let end = self.stopped_at.unwrap_or_else(Instant::now);
        end.saturating_duration_since(self.base)
            .saturating_sub(self.paused)
    }

    /// Total running time in seconds.
    pub fn total_secs(&self) -> f32 {
        self.total().as_secs_f32()
    }

    /// Pause the timer. Has no effect if already stopped.
    pub fn stop(&mut self) {
        if self.stopped_at.is_none() {
            self.stopped_at = Some(Instant::now());
        }
    }

    /// Resume a stopped timer. Has no effect if running.
    pub fn start(&mut self) {
        if let Some(stopped_at) = self.stopped_at.take() {
            let now = Instant::now();
            self.paused += now.saturating_duration_since(stopped_at);
            self.previous = now;
        }
    }

    /// Whether the timer is currently stopped.
    pub fn is_stopped(&self) -> bool {
        self.stopped_at.is_some()
    }

    /// Reset the timer to the current time and start it.
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}
