//! Per-frame-slot dirty tracking.
//!
//! With N frame slots in flight, changing an object's constants has to reach
//! every slot's copy, one slot per frame. A [`DirtyCounter`] counts how many
//! slots still hold stale data: it is reset to N on every change and
//! decremented once for each distinct slot recording that is refreshed.
//!
//! Recordings are identified by a serial that the frame pipeline bumps on
//! every advance. Writing the same data twice within one recording refreshes
//! one slot, not two.
//!
//! # Example
//!
//! ```
//! use waveframe_resources::DirtyCounter;
//!
//! let mut dirty = DirtyCounter::new(3);
//! let mut writes = 0;
//! for serial in 1..=5 {
//!     // Two writers touch the same data during each recording.
//!     for _ in 0..2 {
//!         if dirty.consume_for(serial) {
//!             writes += 1;
//!         }
//!     }
//! }
//! assert_eq!(writes, 6);
//! assert!(!dirty.is_dirty());
//! ```

/// Count of frame slots whose copy of some data is stale.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DirtyCounter {
    remaining: usize,
    frames_in_flight: usize,
    last_serial: Option<u64>,
}

impl DirtyCounter {
    /// Creates a counter that is dirty in all `frames_in_flight` slots.
    #[inline]
    pub const fn new(frames_in_flight: usize) -> Self {
        Self {
            remaining: frames_in_flight,
            frames_in_flight,
            last_serial: None,
        }
    }

    /// Creates a counter with every slot already up to date.
    #[inline]
    pub const fn clean(frames_in_flight: usize) -> Self {
        Self {
            remaining: 0,
            frames_in_flight,
            last_serial: None,
        }
    }

    /// Marks the data changed: every slot needs a refresh again, including
    /// the one currently recording.
    #[inline]
    pub fn mark_dirty(&mut self) {
        self.remaining = self.frames_in_flight;
        self.last_serial = None;
    }

    /// Whether the active slot still needs a write.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.remaining > 0
    }

    /// Slots still holding stale data.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.remaining
    }

    /// The N this counter resets to.
    #[inline]
    pub fn frames_in_flight(&self) -> usize {
        self.frames_in_flight
    }

    /// Records that the slot recording under `serial` was refreshed.
    ///
    /// The first refresh in a recording counts one slot. Later refreshes in
    /// the same recording return `true` without counting again. Returns
    /// `false` once every slot is clean.
    #[inline]
    pub fn consume_for(&mut self, serial: u64) -> bool {
        if self.remaining == 0 {
            return false;
        }
        if self.last_serial != Some(serial) {
            self.remaining -= 1;
            self.last_serial = Some(serial);
        }
        true
    }

    /// Records one slot refresh outside of any recording serial.
    ///
    /// Returns `true` if a refresh was due (and the caller should have written),
    /// `false` if every slot was already clean.
    #[inline]
    pub fn consume(&mut self) -> bool {
        if self.remaining == 0 {
            return false;
        }
        self.remaining -= 1;
        self.last_serial = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_counter_is_dirty_everywhere() {
        let dirty = DirtyCounter::new(3);
        assert!(dirty.is_dirty());
        assert_eq!(dirty.remaining(), 3);
        assert_eq!(dirty.frames_in_flight(), 3);
    }

    #[test]
    fn test_clean_counter() {
        let mut dirty = DirtyCounter::clean(2);
        assert!(!dirty.is_dirty());
        assert!(!dirty.consume());
        assert!(!dirty.consume_for(1));
        dirty.mark_dirty();
        assert_eq!(dirty.remaining(), 2);
    }

    #[test]
    fn test_change_midway_restarts_countdown() {
        let mut dirty = DirtyCounter::new(3);
        assert!(dirty.consume());
        assert!(dirty.consume());
        dirty.mark_dirty();
        assert_eq!(dirty.remaining(), 3);
    }

    #[test]
    fn test_repeat_write_in_one_recording_counts_once() {
        let mut dirty = DirtyCounter::new(3);
        assert!(dirty.consume_for(1));
        assert!(dirty.consume_for(1));
        assert!(dirty.consume_for(1));
        assert_eq!(dirty.remaining(), 2);

        assert!(dirty.consume_for(2));
        assert!(dirty.consume_for(2));
        assert_eq!(dirty.remaining(), 1);

        assert!(dirty.consume_for(3));
        assert!(!dirty.is_dirty());
        assert!(!dirty.consume_for(3));
        assert!(!dirty.consume_for(4));
    }

    #[test]
    fn test_change_after_write_recounts_current_recording() {
        let mut dirty = DirtyCounter::new(2);
        assert!(dirty.consume_for(7));
        assert_eq!(dirty.remaining(), 1);

        // New data arrives after this slot was already written.
        dirty.mark_dirty();
        assert!(dirty.consume_for(7));
        assert_eq!(dirty.remaining(), 1);
        assert!(dirty.consume_for(8));
        assert!(!dirty.is_dirty());
    }
}
