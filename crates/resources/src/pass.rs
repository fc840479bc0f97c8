//! Pass (camera / lighting) state with dirty tracking.

use crate::dirty::DirtyCounter;
use crate::ubo::PassConstants;

/// CPU copy of the pass block.
#[derive(Debug, Clone)]
pub struct PassState {
    /// Slot in the pass constant buffer.
    cb_index: usize,
    constants: PassConstants,
    dirty: DirtyCounter,
}

impl PassState {
    /// Creates a pass state, dirty in every slot.
    pub fn new(cb_index: usize, constants: PassConstants, frames_in_flight: usize) -> Self {
        Self {
            cb_index,
            constants,
            dirty: DirtyCounter::new(frames_in_flight),
        }
    }

    pub fn cb_index(&self) -> usize {
        self.cb_index
    }

    pub fn constants(&self) -> &PassConstants {
        &self.constants
    }

    /// Replaces the constants. Identical values leave the slots clean.
    ///
    /// Returns whether anything changed.
    pub fn update(&mut self, constants: PassConstants) -> bool {
        if constants == self.constants {
            return false;
        }
        self.constants = constants;
        self.dirty.mark_dirty();
        true
    }

    pub fn dirty(&self) -> &DirtyCounter {
        &self.dirty
    }

    pub fn dirty_mut(&mut self) -> &mut DirtyCounter {
        &mut self.dirty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unchanged_update_keeps_slots_clean() {
        let mut pass = PassState::new(0, PassConstants::default(), 3);
        while pass.dirty_mut().consume() {}
        assert!(!pass.update(PassConstants::default()));
        assert!(!pass.dirty().is_dirty());
    }

    #[test]
    fn test_changed_update_dirties_all_slots() {
        let mut pass = PassState::new(0, PassConstants::default(), 2);
        while pass.dirty_mut().consume() {}
        assert!(pass.update(PassConstants::default().with_time(1.0, 0.016)));
        assert_eq!(pass.dirty().remaining(), 2);
        assert_eq!(pass.constants().total_time, 1.0);
    }
}
