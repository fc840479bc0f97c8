//! Command allocators.
//!
//! Every frame slot owns exactly one [`CommandAllocator`]. The allocator's
//! memory backs the command lists recorded for that slot, so it may only be
//! reset once the GPU has finished executing them. The allocator remembers the
//! fence value of its last submission and refuses a reset before that value
//! has completed.

use tracing::trace;

use crate::error::{RhiError, RhiResult};

/// Per-slot command allocator.
///
/// Recorded commands are kept as labels so tests and logs can see what each
/// frame submitted; a device backend would hand out command-list memory here.
#[derive(Debug)]
pub struct CommandAllocator {
    /// Debug name.
    name: String,
    /// Commands recorded since the last reset.
    recorded: Vec<String>,
    /// Fence value of the last submission using this allocator (0 = none).
    submitted_fence: u64,
    /// Number of successful resets.
    resets: u64,
}

impl CommandAllocator {
    /// Creates an empty allocator.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            recorded: Vec::new(),
            submitted_fence: 0,
            resets: 0,
        }
    }

    /// Returns the debug name.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Records a command.
    pub fn record(&mut self, command: impl Into<String>) {
        self.recorded.push(command.into());
    }

    /// Commands recorded since the last reset.
    #[inline]
    pub fn recorded(&self) -> &[String] {
        &self.recorded
    }

    /// Tags the recorded commands with the fence value that retires them.
    pub fn mark_submitted(&mut self, fence_value: u64) {
        self.submitted_fence = fence_value;
    }

    /// Fence value of the last submission, 0 if never submitted.
    #[inline]
    pub fn submitted_fence(&self) -> u64 {
        self.submitted_fence
    }

    /// Number of times the allocator has been reset.
    #[inline]
    pub fn reset_count(&self) -> u64 {
        self.resets
    }

    /// Releases recorded command memory for reuse.
    ///
    /// # Arguments
    ///
    /// * `completed_fence` - The fence's completed value as observed by the caller
    ///
    /// # Errors
    ///
    /// Returns [`RhiError::InFlight`] if the GPU may still be executing
    /// commands from this allocator.
    pub fn reset(&mut self, completed_fence: u64) -> RhiResult<()> {
        if completed_fence < self.submitted_fence {
            return Err(RhiError::InFlight(format!(
                "command allocator '{}' awaits fence {} (completed {})",
                self.name, self.submitted_fence, completed_fence
            )));
        }
        trace!(
            "Reset allocator '{}' ({} commands)",
            self.name,
            self.recorded.len()
        );
        self.recorded.clear();
        self.resets += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_allocator_resets() {
        let mut alloc = CommandAllocator::new("frame0");
        alloc.record("clear");
        alloc.reset(0).unwrap();
        assert!(alloc.recorded().is_empty());
        assert_eq!(alloc.reset_count(), 1);
    }

    #[test]
    fn test_reset_rejected_while_in_flight() {
        let mut alloc = CommandAllocator::new("frame1");
        alloc.record("draw waves");
        alloc.mark_submitted(4);

        let err = alloc.reset(3).unwrap_err();
        assert!(matches!(err, RhiError::InFlight(_)));
        assert_eq!(alloc.recorded().len(), 1);

        alloc.reset(4).unwrap();
        assert!(alloc.recorded().is_empty());
    }
}
