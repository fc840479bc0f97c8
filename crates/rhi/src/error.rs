//! RHI-specific error types.

use thiserror::Error;

/// RHI-specific error type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RhiError {
    /// The device was removed or reset; no fence will ever signal again.
    #[error("Device lost: {0}")]
    DeviceLost(String),

    /// A fence wait did not complete within the configured bound.
    #[error("Timed out after {timeout_ms} ms waiting for fence value {value} (completed {completed})")]
    FenceTimeout {
        /// The value that was awaited.
        value: u64,
        /// The fence's completed value when the wait gave up.
        completed: u64,
        /// The wait bound.
        timeout_ms: u64,
    },

    /// Fence values submitted out of order.
    #[error("Fence value {requested} does not advance past {previous}")]
    NonMonotonicFence {
        /// Last value submitted.
        previous: u64,
        /// Rejected value.
        requested: u64,
    },

    /// A frame operation was issued before the first `advance_frame`.
    #[error("No active frame; call advance_frame first")]
    NoActiveFrame,

    /// The active slot has already been handed to the GPU.
    #[error("Frame slot {0} is not recording")]
    FrameNotRecording(usize),

    /// A resource still referenced by in-flight GPU work was touched.
    #[error("Resource in flight: {0}")]
    InFlight(String),

    /// Element index past the end of a buffer.
    #[error("Index {index} out of range for buffer '{name}' of {len} elements")]
    OutOfRange {
        /// Buffer debug name.
        name: String,
        /// Requested index.
        index: usize,
        /// Element count.
        len: usize,
    },

    /// Invalid pipeline or buffer configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl RhiError {
    /// Whether the error means the device can no longer make progress.
    ///
    /// Fatal errors must be propagated to the application; waiting again
    /// will not help.
    pub fn is_fatal(&self) -> bool {
        matches!(self, RhiError::DeviceLost(_) | RhiError::FenceTimeout { .. })
    }
}

/// Result type alias for RHI operations.
pub type RhiResult<T> = std::result::Result<T, RhiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synchronization_failures_are_fatal() {
        assert!(RhiError::DeviceLost("removed".into()).is_fatal());
        assert!(
            RhiError::FenceTimeout {
                value: 4,
                completed: 1,
                timeout_ms: 10
            }
            .is_fatal()
        );
        assert!(!RhiError::NoActiveFrame.is_fatal());
        assert!(
            !RhiError::NonMonotonicFence {
                previous: 2,
                requested: 2
            }
            .is_fatal()
        );
    }

    #[test]
    fn test_timeout_message_names_values() {
        let msg = RhiError::FenceTimeout {
            value: 7,
            completed: 5,
            timeout_ms: 100,
        }
        .to_string();
        assert!(msg.contains("7"));
        assert!(msg.contains("completed 5"));
    }
}
