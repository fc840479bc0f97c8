//! CPU-GPU synchronization.
//!
//! This module provides:
//! - [`GpuFence`] - the fence interface consumed by the frame pipeline
//! - [`HostFence`] - a host-memory fence signaled by a (simulated) GPU timeline
//!
//! # Overview
//!
//! A fence is a monotonically increasing 64-bit counter. The CPU tags each
//! submission with a new value and asks the queue to signal that value once the
//! GPU has consumed everything submitted before it. Comparing the fence's
//! *completed* value against a frame slot's tag tells the CPU whether the slot's
//! buffers are still being read by the GPU.
//!
//! Waits are always bounded. A fence that stops advancing (device removal,
//! hung queue) surfaces as [`RhiError::FenceTimeout`] or
//! [`RhiError::DeviceLost`] instead of blocking the frame loop forever.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use waveframe_rhi::sync::{GpuFence, HostFence};
//!
//! # fn example() -> Result<(), waveframe_rhi::RhiError> {
//! let fence = Arc::new(HostFence::new());
//!
//! // The GPU timeline signals from another thread.
//! let gpu = Arc::clone(&fence);
//! let worker = std::thread::spawn(move || gpu.signal(1));
//!
//! fence.wait_for_value(1, Duration::from_secs(5))?;
//! assert!(fence.completed_value()? >= 1);
//! worker.join().unwrap()?;
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, error, trace};

use crate::error::{RhiError, RhiResult};

/// Fence interface consumed by the frame pipeline.
///
/// Implementations wrap whatever the device offers (a D3D12 fence, a Vulkan
/// timeline semaphore, or [`HostFence`]).
pub trait GpuFence: Send + Sync {
    /// The highest value the GPU has reached.
    ///
    /// # Errors
    ///
    /// Returns [`RhiError::DeviceLost`] if the device can no longer report
    /// progress.
    fn completed_value(&self) -> RhiResult<u64>;

    /// Blocks until the completed value is at least `value`.
    ///
    /// # Errors
    ///
    /// - [`RhiError::FenceTimeout`] if `timeout` elapses first
    /// - [`RhiError::DeviceLost`] if the device is removed while waiting
    fn wait_for_value(&self, value: u64, timeout: Duration) -> RhiResult<()>;

    /// Non-blocking check that `value` has been reached.
    fn is_complete(&self, value: u64) -> RhiResult<bool> {
        Ok(self.completed_value()? >= value)
    }
}

impl<F: GpuFence + ?Sized> GpuFence for Arc<F> {
    fn completed_value(&self) -> RhiResult<u64> {
        (**self).completed_value()
    }

    fn wait_for_value(&self, value: u64, timeout: Duration) -> RhiResult<()> {
        (**self).wait_for_value(value, timeout)
    }
}

#[derive(Debug, Default)]
struct FenceState {
    completed: u64,
    device_lost: Option<String>,
}

/// Fence living in host memory.
///
/// Whoever plays the GPU calls [`signal`](Self::signal) when it finishes a
/// submission; the frame pipeline waits on it through [`GpuFence`].
///
/// # Thread Safety
///
/// `HostFence` is `Send + Sync`; share it through an `Arc` between the
/// recording thread and the thread emulating the GPU queue.
#[derive(Debug, Default)]
pub struct HostFence {
    state: Mutex<FenceState>,
    advanced: Condvar,
}

impl HostFence {
    /// Creates a fence with completed value 0.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FenceState> {
        // The state is two plain fields; a panic elsewhere cannot leave it torn.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks `value` as reached by the GPU and wakes any waiter.
    ///
    /// The completed value never decreases; signaling an older value is a
    /// no-op.
    ///
    /// # Errors
    ///
    /// Returns [`RhiError::DeviceLost`] once the fence has been marked lost.
    pub fn signal(&self, value: u64) -> RhiResult<()> {
        let mut state = self.lock();
        if let Some(reason) = &state.device_lost {
            return Err(RhiError::DeviceLost(reason.clone()));
        }
        if value > state.completed {
            trace!("Fence advanced {} -> {}", state.completed, value);
            state.completed = value;
            self.advanced.notify_all();
        }
        Ok(())
    }

    /// Simulates device removal: all pending and future waits fail.
    pub fn mark_device_lost(&self, reason: impl Into<String>) {
        let reason = reason.into();
        error!("Fence device lost: {}", reason);
        self.lock().device_lost = Some(reason);
        self.advanced.notify_all();
    }
}

impl GpuFence for HostFence {
    fn completed_value(&self) -> RhiResult<u64> {
        let state = self.lock();
        match &state.device_lost {
            Some(reason) => Err(RhiError::DeviceLost(reason.clone())),
            None => Ok(state.completed),
        }
    }

    fn wait_for_value(&self, value: u64, timeout: Duration) -> RhiResult<()> {
        let guard = self.lock();
        if guard.device_lost.is_none() && guard.completed < value {
            debug!(
                "Waiting for fence value {} (completed {})",
                value, guard.completed
            );
        }
        let (state, _) = self
            .advanced
            .wait_timeout_while(guard, timeout, |s| {
                s.device_lost.is_none() && s.completed < value
            })
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(reason) = &state.device_lost {
            return Err(RhiError::DeviceLost(reason.clone()));
        }
        if state.completed >= value {
            return Ok(());
        }
        Err(RhiError::FenceTimeout {
            value,
            completed: state.completed,
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        })
    }
}
