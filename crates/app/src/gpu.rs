//! Simulated GPU queue.
//!
//! A worker thread stands in for the graphics queue: it receives submitted
//! fence values in order, "executes" each frame for a fixed latency and then
//! signals the shared [`HostFence`].

use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, warn};

use waveframe_rhi::RhiResult;
use waveframe_rhi::sync::HostFence;

pub struct SimulatedGpu {
    queue: Option<Sender<u64>>,
    worker: Option<JoinHandle<RhiResult<()>>>,
}

impl SimulatedGpu {
    /// Starts the queue thread.
    pub fn spawn(fence: Arc<HostFence>, latency: Duration) -> Result<Self> {
        let (queue, submissions) = mpsc::channel::<u64>();
        let worker = thread::Builder::new()
            .name("gpu-queue".into())
            .spawn(move || {
                for value in submissions {
                    thread::sleep(latency);
                    fence.signal(value)?;
                    debug!("GPU finished fence {}", value);
                }
                Ok(())
            })
            .context("failed to spawn GPU queue thread")?;

        info!("Simulated GPU queue started ({:?} per frame)", latency);
        Ok(Self {
            queue: Some(queue),
            worker: Some(worker),
        })
    }

    /// Queues a signal of `value` after the frame's work.
    pub fn signal(&self, value: u64) -> Result<()> {
        self.queue
            .as_ref()
            .ok_or_else(|| anyhow!("GPU queue already shut down"))?
            .send(value)
            .map_err(|_| anyhow!("GPU queue thread exited"))
    }

    /// Drains the queue and joins the worker.
    pub fn shutdown(mut self) -> Result<()> {
        self.stop()
    }

    /// Closes the queue and joins the worker; a second call is a no-op.
    fn stop(&mut self) -> Result<()> {
        self.queue.take();
        match self.worker.take() {
            Some(worker) => worker
                .join()
                .map_err(|_| anyhow!("GPU queue thread panicked"))?
                .context("GPU queue failed"),
            None => Ok(()),
        }
    }
}

impl Drop for SimulatedGpu {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("GPU queue stopped abnormally: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waveframe_rhi::sync::GpuFence;

    #[test]
    fn test_signals_in_order() {
        let fence = Arc::new(HostFence::new());
        let gpu = SimulatedGpu::spawn(Arc::clone(&fence), Duration::from_millis(1)).unwrap();
        for value in 1..=3 {
            gpu.signal(value).unwrap();
        }
        fence.wait_for_value(3, Duration::from_secs(5)).unwrap();
        gpu.shutdown().unwrap();
        assert_eq!(fence.completed_value().unwrap(), 3);
    }

    #[test]
    fn test_lost_device_fails_shutdown() {
        let fence = Arc::new(HostFence::new());
        fence.mark_device_lost("test");
        let gpu = SimulatedGpu::spawn(Arc::clone(&fence), Duration::ZERO).unwrap();
        gpu.signal(1).unwrap();
        assert!(gpu.shutdown().is_err());
    }

    #[test]
    fn test_drop_reports_worker_failure_once() {
        let fence = Arc::new(HostFence::new());
        fence.mark_device_lost("test");
        let mut gpu = SimulatedGpu::spawn(Arc::clone(&fence), Duration::ZERO).unwrap();
        gpu.signal(1).unwrap();

        let err = gpu.stop().unwrap_err();
        assert!(format!("{:#}", err).contains("GPU queue failed"));
        // The worker is gone; dropping has nothing left to report.
        gpu.stop().unwrap();
        drop(gpu);
    }

    #[test]
    fn test_drop_without_shutdown_joins_worker() {
        let fence = Arc::new(HostFence::new());
        let gpu = SimulatedGpu::spawn(Arc::clone(&fence), Duration::ZERO).unwrap();
        gpu.signal(1).unwrap();
        drop(gpu);
        assert_eq!(fence.completed_value().unwrap(), 1);
    }
}
