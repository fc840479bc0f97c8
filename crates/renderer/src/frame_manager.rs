//! Frame ring management and CPU-GPU throttling.
//!
//! This module provides the [`FramePipeline`] struct, which rotates through N
//! [`FrameResource`] slots. It handles:
//!
//! - Slot selection and the fence wait before a slot is reused
//! - Dirty-tracked uploads of object, material and pass constants
//! - Per-frame upload of the dynamic wave vertices
//! - Fence watermarks for submitted slots
//!
//! # Overview
//!
//! 1. While the GPU reads slot k, the CPU writes slot k+1
//! 2. A slot is reused only after the fence passes the value it was submitted with
//! 3. So the CPU runs at most N-1 frames ahead of the GPU
//!
//! Each change to an object or material resets its dirty counter to N. Every
//! frame the active slot is refreshed and the counter drops by one, so after N
//! frames all slots hold the new data.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use waveframe_renderer::{FramePipeline, PipelineConfig};
//! use waveframe_resources::RenderItem;
//! use waveframe_rhi::sync::HostFence;
//!
//! # fn example() -> Result<(), waveframe_rhi::RhiError> {
//! let fence = Arc::new(HostFence::new());
//! let config = PipelineConfig::default();
//! let mut pipeline = FramePipeline::new(config, Arc::clone(&fence))?;
//! let mut item = RenderItem::new(0, 0, config.frames_in_flight);
//!
//! for _ in 0..4 {
//!     pipeline.advance_frame()?;
//!     pipeline.write_object_constants(&mut item)?;
//!     let value = pipeline.submit_next()?;
//!     // The queue signals the value once the GPU has consumed the frame.
//!     fence.signal(value)?;
//! }
//! assert!(!item.dirty().is_dirty());
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use glam::Vec2;
use tracing::{debug, info, warn};

use waveframe_resources::{DirtyCounter, Material, MaterialLibrary, PassState, RenderItem};
use waveframe_rhi::sync::GpuFence;
use waveframe_rhi::vertex::Vertex;
use waveframe_rhi::{RhiError, RhiResult};
use waveframe_waves::WaveField;

use crate::config::PipelineConfig;
use crate::frame::{FrameResource, FrameState};

/// Rotates frame slots and throttles the CPU against a GPU fence.
///
/// # Thread Safety
///
/// The pipeline is not thread-safe. It should only be accessed from the
/// simulation thread; only the fence is shared with whoever plays the GPU.
pub struct FramePipeline<F> {
    config: PipelineConfig,
    fence: F,
    frames: Vec<FrameResource>,
    /// Active slot; `None` until the first `advance_frame`.
    current: Option<usize>,
    /// Highest fence value handed to `submit`.
    last_submitted: u64,
    /// Bumped on every successful `advance_frame`; identifies one slot recording.
    serial: u64,
}

impl<F: GpuFence> FramePipeline<F> {
    /// Creates `config.frames_in_flight` slots.
    ///
    /// # Errors
    ///
    /// Returns [`RhiError::InvalidConfig`] if the configuration is invalid.
    pub fn new(config: PipelineConfig, fence: F) -> RhiResult<Self> {
        config.validate()?;

        let frames = (0..config.frames_in_flight)
            .map(|i| FrameResource::new(i, &config))
            .collect::<RhiResult<Vec<_>>>()?;

        info!(
            "Frame pipeline created with {} frames in flight",
            config.frames_in_flight
        );

        Ok(Self {
            config,
            fence,
            frames,
            current: None,
            last_submitted: 0,
            serial: 0,
        })
    }

    /// Moves to the next slot, waiting for the GPU to release it first.
    ///
    /// This is the only blocking call of the pipeline. Returns the index of the
    /// new active slot.
    ///
    /// # Errors
    ///
    /// - [`RhiError::FenceTimeout`] if the fence does not reach the slot's
    ///   watermark within the configured bound
    /// - [`RhiError::DeviceLost`] if the device is removed
    ///
    /// Both are fatal. On error the pipeline keeps its previous active slot.
    pub fn advance_frame(&mut self) -> RhiResult<usize> {
        let next = self.current.map_or(0, |c| (c + 1) % self.frames.len());

        let pending = self.frames[next].fence_value();
        let mut completed = 0;
        if pending != 0 {
            completed = self.fence.completed_value()?;
            if completed < pending {
                debug!(
                    "Frame slot {} waits for fence {} (completed {})",
                    next, pending, completed
                );
                self.fence
                    .wait_for_value(pending, self.config.fence_timeout())?;
                completed = pending;
            }
        }

        if let Some(c) = self.current
            && self.frames[c].state() == FrameState::Recording
        {
            warn!("Frame slot {} abandoned without submit", c);
            self.frames[c].abandon();
        }

        self.frames[next].begin(completed)?;
        self.current = Some(next);
        self.serial += 1;
        Ok(next)
    }

    /// Active slot that accepts writes of data tracked by `dirty`.
    fn recording_frame(&mut self, dirty: &DirtyCounter) -> RhiResult<&mut FrameResource> {
        if dirty.frames_in_flight() != self.frames.len() {
            return Err(RhiError::InvalidConfig(format!(
                "dirty counter tracks {} slots, pipeline has {}",
                dirty.frames_in_flight(),
                self.frames.len()
            )));
        }
        self.active_frame_mut()
    }

    fn active_frame_mut(&mut self) -> RhiResult<&mut FrameResource> {
        let index = self.current.ok_or(RhiError::NoActiveFrame)?;
        let frame = &mut self.frames[index];
        frame.ensure_recording()?;
        Ok(frame)
    }

    /// Uploads `item`'s object constants to the active slot if it is dirty.
    ///
    /// Returns whether a write happened. Writing the same item again before
    /// the next `advance_frame` rewrites the slot but counts it only once.
    ///
    /// # Errors
    ///
    /// - [`RhiError::NoActiveFrame`] / [`RhiError::FrameNotRecording`]
    /// - [`RhiError::OutOfRange`] if the item's buffer index is past the
    ///   configured object count
    pub fn write_object_constants(&mut self, item: &mut RenderItem) -> RhiResult<bool> {
        let serial = self.serial;
        let frame = self.recording_frame(item.dirty())?;
        if !item.dirty().is_dirty() {
            return Ok(false);
        }
        frame
            .object_constants_mut()
            .copy_data(item.obj_cb_index(), &item.constants())?;
        item.dirty_mut().consume_for(serial);
        Ok(true)
    }

    /// [`write_object_constants`](Self::write_object_constants) for every item.
    ///
    /// Returns the number of writes.
    pub fn update_object_constants(&mut self, items: &mut [RenderItem]) -> RhiResult<usize> {
        let mut written = 0;
        for item in items {
            written += usize::from(self.write_object_constants(item)?);
        }
        Ok(written)
    }

    /// Uploads `material`'s constants to the active slot if it is dirty.
    pub fn write_material_constants(&mut self, material: &mut Material) -> RhiResult<bool> {
        let serial = self.serial;
        let frame = self.recording_frame(material.dirty())?;
        if !material.dirty().is_dirty() {
            return Ok(false);
        }
        frame
            .material_constants_mut()
            .copy_data(material.cb_index(), &material.constants())?;
        material.dirty_mut().consume_for(serial);
        Ok(true)
    }

    /// [`write_material_constants`](Self::write_material_constants) for every
    /// material of the library.
    pub fn update_material_constants(&mut self, materials: &mut MaterialLibrary) -> RhiResult<usize> {
        let mut written = 0;
        for material in materials.iter_mut() {
            written += usize::from(self.write_material_constants(material)?);
        }
        Ok(written)
    }

    /// Uploads the pass block to the active slot if it is dirty.
    pub fn write_pass_constants(&mut self, pass: &mut PassState) -> RhiResult<bool> {
        let serial = self.serial;
        let frame = self.recording_frame(pass.dirty())?;
        if !pass.dirty().is_dirty() {
            return Ok(false);
        }
        frame
            .pass_constants_mut()
            .copy_data(pass.cb_index(), pass.constants())?;
        pass.dirty_mut().consume_for(serial);
        Ok(true)
    }

    /// Copies the wave surface into the active slot's dynamic vertex buffer.
    ///
    /// Runs every frame; the surface changes too often for dirty tracking.
    /// Texture coordinates map the grid's extent onto `[0, 1]`.
    ///
    /// # Errors
    ///
    /// - [`RhiError::NoActiveFrame`] / [`RhiError::FrameNotRecording`]
    /// - [`RhiError::InvalidConfig`] if the pipeline has no wave buffer
    /// - [`RhiError::OutOfRange`] if the field has more vertices than the buffer
    pub fn update_wave_vertices(&mut self, waves: &WaveField) -> RhiResult<()> {
        let frame = self.active_frame_mut()?;
        frame.allocator_mut().record("update waves");
        let buffer = frame.wave_vertices_mut().ok_or_else(|| {
            RhiError::InvalidConfig("pipeline was created without a wave vertex buffer".into())
        })?;

        let width = waves.width();
        let depth = waves.depth();
        let vertices: Vec<Vertex> = (0..waves.vertex_count())
            .map(|k| {
                let p = waves.position(k);
                let uv = Vec2::new(0.5 + p.x / width, 0.5 - p.z / depth);
                Vertex::new(p, waves.normal(k), uv, waves.tangent_x(k))
            })
            .collect();
        buffer.copy_slice(0, &vertices)
    }

    /// Records a command label into the active slot's allocator.
    pub fn record(&mut self, command: impl Into<String>) -> RhiResult<()> {
        self.active_frame_mut()?.allocator_mut().record(command);
        Ok(())
    }

    /// Hands the active slot to the GPU; it is reused once the fence reaches
    /// `fence_value`.
    ///
    /// # Errors
    ///
    /// - [`RhiError::NoActiveFrame`] / [`RhiError::FrameNotRecording`]
    /// - [`RhiError::NonMonotonicFence`] if `fence_value` does not exceed the
    ///   previous submission
    pub fn submit(&mut self, fence_value: u64) -> RhiResult<()> {
        let previous = self.last_submitted;
        let frame = self.active_frame_mut()?;
        if fence_value <= previous {
            return Err(RhiError::NonMonotonicFence {
                previous,
                requested: fence_value,
            });
        }
        frame.submit(fence_value);
        self.last_submitted = fence_value;
        Ok(())
    }

    /// Submits with the next value of the pipeline's own counter and returns it.
    ///
    /// The caller asks its queue to signal the returned value.
    pub fn submit_next(&mut self) -> RhiResult<u64> {
        let value = self.last_submitted + 1;
        self.submit(value)?;
        Ok(value)
    }

    /// Waits for all in-flight frames to complete.
    ///
    /// This is useful before tearing down resources to ensure all GPU work has
    /// finished.
    ///
    /// # Errors
    ///
    /// Same fatal errors as [`advance_frame`](Self::advance_frame).
    pub fn wait_idle(&mut self) -> RhiResult<()> {
        if self.last_submitted == 0 {
            return Ok(());
        }
        debug!("Waiting for fence {} before idle", self.last_submitted);
        self.fence
            .wait_for_value(self.last_submitted, self.config.fence_timeout())?;
        for frame in &mut self.frames {
            frame.retire();
        }
        Ok(())
    }

    /// Index of the active slot, `None` before the first `advance_frame`.
    #[inline]
    pub fn current_frame_index(&self) -> Option<usize> {
        self.current
    }

    /// Serial of the current slot recording; 0 before the first `advance_frame`.
    #[inline]
    pub fn recording_serial(&self) -> u64 {
        self.serial
    }

    #[inline]
    pub fn current_frame(&self) -> Option<&FrameResource> {
        self.current.map(|i| &self.frames[i])
    }

    #[inline]
    pub fn frame(&self, index: usize) -> Option<&FrameResource> {
        self.frames.get(index)
    }

    #[inline]
    pub fn frames(&self) -> &[FrameResource] {
        &self.frames
    }

    /// Returns the number of frames in flight.
    #[inline]
    pub fn frames_in_flight(&self) -> usize {
        self.frames.len()
    }

    /// Highest fence value submitted so far, 0 if none.
    #[inline]
    pub fn last_submitted_fence(&self) -> u64 {
        self.last_submitted
    }

    #[inline]
    pub fn fence(&self) -> &F {
        &self.fence
    }

    #[inline]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }
}
