//! Per-frame resources.

use tracing::{debug, trace};

use waveframe_resources::{MaterialConstants, ObjectConstants, PassConstants};
use waveframe_rhi::buffer::{BufferUsage, UploadBuffer};
use waveframe_rhi::command::CommandAllocator;
use waveframe_rhi::vertex::Vertex;
use waveframe_rhi::{RhiError, RhiResult};

use crate::config::PipelineConfig;

/// Ownership state of a frame slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameState {
    /// Never used, or retired after [`wait_idle`](crate::FramePipeline::wait_idle).
    Idle,
    /// Active slot; the CPU owns its buffers.
    Recording,
    /// Submitted; the GPU may read its buffers until the fence passes
    /// [`FrameResource::fence_value`].
    InFlight,
}

/// One slot of the frame ring.
///
/// Each slot in flight has its own set of resources so the CPU never writes a
/// buffer the GPU is reading:
/// - A command allocator for the slot's command lists
/// - The fence value that retires the slot
/// - Upload buffers for pass, object and material constants
/// - An optional dynamic vertex buffer for the wave surface
///
/// # Synchronization Flow
///
/// ```text
/// 1. advance_frame: wait until fence >= fence_value, reset allocator (-> Recording)
/// 2. write constants / wave vertices into this slot's buffers
/// 3. submit(v): fence_value = v (-> InFlight)
/// 4. the queue signals v once the GPU is done with the slot
/// ```
#[derive(Debug)]
pub struct FrameResource {
    index: usize,
    allocator: CommandAllocator,
    /// Watermark retiring this slot (0 = never submitted).
    fence_value: u64,
    state: FrameState,
    pass_constants: UploadBuffer<PassConstants>,
    object_constants: UploadBuffer<ObjectConstants>,
    material_constants: UploadBuffer<MaterialConstants>,
    wave_vertices: Option<UploadBuffer<Vertex>>,
}

impl FrameResource {
    /// Allocates the slot's buffers as sized by `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if a buffer cannot be created.
    pub(crate) fn new(index: usize, config: &PipelineConfig) -> RhiResult<Self> {
        let wave_vertices = match config.wave_vertex_count {
            0 => None,
            n => Some(UploadBuffer::new(
                format!("frame{index}.waves"),
                BufferUsage::Vertex,
                n,
            )?),
        };
        let frame = Self {
            index,
            allocator: CommandAllocator::new(format!("frame{index}")),
            fence_value: 0,
            state: FrameState::Idle,
            pass_constants: UploadBuffer::new(
                format!("frame{index}.pass"),
                BufferUsage::Constant,
                config.pass_count,
            )?,
            object_constants: UploadBuffer::new(
                format!("frame{index}.objects"),
                BufferUsage::Constant,
                config.object_count,
            )?,
            material_constants: UploadBuffer::new(
                format!("frame{index}.materials"),
                BufferUsage::Structured,
                config.material_count,
            )?,
            wave_vertices,
        };
        debug!("Created frame resource {}", index);
        Ok(frame)
    }

    /// Starts recording: resets the allocator and hands the slot to the CPU.
    ///
    /// `completed_fence` must be the fence's completed value (or a lower bound
    /// of it no smaller than [`fence_value`](Self::fence_value)).
    pub(crate) fn begin(&mut self, completed_fence: u64) -> RhiResult<()> {
        self.allocator.reset(completed_fence)?;
        self.state = FrameState::Recording;
        trace!("Frame slot {} recording", self.index);
        Ok(())
    }

    /// Hands the slot to the GPU, retired by `fence_value`.
    pub(crate) fn submit(&mut self, fence_value: u64) {
        self.allocator.record("execute");
        self.allocator.mark_submitted(fence_value);
        self.fence_value = fence_value;
        self.state = FrameState::InFlight;
        trace!("Frame slot {} in flight until fence {}", self.index, fence_value);
    }

    /// Drops the slot back to idle without submitting.
    pub(crate) fn abandon(&mut self) {
        self.state = FrameState::Idle;
    }

    /// Marks an in-flight slot retired.
    pub(crate) fn retire(&mut self) {
        if self.state == FrameState::InFlight {
            self.state = FrameState::Idle;
        }
    }

    pub(crate) fn ensure_recording(&self) -> RhiResult<()> {
        match self.state {
            FrameState::Recording => Ok(()),
            _ => Err(RhiError::FrameNotRecording(self.index)),
        }
    }

    pub(crate) fn allocator_mut(&mut self) -> &mut CommandAllocator {
        &mut self.allocator
    }

    pub(crate) fn pass_constants_mut(&mut self) -> &mut UploadBuffer<PassConstants> {
        &mut self.pass_constants
    }

    pub(crate) fn object_constants_mut(&mut self) -> &mut UploadBuffer<ObjectConstants> {
        &mut self.object_constants
    }

    pub(crate) fn material_constants_mut(&mut self) -> &mut UploadBuffer<MaterialConstants> {
        &mut self.material_constants
    }

    pub(crate) fn wave_vertices_mut(&mut self) -> Option<&mut UploadBuffer<Vertex>> {
        self.wave_vertices.as_mut()
    }

    /// Position of this slot in the ring.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Fence value that retires this slot, 0 if never submitted.
    #[inline]
    pub fn fence_value(&self) -> u64 {
        self.fence_value
    }

    #[inline]
    pub fn state(&self) -> FrameState {
        self.state
    }

    /// Whether the GPU is done with this slot given the fence's completed value.
    #[inline]
    pub fn is_retired(&self, completed_fence: u64) -> bool {
        completed_fence >= self.fence_value
    }

    #[inline]
    pub fn allocator(&self) -> &CommandAllocator {
        &self.allocator
    }

    #[inline]
    pub fn pass_constants(&self) -> &UploadBuffer<PassConstants> {
        &self.pass_constants
    }

    #[inline]
    pub fn object_constants(&self) -> &UploadBuffer<ObjectConstants> {
        &self.object_constants
    }

    #[inline]
    pub fn material_constants(&self) -> &UploadBuffer<MaterialConstants> {
        &self.material_constants
    }

    /// Dynamic wave vertex buffer, if the pipeline was configured with one.
    #[inline]
    pub fn wave_vertices(&self) -> Option<&UploadBuffer<Vertex>> {
        self.wave_vertices.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PipelineConfig {
        PipelineConfig {
            object_count: 4,
            material_count: 2,
            wave_vertex_count: 9,
            ..PipelineConfig::default()
        }
    }

    #[test]
    fn test_new_frame_is_idle_and_retired() {
        let frame = FrameResource::new(1, &config()).unwrap();
        assert_eq!(frame.index(), 1);
        assert_eq!(frame.state(), FrameState::Idle);
        assert_eq!(frame.fence_value(), 0);
        assert!(frame.is_retired(0));
        assert_eq!(frame.object_constants().len(), 4);
        assert_eq!(frame.object_constants().stride(), 256);
        assert_eq!(frame.material_constants().len(), 2);
        assert_eq!(frame.wave_vertices().map(|vb| vb.len()), Some(9));
    }

    #[test]
    fn test_no_wave_buffer_when_unconfigured() {
        let frame = FrameResource::new(0, &PipelineConfig::default()).unwrap();
        assert!(frame.wave_vertices().is_none());
    }

    #[test]
    fn test_lifecycle() {
        let mut frame = FrameResource::new(0, &config()).unwrap();
        assert_eq!(frame.ensure_recording(), Err(RhiError::FrameNotRecording(0)));

        frame.begin(0).unwrap();
        frame.ensure_recording().unwrap();

        frame.submit(7);
        assert_eq!(frame.state(), FrameState::InFlight);
        assert!(!frame.is_retired(6));
        assert!(frame.is_retired(7));
        assert!(matches!(frame.begin(6), Err(RhiError::InFlight(_))));

        frame.begin(7).unwrap();
        assert_eq!(frame.allocator().reset_count(), 2);
    }

    #[test]
    fn test_frame_resource_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<FrameResource>();
    }
}
