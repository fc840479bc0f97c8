//! Frame resource pipeline.
//!
//! This crate rotates N independent sets of per-frame resources so the CPU can
//! prepare frame N+1 while the GPU still reads frame N:
//! - [`FrameResource`] - one slot: command allocator, fence watermark, upload buffers
//! - [`FramePipeline`] - slot rotation, fence throttling and dirty-tracked uploads
//! - [`PipelineConfig`] - slot count, buffer sizes and the fence wait bound

mod config;
pub mod frame;
pub mod frame_manager;

pub use config::PipelineConfig;
pub use frame::{FrameResource, FrameState};
pub use frame_manager::FramePipeline;

/// Frames in flight used when the configuration does not say otherwise.
pub const DEFAULT_FRAMES_IN_FLIGHT: usize = 3;
