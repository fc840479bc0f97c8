//! Device-facing abstractions (Render Hardware Interface) for the frame pipeline.
//!
//! The pipeline never talks to a graphics API directly. It consumes:
//! - Fences ([`sync::GpuFence`]) to learn when the GPU has finished a frame
//! - Command allocators owned exclusively by one frame slot
//! - CPU-visible upload buffers holding typed constant and vertex data
//!
//! A host-side fence ([`sync::HostFence`]) is provided so the pipeline can be
//! driven by a simulated GPU timeline (tests, headless runs).

mod error;

pub mod buffer;
pub mod command;
pub mod sync;
pub mod vertex;

pub use error::{RhiError, RhiResult};
