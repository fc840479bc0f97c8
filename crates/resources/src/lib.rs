//! Scene-side data that the frame pipeline uploads.
//!
//! This crate holds the CPU copies of per-object, per-material and per-pass
//! constants together with their dirty counters:
//! - Constant block layouts shared with shaders
//! - Render items and materials
//! - Pass (camera / lighting) state

mod error;

pub mod dirty;
pub mod material;
pub mod pass;
pub mod render_item;
pub mod ubo;

pub use dirty::DirtyCounter;
pub use error::{ResourceError, ResourceResult};
pub use material::{Material, MaterialLibrary};
pub use pass::PassState;
pub use render_item::{DrawArgs, RenderItem};
pub use ubo::{Light, MAX_LIGHTS, MaterialConstants, ObjectConstants, PassConstants};
