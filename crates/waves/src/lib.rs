//! Wave field simulation.
//!
//! A height field animated by an explicit finite-difference solver for the
//! damped 2D wave equation:
//! - [`WaveField`] - the grid, its two solution generations, normals and tangents
//! - [`RandomDisturber`] - periodic random impulses to keep the surface moving
//!
//! The stencil pass and the normal pass run row-parallel on rayon's pool.

mod config;
mod disturber;
mod error;
mod field;

pub use config::WaveConfig;
pub use disturber::{DisturberConfig, Disturbance, RandomDisturber};
pub use error::{WaveError, WaveResult};
pub use field::{StencilCoefficients, WaveField};
