//! Core utilities for the waveframe workspace.
//!
//! This crate provides foundational types and utilities used across the workspace:
//! - Error types and result aliases
//! - Logging initialization
//! - Frame timer
//! - JSON configuration loading and saving

pub mod config;
mod error;
mod logging;
mod timer;

pub use error::{Error, Result};
pub use logging::init_logging;
pub use timer::Timer;
