//! Frame pipeline configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use waveframe_rhi::{RhiError, RhiResult};

use crate::DEFAULT_FRAMES_IN_FLIGHT;

/// Sizes and limits of a [`FramePipeline`](crate::FramePipeline).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of frame slots (N).
    pub frames_in_flight: usize,
    /// Pass constant blocks per slot.
    pub pass_count: usize,
    /// Object constant blocks per slot.
    pub object_count: usize,
    /// Material constant blocks per slot.
    pub material_count: usize,
    /// Dynamic wave vertices per slot; 0 disables the wave buffer.
    pub wave_vertex_count: usize,
    /// Upper bound on a single fence wait.
    pub fence_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            frames_in_flight: DEFAULT_FRAMES_IN_FLIGHT,
            pass_count: 1,
            object_count: 16,
            material_count: 8,
            wave_vertex_count: 0,
            fence_timeout_ms: 5_000,
        }
    }
}

impl PipelineConfig {
    #[inline]
    pub fn fence_timeout(&self) -> Duration {
        Duration::from_millis(self.fence_timeout_ms)
    }

    /// # Errors
    ///
    /// Returns [`RhiError::InvalidConfig`] when there are no frame slots, no
    /// pass block, or the fence timeout is zero.
    pub fn validate(&self) -> RhiResult<()> {
        if self.frames_in_flight == 0 {
            return Err(RhiError::InvalidConfig(
                "frames_in_flight must be at least 1".into(),
            ));
        }
        if self.pass_count == 0 {
            return Err(RhiError::InvalidConfig(
                "at least one pass constant block is required".into(),
            ));
        }
        if self.fence_timeout_ms == 0 {
            return Err(RhiError::InvalidConfig(
                "fence_timeout_ms must be positive".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_triple_buffered() {
        let config = PipelineConfig::default();
        assert_eq!(config.frames_in_flight, 3);
        config.validate().unwrap();
    }

    #[test]
    fn test_slot_count_bounds() {
        let config = PipelineConfig {
            frames_in_flight: 0,
            ..PipelineConfig::default()
        };
        assert!(matches!(config.validate(), Err(RhiError::InvalidConfig(_))));

        for frames_in_flight in [1, 6, 8] {
            let config = PipelineConfig {
                frames_in_flight,
                ..PipelineConfig::default()
            };
            config.validate().unwrap();
        }
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let config = PipelineConfig {
            fence_timeout_ms: 0,
            ..PipelineConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_json_overrides() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{ "frames_in_flight": 2, "wave_vertex_count": 64 }"#).unwrap();
        assert_eq!(config.frames_in_flight, 2);
        assert_eq!(config.wave_vertex_count, 64);
        assert_eq!(config.object_count, 16);
        assert_eq!(config.fence_timeout(), Duration::from_secs(5));
    }
}
