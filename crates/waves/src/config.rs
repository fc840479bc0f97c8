//! Wave field configuration.

use serde::{Deserialize, Serialize};

use crate::error::{WaveError, WaveResult};

/// Largest squared Courant number for which the explicit scheme stays stable.
pub(crate) const MAX_COURANT_SQUARED: f32 = 0.5;

/// Parameters of a wave field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaveConfig {
    /// Grid rows (along z).
    pub rows: usize,
    /// Grid columns (along x).
    pub cols: usize,
    /// Distance between neighbouring grid points.
    pub spatial_step: f32,
    /// Fixed solver time step in seconds.
    pub time_step: f32,
    /// Wave propagation speed.
    pub speed: f32,
    /// Damping coefficient.
    pub damping: f32,
}

impl Default for WaveConfig {
    fn default() -> Self {
        Self {
            rows: 128,
            cols: 128,
            spatial_step: 1.0,
            time_step: 0.03,
            speed: 4.0,
            damping: 0.2,
        }
    }
}

impl WaveConfig {
    /// Squared Courant number `(speed*dt/dx)^2`, the `e` of the stencil.
    pub fn courant_squared(&self) -> f32 {
        let c = self.speed * self.time_step / self.spatial_step;
        c * c
    }

    /// Checks that the configuration yields a usable, stable discretization.
    ///
    /// # Errors
    ///
    /// - [`WaveError::InvalidConfig`] for grids without interior cells,
    ///   non-positive or non-finite steps, negative speed or damping
    /// - [`WaveError::Unstable`] when the squared Courant number exceeds 1/2
    pub fn validate(&self) -> WaveResult<()> {
        if self.rows < 3 || self.cols < 3 {
            return Err(WaveError::InvalidConfig(format!(
                "grid {}x{} has no interior cells (need at least 3x3)",
                self.rows, self.cols
            )));
        }
        if self.rows.checked_mul(self.cols).is_none_or(|n| n > u32::MAX as usize) {
            return Err(WaveError::InvalidConfig(format!(
                "grid {}x{} has too many vertices to index",
                self.rows, self.cols
            )));
        }
        let positive = |name: &str, value: f32| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(WaveError::InvalidConfig(format!(
                    "{name} must be positive and finite, got {value}"
                )))
            }
        };
        positive("spatial_step", self.spatial_step)?;
        positive("time_step", self.time_step)?;
        for (name, value) in [("speed", self.speed), ("damping", self.damping)] {
            if !value.is_finite() || value < 0.0 {
                return Err(WaveError::InvalidConfig(format!(
                    "{name} must be non-negative and finite, got {value}"
                )));
            }
        }
        let courant = self.courant_squared();
        if courant > MAX_COURANT_SQUARED {
            return Err(WaveError::Unstable { courant });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        WaveConfig::default().validate().unwrap();
    }

    #[test]
    fn test_grid_without_interior_rejected() {
        let config = WaveConfig {
            rows: 2,
            ..WaveConfig::default()
        };
        assert!(matches!(config.validate(), Err(WaveError::InvalidConfig(_))));
    }

    #[test]
    fn test_non_positive_steps_rejected() {
        for config in [
            WaveConfig {
                spatial_step: 0.0,
                ..WaveConfig::default()
            },
            WaveConfig {
                time_step: -0.1,
                ..WaveConfig::default()
            },
            WaveConfig {
                time_step: f32::NAN,
                ..WaveConfig::default()
            },
            WaveConfig {
                damping: -1.0,
                ..WaveConfig::default()
            },
        ] {
            assert!(matches!(config.validate(), Err(WaveError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_unstable_courant_rejected() {
        // speed*dt/dx = 1, so e = 1
        let config = WaveConfig {
            spatial_step: 1.0,
            time_step: 0.25,
            speed: 4.0,
            ..WaveConfig::default()
        };
        assert_eq!(config.validate(), Err(WaveError::Unstable { courant: 1.0 }));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: WaveConfig = serde_json::from_str(r#"{ "rows": 16, "cols": 8 }"#).unwrap();
        assert_eq!(config.rows, 16);
        assert_eq!(config.cols, 8);
        assert_eq!(config.time_step, WaveConfig::default().time_step);
    }
}
