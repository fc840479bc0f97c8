//! Periodic random disturbances.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{WaveError, WaveResult};
use crate::field::WaveField;

/// How often and how hard the surface is poked.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisturberConfig {
    /// Seconds between disturbances.
    pub interval: f32,
    pub min_magnitude: f32,
    pub max_magnitude: f32,
    /// Rows and columns kept clear along each edge.
    pub margin: usize,
    /// RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for DisturberConfig {
    fn default() -> Self {
        Self {
            interval: 0.25,
            min_magnitude: 0.2,
            max_magnitude: 0.5,
            margin: 4,
            seed: None,
        }
    }
}

/// One applied disturbance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Disturbance {
    pub row: usize,
    pub col: usize,
    pub magnitude: f32,
}

/// Disturbs a [`WaveField`] at a random interior cell every `interval` seconds.
#[derive(Debug)]
pub struct RandomDisturber {
    config: DisturberConfig,
    rng: StdRng,
    elapsed: f32,
}

impl RandomDisturber {
    /// # Errors
    ///
    /// Returns [`WaveError::InvalidConfig`] for a non-positive interval or an
    /// empty or negative magnitude range.
    pub fn new(config: DisturberConfig) -> WaveResult<Self> {
        if !config.interval.is_finite() || config.interval <= 0.0 {
            return Err(WaveError::InvalidConfig(format!(
                "disturbance interval must be positive, got {}",
                config.interval
            )));
        }
        if !(config.min_magnitude.is_finite()
            && config.max_magnitude.is_finite()
            && config.min_magnitude <= config.max_magnitude)
        {
            return Err(WaveError::InvalidConfig(format!(
                "disturbance magnitude range {}..{} is empty",
                config.min_magnitude, config.max_magnitude
            )));
        }

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            config,
            rng,
            elapsed: 0.0,
        })
    }

    pub fn config(&self) -> &DisturberConfig {
        &self.config
    }

    /// Accumulates `dt` and disturbs `field` once the interval has passed.
    ///
    /// Returns `Ok(None)` while waiting, or when the grid is too small to leave
    /// any cell clear of the margin.
    pub fn tick(&mut self, field: &mut WaveField, dt: f32) -> WaveResult<Option<Disturbance>> {
        if !dt.is_finite() || dt < 0.0 {
            return Ok(None);
        }
        self.elapsed += dt;
        if self.elapsed < self.config.interval {
            return Ok(None);
        }
        self.elapsed = 0.0;

        let Some((rows, cols)) = self.ranges(field) else {
            debug!(
                "Grid {}x{} too small for margin {}, skipping disturbance",
                field.row_count(),
                field.column_count(),
                self.config.margin
            );
            return Ok(None);
        };

        let row = self.rng.gen_range(rows);
        let col = self.rng.gen_range(cols);
        let magnitude = if self.config.min_magnitude < self.config.max_magnitude {
            self.rng
                .gen_range(self.config.min_magnitude..self.config.max_magnitude)
        } else {
            self.config.min_magnitude
        };
        field.disturb(row, col, magnitude)?;
        debug!("Disturbed wave field at ({}, {}) by {:.3}", row, col, magnitude);
        Ok(Some(Disturbance {
            row,
            col,
            magnitude,
        }))
    }

    /// Inclusive row and column ranges that respect both the margin and the
    /// field's disturbable interior.
    fn ranges(
        &self,
        field: &WaveField,
    ) -> Option<(
        std::ops::RangeInclusive<usize>,
        std::ops::RangeInclusive<usize>,
    )> {
        let axis = |n: usize| {
            let lo = self.config.margin.max(2);
            let hi = n.checked_sub(1 + self.config.margin)?.min(n.checked_sub(3)?);
            (lo <= hi).then_some(lo..=hi)
        };
        Some((axis(field.row_count())?, axis(field.column_count())?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WaveConfig;

    fn field(rows: usize, cols: usize) -> WaveField {
        WaveField::new(WaveConfig {
            rows,
            cols,
            ..WaveConfig::default()
        })
        .unwrap()
    }

    fn seeded() -> DisturberConfig {
        DisturberConfig {
            seed: Some(7),
            ..DisturberConfig::default()
        }
    }

    #[test]
    fn test_waits_for_interval() {
        let mut waves = field(32, 32);
        let mut disturber = RandomDisturber::new(seeded()).unwrap();
        assert_eq!(disturber.tick(&mut waves, 0.1).unwrap(), None);
        assert_eq!(disturber.tick(&mut waves, 0.1).unwrap(), None);
        let hit = disturber.tick(&mut waves, 0.1).unwrap().unwrap();
        assert!((4..=27).contains(&hit.row));
        assert!((4..=27).contains(&hit.col));
        assert!((0.2..0.5).contains(&hit.magnitude));
        assert_eq!(waves.height(hit.row, hit.col), Some(hit.magnitude));
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = RandomDisturber::new(seeded()).unwrap();
        let mut b = RandomDisturber::new(seeded()).unwrap();
        let (mut wa, mut wb) = (field(32, 32), field(32, 32));
        for _ in 0..10 {
            assert_eq!(
                a.tick(&mut wa, 0.25).unwrap(),
                b.tick(&mut wb, 0.25).unwrap()
            );
        }
    }

    #[test]
    fn test_small_grid_skipped() {
        let mut waves = field(8, 8);
        let mut disturber = RandomDisturber::new(seeded()).unwrap();
        assert_eq!(disturber.tick(&mut waves, 1.0).unwrap(), None);
        assert!(waves.positions().iter().all(|p| p.y == 0.0));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let bad_interval = DisturberConfig {
            interval: 0.0,
            ..DisturberConfig::default()
        };
        assert!(RandomDisturber::new(bad_interval).is_err());

        let bad_range = DisturberConfig {
            min_magnitude: 1.0,
            max_magnitude: 0.5,
            ..DisturberConfig::default()
        };
        assert!(RandomDisturber::new(bad_range).is_err());
    }
}
