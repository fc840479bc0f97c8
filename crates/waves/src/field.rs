//! The wave field and its finite-difference solver.
//!
//! Heights follow the damped wave equation
//! `∂²h/∂t² = c²∇²h − μ ∂h/∂t`, discretized with central differences in
//! space and time. Solving for the next height gives a five-point stencil:
//!
//! ```text
//! h'[i,j] = K1·hPrev[i,j] + K2·hCurr[i,j]
//!         + K3·(hCurr[i+1,j] + hCurr[i-1,j] + hCurr[i,j+1] + hCurr[i,j-1])
//! ```
//!
//! with `d = μ·dt + 2`, `e = (c·dt/dx)²`, `K1 = (μ·dt − 2)/d`,
//! `K2 = (4 − 8e)/d`, `K3 = 2e/d`.
//!
//! Only interior cells are stepped; the outer ring keeps its height, which acts
//! as a clamped boundary.
//!
//! # Example
//!
//! ```
//! use waveframe_waves::{WaveConfig, WaveField};
//!
//! # fn example() -> Result<(), waveframe_waves::WaveError> {
//! let mut waves = WaveField::new(WaveConfig {
//!     rows: 32,
//!     cols: 32,
//!     ..WaveConfig::default()
//! })?;
//! waves.disturb(16, 16, 0.5)?;
//! assert!(waves.update(0.05));
//! assert_eq!(waves.steps_taken(), 1);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

use glam::Vec3;
use rayon::prelude::*;
use tracing::{info, trace, warn};

use crate::config::WaveConfig;
use crate::error::{WaveError, WaveResult};

/// Precomputed stencil weights.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StencilCoefficients {
    /// Weight of the previous height at the cell.
    pub k1: f32,
    /// Weight of the current height at the cell.
    pub k2: f32,
    /// Weight of each of the four current neighbour heights.
    pub k3: f32,
}

impl StencilCoefficients {
    /// Derives the weights from the solver parameters.
    pub fn new(spatial_step: f32, time_step: f32, speed: f32, damping: f32) -> Self {
        let d = damping * time_step + 2.0;
        let e = (speed * speed) * (time_step * time_step) / (spatial_step * spatial_step);
        Self {
            k1: (damping * time_step - 2.0) / d,
            k2: (4.0 - 8.0 * e) / d,
            k3: (2.0 * e) / d,
        }
    }
}

/// A rows × cols height field.
///
/// Vertex `k = i * cols + j` sits at row `i` (z decreasing from
/// `depth/2`) and column `j` (x increasing from `-width/2`).
#[derive(Debug, Clone)]
pub struct WaveField {
    rows: usize,
    cols: usize,
    coefficients: StencilCoefficients,
    time_step: f32,
    spatial_step: f32,
    /// Two solution generations; `generations[current]` is the latest.
    generations: [Vec<Vec3>; 2],
    current: usize,
    normals: Vec<Vec3>,
    tangents: Vec<Vec3>,
    /// Time accumulated since the last step.
    accumulated: f32,
    steps: u64,
}

impl WaveField {
    /// Builds a flat field centred at the origin.
    ///
    /// # Errors
    ///
    /// Returns the error from [`WaveConfig::validate`] for degenerate or
    /// unstable parameters.
    pub fn new(config: WaveConfig) -> WaveResult<Self> {
        config.validate()?;

        let WaveConfig {
            rows,
            cols,
            spatial_step: dx,
            ..
        } = config;

        let half_width = (cols - 1) as f32 * dx * 0.5;
        let half_depth = (rows - 1) as f32 * dx * 0.5;
        let grid: Vec<Vec3> = (0..rows)
            .flat_map(|i| {
                let z = half_depth - i as f32 * dx;
                (0..cols).map(move |j| Vec3::new(-half_width + j as f32 * dx, 0.0, z))
            })
            .collect();

        let coefficients =
            StencilCoefficients::new(dx, config.time_step, config.speed, config.damping);
        info!(
            "Created {}x{} wave field (dx={}, dt={}, k1={:.4}, k2={:.4}, k3={:.4})",
            rows, cols, dx, config.time_step, coefficients.k1, coefficients.k2, coefficients.k3
        );

        Ok(Self {
            rows,
            cols,
            coefficients,
            time_step: config.time_step,
            spatial_step: dx,
            generations: [grid.clone(), grid],
            current: 0,
            normals: vec![Vec3::Y; rows * cols],
            tangents: vec![Vec3::X; rows * cols],
            accumulated: 0.0,
            steps: 0,
        })
    }

    /// Advances simulated time by `dt` seconds.
    ///
    /// Time accumulates until it reaches the fixed time step; then exactly one
    /// solver step runs and the accumulator restarts from zero. Returns whether
    /// a step ran. Negative or non-finite `dt` is ignored.
    pub fn update(&mut self, dt: f32) -> bool {
        if !dt.is_finite() || dt < 0.0 {
            warn!("Ignoring invalid wave time delta {}", dt);
            return false;
        }
        self.accumulated += dt;
        if self.accumulated < self.time_step {
            return false;
        }

        self.step_heights();
        self.current ^= 1;
        self.accumulated = 0.0;
        self.recompute_frame();
        self.steps += 1;
        trace!("Wave step {}", self.steps);
        true
    }

    /// One stencil pass: writes the next heights over the previous generation.
    fn step_heights(&mut self) {
        let rows = self.rows;
        let cols = self.cols;
        let StencilCoefficients { k1, k2, k3 } = self.coefficients;

        let [first, second] = &mut self.generations;
        let (prev, curr) = if self.current == 0 {
            (second, &*first)
        } else {
            (first, &*second)
        };

        // Each task owns one row of `prev`; `curr` is only read.
        prev.par_chunks_mut(cols)
            .enumerate()
            .filter(|(i, _)| *i > 0 && *i < rows - 1)
            .for_each(|(i, row)| {
                for j in 1..cols - 1 {
                    let k = i * cols + j;
                    row[j].y = k1 * row[j].y
                        + k2 * curr[k].y
                        + k3 * (curr[k + cols].y + curr[k - cols].y + curr[k + 1].y + curr[k - 1].y);
                }
            });
    }

    /// Recomputes interior normals and tangents from the latest heights.
    fn recompute_frame(&mut self) {
        let rows = self.rows;
        let cols = self.cols;
        let two_dx = 2.0 * self.spatial_step;
        let curr = &self.generations[self.current];

        self.normals
            .par_chunks_mut(cols)
            .zip(self.tangents.par_chunks_mut(cols))
            .enumerate()
            .filter(|(i, _)| *i > 0 && *i < rows - 1)
            .for_each(|(i, (normals, tangents))| {
                for j in 1..cols - 1 {
                    let k = i * cols + j;
                    let l = curr[k - 1].y;
                    let r = curr[k + 1].y;
                    let t = curr[k - cols].y;
                    let b = curr[k + cols].y;
                    normals[j] = Vec3::new(l - r, two_dx, b - t).normalize();
                    tangents[j] = Vec3::new(two_dx, r - l, 0.0).normalize();
                }
            });
    }

    /// Adds an impulse: `magnitude` at `(i, j)`, half of it at each of the four
    /// axis neighbours.
    ///
    /// # Errors
    ///
    /// Returns [`WaveError::OutOfBounds`] unless `1 < i < rows-2` and
    /// `1 < j < cols-2`; the field is left untouched.
    pub fn disturb(&mut self, i: usize, j: usize, magnitude: f32) -> WaveResult<()> {
        if !(i > 1 && i + 2 < self.rows && j > 1 && j + 2 < self.cols) {
            warn!(
                "Rejected disturbance at ({}, {}) on {}x{} grid",
                i, j, self.rows, self.cols
            );
            return Err(WaveError::OutOfBounds {
                row: i,
                col: j,
                rows: self.rows,
                cols: self.cols,
            });
        }

        let cols = self.cols;
        let half = 0.5 * magnitude;
        let curr = &mut self.generations[self.current];
        let k = i * cols + j;
        curr[k].y += magnitude;
        curr[k + 1].y += half;
        curr[k - 1].y += half;
        curr[k + cols].y += half;
        curr[k - cols].y += half;
        Ok(())
    }

    /// Latest position of vertex `k`.
    ///
    /// # Panics
    ///
    /// Panics if `k >= vertex_count()`.
    #[inline]
    pub fn position(&self, k: usize) -> Vec3 {
        self.generations[self.current][k]
    }

    /// Unit normal of vertex `k`.
    ///
    /// # Panics
    ///
    /// Panics if `k >= vertex_count()`.
    #[inline]
    pub fn normal(&self, k: usize) -> Vec3 {
        self.normals[k]
    }

    /// Unit tangent along +x of vertex `k`.
    ///
    /// # Panics
    ///
    /// Panics if `k >= vertex_count()`.
    #[inline]
    pub fn tangent_x(&self, k: usize) -> Vec3 {
        self.tangents[k]
    }

    /// Height at row `i`, column `j`, or `None` outside the grid.
    pub fn height(&self, i: usize, j: usize) -> Option<f32> {
        (i < self.rows && j < self.cols).then(|| self.generations[self.current][i * self.cols + j].y)
    }

    /// Height of the previous generation, or `None` outside the grid.
    pub fn previous_height(&self, i: usize, j: usize) -> Option<f32> {
        (i < self.rows && j < self.cols)
            .then(|| self.generations[self.current ^ 1][i * self.cols + j].y)
    }

    /// All latest positions, row-major.
    #[inline]
    pub fn positions(&self) -> &[Vec3] {
        &self.generations[self.current]
    }

    #[inline]
    pub fn normals(&self) -> &[Vec3] {
        &self.normals
    }

    #[inline]
    pub fn tangents(&self) -> &[Vec3] {
        &self.tangents
    }

    #[inline]
    pub fn row_count(&self) -> usize {
        self.rows
    }

    #[inline]
    pub fn column_count(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.rows * self.cols
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        (self.rows - 1) * (self.cols - 1) * 2
    }

    /// Extent along x.
    #[inline]
    pub fn width(&self) -> f32 {
        self.cols as f32 * self.spatial_step
    }

    /// Extent along z.
    #[inline]
    pub fn depth(&self) -> f32 {
        self.rows as f32 * self.spatial_step
    }

    #[inline]
    pub fn coefficients(&self) -> StencilCoefficients {
        self.coefficients
    }

    #[inline]
    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    #[inline]
    pub fn spatial_step(&self) -> f32 {
        self.spatial_step
    }

    /// Time accumulated towards the next step.
    #[inline]
    pub fn accumulated_time(&self) -> f32 {
        self.accumulated
    }

    /// Number of solver steps run so far.
    #[inline]
    pub fn steps_taken(&self) -> u64 {
        self.steps
    }

    /// Triangle list indices for the grid, two triangles per quad.
    pub fn indices(&self) -> Vec<u32> {
        let cols = self.cols as u32;
        let mut indices = Vec::with_capacity(self.triangle_count() * 3);
        for i in 0..self.rows as u32 - 1 {
            for j in 0..cols - 1 {
                let k = i * cols + j;
                indices.extend_from_slice(&[k, k + 1, k + cols, k + cols, k + 1, k + cols + 1]);
            }
        }
        indices
    }
}
