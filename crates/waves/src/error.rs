//! Wave simulation error types.

use thiserror::Error;

/// Error type for wave field construction and disturbance.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WaveError {
    /// Degenerate parameters (grid too small, non-positive steps, NaN).
    #[error("Invalid wave configuration: {0}")]
    InvalidConfig(String),

    /// Parameters violate the stability bound of the explicit scheme.
    #[error("Unstable discretization: (speed*dt/dx)^2 = {courant} exceeds 0.5")]
    Unstable {
        /// The squared Courant number `(speed*dt/dx)^2`.
        courant: f32,
    },

    /// Disturbance too close to the edge of the grid.
    #[error("Disturbance at ({row}, {col}) outside interior of {rows}x{cols} grid")]
    OutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

/// Result type alias for wave operations.
pub type WaveResult<T> = Result<T, WaveError>;
