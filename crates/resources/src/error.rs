//! Error types for resource bookkeeping.

use thiserror::Error;

/// Error type for resource operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// A material with this name is already registered.
    #[error("Material '{0}' already exists")]
    DuplicateMaterial(String),

    /// No material with this name is registered.
    #[error("Unknown material '{0}'")]
    UnknownMaterial(String),
}

/// Result type alias for resource operations.
pub type ResourceResult<T> = Result<T, ResourceError>;
