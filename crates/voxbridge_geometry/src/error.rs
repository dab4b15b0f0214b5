//! # Geometry Error Types

use thiserror::Error;

/// Errors raised while converting between meshes and voxel grids.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    /// A parameter or derived quantity is outside its allowed range.
    #[error("validation failed: {0}")]
    Validation(String),

    /// There is nothing to work on (mesh without triangles, no color samples).
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// Round-trip metadata could not be serialized or parsed.
    #[error("invalid round-trip metadata: {0}")]
    Metadata(String),
}

/// Result type for geometry operations.
pub type GeometryResult<T> = Result<T, GeometryError>;
