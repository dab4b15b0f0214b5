//! # Bridge Error Types
//!
//! Umbrella error for the host-facing pipelines.

use thiserror::Error;
use voxbridge_format::{VoxError, VoxFileError};
use voxbridge_geometry::GeometryError;

/// Errors from loading or validating a [`crate::ConvertConfig`].
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML text could not be parsed.
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be written as TOML.
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is outside its allowed range.
    #[error("invalid value: {0}")]
    Invalid(String),
}

/// Errors that can occur in an import or export.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Container codec error.
    #[error(transparent)]
    Vox(#[from] VoxError),

    /// Voxelization, quantization or metadata error.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<VoxFileError> for BridgeError {
    fn from(err: VoxFileError) -> Self {
        match err {
            VoxFileError::Io(e) => Self::Io(e),
            VoxFileError::Vox(e) => Self::Vox(e),
        }
    }
}

/// Result type for pipeline operations.
pub type BridgeResult<T> = Result<T, BridgeError>;
