//! # Format Error Types
//!
//! All errors that can occur while decoding or encoding a `.vox` container.

use thiserror::Error;

/// Errors that can occur in the `.vox` codec.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VoxError {
    /// The buffer is not a `.vox` container (bad magic, missing `MAIN`).
    #[error("invalid VOX format: {0}")]
    InvalidFormat(String),

    /// The container declares a revision this codec does not read.
    #[error("unsupported VOX version: {0} (supported: {min}..={max})", min = crate::MIN_VERSION, max = crate::MAX_VERSION)]
    UnsupportedVersion(u32),

    /// The buffer ends before a declared length is satisfied.
    #[error("truncated data at offset {offset}: need {needed} bytes, {available} available")]
    Truncated {
        /// Offset where the read started.
        offset: usize,
        /// Bytes the declaration requires.
        needed: usize,
        /// Bytes left in the buffer.
        available: usize,
    },

    /// A chunk's declared lengths or contents are inconsistent.
    #[error("corrupt {chunk} chunk: {reason}")]
    CorruptChunk {
        /// Chunk id as text.
        chunk: String,
        /// What was wrong.
        reason: String,
    },

    /// A grid or palette violates a format limit on write.
    #[error("validation failed: {0}")]
    Validation(String),
}

impl VoxError {
    /// Builds a [`VoxError::CorruptChunk`] for the given chunk id.
    #[must_use]
    pub fn corrupt(id: [u8; 4], reason: impl Into<String>) -> Self {
        Self::CorruptChunk {
            chunk: String::from_utf8_lossy(&id).into_owned(),
            reason: reason.into(),
        }
    }
}

/// Result type for codec operations.
pub type VoxResult<T> = Result<T, VoxError>;
