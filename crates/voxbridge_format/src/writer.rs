//! # Container Writer
//!
//! Encodes a [`Grid`] and [`Palette`] into a `.vox` buffer.
//!
//! Output layout (version 150):
//!
//! ```text
//! "VOX " | 150 | MAIN { SIZE, XYZI, [RGBA] }
//! ```
//!
//! The `RGBA` chunk is written only when the palette differs from the
//! built-in default, so decoding then encoding a file without one yields the
//! same bytes.

use std::fs;
use std::path::Path;

use crate::chunk::{append_chunk, write_chunk, MAIN_ID, RGBA_ID, SIZE_CHUNK_LEN, SIZE_ID, XYZI_ID};
use crate::error::{VoxError, VoxResult};
use crate::model::{Grid, VoxelRecord, MAX_DIMENSION};
use crate::palette::Palette;
use crate::reader::VoxFileError;
use crate::{VOX_MAGIC, VOX_VERSION};

/// Checks a grid against the format limits.
///
/// # Errors
///
/// Returns [`VoxError::Validation`] naming the first violated limit.
pub fn validate(grid: &Grid) -> VoxResult<()> {
    for (axis, &dim) in ["x", "y", "z"].iter().zip(grid.size().iter()) {
        if dim == 0 || dim > MAX_DIMENSION {
            return Err(VoxError::Validation(format!(
                "grid dimension {axis} = {dim} is outside 1..={MAX_DIMENSION}"
            )));
        }
    }

    if u32::try_from(grid.len()).is_err() {
        return Err(VoxError::Validation(format!(
            "{} voxels exceed the 4-byte voxel count",
            grid.len()
        )));
    }

    for voxel in grid.voxels() {
        if voxel.color_index == 0 {
            return Err(VoxError::Validation(format!(
                "voxel at {:?} uses reserved palette index 0",
                voxel.coord()
            )));
        }
        if !grid.contains(voxel.coord()) {
            return Err(VoxError::Validation(format!(
                "voxel at {:?} lies outside grid dimensions {:?}",
                voxel.coord(),
                grid.size()
            )));
        }
    }
    Ok(())
}

/// Encodes a grid and palette.
///
/// # Errors
///
/// Returns [`VoxError::Validation`] if the grid violates a format limit.
pub fn encode(grid: &Grid, palette: &Palette) -> VoxResult<Vec<u8>> {
    validate(grid)?;

    let mut size_content = Vec::with_capacity(SIZE_CHUNK_LEN);
    for dim in grid.size() {
        size_content.extend_from_slice(&dim.to_le_bytes());
    }

    let records: Vec<VoxelRecord> = grid.voxels().iter().map(|&v| VoxelRecord::from(v)).collect();
    let count = u32::try_from(records.len())
        .map_err(|_| VoxError::Validation("voxel count overflow".to_string()))?;
    let mut xyzi_content = Vec::with_capacity(4 + records.len() * 4);
    xyzi_content.extend_from_slice(&count.to_le_bytes());
    xyzi_content.extend_from_slice(bytemuck::cast_slice(&records));

    let mut children = Vec::new();
    append_chunk(&mut children, SIZE_ID, &size_content, &[])?;
    append_chunk(&mut children, XYZI_ID, &xyzi_content, &[])?;
    if !palette.is_default() {
        append_chunk(&mut children, RGBA_ID, &palette.to_rgba_chunk(), &[])?;
    }

    let main = write_chunk(MAIN_ID, &[], &children)?;

    let mut out = Vec::with_capacity(8 + main.len());
    out.extend_from_slice(&VOX_MAGIC);
    out.extend_from_slice(&VOX_VERSION.to_le_bytes());
    out.extend_from_slice(&main);

    tracing::debug!(
        "Encoded VOX: {:?}, {} voxels, {} bytes",
        grid.size(),
        grid.len(),
        out.len()
    );
    Ok(out)
}

/// Encodes and writes a `.vox` file.
///
/// # Errors
///
/// Returns [`VoxFileError::Vox`] on validation failure and
/// [`VoxFileError::Io`] if the file cannot be written.
pub fn encode_to_file<P: AsRef<Path>>(path: P, grid: &Grid, palette: &Palette) -> Result<(), VoxFileError> {
    let bytes = encode(grid, palette)?;
    fs::write(path, bytes)?;
    Ok(())
}
