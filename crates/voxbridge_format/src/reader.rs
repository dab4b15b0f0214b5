//! # Container Reader
//!
//! Decodes a `.vox` byte buffer into a [`Grid`] and its [`Palette`].
//!
//! ```text
//! VOX File Structure:
//! ├── "VOX " (4 bytes) - Magic number
//! ├── Version (4 bytes) - File version (150)
//! └── MAIN Chunk
//!     ├── SIZE Chunk - Model dimensions
//!     ├── XYZI Chunk - Voxel data
//!     ├── RGBA Chunk - Palette (optional)
//!     └── ...        - Scene graph, materials (skipped by length)
//! ```

use std::fs;
use std::path::Path;

use crate::chunk::{iter_chunks, read_chunk, ByteReader, Chunk, MAIN_ID, SIZE_ID, XYZI_ID};
use crate::error::{VoxError, VoxResult};
use crate::model::{Grid, Voxel, VoxelRecord, MAX_DIMENSION};
use crate::palette::Palette;
use crate::{MAX_VERSION, MIN_VERSION, VOX_MAGIC, VOX_VERSION};

/// Decoded container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoxFile {
    /// Version declared in the header.
    pub version: u32,
    /// Model grid.
    pub grid: Grid,
    /// Color palette (built-in default when the file has no `RGBA` chunk).
    pub palette: Palette,
}

impl VoxFile {
    /// Splits into grid and palette.
    #[must_use]
    pub fn into_parts(self) -> (Grid, Palette) {
        (self.grid, self.palette)
    }
}

/// Decodes a `.vox` buffer.
///
/// # Errors
///
/// - [`VoxError::InvalidFormat`] on a bad magic number or a missing `MAIN` chunk
/// - [`VoxError::UnsupportedVersion`] outside the readable version range
/// - [`VoxError::Truncated`] when the buffer ends inside a declared chunk
/// - [`VoxError::CorruptChunk`] on inconsistent lengths, a `SIZE` outside
///   1..=256, or out-of-bounds voxels
pub fn decode(bytes: &[u8]) -> VoxResult<VoxFile> {
    let mut header = ByteReader::at(bytes, 0);
    let magic = header
        .read_id()
        .map_err(|_| VoxError::InvalidFormat(format!("{} bytes is too short for a header", bytes.len())))?;
    if magic != VOX_MAGIC {
        return Err(VoxError::InvalidFormat(format!(
            "expected 'VOX ', got '{}'",
            String::from_utf8_lossy(&magic)
        )));
    }

    let version = header
        .read_u32()
        .map_err(|_| VoxError::InvalidFormat("missing version field".to_string()))?;
    if !(MIN_VERSION..=MAX_VERSION).contains(&version) {
        return Err(VoxError::UnsupportedVersion(version));
    }
    if version != VOX_VERSION {
        tracing::warn!("VOX version {} (expected {}), reading anyway", version, VOX_VERSION);
    }

    let main = read_chunk(bytes, header.position())?;
    let Chunk::Main(children) = Chunk::parse(&main)? else {
        return Err(VoxError::InvalidFormat(format!(
            "expected MAIN chunk, found '{}'",
            main.id_str()
        )));
    };
    if main.next_offset < bytes.len() {
        tracing::warn!(
            "Ignoring {} trailing bytes after MAIN chunk",
            bytes.len() - main.next_offset
        );
    }

    let mut size: Option<[u32; 3]> = None;
    let mut records: Option<&[VoxelRecord]> = None;
    let mut palette: Option<Palette> = None;

    for raw in iter_chunks(children) {
        let raw = raw.map_err(|e| match e {
            VoxError::Truncated { offset, needed, available } => VoxError::corrupt(
                MAIN_ID,
                format!(
                    "child at offset {offset} overruns the children region (needs {needed} bytes, {available} left)"
                ),
            ),
            other => other,
        })?;

        match Chunk::parse(&raw)? {
            Chunk::Size(dims) => {
                if size.is_some() {
                    tracing::warn!("Skipping additional model SIZE {:?} (only the first model is read)", dims);
                } else {
                    size = Some(dims);
                }
            }
            Chunk::VoxelList(list) => {
                if records.is_some() {
                    tracing::warn!("Skipping additional model XYZI with {} voxels", list.len());
                } else {
                    records = Some(list);
                }
            }
            Chunk::Palette(custom) => {
                palette = Some(*custom);
            }
            Chunk::Main(_) => {
                tracing::warn!("Skipping nested MAIN chunk ({} bytes)", raw.total_len());
            }
            Chunk::Opaque { id, skipped } => {
                tracing::debug!(
                    "Skipping chunk '{}' ({} bytes)",
                    String::from_utf8_lossy(&id),
                    skipped
                );
            }
        }
    }

    let records = records.unwrap_or(&[]);
    let grid = build_grid(size, records)?;
    let palette = palette.unwrap_or_default();

    tracing::debug!(
        "Decoded VOX: {:?}, {} voxels, custom palette: {}",
        grid.size(),
        grid.len(),
        !palette.is_default()
    );

    Ok(VoxFile { version, grid, palette })
}

/// Reads and decodes a `.vox` file.
///
/// # Errors
///
/// Returns [`VoxFileError::Io`] if the file cannot be read, otherwise any
/// [`decode`] error.
pub fn decode_file<P: AsRef<Path>>(path: P) -> Result<VoxFile, VoxFileError> {
    let bytes = fs::read(path)?;
    Ok(decode(&bytes)?)
}

/// Error from the file helpers: I/O or codec.
#[derive(thiserror::Error, Debug)]
pub enum VoxFileError {
    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// Codec error.
    #[error(transparent)]
    Vox(#[from] VoxError),
}

fn build_grid(size: Option<[u32; 3]>, records: &[VoxelRecord]) -> VoxResult<Grid> {
    let Some([x, y, z]) = size else {
        let mut grid = Grid::new(0, 0, 0);
        grid_from_records(&mut grid, records, false)?;
        if !grid.is_empty() {
            let inferred = grid.tight_size();
            tracing::warn!("XYZI without SIZE, inferring dimensions {:?}", inferred);
            grid.set_size(inferred);
        }
        return Ok(grid);
    };

    for (dim, axis) in [x, y, z].into_iter().zip(["x", "y", "z"]) {
        if !(1..=MAX_DIMENSION).contains(&dim) {
            return Err(VoxError::corrupt(
                SIZE_ID,
                format!("dimension {axis} = {dim} is outside 1..={MAX_DIMENSION}"),
            ));
        }
    }
    let mut grid = Grid::new(x, y, z);
    grid_from_records(&mut grid, records, true)?;
    Ok(grid)
}

fn grid_from_records(grid: &mut Grid, records: &[VoxelRecord], bounded: bool) -> VoxResult<()> {
    for &record in records {
        let voxel = Voxel::from(record);
        if voxel.color_index == 0 {
            return Err(VoxError::corrupt(
                XYZI_ID,
                format!("voxel at {:?} uses reserved palette index 0", voxel.coord()),
            ));
        }
        if bounded && !grid.contains(voxel.coord()) {
            return Err(VoxError::corrupt(
                XYZI_ID,
                format!(
                    "voxel at {:?} lies outside dimensions {:?}",
                    voxel.coord(),
                    grid.size()
                ),
            ));
        }
        if !grid.insert(voxel) {
            return Err(VoxError::corrupt(
                XYZI_ID,
                format!("duplicate voxel at {:?}", voxel.coord()),
            ));
        }
    }
    Ok(())
}
