//! # Conversion Pipelines
//!
//! Host-facing entry points.
//!
//! ```text
//! IMPORT   bytes ──decode──► Grid + Palette ──build──► BuiltMesh
//!                                                         │
//!                                        host.attach_metadata(metadata)
//!
//! EXPORT   host.read_metadata() ── Some ──► Grid + Palette ─┐
//!              │ None                                        ├─encode──► bytes
//!              ▼                                             │
//!          mesh ─► face colors ─► quantize ─► voxelize ──────┘
//! ```

use std::fs;
use std::path::Path;

use voxbridge_format::{Grid, Palette};
use voxbridge_geometry::mesh_builder::build_with;
use voxbridge_geometry::{quantize, BuiltMesh, MeshInput, MetadataHost, VoxelizerConfig};

use crate::config::{ExportConfig, ImportConfig};
use crate::error::BridgeResult;

/// Where an exported grid came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportSource {
    /// Rebuilt from round-trip metadata; geometry was not inspected.
    RoundTrip,
    /// Produced by voxelizing the mesh.
    Voxelized,
}

/// Grid and palette ready to encode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedExport {
    /// Model grid.
    pub grid: Grid,
    /// Model palette.
    pub palette: Palette,
    /// Path taken to produce them.
    pub source: ExportSource,
}

/// Decodes a `.vox` buffer.
///
/// # Errors
///
/// Any [`voxbridge_format::VoxError`].
pub fn decode(bytes: &[u8]) -> BridgeResult<(Grid, Palette)> {
    Ok(voxbridge_format::decode(bytes)?.into_parts())
}

/// Encodes a grid and palette.
///
/// # Errors
///
/// [`voxbridge_format::VoxError::Validation`] if the grid violates a format
/// limit.
pub fn encode(grid: &Grid, palette: &Palette) -> BridgeResult<Vec<u8>> {
    Ok(voxbridge_format::encode(grid, palette)?)
}

/// Voxelizes a mesh with precomputed per-face palette indices.
///
/// # Errors
///
/// Any [`voxbridge_geometry::GeometryError`].
pub fn voxelize(mesh: &MeshInput, face_indices: &[u8], config: &VoxelizerConfig) -> BridgeResult<Grid> {
    Ok(voxbridge_geometry::voxelize(mesh, face_indices, config)?)
}

/// Builds the cube mesh for a grid.
#[must_use]
pub fn build_mesh(grid: &Grid, palette: &Palette, scale: f32) -> BuiltMesh {
    voxbridge_geometry::build(grid, palette, scale)
}

/// Imports a `.vox` buffer: decodes it, builds the cube mesh and stores the
/// round-trip metadata on `host`.
///
/// # Errors
///
/// Decoding errors, or a metadata error from the host.
pub fn import_vox<H>(bytes: &[u8], host: &mut H, config: &ImportConfig) -> BridgeResult<BuiltMesh>
where
    H: MetadataHost + ?Sized,
{
    let (grid, palette) = decode(bytes)?;
    let mesh = build_with(&grid, &palette, &config.build_options());
    host.attach_metadata(&mesh.metadata)?;

    tracing::info!(
        "Imported VOX: {:?}, {} voxels, {} faces",
        grid.size(),
        grid.len(),
        mesh.faces.len()
    );
    Ok(mesh)
}

/// Produces the grid and palette an export would write.
///
/// With `preserve_roundtrip` set and metadata present on `host`, the grid is
/// rebuilt from the metadata and `mesh` is not inspected. Otherwise face
/// colors are sampled, quantized to 255 entries and the mesh is voxelized.
///
/// # Errors
///
/// Any [`voxbridge_geometry::GeometryError`] from quantization or
/// voxelization.
pub fn prepare_export<H>(mesh: &MeshInput, host: &H, config: &ExportConfig) -> BridgeResult<PreparedExport>
where
    H: MetadataHost + ?Sized,
{
    if config.preserve_roundtrip {
        if let Some(metadata) = host.read_metadata() {
            if metadata.cubes.is_empty() {
                tracing::warn!("Round-trip metadata has no cubes, voxelizing instead");
            } else {
                let (grid, palette) = metadata.to_grid();
                tracing::info!("Using preserved VOX data: {} voxels", grid.len());
                return Ok(PreparedExport {
                    grid,
                    palette,
                    source: ExportSource::RoundTrip,
                });
            }
        }
    }

    let samples = mesh.face_colors(&config.color_sampling());
    let quantized = quantize(&samples, Some(config.fallback_color))?;
    let face_indices = quantized.indices(&samples)?;
    let grid = voxelize(mesh, &face_indices, &config.voxelizer_config())?;

    Ok(PreparedExport {
        grid,
        palette: quantized.into_palette(),
        source: ExportSource::Voxelized,
    })
}

/// Exports a host mesh to `.vox` bytes.
///
/// # Errors
///
/// Any [`prepare_export`] error, or a validation error from encoding.
pub fn export_mesh<H>(mesh: &MeshInput, host: &H, config: &ExportConfig) -> BridgeResult<Vec<u8>>
where
    H: MetadataHost + ?Sized,
{
    let prepared = prepare_export(mesh, host, config)?;
    let bytes = encode(&prepared.grid, &prepared.palette)?;
    tracing::info!(
        "Exported {} voxels ({:?}), model size {:?}, {} bytes",
        prepared.grid.len(),
        prepared.source,
        prepared.grid.size(),
        bytes.len()
    );
    Ok(bytes)
}

/// Reads a `.vox` file and imports it.
///
/// # Errors
///
/// I/O errors, or any [`import_vox`] error.
pub fn import_file<P, H>(path: P, host: &mut H, config: &ImportConfig) -> BridgeResult<BuiltMesh>
where
    P: AsRef<Path>,
    H: MetadataHost + ?Sized,
{
    let bytes = fs::read(path)?;
    import_vox(&bytes, host, config)
}

/// Exports a host mesh and writes the `.vox` file.
///
/// # Errors
///
/// I/O errors, or any [`export_mesh`] error.
pub fn export_file<P, H>(path: P, mesh: &MeshInput, host: &H, config: &ExportConfig) -> BridgeResult<()>
where
    P: AsRef<Path>,
    H: MetadataHost + ?Sized,
{
    let bytes = export_mesh(mesh, host, config)?;
    fs::write(path, bytes)?;
    Ok(())
}
