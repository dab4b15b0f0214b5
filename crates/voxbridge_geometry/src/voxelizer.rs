//! # Voxelizer
//!
//! Converts a triangle mesh into a voxel [`Grid`] by ray-cast parity voting.
//!
//! ## Algorithm
//!
//! ```text
//! bounds ──► cell dims = max(1, ceil(extent / voxel_size))
//!   │
//!   ▼  (parallel, one task per cell)
//! cell center ──► cast N seeded rays (BVH) ──► odd crossings = "inside" vote
//!   │                                    strict majority = solid
//!   ▼                                    nearest hit triangle = color
//! optional interior fill (flood from boundary, enclosed cells → solid)
//!   │
//!   ▼
//! Grid, voxels in x → y → z order
//! ```
//!
//! Classification is parallel but collected through an indexed iterator, so
//! the output grid is identical across runs and thread counts.

use rayon::prelude::*;
use voxbridge_format::{Grid, Voxel, MAX_DIMENSION};

use crate::bvh::Bvh;
use crate::error::{GeometryError, GeometryResult};
use crate::fill::{fill_interior, CellLayout};
use crate::math::{Aabb, Vec3};
use crate::mesh::MeshInput;
use crate::raycast::{ray_directions, PreparedTriangle, Ray};

/// Relative slack so an extent that is an exact multiple of the voxel size
/// does not gain an extra cell from float error.
const DIMENSION_EPSILON: f64 = 1e-6;

/// Default seed for the ray direction set.
pub const DEFAULT_RAY_SEED: u64 = 0x5658_4252_4944_4745;

/// Voxelization parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoxelizerConfig {
    /// Edge length of one voxel in mesh units.
    pub voxel_size: f32,
    /// Largest allowed grid dimension on any axis (1..=256).
    pub max_dimension: u32,
    /// Rays cast per cell.
    pub ray_samples: u32,
    /// Fill enclosed empty space.
    pub fill_interior: bool,
    /// Seed for the ray direction set.
    pub ray_seed: u64,
}

impl Default for VoxelizerConfig {
    fn default() -> Self {
        Self {
            voxel_size: 0.1,
            max_dimension: 126,
            ray_samples: 3,
            fill_interior: false,
            ray_seed: DEFAULT_RAY_SEED,
        }
    }
}

impl VoxelizerConfig {
    /// Checks every parameter range.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Validation`] naming the offending parameter.
    pub fn validate(&self) -> GeometryResult<()> {
        if !(self.voxel_size.is_finite() && self.voxel_size > 0.0) {
            return Err(GeometryError::Validation(format!(
                "voxel size must be finite and > 0, got {}",
                self.voxel_size
            )));
        }
        if self.ray_samples < 1 {
            return Err(GeometryError::Validation("ray samples must be at least 1".to_string()));
        }
        if !(1..=MAX_DIMENSION).contains(&self.max_dimension) {
            return Err(GeometryError::Validation(format!(
                "max dimension {} is outside 1..={MAX_DIMENSION}",
                self.max_dimension
            )));
        }
        Ok(())
    }
}

/// Mesh-to-grid converter with a fixed ray direction set.
#[derive(Debug, Clone)]
pub struct Voxelizer {
    config: VoxelizerConfig,
    directions: Vec<Vec3>,
}

impl Voxelizer {
    /// Validates `config` and derives the ray directions.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Validation`] for an invalid config.
    pub fn new(config: VoxelizerConfig) -> GeometryResult<Self> {
        config.validate()?;
        let directions = ray_directions(config.ray_samples, config.ray_seed);
        Ok(Self { config, directions })
    }

    /// Active configuration.
    #[must_use]
    pub const fn config(&self) -> &VoxelizerConfig {
        &self.config
    }

    /// Grid dimensions needed to cover `bounds`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Validation`] when a dimension exceeds the
    /// configured maximum or the bounds are not finite.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn dimensions(&self, bounds: &Aabb) -> GeometryResult<[u32; 3]> {
        let extent = bounds.extent();
        if !(bounds.min.is_finite() && extent.is_finite()) {
            return Err(GeometryError::Validation("mesh bounds are not finite".to_string()));
        }
        let size = f64::from(self.config.voxel_size);
        let mut dims = [0u32; 3];
        for ((dim, e), axis) in dims.iter_mut().zip(extent.to_array()).zip(["x", "y", "z"]) {
            let cells = (f64::from(e) / size - DIMENSION_EPSILON).ceil().max(1.0);
            if cells > f64::from(self.config.max_dimension) {
                return Err(GeometryError::Validation(format!(
                    "grid dimension {axis} needs {cells} cells at voxel size {}, max is {}",
                    self.config.voxel_size, self.config.max_dimension
                )));
            }
            *dim = cells as u32;
        }
        Ok(dims)
    }

    /// Voxelizes `mesh`. `face_indices[i]` is the palette index of triangle `i`.
    ///
    /// # Errors
    ///
    /// - [`GeometryError::EmptyInput`] for a mesh without triangles
    /// - [`GeometryError::Validation`] for a face index list of the wrong
    ///   length, a face index of 0, or a grid that would be too large
    #[allow(clippy::cast_possible_truncation)]
    pub fn voxelize(&self, mesh: &MeshInput, face_indices: &[u8]) -> GeometryResult<Grid> {
        let bounds = mesh
            .bounds()
            .ok_or_else(|| GeometryError::EmptyInput("mesh has no triangles".to_string()))?;
        if face_indices.len() != mesh.len() {
            return Err(GeometryError::Validation(format!(
                "{} face indices for {} triangles",
                face_indices.len(),
                mesh.len()
            )));
        }
        if let Some(face) = face_indices.iter().position(|&i| i == 0) {
            return Err(GeometryError::Validation(format!(
                "triangle {face} uses reserved palette index 0"
            )));
        }

        let dims = self.dimensions(&bounds)?;
        let layout = CellLayout::new(dims.map(|d| d as usize));
        let triangles = Bvh::new(mesh.triangles().iter().map(PreparedTriangle::from).collect());

        tracing::debug!(
            "Voxelizing {} triangles into {:?} cells ({} rays per cell)",
            triangles.len(),
            dims,
            self.directions.len()
        );

        let mut cells: Vec<Option<u8>> = (0..layout.len())
            .into_par_iter()
            .map(|i| {
                let center = self.cell_center(&bounds, layout.coord(i));
                self.classify(center, &triangles).map(|tri| face_indices[tri])
            })
            .collect();

        if self.config.fill_interior {
            let filled = fill_interior(layout, &mut cells);
            tracing::debug!("Interior fill added {} voxels", filled);
        }

        let mut grid = Grid::new(dims[0], dims[1], dims[2]);
        for (i, cell) in cells.iter().enumerate() {
            if let Some(color_index) = *cell {
                let [x, y, z] = layout.coord(i);
                // dims <= 256, so every coordinate fits in u8
                grid.insert(Voxel::new(x as u8, y as u8, z as u8, color_index));
            }
        }

        tracing::info!("Voxelized mesh: {:?}, {} voxels", grid.size(), grid.len());
        Ok(grid)
    }

    #[allow(clippy::cast_precision_loss)]
    fn cell_center(&self, bounds: &Aabb, [x, y, z]: [usize; 3]) -> Vec3 {
        let size = self.config.voxel_size;
        bounds.min + Vec3::new(x as f32 + 0.5, y as f32 + 0.5, z as f32 + 0.5) * size
    }

    /// Strict-majority parity vote. Returns the nearest hit triangle when the
    /// cell is solid.
    fn classify(&self, center: Vec3, triangles: &Bvh) -> Option<usize> {
        let mut inside_votes = 0usize;
        let mut nearest: Option<(f32, usize)> = None;
        for &direction in &self.directions {
            let hits = triangles.cast(&Ray { origin: center, direction });
            if hits.is_inside() {
                inside_votes += 1;
            }
            if let Some((t, tri)) = hits.nearest {
                if nearest.map_or(true, |(best, _)| t < best) {
                    nearest = Some((t, tri));
                }
            }
        }
        if inside_votes * 2 > self.directions.len() {
            nearest.map(|(_, tri)| tri)
        } else {
            None
        }
    }
}

/// One-shot voxelization with `config`.
///
/// # Errors
///
/// See [`VoxelizerConfig::validate`] and [`Voxelizer::voxelize`].
pub fn voxelize(mesh: &MeshInput, face_indices: &[u8], config: &VoxelizerConfig) -> GeometryResult<Grid> {
    Voxelizer::new(*config)?.voxelize(mesh, face_indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cube_mesh(min: f32, max: f32) -> MeshInput {
        let mut mesh = MeshInput::new();
        mesh.push_box(Vec3::new(min, min, min), Vec3::new(max, max, max), None);
        mesh
    }

    #[test]
    fn test_config_validation() {
        let bad = [
            VoxelizerConfig { voxel_size: 0.0, ..VoxelizerConfig::default() },
            VoxelizerConfig { voxel_size: f32::NAN, ..VoxelizerConfig::default() },
            VoxelizerConfig { voxel_size: -1.0, ..VoxelizerConfig::default() },
            VoxelizerConfig { ray_samples: 0, ..VoxelizerConfig::default() },
            VoxelizerConfig { max_dimension: 0, ..VoxelizerConfig::default() },
            VoxelizerConfig { max_dimension: 257, ..VoxelizerConfig::default() },
        ];
        for config in bad {
            assert!(matches!(Voxelizer::new(config), Err(GeometryError::Validation(_))), "{config:?}");
        }
        assert!(Voxelizer::new(VoxelizerConfig { max_dimension: 256, ..VoxelizerConfig::default() }).is_ok());
    }

    #[test]
    fn test_dimensions() {
        let v = Voxelizer::new(VoxelizerConfig { voxel_size: 0.5, ..VoxelizerConfig::default() }).unwrap();
        let bounds = Aabb { min: Vec3::ZERO, max: Vec3::new(1.0, 1.2, 0.0) };
        assert_eq!(v.dimensions(&bounds).unwrap(), [2, 3, 1]);
    }

    #[test]
    fn test_dimension_limit() {
        let v = Voxelizer::new(VoxelizerConfig { voxel_size: 1.0, max_dimension: 4, ..VoxelizerConfig::default() })
            .unwrap();
        let fits = Aabb { min: Vec3::ZERO, max: Vec3::new(4.0, 1.0, 1.0) };
        assert!(v.dimensions(&fits).is_ok());
        let too_big = Aabb { min: Vec3::ZERO, max: Vec3::new(4.5, 1.0, 1.0) };
        assert!(matches!(v.dimensions(&too_big), Err(GeometryError::Validation(_))));
    }

    #[test]
    fn test_empty_mesh() {
        let err = voxelize(&MeshInput::new(), &[], &VoxelizerConfig::default()).unwrap_err();
        assert!(matches!(err, GeometryError::EmptyInput(_)));
    }

    #[test]
    fn test_face_index_checks() {
        let mesh = cube_mesh(0.0, 1.0);
        let config = VoxelizerConfig { voxel_size: 1.0, ..VoxelizerConfig::default() };
        assert!(matches!(voxelize(&mesh, &[1; 3], &config), Err(GeometryError::Validation(_))));
        let mut indices = vec![1u8; 12];
        indices[4] = 0;
        assert!(matches!(voxelize(&mesh, &indices, &config), Err(GeometryError::Validation(_))));
    }

    #[test]
    fn test_solid_box_fills_every_cell() {
        let mesh = cube_mesh(0.0, 2.0);
        let config = VoxelizerConfig { voxel_size: 0.5, ray_samples: 5, ..VoxelizerConfig::default() };
        let grid = voxelize(&mesh, &[3; 12], &config).unwrap();
        assert_eq!(grid.size(), [4, 4, 4]);
        assert_eq!(grid.len(), 64);
        assert!(grid.voxels().iter().all(|v| v.color_index == 3));
        // x-major output order
        assert_eq!(grid.voxels()[0].coord(), [0, 0, 0]);
        assert_eq!(grid.voxels()[1].coord(), [0, 0, 1]);
        assert_eq!(grid.voxels()[63].coord(), [3, 3, 3]);
    }
}
