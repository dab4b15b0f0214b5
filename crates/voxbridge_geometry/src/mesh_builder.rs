//! # Mesh Builder
//!
//! Rebuilds a renderable mesh from a voxel grid: one unit cube per voxel.
//!
//! ```text
//!      7 ──────── 6        corner i = (coord + CUBE_CORNERS[i]) * scale
//!     ╱│         ╱│
//!    4 ──────── 5 │        faces (quads, CUBE_FACES order):
//!    │ 3 ───────│─2          bottom (0,1,2,3)  top   (4,7,6,5)
//!    │╱         │╱           front  (0,4,5,1)  back  (2,6,7,3)
//!    0 ──────── 1            left   (0,3,7,4)  right (1,5,6,2)
//! ```
//!
//! Faces between adjacent voxels are kept. Every cube stays addressable
//! through the round-trip metadata, which is what export relies on.

use bytemuck::{Pod, Zeroable};
use voxbridge_format::{Grid, Palette, Rgba};

use crate::metadata::{CubeEntry, RoundTripMetadata};

/// Unit cube corner offsets.
pub const CUBE_CORNERS: [[u8; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

/// Quads of a cube, as indices into [`CUBE_CORNERS`].
pub const CUBE_FACES: [[u32; 4]; 6] = [
    [0, 1, 2, 3],
    [4, 7, 6, 5],
    [0, 4, 5, 1],
    [2, 6, 7, 3],
    [0, 3, 7, 4],
    [1, 5, 6, 2],
];

/// Faces generated per voxel.
pub const FACES_PER_CUBE: u32 = 6;

/// Output vertex (GPU-ready layout).
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct MeshVertex {
    /// Position in mesh units
    pub position: [f32; 3],
    /// Linear RGBA color (0-1)
    pub color: [f32; 4],
}

/// Mesh rebuilt from a grid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuiltMesh {
    /// Vertex buffer, 8 per cube
    pub vertices: Vec<MeshVertex>,
    /// Quads as vertex indices, 6 per cube
    pub faces: Vec<[u32; 4]>,
    /// Data needed to export the grid back unchanged
    pub metadata: RoundTripMetadata,
}

impl BuiltMesh {
    /// Number of cubes.
    #[must_use]
    pub fn cube_count(&self) -> usize {
        self.metadata.cubes.len()
    }

    /// Vertex buffer as raw bytes.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }
}

/// Mesh building options.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BuildOptions {
    /// Edge length of one cube
    pub scale: f32,
    /// Color vertices from the palette; otherwise neutral gray
    pub apply_colors: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self { scale: 0.1, apply_colors: true }
    }
}

/// Builds the cube mesh for `grid`, colored from `palette`.
#[must_use]
pub fn build(grid: &Grid, palette: &Palette, scale: f32) -> BuiltMesh {
    build_with(grid, palette, &BuildOptions { scale, apply_colors: true })
}

/// Builds the cube mesh with explicit options.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn build_with(grid: &Grid, palette: &Palette, options: &BuildOptions) -> BuiltMesh {
    let count = grid.len();
    let mut vertices = Vec::with_capacity(count * CUBE_CORNERS.len());
    let mut faces = Vec::with_capacity(count * CUBE_FACES.len());
    let mut cubes = Vec::with_capacity(count);

    // At most 256^3 cubes: vertex and face counts stay well inside u32.
    for voxel in grid.voxels() {
        let color = if options.apply_colors {
            palette.get(voxel.color_index)
        } else {
            Rgba::NEUTRAL_GRAY
        }
        .as_float();

        let base = vertices.len() as u32;
        let first_face = faces.len() as u32;
        let coord = voxel.coord();

        for corner in CUBE_CORNERS {
            let mut position = [0.0f32; 3];
            for ((p, c), k) in position.iter_mut().zip(coord).zip(corner) {
                *p = f32::from(u16::from(c) + u16::from(k)) * options.scale;
            }
            vertices.push(MeshVertex { position, color });
        }
        faces.extend(CUBE_FACES.iter().map(|quad| quad.map(|i| base + i)));

        cubes.push(CubeEntry {
            coord,
            color_index: u32::from(voxel.color_index),
            first_face,
            face_count: FACES_PER_CUBE,
        });
    }

    tracing::debug!(
        "Built mesh: {} cubes, {} vertices, {} faces",
        cubes.len(),
        vertices.len(),
        faces.len()
    );

    BuiltMesh {
        vertices,
        faces,
        metadata: RoundTripMetadata {
            size: grid.size(),
            palette: palette.clone(),
            cubes,
        },
    }
}
