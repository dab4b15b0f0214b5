//! Sparse voxel grid.
//!
//! A [`Grid`] owns a set of [`Voxel`]s keyed by coordinate. Absence of a voxel
//! means empty space. Iteration follows insertion order, so a decoded grid
//! re-encodes to the same byte order.

use std::collections::HashMap;

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Largest dimension the container can address on any axis.
pub const MAX_DIMENSION: u32 = 256;

/// Single voxel: coordinate plus palette reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Voxel {
    /// X position.
    pub x: u8,
    /// Y position.
    pub y: u8,
    /// Z position.
    pub z: u8,
    /// Palette index (1-255).
    pub color_index: u8,
}

impl Voxel {
    /// Creates a voxel.
    #[inline]
    #[must_use]
    pub const fn new(x: u8, y: u8, z: u8, color_index: u8) -> Self {
        Self { x, y, z, color_index }
    }

    /// Coordinate as an array.
    #[inline]
    #[must_use]
    pub const fn coord(&self) -> [u8; 3] {
        [self.x, self.y, self.z]
    }
}

/// On-disk `XYZI` record. Four unsigned bytes, no padding.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Pod, Zeroable)]
pub struct VoxelRecord {
    /// X position.
    pub x: u8,
    /// Y position.
    pub y: u8,
    /// Z position.
    pub z: u8,
    /// Palette index.
    pub color_index: u8,
}

impl From<Voxel> for VoxelRecord {
    fn from(v: Voxel) -> Self {
        Self { x: v.x, y: v.y, z: v.z, color_index: v.color_index }
    }
}

impl From<VoxelRecord> for Voxel {
    fn from(r: VoxelRecord) -> Self {
        Self::new(r.x, r.y, r.z, r.color_index)
    }
}

/// Sparse voxel grid with dimensions.
#[derive(Debug, Clone, Default)]
pub struct Grid {
    size: [u32; 3],
    voxels: Vec<Voxel>,
    index: HashMap<[u8; 3], usize>,
}

impl Grid {
    /// Creates an empty grid with the given dimensions.
    #[must_use]
    pub fn new(size_x: u32, size_y: u32, size_z: u32) -> Self {
        Self {
            size: [size_x, size_y, size_z],
            voxels: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Grid dimensions (x, y, z).
    #[inline]
    #[must_use]
    pub const fn size(&self) -> [u32; 3] {
        self.size
    }

    /// Replaces the grid dimensions.
    pub fn set_size(&mut self, size: [u32; 3]) {
        self.size = size;
    }

    /// Number of voxels.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.voxels.len()
    }

    /// True when the grid holds no voxels.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.voxels.is_empty()
    }

    /// Voxels in insertion order.
    #[inline]
    #[must_use]
    pub fn voxels(&self) -> &[Voxel] {
        &self.voxels
    }

    /// True when `coord` lies inside the dimensions.
    #[inline]
    #[must_use]
    pub fn contains(&self, coord: [u8; 3]) -> bool {
        coord
            .iter()
            .zip(self.size.iter())
            .all(|(&c, &s)| u32::from(c) < s)
    }

    /// Inserts a voxel. Returns `false` (and keeps the existing one) when the
    /// coordinate is already occupied.
    pub fn insert(&mut self, voxel: Voxel) -> bool {
        let coord = voxel.coord();
        if self.index.contains_key(&coord) {
            return false;
        }
        self.index.insert(coord, self.voxels.len());
        self.voxels.push(voxel);
        true
    }

    /// Gets the voxel at `coord`.
    #[must_use]
    pub fn get(&self, coord: [u8; 3]) -> Option<&Voxel> {
        self.index.get(&coord).map(|&i| &self.voxels[i])
    }

    /// Smallest dimensions that enclose every voxel (max coordinate + 1).
    #[must_use]
    pub fn tight_size(&self) -> [u32; 3] {
        self.voxels.iter().fold([0u32; 3], |acc, v| {
            [
                acc[0].max(u32::from(v.x) + 1),
                acc[1].max(u32::from(v.y) + 1),
                acc[2].max(u32::from(v.z) + 1),
            ]
        })
    }
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size
            && self.voxels.len() == other.voxels.len()
            && self.voxels.iter().all(|v| other.get(v.coord()) == Some(v))
    }
}

impl Eq for Grid {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_rejects_duplicate_coordinate() {
        let mut grid = Grid::new(4, 4, 4);
        assert!(grid.insert(Voxel::new(1, 2, 3, 7)));
        assert!(!grid.insert(Voxel::new(1, 2, 3, 9)));
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.get([1, 2, 3]).map(|v| v.color_index), Some(7));
    }

    #[test]
    fn test_equality_ignores_order() {
        let mut a = Grid::new(2, 2, 2);
        a.insert(Voxel::new(0, 0, 0, 1));
        a.insert(Voxel::new(1, 1, 1, 2));

        let mut b = Grid::new(2, 2, 2);
        b.insert(Voxel::new(1, 1, 1, 2));
        b.insert(Voxel::new(0, 0, 0, 1));

        assert_eq!(a, b);

        b.set_size([3, 2, 2]);
        assert_ne!(a, b);
    }

    #[test]
    fn test_contains_and_tight_size() {
        let mut grid = Grid::new(3, 1, 2);
        assert!(grid.contains([2, 0, 1]));
        assert!(!grid.contains([3, 0, 0]));

        grid.insert(Voxel::new(2, 0, 1, 5));
        assert_eq!(grid.tight_size(), [3, 1, 2]);
    }
}
