//! # Round-Trip Metadata
//!
//! A mesh built from a grid carries the exact voxel data it came from. When
//! that mesh is exported again, the grid is rebuilt from this record instead
//! of voxelizing the geometry, so the output matches the input file.
//!
//! The host stores the record on its scene object through [`MetadataHost`].
//! [`PropertyStore`] is a host backed by string properties, holding the
//! record as JSON.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use voxbridge_format::{Grid, Palette, Voxel};

use crate::error::{GeometryError, GeometryResult};

/// Property key under which [`PropertyStore`] keeps the record.
pub const METADATA_PROPERTY: &str = "vox_metadata";

/// One generated cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CubeEntry {
    /// Voxel coordinate.
    pub coord: [u8; 3],
    /// Palette index. Wider than the format allows, since hosts may edit it.
    pub color_index: u32,
    /// Index of the cube's first face in the mesh.
    pub first_face: u32,
    /// Number of faces of the cube.
    pub face_count: u32,
}

/// Voxel data attached to a generated mesh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTripMetadata {
    /// Grid dimensions at import.
    pub size: [u32; 3],
    /// Full palette at import.
    pub palette: Palette,
    /// One entry per cube, in mesh order.
    pub cubes: Vec<CubeEntry>,
}

impl RoundTripMetadata {
    /// Rebuilds the grid and palette.
    ///
    /// Duplicate coordinates keep the first entry. Palette indices outside
    /// 1..=255 become 1. Dimensions grow if a cube lies outside the recorded
    /// size.
    #[must_use]
    pub fn to_grid(&self) -> (Grid, Palette) {
        let tight = self.cubes.iter().fold([0u32; 3], |acc, cube| {
            let mut out = acc;
            for (o, &c) in out.iter_mut().zip(cube.coord.iter()) {
                *o = (*o).max(u32::from(c) + 1);
            }
            out
        });
        let size = [
            self.size[0].max(tight[0]),
            self.size[1].max(tight[1]),
            self.size[2].max(tight[2]),
        ];
        if size != self.size {
            tracing::warn!("Round-trip cubes exceed recorded size {:?}, using {:?}", self.size, size);
        }

        let mut grid = Grid::new(size[0], size[1], size[2]);
        let mut remapped = 0usize;
        let mut duplicates = 0usize;
        for cube in &self.cubes {
            let color_index = match u8::try_from(cube.color_index) {
                Ok(i) if i >= 1 => i,
                _ => {
                    remapped += 1;
                    1
                }
            };
            let [x, y, z] = cube.coord;
            if !grid.insert(Voxel::new(x, y, z, color_index)) {
                duplicates += 1;
            }
        }
        if remapped > 0 || duplicates > 0 {
            tracing::warn!(
                "Round-trip metadata: {} invalid palette indices mapped to 1, {} duplicate cubes dropped",
                remapped,
                duplicates
            );
        }
        (grid, self.palette.clone())
    }

    /// Serializes to JSON.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Metadata`] if serialization fails.
    pub fn to_json(&self) -> GeometryResult<String> {
        serde_json::to_string(self).map_err(|e| GeometryError::Metadata(e.to_string()))
    }

    /// Parses from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::Metadata`] on malformed input.
    pub fn from_json(json: &str) -> GeometryResult<Self> {
        serde_json::from_str(json).map_err(|e| GeometryError::Metadata(e.to_string()))
    }
}

/// Scene object that can carry round-trip metadata.
pub trait MetadataHost {
    /// Stores `metadata` on the object, replacing any previous record.
    fn attach_metadata(&mut self, metadata: &RoundTripMetadata) -> GeometryResult<()>;

    /// Reads the stored record, if present and readable.
    fn read_metadata(&self) -> Option<RoundTripMetadata>;
}

/// Host backed by named string properties.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PropertyStore {
    properties: HashMap<String, String>,
}

impl PropertyStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets a property.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Sets a property.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.properties.insert(key.into(), value.into());
    }

    /// Removes a property.
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.properties.remove(key)
    }
}

impl MetadataHost for PropertyStore {
    fn attach_metadata(&mut self, metadata: &RoundTripMetadata) -> GeometryResult<()> {
        let json = metadata.to_json()?;
        self.set(METADATA_PROPERTY, json);
        Ok(())
    }

    fn read_metadata(&self) -> Option<RoundTripMetadata> {
        let json = self.get(METADATA_PROPERTY)?;
        match RoundTripMetadata::from_json(json) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                tracing::warn!("Ignoring unreadable round-trip metadata: {}", e);
                None
            }
        }
    }
}
