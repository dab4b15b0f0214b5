//! # VOXBRIDGE Geometry
//!
//! Conversion between triangle meshes and voxel grids.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  EXPORT                                                     │
//! │  MeshInput → face colors → Quantizer → face indices         │
//! │      ↓                                     ↓                │
//! │  Voxelizer (ray parity, rayon) ───────→ Grid + Palette      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  IMPORT                                                     │
//! │  Grid + Palette → Mesh Builder → BuiltMesh + metadata       │
//! │                                        ↓                    │
//! │                         MetadataHost (round-trip bypass)    │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here is deterministic: the same mesh and configuration always
//! produce the same grid, regardless of thread count.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod bvh;
pub mod error;
pub mod fill;
pub mod math;
pub mod mesh;
pub mod mesh_builder;
pub mod metadata;
pub mod quantizer;
pub mod raycast;
pub mod voxelizer;

pub use bvh::Bvh;
pub use error::{GeometryError, GeometryResult};
pub use math::{Aabb, Vec3};
pub use mesh::{ColorSampling, MeshInput, Triangle};
pub use mesh_builder::{build, build_with, BuildOptions, BuiltMesh, MeshVertex};
pub use metadata::{CubeEntry, MetadataHost, PropertyStore, RoundTripMetadata};
pub use quantizer::{quantize, QuantizedPalette};
pub use voxelizer::{voxelize, Voxelizer, VoxelizerConfig};
