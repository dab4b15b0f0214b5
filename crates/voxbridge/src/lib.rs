//! # VOXBRIDGE
//!
//! Bidirectional conversion between MagicaVoxel `.vox` files and triangle
//! meshes.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use voxbridge::{import_vox, export_mesh, ConvertConfig, PropertyStore};
//!
//! let config = ConvertConfig::load("voxbridge.toml")?;
//! let mut object = PropertyStore::new();
//!
//! // .vox -> cube mesh, metadata stored on the object
//! let mesh = import_vox(&bytes, &mut object, &config.import)?;
//!
//! // ... host edits the object ...
//!
//! // Unchanged object: written back byte-for-byte from the metadata
//! let out = export_mesh(&host_mesh, &object, &config.export)?;
//! ```
//!
//! ## Crates
//!
//! - [`voxbridge_format`]: container codec, palette, sparse grid
//! - [`voxbridge_geometry`]: voxelizer, quantizer, mesh builder, metadata

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod config;
pub mod error;
pub mod pipeline;

pub use config::{ConvertConfig, ExportConfig, ImportConfig};
pub use error::{BridgeError, BridgeResult, ConfigError};
pub use pipeline::{
    build_mesh, decode, encode, export_file, export_mesh, import_file, import_vox, prepare_export,
    voxelize, ExportSource, PreparedExport,
};

pub use voxbridge_format::{Grid, Palette, Rgba, Voxel};
pub use voxbridge_geometry::{
    BuiltMesh, ColorSampling, MeshInput, MetadataHost, PropertyStore, RoundTripMetadata, Triangle, Vec3,
};
