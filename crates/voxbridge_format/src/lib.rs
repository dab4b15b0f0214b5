//! # VOXBRIDGE Format
//!
//! Reader and writer for the MagicaVoxel `.vox` container.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │                  .vox byte buffer                    │
//! ├──────────────────────────────────────────────────────┤
//! │  header ("VOX ", version)                            │
//! │    ↓                                                 │
//! │  chunk codec  →  Chunk { Size | VoxelList |          │
//! │                          Palette | Opaque }          │
//! │    ↓                                                 │
//! │  Grid (sparse voxels) + Palette (256 RGBA entries)   │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! Decoding is lenient about what it does not understand (unknown chunks are
//! skipped by length) and strict about what it does (declared lengths, voxel
//! bounds). Encoding is deterministic: the same grid and palette always
//! produce the same bytes.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod chunk;
pub mod error;
pub mod model;
pub mod palette;
pub mod reader;
pub mod writer;

pub use chunk::{Chunk, RawChunk};
pub use error::{VoxError, VoxResult};
pub use model::{Grid, Voxel, VoxelRecord, MAX_DIMENSION};
pub use palette::{Palette, Rgba, MAX_PALETTE_INDEX, PALETTE_SIZE};
pub use reader::{decode, decode_file, VoxFile, VoxFileError};
pub use writer::{encode, encode_to_file, validate};

/// File magic.
pub const VOX_MAGIC: [u8; 4] = *b"VOX ";

/// Version written by [`encode`].
pub const VOX_VERSION: u32 = 150;

/// Oldest version [`decode`] accepts.
pub const MIN_VERSION: u32 = 150;

/// Newest version [`decode`] accepts.
pub const MAX_VERSION: u32 = 200;
