//! # Chunk Codec
//!
//! Low-level reader/writer for the tagged, length-prefixed chunk structure.
//!
//! ```text
//! ┌──────────┬──────────────┬───────────────┬─────────┬──────────┐
//! │ id (4)   │ content (4)  │ children (4)  │ content │ children │
//! │ ASCII    │ u32 LE       │ u32 LE        │ N bytes │ M bytes  │
//! └──────────┴──────────────┴───────────────┴─────────┴──────────┘
//! ```
//!
//! Recognized ids are decoded into the [`Chunk`] tagged union. Every other id
//! lands in [`Chunk::Opaque`] and is skipped by its declared lengths alone.

use crate::error::{VoxError, VoxResult};
use crate::model::VoxelRecord;
use crate::palette::{Palette, RGBA_CHUNK_LEN};

/// Top-level container chunk.
pub const MAIN_ID: [u8; 4] = *b"MAIN";
/// Model dimensions.
pub const SIZE_ID: [u8; 4] = *b"SIZE";
/// Voxel list.
pub const XYZI_ID: [u8; 4] = *b"XYZI";
/// Palette.
pub const RGBA_ID: [u8; 4] = *b"RGBA";

/// Chunk header size: id + content length + children length.
pub const CHUNK_HEADER_LEN: usize = 12;

/// Byte length of a `SIZE` body.
pub const SIZE_CHUNK_LEN: usize = 12;

/// Little-endian cursor over a borrowed buffer.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    buffer: &'a [u8],
    position: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a reader positioned at `offset`.
    #[must_use]
    pub const fn at(buffer: &'a [u8], offset: usize) -> Self {
        Self { buffer, position: offset }
    }

    /// Current offset.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Returns the number of bytes remaining.
    #[inline]
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.position)
    }

    /// Reads `len` raw bytes.
    pub fn read_bytes(&mut self, len: usize) -> VoxResult<&'a [u8]> {
        if len > self.remaining() {
            return Err(VoxError::Truncated {
                offset: self.position,
                needed: len,
                available: self.remaining(),
            });
        }
        let slice = &self.buffer[self.position..self.position + len];
        self.position += len;
        Ok(slice)
    }

    /// Reads a 4-byte identifier.
    pub fn read_id(&mut self) -> VoxResult<[u8; 4]> {
        let bytes = self.read_bytes(4)?;
        Ok([bytes[0], bytes[1], bytes[2], bytes[3]])
    }

    /// Reads a u32 in little-endian format.
    pub fn read_u32(&mut self) -> VoxResult<u32> {
        self.read_id().map(u32::from_le_bytes)
    }
}

/// One chunk as laid out in the buffer, not yet interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawChunk<'a> {
    /// 4-character identifier.
    pub id: [u8; 4],
    /// Content bytes.
    pub content: &'a [u8],
    /// Concatenated child chunks.
    pub children: &'a [u8],
    /// Offset of the chunk header.
    pub offset: usize,
    /// Offset of the byte following the chunk.
    pub next_offset: usize,
}

impl RawChunk<'_> {
    /// Identifier as text, for messages.
    #[must_use]
    pub fn id_str(&self) -> String {
        String::from_utf8_lossy(&self.id).into_owned()
    }

    /// Total bytes this chunk occupies, header included.
    #[inline]
    #[must_use]
    pub const fn total_len(&self) -> usize {
        self.next_offset - self.offset
    }
}

/// Reads the chunk starting at `offset`.
///
/// # Errors
///
/// Returns [`VoxError::Truncated`] if the header or the declared content and
/// children lengths run past the end of `buffer`.
pub fn read_chunk(buffer: &[u8], offset: usize) -> VoxResult<RawChunk<'_>> {
    let mut reader = ByteReader::at(buffer, offset);
    let id = reader.read_id()?;
    let content_len = reader.read_u32()? as usize;
    let children_len = reader.read_u32()? as usize;
    let content = reader.read_bytes(content_len)?;
    let children = reader.read_bytes(children_len)?;

    Ok(RawChunk {
        id,
        content,
        children,
        offset,
        next_offset: reader.position(),
    })
}

/// Iterates the chunks laid end to end in `region`.
///
/// Offsets in the yielded chunks are relative to `region`.
pub fn iter_chunks(region: &[u8]) -> impl Iterator<Item = VoxResult<RawChunk<'_>>> {
    let mut offset = 0;
    let mut failed = false;
    std::iter::from_fn(move || {
        if failed || offset >= region.len() {
            return None;
        }
        let result = read_chunk(region, offset);
        match &result {
            Ok(chunk) => offset = chunk.next_offset,
            Err(_) => failed = true,
        }
        Some(result)
    })
}

/// Encodes a chunk: header, content, children.
///
/// # Errors
///
/// Returns [`VoxError::Validation`] if either length does not fit in a u32.
pub fn write_chunk(id: [u8; 4], content: &[u8], children: &[u8]) -> VoxResult<Vec<u8>> {
    let mut out = Vec::with_capacity(CHUNK_HEADER_LEN + content.len() + children.len());
    append_chunk(&mut out, id, content, children)?;
    Ok(out)
}

/// Appends an encoded chunk to `out`.
///
/// # Errors
///
/// Returns [`VoxError::Validation`] if either length does not fit in a u32.
pub fn append_chunk(out: &mut Vec<u8>, id: [u8; 4], content: &[u8], children: &[u8]) -> VoxResult<()> {
    let length = |bytes: &[u8]| {
        u32::try_from(bytes.len()).map_err(|_| {
            VoxError::Validation(format!(
                "{} chunk section of {} bytes exceeds the 4-byte length field",
                String::from_utf8_lossy(&id),
                bytes.len()
            ))
        })
    };
    let content_len = length(content)?;
    let children_len = length(children)?;

    out.extend_from_slice(&id);
    out.extend_from_slice(&content_len.to_le_bytes());
    out.extend_from_slice(&children_len.to_le_bytes());
    out.extend_from_slice(content);
    out.extend_from_slice(children);
    Ok(())
}

/// A `MAIN` child, decoded by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk<'a> {
    /// `MAIN`: container root, holding every other chunk as children.
    Main(&'a [u8]),
    /// `SIZE`: model dimensions.
    Size([u32; 3]),
    /// `XYZI`: voxel records.
    VoxelList(&'a [VoxelRecord]),
    /// `RGBA`: palette override.
    Palette(Box<Palette>),
    /// Any other id, skipped by length.
    Opaque {
        /// Identifier of the skipped chunk.
        id: [u8; 4],
        /// Bytes skipped (content + children).
        skipped: usize,
    },
}

impl<'a> Chunk<'a> {
    /// Interprets a raw chunk.
    ///
    /// # Errors
    ///
    /// Returns [`VoxError::CorruptChunk`] when a recognized chunk's content is
    /// shorter than its kind requires.
    pub fn parse(raw: &RawChunk<'a>) -> VoxResult<Self> {
        match raw.id {
            MAIN_ID => Ok(Self::Main(raw.children)),
            SIZE_ID => {
                let mut reader = ByteReader::at(raw.content, 0);
                let mut dims = [0u32; 3];
                for dim in &mut dims {
                    *dim = reader.read_u32().map_err(|_| {
                        VoxError::corrupt(raw.id, format!(
                            "content is {} bytes, need {SIZE_CHUNK_LEN}",
                            raw.content.len()
                        ))
                    })?;
                }
                Ok(Self::Size(dims))
            }
            XYZI_ID => {
                let mut reader = ByteReader::at(raw.content, 0);
                let count = reader.read_u32().map_err(|_| {
                    VoxError::corrupt(raw.id, "missing voxel count")
                })? as usize;
                let body = count
                    .checked_mul(4)
                    .and_then(|len| reader.read_bytes(len).ok())
                    .ok_or_else(|| {
                        VoxError::corrupt(raw.id, format!(
                            "declares {count} voxels but holds {} record bytes",
                            raw.content.len().saturating_sub(4)
                        ))
                    })?;
                Ok(Self::VoxelList(bytemuck::cast_slice(body)))
            }
            RGBA_ID => Palette::from_rgba_chunk(raw.content)
                .map(|p| Self::Palette(Box::new(p)))
                .ok_or_else(|| {
                    VoxError::corrupt(raw.id, format!(
                        "content is {} bytes, need {RGBA_CHUNK_LEN}",
                        raw.content.len()
                    ))
                }),
            id => Ok(Self::Opaque {
                id,
                skipped: raw.content.len() + raw.children.len(),
            }),
        }
    }
}
