//! Indexed color table shared by every voxel of a model.
//!
//! The palette always holds 256 entries. Index 0 is reserved (a voxel with
//! index 0 does not exist); indices 1..=255 are addressable.
//!
//! ## RGBA chunk layout
//!
//! ```text
//! file slot 0   -> palette index 1
//! file slot 1   -> palette index 2
//! ...
//! file slot 254 -> palette index 255
//! file slot 255 -> palette index 0 (reserved entry, kept for round-trip)
//! ```

use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

/// Number of palette entries, reserved slot included.
pub const PALETTE_SIZE: usize = 256;

/// Highest addressable palette index.
pub const MAX_PALETTE_INDEX: u8 = 255;

/// Byte length of an `RGBA` chunk body.
pub const RGBA_CHUNK_LEN: usize = PALETTE_SIZE * 4;

/// Default MagicaVoxel palette, packed as `0xAABBGGRR`.
const DEFAULT_PALETTE_PACKED: [u32; 256] = [
    0x00000000, 0xffffffff, 0xffccffff, 0xff99ffff, 0xff66ffff, 0xff33ffff, 0xff00ffff, 0xffffccff,
    0xffccccff, 0xff99ccff, 0xff66ccff, 0xff33ccff, 0xff00ccff, 0xffff99ff, 0xffcc99ff, 0xff9999ff,
    0xff6699ff, 0xff3399ff, 0xff0099ff, 0xffff66ff, 0xffcc66ff, 0xff9966ff, 0xff6666ff, 0xff3366ff,
    0xff0066ff, 0xffff33ff, 0xffcc33ff, 0xff9933ff, 0xff6633ff, 0xff3333ff, 0xff0033ff, 0xffff00ff,
    0xffcc00ff, 0xff9900ff, 0xff6600ff, 0xff3300ff, 0xff0000ff, 0xffffffcc, 0xffccffcc, 0xff99ffcc,
    0xff66ffcc, 0xff33ffcc, 0xff00ffcc, 0xffffcccc, 0xffcccccc, 0xff99cccc, 0xff66cccc, 0xff33cccc,
    0xff00cccc, 0xffff99cc, 0xffcc99cc, 0xff9999cc, 0xff6699cc, 0xff3399cc, 0xff0099cc, 0xffff66cc,
    0xffcc66cc, 0xff9966cc, 0xff6666cc, 0xff3366cc, 0xff0066cc, 0xffff33cc, 0xffcc33cc, 0xff9933cc,
    0xff6633cc, 0xff3333cc, 0xff0033cc, 0xffff00cc, 0xffcc00cc, 0xff9900cc, 0xff6600cc, 0xff3300cc,
    0xff0000cc, 0xffffff99, 0xffccff99, 0xff99ff99, 0xff66ff99, 0xff33ff99, 0xff00ff99, 0xffffcc99,
    0xffcccc99, 0xff99cc99, 0xff66cc99, 0xff33cc99, 0xff00cc99, 0xffff9999, 0xffcc9999, 0xff999999,
    0xff669999, 0xff339999, 0xff009999, 0xffff6699, 0xffcc6699, 0xff996699, 0xff666699, 0xff336699,
    0xff006699, 0xffff3399, 0xffcc3399, 0xff993399, 0xff663399, 0xff333399, 0xff003399, 0xffff0099,
    0xffcc0099, 0xff990099, 0xff660099, 0xff330099, 0xff000099, 0xffffff66, 0xffccff66, 0xff99ff66,
    0xff66ff66, 0xff33ff66, 0xff00ff66, 0xffffcc66, 0xffcccc66, 0xff99cc66, 0xff66cc66, 0xff33cc66,
    0xff00cc66, 0xffff9966, 0xffcc9966, 0xff999966, 0xff669966, 0xff339966, 0xff009966, 0xffff6666,
    0xffcc6666, 0xff996666, 0xff666666, 0xff336666, 0xff006666, 0xffff3366, 0xffcc3366, 0xff993366,
    0xff663366, 0xff333366, 0xff003366, 0xffff0066, 0xffcc0066, 0xff990066, 0xff660066, 0xff330066,
    0xff000066, 0xffffff33, 0xffccff33, 0xff99ff33, 0xff66ff33, 0xff33ff33, 0xff00ff33, 0xffffcc33,
    0xffcccc33, 0xff99cc33, 0xff66cc33, 0xff33cc33, 0xff00cc33, 0xffff9933, 0xffcc9933, 0xff999933,
    0xff669933, 0xff339933, 0xff009933, 0xffff6633, 0xffcc6633, 0xff996633, 0xff666633, 0xff336633,
    0xff006633, 0xffff3333, 0xffcc3333, 0xff993333, 0xff663333, 0xff333333, 0xff003333, 0xffff0033,
    0xffcc0033, 0xff990033, 0xff660033, 0xff330033, 0xff000033, 0xffffff00, 0xffccff00, 0xff99ff00,
    0xff66ff00, 0xff33ff00, 0xff00ff00, 0xffffcc00, 0xffcccc00, 0xff99cc00, 0xff66cc00, 0xff33cc00,
    0xff00cc00, 0xffff9900, 0xffcc9900, 0xff999900, 0xff669900, 0xff339900, 0xff009900, 0xffff6600,
    0xffcc6600, 0xff996600, 0xff666600, 0xff336600, 0xff006600, 0xffff3300, 0xffcc3300, 0xff993300,
    0xff663300, 0xff333300, 0xff003300, 0xffff0000, 0xffcc0000, 0xff990000, 0xff660000, 0xff330000,
    0xff0000ee, 0xff0000dd, 0xff0000bb, 0xff0000aa, 0xff000088, 0xff000077, 0xff000055, 0xff000044,
    0xff000022, 0xff000011, 0xff00ee00, 0xff00dd00, 0xff00bb00, 0xff00aa00, 0xff008800, 0xff007700,
    0xff005500, 0xff004400, 0xff002200, 0xff001100, 0xffee0000, 0xffdd0000, 0xffbb0000, 0xffaa0000,
    0xff880000, 0xff770000, 0xff550000, 0xff440000, 0xff220000, 0xff110000, 0xffeeeeee, 0xffdddddd,
    0xffbbbbbb, 0xffaaaaaa, 0xff888888, 0xff777777, 0xff555555, 0xff444444, 0xff222222, 0xff111111,
];
/// Color entry in a palette (8 bits per channel).
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Pod, Zeroable, Serialize, Deserialize)]
pub struct Rgba {
    /// Red component (0-255).
    pub r: u8,
    /// Green component (0-255).
    pub g: u8,
    /// Blue component (0-255).
    pub b: u8,
    /// Alpha component (0-255).
    pub a: u8,
}

impl Rgba {
    /// Neutral gray used when a mesh carries no color information.
    pub const NEUTRAL_GRAY: Self = Self::new(180, 180, 180, 255);

    /// Creates a color from its channels.
    #[inline]
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    #[inline]
    #[must_use]
    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self::new(r, g, b, 255)
    }

    /// Creates from packed `0xAABBGGRR`.
    #[inline]
    #[must_use]
    pub const fn from_packed(packed: u32) -> Self {
        Self {
            r: (packed & 0xFF) as u8,
            g: ((packed >> 8) & 0xFF) as u8,
            b: ((packed >> 16) & 0xFF) as u8,
            a: ((packed >> 24) & 0xFF) as u8,
        }
    }

    /// Creates from normalized float channels, clamping to [0, 1].
    #[must_use]
    pub fn from_float(rgba: [f32; 4]) -> Self {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self::new(channel(rgba[0]), channel(rgba[1]), channel(rgba[2]), channel(rgba[3]))
    }

    /// Returns as normalized float array [r, g, b, a].
    #[inline]
    #[must_use]
    pub fn as_float(&self) -> [f32; 4] {
        [
            f32::from(self.r) / 255.0,
            f32::from(self.g) / 255.0,
            f32::from(self.b) / 255.0,
            f32::from(self.a) / 255.0,
        ]
    }

    /// Squared Euclidean distance over all four channels.
    #[inline]
    #[must_use]
    pub fn distance_squared(self, other: Self) -> u32 {
        let d = |a: u8, b: u8| {
            let diff = i32::from(a) - i32::from(b);
            diff.unsigned_abs() * diff.unsigned_abs()
        };
        d(self.r, other.r) + d(self.g, other.g) + d(self.b, other.b) + d(self.a, other.a)
    }
}

/// 256-entry color table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "Vec<Rgba>", try_from = "Vec<Rgba>")]
pub struct Palette {
    colors: [Rgba; PALETTE_SIZE],
}

impl Default for Palette {
    fn default() -> Self {
        let mut colors = [Rgba::default(); PALETTE_SIZE];
        for (slot, &packed) in colors.iter_mut().zip(DEFAULT_PALETTE_PACKED.iter()) {
            *slot = Rgba::from_packed(packed);
        }
        Self { colors }
    }
}

impl Palette {
    /// Creates a palette from a full color table.
    #[must_use]
    pub const fn from_colors(colors: [Rgba; PALETTE_SIZE]) -> Self {
        Self { colors }
    }

    /// Gets the color at `index`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: u8) -> Rgba {
        self.colors[usize::from(index)]
    }

    /// Sets the color at `index`. Index 0 is the reserved entry.
    #[inline]
    pub fn set(&mut self, index: u8, color: Rgba) {
        self.colors[usize::from(index)] = color;
    }

    /// All 256 entries, reserved slot first.
    #[inline]
    #[must_use]
    pub fn colors(&self) -> &[Rgba; PALETTE_SIZE] {
        &self.colors
    }

    /// True when this palette equals the built-in default table.
    #[must_use]
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Decodes an `RGBA` chunk body. Returns `None` if `content` is short.
    #[must_use]
    pub fn from_rgba_chunk(content: &[u8]) -> Option<Self> {
        let body = content.get(..RGBA_CHUNK_LEN)?;
        let records: &[Rgba] = bytemuck::cast_slice(body);
        let mut colors = [Rgba::default(); PALETTE_SIZE];
        colors[1..].copy_from_slice(&records[..PALETTE_SIZE - 1]);
        colors[0] = records[PALETTE_SIZE - 1];
        Some(Self { colors })
    }

    /// Encodes the palette as an `RGBA` chunk body.
    #[must_use]
    pub fn to_rgba_chunk(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(RGBA_CHUNK_LEN);
        body.extend_from_slice(bytemuck::cast_slice(&self.colors[1..]));
        body.extend_from_slice(bytemuck::bytes_of(&self.colors[0]));
        body
    }
}

impl From<Palette> for Vec<Rgba> {
    fn from(palette: Palette) -> Self {
        palette.colors.to_vec()
    }
}

impl TryFrom<Vec<Rgba>> for Palette {
    type Error = String;

    fn try_from(colors: Vec<Rgba>) -> Result<Self, Self::Error> {
        let colors: [Rgba; PALETTE_SIZE] = colors
            .try_into()
            .map_err(|v: Vec<Rgba>| format!("palette needs {PALETTE_SIZE} entries, got {}", v.len()))?;
        Ok(Self { colors })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rgba_from_packed() {
        let color = Rgba::from_packed(0xFF11_2233);
        assert_eq!(color.r, 0x33);
        assert_eq!(color.g, 0x22);
        assert_eq!(color.b, 0x11);
        assert_eq!(color.a, 0xFF);
    }

    #[test]
    fn test_default_palette() {
        let palette = Palette::default();
        // Index 0 is the transparent reserved slot
        assert_eq!(palette.get(0), Rgba::new(0, 0, 0, 0));
        assert_eq!(palette.get(1), Rgba::opaque(255, 255, 255));
        assert_eq!(palette.get(255), Rgba::opaque(0x11, 0x11, 0x11));
        assert!(palette.is_default());
    }

    #[test]
    fn test_rgba_chunk_slot_mapping() {
        let mut palette = Palette::default();
        palette.set(1, Rgba::opaque(1, 2, 3));
        palette.set(255, Rgba::opaque(4, 5, 6));
        palette.set(0, Rgba::new(7, 8, 9, 10));

        let body = palette.to_rgba_chunk();
        assert_eq!(body.len(), RGBA_CHUNK_LEN);
        assert_eq!(&body[0..4], &[1, 2, 3, 255]);
        assert_eq!(&body[254 * 4..255 * 4], &[4, 5, 6, 255]);
        assert_eq!(&body[255 * 4..], &[7, 8, 9, 10]);

        assert_eq!(Palette::from_rgba_chunk(&body), Some(palette));
    }

    #[test]
    fn test_rgba_chunk_too_short() {
        assert!(Palette::from_rgba_chunk(&[0u8; RGBA_CHUNK_LEN - 1]).is_none());
    }

    #[test]
    fn test_distance_squared() {
        let a = Rgba::new(0, 0, 0, 0);
        let b = Rgba::new(3, 4, 0, 0);
        assert_eq!(a.distance_squared(b), 25);
        assert_eq!(b.distance_squared(a), 25);
    }

    #[test]
    fn test_from_float_clamps() {
        assert_eq!(Rgba::from_float([1.5, -1.0, 0.5, 1.0]), Rgba::new(255, 0, 128, 255));
    }
}
