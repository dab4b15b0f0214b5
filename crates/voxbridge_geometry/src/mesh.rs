//! Host mesh input: triangles with optional color data.
//!
//! The host application triangulates its faces and hands them over as a flat
//! list. Each triangle may carry per-vertex colors (a color attribute) and/or
//! the base color of its material. [`MeshInput::face_colors`] reduces that to
//! one RGBA sample per triangle for the quantizer.

use voxbridge_format::Rgba;

use crate::math::{Aabb, Vec3};

/// One triangle of the host mesh.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    /// Corner positions.
    pub positions: [Vec3; 3],
    /// Per-corner colors, if the mesh has a color attribute.
    pub vertex_colors: Option<[Rgba; 3]>,
    /// Base color of the face's material, if any.
    pub base_color: Option<Rgba>,
}

impl Triangle {
    /// Uncolored triangle.
    #[must_use]
    pub const fn new(a: Vec3, b: Vec3, c: Vec3) -> Self {
        Self {
            positions: [a, b, c],
            vertex_colors: None,
            base_color: None,
        }
    }

    /// Sets the per-corner colors.
    #[must_use]
    pub const fn with_vertex_colors(mut self, colors: [Rgba; 3]) -> Self {
        self.vertex_colors = Some(colors);
        self
    }

    /// Sets the material base color.
    #[must_use]
    pub const fn with_base_color(mut self, color: Rgba) -> Self {
        self.base_color = Some(color);
        self
    }

    /// Color sample for this face under `sampling`.
    ///
    /// Vertex colors are averaged per channel (rounded down); when they are
    /// disabled or absent the material color is used, then the fallback.
    #[must_use]
    pub fn sample_color(&self, sampling: &ColorSampling) -> Rgba {
        if sampling.use_vertex_colors {
            if let Some([p, q, r]) = self.vertex_colors {
                let mean = |a: u8, b: u8, c: u8| {
                    let sum = u32::from(a) + u32::from(b) + u32::from(c);
                    u8::try_from(sum / 3).unwrap_or(u8::MAX)
                };
                return Rgba::new(
                    mean(p.r, q.r, r.r),
                    mean(p.g, q.g, r.g),
                    mean(p.b, q.b, r.b),
                    mean(p.a, q.a, r.a),
                );
            }
        }
        if sampling.use_material_colors {
            if let Some(color) = self.base_color {
                return color;
            }
        }
        sampling.fallback
    }

    fn bounds(&self) -> Aabb {
        let mut bounds = Aabb::from_point(self.positions[0]);
        bounds.include(self.positions[1]);
        bounds.include(self.positions[2]);
        bounds
    }
}

/// Which color sources feed the face samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorSampling {
    /// Read per-vertex colors.
    pub use_vertex_colors: bool,
    /// Read material base colors.
    pub use_material_colors: bool,
    /// Color for faces with no usable source.
    pub fallback: Rgba,
}

impl Default for ColorSampling {
    fn default() -> Self {
        Self {
            use_vertex_colors: true,
            use_material_colors: true,
            fallback: Rgba::NEUTRAL_GRAY,
        }
    }
}

/// Triangulated mesh handed over by the host.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshInput {
    triangles: Vec<Triangle>,
}

impl MeshInput {
    /// Creates an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mesh from triangles.
    #[must_use]
    pub fn from_triangles(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }

    /// Appends a triangle.
    pub fn push(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Triangles in host order.
    #[must_use]
    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Number of triangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// True when the mesh has no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Bounding box of every corner, `None` for an empty mesh.
    #[must_use]
    pub fn bounds(&self) -> Option<Aabb> {
        let mut iter = self.triangles.iter();
        let mut bounds = iter.next()?.bounds();
        for tri in iter {
            let b = tri.bounds();
            bounds.include(b.min);
            bounds.include(b.max);
        }
        Some(bounds)
    }

    /// One color sample per triangle, in triangle order.
    #[must_use]
    pub fn face_colors(&self, sampling: &ColorSampling) -> Vec<Rgba> {
        self.triangles.iter().map(|t| t.sample_color(sampling)).collect()
    }

    /// Appends the 12 triangles of an axis-aligned box.
    pub fn push_box(&mut self, min: Vec3, max: Vec3, base_color: Option<Rgba>) {
        let c = |x: bool, y: bool, z: bool| {
            Vec3::new(
                if x { max.x } else { min.x },
                if y { max.y } else { min.y },
                if z { max.z } else { min.z },
            )
        };
        let corners = [
            c(false, false, false),
            c(true, false, false),
            c(true, true, false),
            c(false, true, false),
            c(false, false, true),
            c(true, false, true),
            c(true, true, true),
            c(false, true, true),
        ];
        for quad in crate::mesh_builder::CUBE_FACES {
            let [q0, q1, q2, q3] = quad.map(|i| corners[i as usize]);
            for (p0, p1, p2) in [(q0, q1, q2), (q0, q2, q3)] {
                let mut tri = Triangle::new(p0, p1, p2);
                tri.base_color = base_color;
                self.triangles.push(tri);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vertex_colors_win() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::ZERO, Vec3::ZERO)
            .with_vertex_colors([
                Rgba::opaque(10, 0, 0),
                Rgba::opaque(20, 0, 0),
                Rgba::opaque(31, 0, 0),
            ])
            .with_base_color(Rgba::opaque(0, 0, 255));
        assert_eq!(tri.sample_color(&ColorSampling::default()), Rgba::opaque(20, 0, 0));
    }

    #[test]
    fn test_sampling_flags() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::ZERO, Vec3::ZERO)
            .with_vertex_colors([Rgba::opaque(1, 1, 1); 3])
            .with_base_color(Rgba::opaque(0, 0, 255));

        let no_vertex = ColorSampling { use_vertex_colors: false, ..ColorSampling::default() };
        assert_eq!(tri.sample_color(&no_vertex), Rgba::opaque(0, 0, 255));

        let none = ColorSampling {
            use_vertex_colors: false,
            use_material_colors: false,
            fallback: Rgba::opaque(9, 9, 9),
        };
        assert_eq!(tri.sample_color(&none), Rgba::opaque(9, 9, 9));
    }

    #[test]
    fn test_uncolored_face_gets_gray() {
        let tri = Triangle::new(Vec3::ZERO, Vec3::ZERO, Vec3::ZERO);
        assert_eq!(tri.sample_color(&ColorSampling::default()), Rgba::NEUTRAL_GRAY);
    }

    #[test]
    fn test_box_bounds() {
        let mut mesh = MeshInput::new();
        assert!(mesh.bounds().is_none());
        mesh.push_box(Vec3::new(-1.0, 0.0, 2.0), Vec3::new(1.0, 3.0, 4.0), None);
        assert_eq!(mesh.len(), 12);
        let bounds = mesh.bounds().unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, 2.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 3.0, 4.0));
    }
}
