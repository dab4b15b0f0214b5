//! Ray/triangle intersection and the seeded ray direction set.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::math::{Aabb, Vec3};
use crate::mesh::Triangle;

/// Hits closer than this along the ray are ignored, as are triangles whose
/// plane is this close to parallel with the ray.
const EPSILON: f32 = 1e-7;

/// Half-line from `origin` along unit `direction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// Start point
    pub origin: Vec3,
    /// Unit direction
    pub direction: Vec3,
}

/// Triangle with its edges precomputed for repeated intersection tests.
#[derive(Debug, Clone, Copy)]
pub struct PreparedTriangle {
    v0: Vec3,
    edge1: Vec3,
    edge2: Vec3,
    bounds: Aabb,
}

impl PreparedTriangle {
    /// Precomputes edges and bounds.
    #[must_use]
    pub fn new(positions: [Vec3; 3]) -> Self {
        let [v0, v1, v2] = positions;
        let mut bounds = Aabb::from_point(v0);
        bounds.include(v1);
        bounds.include(v2);
        Self {
            v0,
            edge1: v1 - v0,
            edge2: v2 - v0,
            bounds,
        }
    }

    /// Bounding box of the triangle.
    #[must_use]
    pub const fn bounds(&self) -> Aabb {
        self.bounds
    }

    /// Möller–Trumbore intersection. Returns the ray parameter `t` of the hit.
    #[must_use]
    pub fn intersect(&self, ray: &Ray) -> Option<f32> {
        let p = ray.direction.cross(self.edge2);
        let det = self.edge1.dot(p);
        if det.abs() < EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;

        let s = ray.origin - self.v0;
        let u = s.dot(p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }

        let q = s.cross(self.edge1);
        let v = ray.direction.dot(q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }

        let t = self.edge2.dot(q) * inv_det;
        (t > EPSILON).then_some(t)
    }
}

impl From<&Triangle> for PreparedTriangle {
    fn from(tri: &Triangle) -> Self {
        Self::new(tri.positions)
    }
}

/// Outcome of casting one ray against a triangle set.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RayHits {
    /// Number of triangles crossed.
    pub crossings: u32,
    /// Closest hit as `(t, triangle index)`.
    pub nearest: Option<(f32, usize)>,
}

impl RayHits {
    /// Odd crossing count: the origin is inside a closed surface.
    #[must_use]
    pub const fn is_inside(&self) -> bool {
        self.crossings % 2 == 1
    }

    /// Counts a hit on triangle `index` at `t`. Equal distances keep the
    /// lower index, so the result does not depend on visiting order.
    pub fn record(&mut self, t: f32, index: usize) {
        self.crossings += 1;
        let closer = self
            .nearest
            .map_or(true, |(best, best_index)| t.total_cmp(&best).then(index.cmp(&best_index)).is_lt());
        if closer {
            self.nearest = Some((t, index));
        }
    }
}

/// Casts `ray` against every triangle, without culling. See
/// [`crate::bvh::Bvh`] for the accelerated version.
#[must_use]
pub fn cast(ray: &Ray, triangles: &[PreparedTriangle]) -> RayHits {
    let mut hits = RayHits::default();
    for (index, tri) in triangles.iter().enumerate() {
        if let Some(t) = tri.intersect(ray) {
            hits.record(t, index);
        }
    }
    hits
}

/// `count` unit directions, uniformly distributed on the sphere, derived
/// from `seed`. The same seed always yields the same set.
#[must_use]
pub fn ray_directions(count: u32, seed: u64) -> Vec<Vec3> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut directions = Vec::with_capacity(count as usize);
    while directions.len() < count as usize {
        let z: f32 = rng.gen_range(-1.0..=1.0);
        let phi: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
        let r = (1.0 - z * z).max(0.0).sqrt();
        let dir = Vec3::new(r * phi.cos(), r * phi.sin(), z);
        // Axis-aligned rays graze the shared edges of axis-aligned meshes.
        let axis_aligned = [dir.x, dir.y, dir.z].iter().filter(|c| c.abs() < 1e-3).count() >= 2;
        if let (false, Some(unit)) = (axis_aligned, dir.normalized()) {
            directions.push(unit);
        }
    }
    directions
}
