//! # Triangle BVH
//!
//! Bounding volume hierarchy over [`PreparedTriangle`]s so a ray only tests
//! triangles whose boxes it passes through.
//!
//! ```text
//! root box
//! ├── left  (lower half of centroids along the longest axis)
//! │   ├── leaf: ≤ 4 triangles
//! │   └── leaf
//! └── right
//!     └── ...
//! ```
//!
//! Nodes are stored depth-first: a branch's left child is the next node, the
//! right child is stored explicitly. Parity counting needs every crossing,
//! so traversal never stops early. [`Bvh::cast`] returns exactly what
//! [`crate::raycast::cast`] returns for the same triangles.

use crate::math::{Aabb, Vec3};
use crate::raycast::{PreparedTriangle, Ray, RayHits};

/// Triangles per leaf.
const LEAF_SIZE: usize = 4;

/// Traversal stack size. Median splits keep the depth below
/// `log2(triangles)`, far under this for any addressable mesh.
const MAX_STACK: usize = 64;

/// Node boxes grow by this fraction of the scene size so hits on a box face
/// survive float error in the slab test.
const RELATIVE_MARGIN: f32 = 1e-5;

#[derive(Debug, Clone, Copy)]
enum NodeKind {
    Leaf { start: usize, len: usize },
    Branch { right: usize },
}

#[derive(Debug, Clone, Copy)]
struct Node {
    bounds: Aabb,
    kind: NodeKind,
}

/// Bounding volume hierarchy over a triangle set.
#[derive(Debug, Clone)]
pub struct Bvh {
    triangles: Vec<PreparedTriangle>,
    order: Vec<usize>,
    nodes: Vec<Node>,
}

impl Bvh {
    /// Builds the hierarchy. Triangle indices in [`RayHits::nearest`] refer
    /// to positions in `triangles`.
    #[must_use]
    pub fn new(triangles: Vec<PreparedTriangle>) -> Self {
        let mut order: Vec<usize> = (0..triangles.len()).collect();
        let mut nodes = Vec::with_capacity(2 * triangles.len() / LEAF_SIZE + 1);

        if let Some(scene) = triangles.iter().map(PreparedTriangle::bounds).reduce(Aabb::union) {
            let scale = scene
                .min
                .to_array()
                .into_iter()
                .chain(scene.max.to_array())
                .fold(1.0f32, |acc, c| acc.max(c.abs()));
            build_node(&triangles, &mut order, 0, scale * RELATIVE_MARGIN, &mut nodes);
        }

        tracing::trace!("Built BVH: {} triangles, {} nodes", triangles.len(), nodes.len());
        Self { triangles, order, nodes }
    }

    /// Number of triangles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// True when there are no triangles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Casts `ray` against every triangle whose box it crosses.
    #[must_use]
    pub fn cast(&self, ray: &Ray) -> RayHits {
        let mut hits = RayHits::default();
        if self.nodes.is_empty() {
            return hits;
        }

        let inv_dir = Vec3::new(1.0 / ray.direction.x, 1.0 / ray.direction.y, 1.0 / ray.direction.z);
        let mut stack = [0usize; MAX_STACK];
        let mut top = 1;

        while top > 0 {
            top -= 1;
            let index = stack[top];
            let node = &self.nodes[index];
            if !crosses(&node.bounds, ray, inv_dir) {
                continue;
            }
            match node.kind {
                NodeKind::Leaf { start, len } => {
                    for &tri in &self.order[start..start + len] {
                        if let Some(t) = self.triangles[tri].intersect(ray) {
                            hits.record(t, tri);
                        }
                    }
                }
                NodeKind::Branch { right } => {
                    stack[top] = right;
                    stack[top + 1] = index + 1;
                    top += 2;
                }
            }
        }
        hits
    }
}

fn build_node(
    triangles: &[PreparedTriangle],
    order: &mut [usize],
    offset: usize,
    margin: f32,
    nodes: &mut Vec<Node>,
) {
    let mut bounds = triangles[order[0]].bounds();
    let mut centroids = Aabb::from_point(bounds.center());
    for &tri in &order[1..] {
        let b = triangles[tri].bounds();
        bounds = bounds.union(b);
        centroids.include(b.center());
    }

    let index = nodes.len();
    nodes.push(Node {
        bounds: bounds.padded(margin),
        kind: NodeKind::Leaf { start: offset, len: order.len() },
    });
    if order.len() <= LEAF_SIZE {
        return;
    }

    let spread = centroids.extent().to_array();
    let axis = (0..3).fold(0, |best, a| if spread[a] > spread[best] { a } else { best });
    if spread[axis] <= 0.0 {
        // All centroids coincide; no split separates them.
        return;
    }

    let key = |tri: usize| triangles[tri].bounds().center().to_array()[axis];
    let mid = order.len() / 2;
    order.select_nth_unstable_by(mid, |&a, &b| key(a).total_cmp(&key(b)));

    let (left, right) = order.split_at_mut(mid);
    build_node(triangles, left, offset, margin, nodes);
    let right_index = nodes.len();
    build_node(triangles, right, offset + mid, margin, nodes);
    nodes[index].kind = NodeKind::Branch { right: right_index };
}

/// Slab test against the half-line `t >= 0`.
fn crosses(bounds: &Aabb, ray: &Ray, inv_dir: Vec3) -> bool {
    let (o, d, lo, hi) = (ray.origin, ray.direction, bounds.min, bounds.max);
    let axes = [
        (o.x, d.x, inv_dir.x, lo.x, hi.x),
        (o.y, d.y, inv_dir.y, lo.y, hi.y),
        (o.z, d.z, inv_dir.z, lo.z, hi.z),
    ];

    let mut t_enter = 0.0f32;
    let mut t_exit = f32::INFINITY;
    for (origin, dir, inv, min, max) in axes {
        if dir == 0.0 {
            if origin < min || origin > max {
                return false;
            }
            continue;
        }
        let t1 = (min - origin) * inv;
        let t2 = (max - origin) * inv;
        t_enter = t_enter.max(t1.min(t2));
        t_exit = t_exit.min(t1.max(t2));
        if t_enter > t_exit {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::MeshInput;
    use crate::raycast::{cast, ray_directions};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    fn scattered_boxes(count: usize, seed: u64) -> Vec<PreparedTriangle> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut mesh = MeshInput::new();
        for _ in 0..count {
            let min = Vec3::new(
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
            );
            let size = Vec3::new(
                rng.gen_range(0.1..2.0),
                rng.gen_range(0.1..2.0),
                rng.gen_range(0.1..2.0),
            );
            mesh.push_box(min, min + size, None);
        }
        mesh.triangles().iter().map(PreparedTriangle::from).collect()
    }

    #[test]
    fn test_matches_exhaustive_cast() {
        let triangles = scattered_boxes(60, 9);
        let bvh = Bvh::new(triangles.clone());
        assert_eq!(bvh.len(), 720);

        let mut rng = ChaCha8Rng::seed_from_u64(10);
        for direction in ray_directions(40, 11) {
            for _ in 0..25 {
                let origin = Vec3::new(
                    rng.gen_range(-6.0..6.0),
                    rng.gen_range(-6.0..6.0),
                    rng.gen_range(-6.0..6.0),
                );
                let ray = Ray { origin, direction };
                assert_eq!(bvh.cast(&ray), cast(&ray, &triangles), "{ray:?}");
            }
        }
    }

    #[test]
    fn test_axis_parallel_rays() {
        let triangles = scattered_boxes(30, 3);
        let bvh = Bvh::new(triangles.clone());
        for direction in [Vec3::new(1.0, 0.0, 0.0), Vec3::new(0.0, -1.0, 0.0), Vec3::new(0.0, 0.0, 1.0)] {
            for step in 0..20u8 {
                let c = f32::from(step) * 0.5 - 5.0;
                let ray = Ray { origin: Vec3::new(c, c * 0.7, -c * 0.3), direction };
                assert_eq!(bvh.cast(&ray), cast(&ray, &triangles));
            }
        }
    }

    #[test]
    fn test_empty_and_coincident() {
        let empty = Bvh::new(Vec::new());
        assert!(empty.is_empty());
        let ray = Ray { origin: Vec3::ZERO, direction: Vec3::new(0.0, 0.0, 1.0) };
        assert_eq!(empty.cast(&ray), RayHits::default());

        // Identical triangles cannot be split and stay in one leaf.
        let tri = PreparedTriangle::new([
            Vec3::new(-1.0, -1.0, 2.0),
            Vec3::new(3.0, -1.0, 2.0),
            Vec3::new(-1.0, 3.0, 2.0),
        ]);
        let bvh = Bvh::new(vec![tri; 9]);
        let hits = bvh.cast(&ray);
        assert_eq!(hits.crossings, 9);
        assert_eq!(hits.nearest.map(|(_, i)| i), Some(0));
    }
}
