//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A binary tree over primitives for efficient ray-scene intersection.
//! Composites and solids are primitives like any other, so a BVH can hold
//! whole boolean trees next to loose spheres and planes.

use crate::{HitRecord, Primitive, Ray, Shader};
use helio_math::{Aabb, Interval, Mat4, Vec2, Vec3};

/// Maximum primitives per leaf node before splitting.
const LEAF_MAX_SIZE: usize = 4;

/// BVH node - either a branch with two children or a leaf with primitives.
///
/// Using an enum allows for more cache-efficient traversal since
/// we avoid dynamic dispatch overhead.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf node with a small number of primitives.
    Leaf {
        objects: Vec<Box<dyn Primitive>>,
        bbox: Aabb,
    },
    /// Empty node (for edge cases).
    Empty,
}

impl BvhNode {
    /// Create a BVH from a list of primitives.
    pub fn new(objects: Vec<Box<dyn Primitive>>) -> Self {
        if objects.is_empty() {
            return BvhNode::Empty;
        }
        log::debug!("building bvh over {} objects", objects.len());

        // Unbounded primitives (infinite planes) have no usable centroid
        // for splitting; they go into a flat leaf beside the tree
        let (bounded, unbounded): (Vec<_>, Vec<_>) = objects
            .into_iter()
            .partition(|o| o.bounding_box().is_finite());

        if unbounded.is_empty() {
            return Self::build(bounded);
        }
        let leaf = Self::flat_leaf(unbounded);
        if bounded.is_empty() {
            return leaf;
        }

        let tree = Self::build(bounded);
        let bbox = Aabb::surrounding(&tree.bounding_box(), &leaf.bounding_box());
        BvhNode::Branch {
            left: Box::new(tree),
            right: Box::new(leaf),
            bbox,
        }
    }

    /// Leaf over objects that never participate in splitting.
    fn flat_leaf(objects: Vec<Box<dyn Primitive>>) -> Self {
        let mut bbox = Aabb::EMPTY;
        for obj in &objects {
            bbox.extend(&obj.bounding_box());
        }
        BvhNode::Leaf { objects, bbox }
    }

    /// Recursive BVH construction.
    ///
    /// Simple median-split approach: sort objects by centroid on longest axis,
    /// split in half, recurse.
    fn build(mut objects: Vec<Box<dyn Primitive>>) -> Self {
        let n = objects.len();

        // Compute bounding box of all objects
        let bounds = objects
            .iter()
            .map(|o| o.bounding_box())
            .fold(objects[0].bounding_box(), |acc, b| {
                Aabb::surrounding(&acc, &b)
            });

        // Create leaf for small sets
        if n <= LEAF_MAX_SIZE {
            return BvhNode::Leaf {
                objects,
                bbox: bounds,
            };
        }

        // Compute centroid bounds to choose split axis
        let centroid_bounds = objects.iter().fold(Aabb::EMPTY, |acc, obj| {
            let c = obj.bounding_box().center();
            Aabb::surrounding(&acc, &Aabb::from_points(c, c))
        });

        // Choose split axis based on centroid spread
        let axis = centroid_bounds.longest_axis();

        // Sort objects by centroid on chosen axis
        objects.sort_unstable_by(|a, b| {
            let a_val = a.bounding_box().center()[axis];
            let b_val = b.bounding_box().center()[axis];
            a_val
                .partial_cmp(&b_val)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        // Split at midpoint
        let mid = n / 2;
        let right_objects = objects.split_off(mid);
        let left_objects = objects;

        // Recurse
        let left = Self::build(left_objects);
        let right = Self::build(right_objects);

        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox: bounds,
        }
    }
}

impl Primitive for BvhNode {
    fn intersect<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        match self {
            BvhNode::Empty => false,

            BvhNode::Leaf { objects, bbox } => {
                if !bbox.hit(ray.origin(), ray.direction(), ray_t) {
                    return false;
                }

                let mut hit_anything = false;
                let mut closest = ray_t.max;

                for obj in objects {
                    let interval = Interval::new(ray_t.min, closest);
                    if obj.intersect(ray, interval, rec) {
                        hit_anything = true;
                        closest = rec.t;
                    }
                }
                hit_anything
            }

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray.origin(), ray.direction(), ray_t) {
                    return false;
                }

                let hit_left = left.intersect(ray, ray_t, rec);

                // Only check right up to closest hit
                let right_max = if hit_left { rec.t } else { ray_t.max };
                let hit_right = right.intersect(ray, Interval::new(ray_t.min, right_max), rec);

                hit_left || hit_right
            }
        }
    }

    fn normal(&self, _p: Vec3) -> Vec3 {
        panic!("a BVH node has no surface normal; query the hit primitive");
    }

    fn texture_coords(&self, _p: Vec3) -> Vec2 {
        panic!("a BVH node has no texture coordinates; query the hit primitive");
    }

    fn shader(&self) -> &Shader {
        panic!("a BVH node carries no shader; query the hit primitive");
    }

    fn bounding_box(&self) -> Aabb {
        match self {
            BvhNode::Empty => Aabb::EMPTY,
            BvhNode::Leaf { bbox, .. } => *bbox,
            BvhNode::Branch { bbox, .. } => *bbox,
        }
    }

    /// Transform every held primitive and refit boxes bottom-up.
    ///
    /// The tree topology is kept as-is; a heavily rotated scene may want
    /// a rebuild instead.
    fn transform(&mut self, m: &Mat4) {
        match self {
            BvhNode::Empty => {}
            BvhNode::Leaf { objects, bbox } => {
                let mut bounds = Aabb::EMPTY;
                for obj in objects.iter_mut() {
                    obj.transform(m);
                    bounds.extend(&obj.bounding_box());
                }
                *bbox = bounds;
            }
            BvhNode::Branch { left, right, bbox } => {
                left.transform(m);
                right.transform(m);
                *bbox = Aabb::surrounding(&left.bounding_box(), &right.bounding_box());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BoolOp, Color, Csg, Plane, Solid, Sphere};
    use std::sync::Arc;

    fn sphere(center: Vec3, radius: f32) -> Box<dyn Primitive> {
        Box::new(Sphere::new(
            center,
            radius,
            Arc::new(Shader::flat(Color::new(0.5, 0.5, 0.5))),
        ))
    }

    #[test]
    fn test_bvh_empty() {
        let bvh = BvhNode::new(vec![]);
        assert!(matches!(bvh, BvhNode::Empty));
    }

    #[test]
    fn test_bvh_single_sphere() {
        let bvh = BvhNode::new(vec![sphere(Vec3::new(0.0, 0.0, -1.0), 0.5)]);

        // Should create a leaf
        assert!(matches!(bvh, BvhNode::Leaf { .. }));

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(bvh.intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let spheres: Vec<Box<dyn Primitive>> = (0..10)
            .map(|i| sphere(Vec3::new(i as f32, 0.0, -5.0), 0.5))
            .collect();

        let bvh = BvhNode::new(spheres);

        // Ray that hits the sphere at x=5
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(bvh.intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));

        // Hit point should be near z = -4.5 (sphere at z=-5, radius 0.5)
        assert!((rec.p.z - (-4.5)).abs() < 0.01);
    }

    #[test]
    fn test_bvh_holds_composites() {
        let mut a = Solid::new();
        a.add(sphere(Vec3::new(0.0, 0.0, -5.0), 1.0));
        let mut b = Solid::new();
        b.add(sphere(Vec3::new(0.0, 0.0, -5.0), 0.5));

        let hollow = Csg::new(a, b, BoolOp::Difference);
        let bvh = BvhNode::new(vec![Box::new(hollow), sphere(Vec3::new(3.0, 0.0, -5.0), 1.0)]);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(bvh.intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
        assert!((rec.t - 4.0).abs() < 0.001, "outer shell at t=4, got {}", rec.t);
    }

    #[test]
    fn test_bvh_splits_with_infinite_plane() {
        // Enough spheres to force a median split, plus an unbounded plane
        // whose box would poison centroid sorting
        let mut objects: Vec<Box<dyn Primitive>> = (0..6)
            .map(|i| sphere(Vec3::new(i as f32, 0.0, -5.0), 0.5))
            .collect();
        objects.push(Box::new(Plane::new(
            Vec3::new(0.0, -2.0, 0.0),
            Vec3::Y,
            Arc::new(Shader::flat(Color::new(0.5, 0.5, 0.5))),
        )));

        let bvh = BvhNode::new(objects);

        let down = Ray::new(Vec3::new(0.0, 5.0, 3.0), Vec3::NEG_Y);
        let mut rec = HitRecord::default();
        assert!(bvh.intersect(&down, Interval::new(0.001, f32::INFINITY), &mut rec));
        assert!((rec.t - 7.0).abs() < 0.001, "plane at y=-2, got {}", rec.t);

        let across = Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(bvh.intersect(&across, Interval::new(0.001, f32::INFINITY), &mut rec));
        assert!((rec.t - 4.5).abs() < 0.001, "sphere at z=-5, got {}", rec.t);
    }

    #[test]
    fn test_bvh_transform_refits_boxes() {
        let spheres: Vec<Box<dyn Primitive>> = (0..8)
            .map(|i| sphere(Vec3::new(i as f32, 0.0, 0.0), 0.5))
            .collect();

        let mut bvh = BvhNode::new(spheres);
        bvh.transform(&Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)));

        let bbox = bvh.bounding_box();
        assert!((bbox.center().z + 5.0).abs() < 0.001);

        let ray = Ray::new(Vec3::new(3.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();
        assert!(bvh.intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
        assert!((rec.t - 4.5).abs() < 0.001);
    }
}
