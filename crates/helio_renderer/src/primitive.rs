//! Primitive capability trait and the best-hit record.

use crate::{Ray, Shader};
use helio_math::{Aabb, Interval, Vec2, Vec3};

/// Minimum ray parameter accepted by intersection queries.
///
/// Keeps secondary rays (shadow, reflection, boolean marching restarts) from
/// re-hitting the surface they start on.
pub const RAY_EPSILON: f32 = 1e-3;

/// Record of the nearest intersection found so far.
///
/// Threaded through every intersection call; a primitive writes it only when
/// it finds a hit strictly closer than the caller's interval allows. The
/// record keeps a reference to the primitive that was hit so that normals,
/// texture coordinates, and the shader can be queried afterwards.
#[derive(Debug, Clone, Copy)]
pub struct HitRecord<'a> {
    /// Ray parameter of the hit
    pub t: f32,
    /// World-space hit point
    pub p: Vec3,
    /// The primitive that produced the hit, if any
    pub prim: Option<&'a dyn Primitive>,
}

impl<'a> Default for HitRecord<'a> {
    fn default() -> Self {
        Self {
            t: f32::INFINITY,
            p: Vec3::ZERO,
            prim: None,
        }
    }
}

impl<'a> HitRecord<'a> {
    /// Whether any hit has been recorded.
    pub fn is_hit(&self) -> bool {
        self.prim.is_some()
    }
}

impl std::fmt::Debug for dyn Primitive + '_ {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Primitive({:?})", self.bounding_box())
    }
}

/// Capability set shared by every ray-traceable object.
///
/// Planes, spheres, groups, BVH nodes, and boolean composites all implement
/// this trait, so composites can nest arbitrarily: a [`crate::Csg`] node is
/// just another primitive.
pub trait Primitive: Send + Sync {
    /// Find the nearest intersection within `ray_t`.
    ///
    /// On success the record is updated and `true` is returned. The record
    /// is only touched when the new hit improves on `ray_t.max`.
    fn intersect<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool;

    /// Existence-only query (shadow tests).
    ///
    /// Never mutates caller state; the default probes a disposable record.
    fn if_intersect(&self, ray: &Ray, ray_t: Interval) -> bool {
        let mut probe = HitRecord::default();
        self.intersect(ray, ray_t, &mut probe)
    }

    /// Outward surface normal at a point on the primitive's boundary.
    fn normal(&self, p: Vec3) -> Vec3;

    /// Texture coordinates at a point on the primitive's boundary.
    fn texture_coords(&self, p: Vec3) -> Vec2;

    /// The shader bound to this primitive.
    fn shader(&self) -> &Shader;

    /// Axis-aligned bounding box in world space.
    fn bounding_box(&self) -> Aabb;

    /// Apply an affine transform to the primitive's geometry.
    fn transform(&mut self, m: &helio_math::Mat4);
}
