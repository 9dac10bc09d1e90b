//! Infinite plane primitive.

use crate::{HitRecord, Primitive, Ray, Shader};
use helio_math::{Aabb, Interval, Mat4, Vec2, Vec3};
use std::sync::Arc;

/// An infinite plane given by a point and a unit normal.
pub struct Plane {
    origin: Vec3,
    normal: Vec3,
    // In-plane basis for texture coordinates
    u: Vec3,
    v: Vec3,
    shader: Arc<Shader>,
}

impl Plane {
    /// Create a new plane through `origin` with the given normal.
    pub fn new(origin: Vec3, normal: Vec3, shader: Arc<Shader>) -> Self {
        let normal = normal.normalize();
        let u = normal.any_orthonormal_vector();
        let v = normal.cross(u);

        Self {
            origin,
            normal,
            u,
            v,
            shader,
        }
    }
}

impl Primitive for Plane {
    fn intersect<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let dist = (self.origin - ray.origin()).dot(self.normal) / ray.direction().dot(self.normal);
        if !dist.is_finite() || !ray_t.surrounds(dist) {
            return false;
        }

        rec.t = dist;
        rec.p = ray.at(dist);
        rec.prim = Some(self);
        true
    }

    fn normal(&self, _p: Vec3) -> Vec3 {
        self.normal
    }

    fn texture_coords(&self, p: Vec3) -> Vec2 {
        let local = p - self.origin;
        Vec2::new(local.dot(self.u), local.dot(self.v))
    }

    fn shader(&self) -> &Shader {
        &self.shader
    }

    fn bounding_box(&self) -> Aabb {
        // Unbounded, except flat along an axis-aligned normal
        let mut min = Vec3::NEG_INFINITY;
        let mut max = Vec3::INFINITY;
        for axis in 0..3 {
            if self.normal[axis].abs() == 1.0 {
                min[axis] = self.origin[axis];
                max[axis] = self.origin[axis];
                break;
            }
        }
        Aabb::from_points(min, max)
    }

    fn transform(&mut self, m: &Mat4) {
        self.origin = m.transform_point3(self.origin);

        // Normals transform by the inverse transpose
        let nt = m.inverse().transpose();
        self.normal = nt.transform_vector3(self.normal).normalize();
        self.u = self.normal.any_orthonormal_vector();
        self.v = self.normal.cross(self.u);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Color;

    fn gray() -> Arc<Shader> {
        Arc::new(Shader::flat(Color::new(0.5, 0.5, 0.5)))
    }

    #[test]
    fn test_plane_hit() {
        let plane = Plane::new(Vec3::ZERO, Vec3::Y, gray());

        let ray = Ray::new(Vec3::new(0.0, 2.0, 0.0), Vec3::NEG_Y);
        let mut rec = HitRecord::default();

        assert!(plane.intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
        assert!((rec.t - 2.0).abs() < 1e-5);
        assert_eq!(plane.normal(rec.p), Vec3::Y);
    }

    #[test]
    fn test_plane_parallel_ray_misses() {
        let plane = Plane::new(Vec3::ZERO, Vec3::Y, gray());

        let ray = Ray::new(Vec3::new(0.0, 1.0, 0.0), Vec3::X);
        let mut rec = HitRecord::default();

        assert!(!plane.intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
    }

    #[test]
    fn test_plane_behind_ray_misses() {
        let plane = Plane::new(Vec3::ZERO, Vec3::Y, gray());

        let ray = Ray::new(Vec3::new(0.0, 2.0, 0.0), Vec3::Y);
        let mut rec = HitRecord::default();

        assert!(!plane.intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
    }

    #[test]
    fn test_plane_bounding_box_flat_axis() {
        let plane = Plane::new(Vec3::new(0.0, 3.0, 0.0), Vec3::Y, gray());
        let bbox = plane.bounding_box();

        assert!(bbox.min.x.is_infinite());
        assert!(bbox.max.z.is_infinite());
        // Flat along Y, padded to minimum thickness
        assert!((bbox.min.y - 3.0).abs() < 0.001);
        assert!((bbox.max.y - 3.0).abs() < 0.001);
    }

    #[test]
    fn test_plane_transform_translation() {
        let mut plane = Plane::new(Vec3::ZERO, Vec3::Y, gray());
        plane.transform(&Mat4::from_translation(Vec3::new(0.0, 5.0, 0.0)));

        let ray = Ray::new(Vec3::new(0.0, 7.0, 0.0), Vec3::NEG_Y);
        let mut rec = HitRecord::default();

        assert!(plane.intersect(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
        assert!((rec.t - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_plane_texture_coords_in_plane() {
        let plane = Plane::new(Vec3::ZERO, Vec3::Y, gray());
        let uv = plane.texture_coords(Vec3::new(3.0, 0.0, 4.0));

        // Projection preserves in-plane distance
        assert!((uv.length() - 5.0).abs() < 1e-4);
    }
}
