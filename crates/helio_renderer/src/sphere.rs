//! Sphere primitive.

use crate::{HitRecord, Primitive, Ray, Shader};
use helio_math::{Aabb, Interval, Mat4, Vec2, Vec3};
use std::f32::consts::PI;
use std::sync::Arc;

/// A sphere primitive.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    shader: Arc<Shader>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, shader: Arc<Shader>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);

        Self {
            center,
            radius,
            shader,
            bbox: Aabb::from_points(center - rvec, center + rvec),
        }
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f32 {
        self.radius
    }
}

impl Primitive for Sphere {
    fn intersect<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return false;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return false;
            }
        }

        rec.t = root;
        rec.p = ray.at(root);
        rec.prim = Some(self);
        true
    }

    fn normal(&self, p: Vec3) -> Vec3 {
        (p - self.center) / self.radius
    }

    fn texture_coords(&self, p: Vec3) -> Vec2 {
        // theta: angle down from +Y, phi: angle around Y axis from +X
        let n = self.normal(p);
        let theta = (-n.y).acos();
        let phi = (-n.z).atan2(n.x) + PI;

        Vec2::new(phi / (2.0 * PI), theta / PI)
    }

    fn shader(&self) -> &Shader {
        &self.shader
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn transform(&mut self, m: &Mat4) {
        self.center = m.transform_point3(self.center);

        // Mean axis stretch; exact for rigid and uniform-scale transforms
        let scale = (m.transform_vector3(Vec3::X).length()
            + m.transform_vector3(Vec3::Y).length()
            + m.transform_vector3(Vec3::Z).length())
            / 3.0;
        self.radius *= scale;

        let rvec = Vec3::splat(self.radius);
        self.bbox = Aabb::from_points(self.center - rvec, self.center + rvec);
    }
}
