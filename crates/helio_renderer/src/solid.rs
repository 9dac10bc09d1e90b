//! Ordered collections of primitives.

use crate::{HitRecord, Primitive, Ray, Shader};
use helio_math::{Aabb, Interval, Mat4, Vec2, Vec3};

/// A solid: an ordered collection of primitives traced as one object.
///
/// Doubles as the operand type of boolean composites (each [`crate::Csg`]
/// owns two of these) and as a plain grouping node for scenes. Member order
/// never affects results; only the nearest hit wins.
pub struct Solid {
    prims: Vec<Box<dyn Primitive>>,
    bbox: Aabb,
}

impl Solid {
    /// Create an empty solid.
    pub fn new() -> Self {
        Self {
            prims: Vec::new(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Create a solid from a list of primitives.
    pub fn from_prims(prims: Vec<Box<dyn Primitive>>) -> Self {
        let mut bbox = Aabb::EMPTY;
        for prim in &prims {
            bbox.extend(&prim.bounding_box());
        }
        Self { prims, bbox }
    }

    /// Add a primitive to the solid.
    pub fn add(&mut self, prim: Box<dyn Primitive>) {
        self.bbox.extend(&prim.bounding_box());
        self.prims.push(prim);
    }

    /// Get the number of member primitives.
    pub fn len(&self) -> usize {
        self.prims.len()
    }

    /// Check if the solid has no members.
    pub fn is_empty(&self) -> bool {
        self.prims.is_empty()
    }

    /// Trace a ray against every member, returning the nearest-hit record.
    ///
    /// Unlike [`Primitive::intersect`] this always returns a fresh record,
    /// which is what the boolean marching loops consume.
    pub(crate) fn trace<'a>(&'a self, ray: &Ray, ray_t: Interval) -> HitRecord<'a> {
        let mut rec = HitRecord::default();
        let mut closest = ray_t.max;

        for prim in &self.prims {
            if prim.intersect(ray, ray_t.capped(closest), &mut rec) {
                closest = rec.t;
            }
        }

        rec
    }

    fn refit(&mut self) {
        self.bbox = Aabb::EMPTY;
        for prim in &self.prims {
            self.bbox.extend(&prim.bounding_box());
        }
    }
}

impl Default for Solid {
    fn default() -> Self {
        Self::new()
    }
}

impl Primitive for Solid {
    fn intersect<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let mut hit_anything = false;
        let mut closest = ray_t.max;

        for prim in &self.prims {
            if prim.intersect(ray, ray_t.capped(closest), rec) {
                hit_anything = true;
                closest = rec.t;
            }
        }

        hit_anything
    }

    fn normal(&self, _p: Vec3) -> Vec3 {
        panic!("a solid is a collection and has no surface normal; query the hit primitive");
    }

    fn texture_coords(&self, _p: Vec3) -> Vec2 {
        panic!("a solid is a collection and has no texture coordinates; query the hit primitive");
    }

    fn shader(&self) -> &Shader {
        panic!("a solid is a collection and carries no shader; query the hit primitive");
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn transform(&mut self, m: &Mat4) {
        for prim in &mut self.prims {
            prim.transform(m);
        }
        self.refit();
    }
}
