//! Boolean (CSG) composite solids.
//!
//! A [`Csg`] node combines two sub-solids with a boolean operator and answers
//! ray queries for the combined shape without ever materializing it. Each
//! query runs a marching loop: both sub-solids are traced independently from
//! an advancing origin, each result is classified as entering/exiting/miss,
//! and an operator-specific decision table either accepts a surface, rejects
//! the ray, or pushes the origin past an intermediate surface and retries.
//! Accepted hits are reported at their distance from the *original* origin,
//! so callers never observe the internal marching.

use crate::{HitRecord, Primitive, Ray, Shader, Solid, RAY_EPSILON};
use helio_math::{Aabb, Interval, Mat4, Vec2, Vec3};

/// Boolean operator combining two sub-solids.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    Union,
    Intersection,
    /// A minus B
    Difference,
}

/// How a traced sub-ray relates to one sub-solid's boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// No surface ahead of the ray
    Miss,
    /// The hit surface faces the ray: the ray is passing into the solid
    Entering,
    /// The hit surface faces away: the ray is passing out of the solid
    Exiting,
}

impl Classification {
    /// Classify a traced record against the ray that produced it.
    pub fn of(ray: &Ray, rec: &HitRecord) -> Self {
        match rec.prim {
            None => Classification::Miss,
            Some(prim) => {
                if prim.normal(rec.p).dot(ray.direction()) < 0.0 {
                    Classification::Entering
                } else {
                    Classification::Exiting
                }
            }
        }
    }
}

/// Refinement step limits per operator.
///
/// Exceeding a limit means the marching origin keeps landing on surfaces
/// without resolving a boundary, which only happens for degenerate or
/// self-intersecting input; it is a fatal invariant failure, not a miss.
const UNION_STEP_LIMIT: u32 = 100;
const INTERSECTION_STEP_LIMIT: u32 = 100;
const DIFFERENCE_STEP_LIMIT: u32 = 10;

/// A boolean composite of two sub-solids.
///
/// Implements [`Primitive`], so composites nest: a `Csg` can be a member of
/// a [`Solid`] that is itself an operand of another `Csg`.
pub struct Csg {
    a: Solid,
    b: Solid,
    op: BoolOp,
    bbox: Aabb,
    /// Rotation/scale pivot; starts at the combined box center and follows
    /// the node under translation.
    pivot: Vec3,
}

impl Csg {
    /// Combine two sub-solids with a boolean operator.
    ///
    /// Both operands must be non-empty.
    pub fn new(a: Solid, b: Solid, op: BoolOp) -> Self {
        debug_assert!(
            !a.is_empty() && !b.is_empty(),
            "boolean operands must be non-empty"
        );

        let bbox = combined_box(&a.bounding_box(), &b.bounding_box(), op);
        log::debug!(
            "csg {:?}: {} + {} prims, bbox {:?}..{:?}",
            op,
            a.len(),
            b.len(),
            bbox.min,
            bbox.max
        );

        Self {
            a,
            b,
            op,
            bbox,
            pivot: bbox.center(),
        }
    }

    /// The boolean operator of this node.
    pub fn op(&self) -> BoolOp {
        self.op
    }

    /// Current rotation/scale pivot.
    pub fn pivot(&self) -> Vec3 {
        self.pivot
    }

    /// Trace both sub-solids from the marching origin and classify.
    fn probe<'a>(
        &'a self,
        march: &Ray,
        trace_t: Interval,
    ) -> (HitRecord<'a>, Classification, HitRecord<'a>, Classification) {
        let hit_a = self.a.trace(march, trace_t);
        let hit_b = self.b.trace(march, trace_t);
        let class_a = Classification::of(march, &hit_a);
        let class_b = Classification::of(march, &hit_b);
        (hit_a, class_a, hit_b, class_b)
    }

    fn march_union<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        use Classification::*;

        let trace_t = Interval::new(ray_t.min.max(RAY_EPSILON), ray_t.max);
        let mut march = *ray;

        for _ in 0..UNION_STEP_LIMIT {
            let (ha, ca, hb, cb) = self.probe(&march, trace_t);

            match (ca, cb) {
                (Miss, Miss) => return false,
                // Region agreement from outside: the nearer surface is exposed
                (Entering, Entering) => {
                    let nearer = if ha.t < hb.t { &ha } else { &hb };
                    return accept(ray, &march, nearer, ray_t, rec);
                }
                // Inside both: the union is only left at the farther exit
                (Exiting, Exiting) => {
                    let farther = if ha.t > hb.t { &ha } else { &hb };
                    return accept(ray, &march, farther, ray_t, rec);
                }
                (_, Miss) => return accept(ray, &march, &ha, ray_t, rec),
                (Miss, _) => return accept(ray, &march, &hb, ray_t, rec),
                (Entering, Exiting) => {
                    if hb.t < ha.t {
                        return accept(ray, &march, &hb, ray_t, rec);
                    }
                    // A's entry is occluded inside B; the exposed union
                    // surface lies further out
                    march = march.advanced_to(ha.p);
                }
                (Exiting, Entering) => {
                    if ha.t < hb.t {
                        return accept(ray, &march, &ha, ray_t, rec);
                    }
                    march = march.advanced_to(hb.p);
                }
            }
        }

        panic!(
            "union marching did not converge within {UNION_STEP_LIMIT} steps; \
             geometry is degenerate or self-intersecting"
        );
    }

    fn march_intersection<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
    ) -> bool {
        use Classification::*;

        let trace_t = Interval::new(ray_t.min.max(RAY_EPSILON), ray_t.max);
        let mut march = *ray;

        for _ in 0..INTERSECTION_STEP_LIMIT {
            let (ha, ca, hb, cb) = self.probe(&march, trace_t);

            match (ca, cb) {
                // No shared volume reachable once either side runs out
                (Miss, _) | (_, Miss) => return false,
                (Entering, Entering) => {
                    if (ha.t - hb.t).abs() < RAY_EPSILON {
                        // Coincident entries: the ray crosses into both
                        // solids at once, which is the shared boundary
                        return accept(ray, &march, &ha, ray_t, rec);
                    }
                    let nearer = if ha.t < hb.t { ha.p } else { hb.p };
                    march = march.advanced_to(nearer);
                }
                // Leaving the shared region through the nearer exit
                (Exiting, Exiting) => {
                    let nearer = if ha.t < hb.t { &ha } else { &hb };
                    return accept(ray, &march, nearer, ray_t, rec);
                }
                (Entering, Exiting) => {
                    if ha.t < hb.t {
                        return accept(ray, &march, &ha, ray_t, rec);
                    }
                    march = march.advanced_to(hb.p);
                }
                (Exiting, Entering) => {
                    if hb.t < ha.t {
                        return accept(ray, &march, &hb, ray_t, rec);
                    }
                    march = march.advanced_to(ha.p);
                }
            }
        }

        panic!(
            "intersection marching did not converge within {INTERSECTION_STEP_LIMIT} steps; \
             geometry is degenerate or self-intersecting"
        );
    }

    fn march_difference<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
    ) -> bool {
        use Classification::*;

        let trace_t = Interval::new(ray_t.min.max(RAY_EPSILON), ray_t.max);
        let mut march = *ray;

        for _ in 0..DIFFERENCE_STEP_LIMIT {
            let (ha, ca, hb, cb) = self.probe(&march, trace_t);

            match (ca, cb) {
                // Nothing of A ahead: nothing to subtract from
                (Miss, _) => return false,
                // B never interferes
                (_, Miss) => return accept(ray, &march, &ha, ray_t, rec),
                (Entering, Entering) => {
                    if ha.t < hb.t {
                        return accept(ray, &march, &ha, ray_t, rec);
                    }
                    // Entry into B excludes that stretch of A
                    march = march.advanced_to(hb.p);
                }
                (Exiting, Exiting) => {
                    if hb.t < ha.t {
                        // B's exit while still inside A: the cavity wall
                        return accept(ray, &march, &hb, ray_t, rec);
                    }
                    march = march.advanced_to(ha.p);
                }
                // Inside the excluded region; skip the nearer surface
                (Entering, Exiting) => {
                    let nearer = if ha.t < hb.t { ha.p } else { hb.p };
                    march = march.advanced_to(nearer);
                }
                // Boundary of the carved solid: whichever comes first
                (Exiting, Entering) => {
                    let nearer = if ha.t < hb.t { &ha } else { &hb };
                    return accept(ray, &march, nearer, ray_t, rec);
                }
            }
        }

        panic!(
            "difference marching did not converge within {DIFFERENCE_STEP_LIMIT} steps; \
             geometry is degenerate or self-intersecting"
        );
    }
}

impl Primitive for Csg {
    fn intersect<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        match self.op {
            BoolOp::Union => self.march_union(ray, ray_t, rec),
            BoolOp::Intersection => self.march_intersection(ray, ray_t, rec),
            BoolOp::Difference => self.march_difference(ray, ray_t, rec),
        }
    }

    fn normal(&self, _p: Vec3) -> Vec3 {
        panic!("a composite solid has no surface normal of its own; query the primitive recorded in the hit");
    }

    fn texture_coords(&self, _p: Vec3) -> Vec2 {
        panic!("a composite solid has no texture coordinates of its own; query the primitive recorded in the hit");
    }

    fn shader(&self) -> &Shader {
        panic!("a composite solid carries no shader of its own; query the primitive recorded in the hit");
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn transform(&mut self, m: &Mat4) {
        // Rotate/scale about the node's own pivot, not the world origin
        let about_pivot =
            Mat4::from_translation(self.pivot) * *m * Mat4::from_translation(-self.pivot);
        self.a.transform(&about_pivot);
        self.b.transform(&about_pivot);

        // The pivot itself only follows the transform's translation
        self.pivot += m.w_axis.truncate();
        self.bbox = combined_box(&self.a.bounding_box(), &self.b.bounding_box(), self.op);
    }
}

/// Combine operand bounding boxes per operator.
///
/// Difference keeps A's box unmodified: B may poke outside it, but the
/// result can never exceed A. A disjoint Intersection yields an inverted
/// box that no ray hits.
fn combined_box(a: &Aabb, b: &Aabb, op: BoolOp) -> Aabb {
    match op {
        BoolOp::Union => Aabb::surrounding(a, b),
        BoolOp::Intersection => Aabb {
            min: a.min.max(b.min),
            max: a.max.min(b.max),
        },
        BoolOp::Difference => *a,
    }
}

/// Accept a candidate surface, re-basing its distance onto the original ray.
///
/// If the marching origin was advanced, the reported distance is the local
/// hit distance plus the distance marched; a hit that no longer improves on
/// the caller's interval is dropped.
fn accept<'a>(
    original: &Ray,
    march: &Ray,
    candidate: &HitRecord<'a>,
    ray_t: Interval,
    rec: &mut HitRecord<'a>,
) -> bool {
    let t = true_distance(original, march, candidate.t);
    if !ray_t.surrounds(t) {
        return false;
    }

    *rec = *candidate;
    rec.t = t;
    true
}

fn true_distance(original: &Ray, march: &Ray, local_t: f32) -> f32 {
    if march.origin() != original.origin() {
        local_t + (march.origin() - original.origin()).length()
    } else {
        local_t
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Sphere};
    use std::sync::Arc;

    const T: Interval = Interval {
        min: RAY_EPSILON,
        max: f32::INFINITY,
    };

    fn solid_sphere(center: Vec3, radius: f32) -> Solid {
        let shader = Arc::new(Shader::flat(Color::splat(0.5)));
        let mut solid = Solid::new();
        solid.add(Box::new(Sphere::new(center, radius, shader)));
        solid
    }

    fn two_unit_spheres(op: BoolOp) -> Csg {
        Csg::new(
            solid_sphere(Vec3::new(-0.5, 0.0, 0.0), 1.0),
            solid_sphere(Vec3::new(0.5, 0.0, 0.0), 1.0),
            op,
        )
    }

    fn hit_t(csg: &Csg, ray: &Ray) -> Option<f32> {
        let mut rec = HitRecord::default();
        csg.intersect(ray, T, &mut rec).then(|| rec.t)
    }

    /// Degenerate surface that reports the same entering hit from every
    /// origin, so marching can never resolve a boundary.
    struct StuckSurface {
        t: f32,
        shader: Arc<Shader>,
    }

    impl Primitive for StuckSurface {
        fn intersect<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
            if !ray_t.surrounds(self.t) {
                return false;
            }
            rec.t = self.t;
            rec.p = ray.at(self.t);
            rec.prim = Some(self);
            true
        }

        fn normal(&self, _p: Vec3) -> Vec3 {
            Vec3::NEG_Z
        }

        fn texture_coords(&self, _p: Vec3) -> Vec2 {
            Vec2::ZERO
        }

        fn shader(&self) -> &Shader {
            &self.shader
        }

        fn bounding_box(&self) -> Aabb {
            Aabb::from_points(Vec3::splat(-1.0), Vec3::splat(1.0))
        }

        fn transform(&mut self, _m: &Mat4) {}
    }

    #[test]
    fn test_miss_both_rejects_for_every_operator() {
        let ray = Ray::new(Vec3::new(0.0, 10.0, -10.0), Vec3::Z);
        for op in [BoolOp::Union, BoolOp::Intersection, BoolOp::Difference] {
            let csg = two_unit_spheres(op);
            assert_eq!(hit_t(&csg, &ray), None, "{op:?} must miss");
        }
    }

    #[test]
    fn test_union_with_self_is_idempotent() {
        let csg = Csg::new(
            solid_sphere(Vec3::ZERO, 1.0),
            solid_sphere(Vec3::ZERO, 1.0),
            BoolOp::Union,
        );
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);

        let t = hit_t(&csg, &ray).expect("self-union must hit");
        assert!((t - 9.0).abs() < 1e-3, "sphere alone hits at t=9, got {t}");
    }

    #[test]
    fn test_intersection_with_self_is_idempotent() {
        let csg = Csg::new(
            solid_sphere(Vec3::ZERO, 1.0),
            solid_sphere(Vec3::ZERO, 1.0),
            BoolOp::Intersection,
        );
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);

        let t = hit_t(&csg, &ray).expect("self-intersection must hit");
        assert!((t - 9.0).abs() < 1e-3, "sphere alone hits at t=9, got {t}");
    }

    #[test]
    fn test_difference_with_self_is_empty() {
        let csg = Csg::new(
            solid_sphere(Vec3::ZERO, 1.0),
            solid_sphere(Vec3::ZERO, 1.0),
            BoolOp::Difference,
        );

        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);
        assert_eq!(hit_t(&csg, &ray), None, "A minus A is the empty solid");

        let inside = Ray::new(Vec3::new(0.0, 0.2, 0.0), Vec3::Z);
        assert_eq!(hit_t(&csg, &inside), None);
    }

    #[test]
    fn test_disjoint_intersection_never_hits() {
        let csg = Csg::new(
            solid_sphere(Vec3::new(-3.0, 0.0, 0.0), 1.0),
            solid_sphere(Vec3::new(3.0, 0.0, 0.0), 1.0),
            BoolOp::Intersection,
        );

        // Through A only, through B only, through neither
        for origin in [
            Vec3::new(-3.0, 0.0, -10.0),
            Vec3::new(3.0, 0.0, -10.0),
            Vec3::new(0.0, 0.0, -10.0),
        ] {
            let ray = Ray::new(origin, Vec3::Z);
            assert_eq!(hit_t(&csg, &ray), None, "disjoint operands share no volume");
        }
    }

    #[test]
    fn test_ray_inside_a_far_from_b_behaves_like_a_alone() {
        let a = Vec3::ZERO;
        let b = Vec3::new(50.0, 0.0, 0.0);
        let ray = Ray::new(Vec3::ZERO, Vec3::Z);

        // Sphere A alone exits at t=1
        for op in [BoolOp::Union, BoolOp::Difference] {
            let csg = Csg::new(solid_sphere(a, 1.0), solid_sphere(b, 1.0), op);
            let t = hit_t(&csg, &ray).expect("must hit A's surface");
            assert!((t - 1.0).abs() < 1e-3, "{op:?}: expected t=1, got {t}");
        }
    }

    #[test]
    fn test_union_front_surface_of_two_overlapping_spheres() {
        let csg = two_unit_spheres(BoolOp::Union);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);

        // Both spheres are entered at z = -sqrt(1 - 0.25)
        let expected = 10.0 - (0.75f32).sqrt();
        let t = hit_t(&csg, &ray).expect("union must hit");
        assert!((t - expected).abs() < 1e-3, "expected {expected}, got {t}");

        // Shadow-style probe agrees and leaves its ray untouched
        let probe = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);
        assert!(csg.if_intersect(&probe, T));
    }

    #[test]
    fn test_union_from_inside_reports_far_exit() {
        let csg = two_unit_spheres(BoolOp::Union);

        // Origin inside A only; the union is left through B's far surface
        // at x=1.5, after one marching restart at B's occluded entry
        let ray = Ray::new(Vec3::new(-1.2, 0.0, 0.0), Vec3::X);
        let t = hit_t(&csg, &ray).expect("union must hit from inside");
        assert!((t - 2.7).abs() < 1e-3, "expected exit at x=1.5 (t=2.7), got {t}");
    }

    #[test]
    fn test_intersection_reports_lens_entry() {
        let csg = two_unit_spheres(BoolOp::Intersection);

        // Through both centers: the lens spans x in [-0.5, 0.5]; its entry
        // is B's entry surface, not A's
        let ray = Ray::new(Vec3::new(-10.0, 0.0, 0.0), Vec3::X);
        let t = hit_t(&csg, &ray).expect("ray through the lens must hit");
        assert!((t - 9.5).abs() < 1e-3, "lens entry at x=-0.5 (t=9.5), got {t}");
    }

    #[test]
    fn test_intersection_misses_outside_lens() {
        let csg = two_unit_spheres(BoolOp::Intersection);

        // At y=0.9 both spheres are pierced but their chords do not overlap
        let ray = Ray::new(Vec3::new(-10.0, 0.9, 0.0), Vec3::X);
        assert_eq!(hit_t(&csg, &ray), None, "no shared volume off the lens axis");
    }

    #[test]
    fn test_difference_hollow_sphere() {
        let csg = Csg::new(
            solid_sphere(Vec3::ZERO, 1.0),
            solid_sphere(Vec3::ZERO, 0.5),
            BoolOp::Difference,
        );

        // From outside: the outer entry surface
        let outside = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);
        let t = hit_t(&csg, &outside).expect("outer shell must be hit");
        assert!((t - 9.0).abs() < 1e-3, "outer entry at t=9, got {t}");

        // From the carved-out center: the cavity wall, never empty space
        let center = Ray::new(Vec3::ZERO, Vec3::Z);
        let t = hit_t(&csg, &center).expect("cavity wall must be hit");
        assert!((t - 0.5).abs() < 1e-3, "cavity wall at t=0.5, got {t}");

        // From within the shell material: the cavity is entered first
        let shell = Ray::new(Vec3::new(0.0, 0.0, -0.75), Vec3::Z);
        let t = hit_t(&csg, &shell).expect("shell interior must resolve");
        assert!((t - 0.25).abs() < 1e-3, "cavity entry at t=0.25, got {t}");
    }

    #[test]
    fn test_bounding_boxes_per_operator() {
        let a = solid_sphere(Vec3::new(-0.5, 0.0, 0.0), 1.0);
        let b = solid_sphere(Vec3::new(0.5, 0.0, 0.0), 1.0);
        let a_box = a.bounding_box();

        let union = Csg::new(
            solid_sphere(Vec3::new(-0.5, 0.0, 0.0), 1.0),
            solid_sphere(Vec3::new(0.5, 0.0, 0.0), 1.0),
            BoolOp::Union,
        );
        assert!((union.bounding_box().min.x + 1.5).abs() < 1e-3);
        assert!((union.bounding_box().max.x - 1.5).abs() < 1e-3);

        let inter = Csg::new(
            solid_sphere(Vec3::new(-0.5, 0.0, 0.0), 1.0),
            solid_sphere(Vec3::new(0.5, 0.0, 0.0), 1.0),
            BoolOp::Intersection,
        );
        assert!((inter.bounding_box().min.x + 0.5).abs() < 1e-3);
        assert!((inter.bounding_box().max.x - 0.5).abs() < 1e-3);

        let diff = Csg::new(a, b, BoolOp::Difference);
        assert_eq!(diff.bounding_box().min, a_box.min);
        assert_eq!(diff.bounding_box().max, a_box.max);
    }

    #[test]
    fn test_pivot_is_combined_box_center() {
        let csg = Csg::new(
            solid_sphere(Vec3::new(1.0, 0.0, 0.0), 0.5),
            solid_sphere(Vec3::new(3.0, 0.0, 0.0), 0.5),
            BoolOp::Union,
        );
        assert!((csg.pivot() - Vec3::new(2.0, 0.0, 0.0)).length() < 1e-3);
    }

    #[test]
    fn test_rotation_pivots_about_node_center() {
        let mut csg = Csg::new(
            solid_sphere(Vec3::new(1.0, 0.0, 0.0), 0.5),
            solid_sphere(Vec3::new(3.0, 0.0, 0.0), 0.5),
            BoolOp::Union,
        );

        // A half turn about the pivot (2,0,0) swaps the spheres in place;
        // about the world origin it would fling them to negative x
        csg.transform(&Mat4::from_rotation_y(std::f32::consts::PI));

        let ray = Ray::new(Vec3::new(1.0, 0.0, -10.0), Vec3::Z);
        let t = hit_t(&csg, &ray).expect("sphere must still sit at x=1");
        assert!((t - 9.5).abs() < 1e-2, "expected t=9.5, got {t}");
    }

    #[test]
    fn test_pivot_follows_translation() {
        let mut csg = Csg::new(
            solid_sphere(Vec3::new(1.0, 0.0, 0.0), 0.5),
            solid_sphere(Vec3::new(3.0, 0.0, 0.0), 0.5),
            BoolOp::Union,
        );

        csg.transform(&Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)));
        assert!((csg.pivot() - Vec3::new(4.0, 0.0, 0.0)).length() < 1e-3);

        // Rotation now pivots about the moved center (4,0,0): spheres at
        // x=3 and x=5 swap in place
        csg.transform(&Mat4::from_rotation_y(std::f32::consts::PI));
        let ray = Ray::new(Vec3::new(3.0, 0.0, -10.0), Vec3::Z);
        let t = hit_t(&csg, &ray).expect("sphere must sit at x=3");
        assert!((t - 9.5).abs() < 1e-2, "expected t=9.5, got {t}");
    }

    #[test]
    fn test_translation_composition_matches_composed_matrix() {
        let make = || two_unit_spheres(BoolOp::Union);
        let rays = [
            Ray::new(Vec3::new(1.0, 1.0, -10.0), Vec3::Z),
            Ray::new(Vec3::new(0.5, 0.0, -10.0), Vec3::Z),
        ];

        let t1 = Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0));
        let t2 = Mat4::from_translation(Vec3::new(0.0, 1.0, 0.0));

        let mut stepwise = make();
        stepwise.transform(&t1);
        stepwise.transform(&t2);

        let mut composed = make();
        composed.transform(&(t2 * t1));

        for ray in &rays {
            match (hit_t(&stepwise, ray), hit_t(&composed, ray)) {
                (Some(a), Some(b)) => assert!((a - b).abs() < 1e-3, "{a} vs {b}"),
                (a, b) => assert_eq!(a.is_some(), b.is_some()),
            }
        }
    }

    #[test]
    fn test_rotation_composition_matches_composed_matrix() {
        // Asymmetric operands so rotations are observable
        let make = || {
            Csg::new(
                solid_sphere(Vec3::new(-0.5, 0.0, 0.0), 1.0),
                solid_sphere(Vec3::new(0.5, 0.0, 0.0), 0.6),
                BoolOp::Union,
            )
        };
        let ray = Ray::new(Vec3::new(0.4, 0.1, -10.0), Vec3::Z);

        let r1 = Mat4::from_rotation_y(0.3);
        let r2 = Mat4::from_rotation_y(0.5);

        let mut stepwise = make();
        stepwise.transform(&r1);
        stepwise.transform(&r2);

        let mut composed = make();
        composed.transform(&(r2 * r1));

        let a = hit_t(&stepwise, &ray).expect("rotated union must hit");
        let b = hit_t(&composed, &ray).expect("rotated union must hit");
        assert!((a - b).abs() < 1e-3, "{a} vs {b}");
    }

    #[test]
    fn test_nested_composites() {
        // (outer minus inner) unioned with a side sphere
        let hollow = Csg::new(
            solid_sphere(Vec3::ZERO, 1.0),
            solid_sphere(Vec3::ZERO, 0.5),
            BoolOp::Difference,
        );
        let mut left = Solid::new();
        left.add(Box::new(hollow));

        let csg = Csg::new(left, solid_sphere(Vec3::new(3.0, 0.0, 0.0), 1.0), BoolOp::Union);

        let through_shell = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);
        let t = hit_t(&csg, &through_shell).expect("nested shell must be hit");
        assert!((t - 9.0).abs() < 1e-3);

        let through_side = Ray::new(Vec3::new(3.0, 0.0, -10.0), Vec3::Z);
        let t = hit_t(&csg, &through_side).expect("side sphere must be hit");
        assert!((t - 9.0).abs() < 1e-3);
    }

    #[test]
    fn test_hit_beyond_current_best_is_dropped() {
        let csg = two_unit_spheres(BoolOp::Union);
        let ray = Ray::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z);

        // Something else already hit at t=5; the union at ~9.1 must not win
        let mut rec = HitRecord::default();
        rec.t = 5.0;
        assert!(!csg.intersect(&ray, Interval::new(RAY_EPSILON, 5.0), &mut rec));
        assert_eq!(rec.t, 5.0);
    }

    #[test]
    #[should_panic(expected = "did not converge")]
    fn test_intersection_step_limit_is_fatal() {
        // Both operands keep reporting an entering surface ahead of the
        // advancing origin, so no decision-table arm can ever terminate
        let shader = Arc::new(Shader::flat(Color::splat(0.5)));
        let mut a = Solid::new();
        a.add(Box::new(StuckSurface {
            t: 0.5,
            shader: Arc::clone(&shader),
        }));
        let mut b = Solid::new();
        b.add(Box::new(StuckSurface { t: 0.7, shader }));

        let csg = Csg::new(a, b, BoolOp::Intersection);
        let mut rec = HitRecord::default();
        csg.intersect(&Ray::new(Vec3::ZERO, Vec3::Z), T, &mut rec);
    }

    #[test]
    #[should_panic]
    fn test_normal_on_composite_is_fatal() {
        let csg = two_unit_spheres(BoolOp::Union);
        csg.normal(Vec3::ZERO);
    }

    #[test]
    #[should_panic]
    fn test_texture_coords_on_composite_is_fatal() {
        let csg = two_unit_spheres(BoolOp::Union);
        csg.texture_coords(Vec3::ZERO);
    }
}
