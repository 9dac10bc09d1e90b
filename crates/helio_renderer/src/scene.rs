//! Scene container and recursive (Whitted-style) shading.

use crate::{Color, HitRecord, Light, Primitive, Ray, RAY_EPSILON};
use helio_math::{Interval, Vec3};

/// Color returned when the recursion depth budget runs out.
const EXIT_COLOR: Color = Color::new(0.4, 0.4, 0.4);

/// A renderable scene: geometry root, lights, and background.
///
/// The root is any [`Primitive`], typically a [`crate::BvhNode`] over the
/// top-level objects.
pub struct Scene {
    root: Box<dyn Primitive>,
    lights: Vec<Box<dyn Light>>,
    background: Color,
    max_bounces: u32,
}

impl Scene {
    pub fn new(root: Box<dyn Primitive>) -> Self {
        Self {
            root,
            lights: Vec::new(),
            background: Color::new(0.1, 0.1, 0.1),
            max_bounces: 5,
        }
    }

    pub fn add_light(&mut self, light: Box<dyn Light>) {
        self.lights.push(light);
    }

    pub fn with_background(mut self, background: Color) -> Self {
        self.background = background;
        self
    }

    pub fn with_max_bounces(mut self, max_bounces: u32) -> Self {
        self.max_bounces = max_bounces;
        self
    }

    /// Trace a ray into the scene and return its color.
    pub fn ray_trace(&self, ray: &Ray) -> Color {
        let mut rec = HitRecord::default();
        if !self
            .root
            .intersect(ray, Interval::new(RAY_EPSILON, f32::INFINITY), &mut rec)
        {
            return self.background;
        }
        self.shade(ray, &rec)
    }

    /// Whether anything blocks the ray before `max_t`.
    pub fn occluded(&self, ray: &Ray, max_t: f32) -> bool {
        self.root
            .if_intersect(ray, Interval::new(RAY_EPSILON, max_t))
    }

    /// Spawn a secondary ray, honoring the recursion budget.
    fn re_trace(&self, ray: &Ray) -> Color {
        if ray.bounce() > self.max_bounces {
            return EXIT_COLOR;
        }
        self.ray_trace(ray)
    }

    fn shade(&self, ray: &Ray, rec: &HitRecord) -> Color {
        // A hit record always carries its primitive; a miss never reaches here
        let prim = match rec.prim {
            Some(prim) => prim,
            None => return self.background,
        };

        let d = ray.direction().normalize();
        let mut n = prim.normal(rec.p);

        // Shade the face the ray sees
        let inside = n.dot(d) > 0.0;
        if inside {
            n = -n;
        }

        let shader = prim.shader();
        let base = shader.base_color(rec.p);

        let mut color = shader.ka * base;

        for light in &self.lights {
            let Some(sample) = light.illuminate(rec.p) else {
                continue;
            };

            if light.casts_shadow() {
                let shadow_ray = Ray::new(rec.p, sample.direction);
                if self.occluded(&shadow_ray, sample.distance) {
                    continue;
                }
            }

            let cos_theta = n.dot(sample.direction).max(0.0);
            color += shader.kd * cos_theta * base * sample.radiance;

            if shader.ks > 0.0 {
                let r = reflect(-sample.direction, n);
                let highlight = r.dot(-d).max(0.0).powf(shader.ke);
                color += shader.ks * highlight * sample.radiance;
            }
        }

        if shader.km > 0.0 {
            let reflected = Ray::with_bounce(rec.p, reflect(d, n), ray.bounce() + 1);
            color += shader.km * self.re_trace(&reflected);
        }

        if shader.kt > 0.0 {
            let ratio = if inside {
                shader.ior
            } else {
                1.0 / shader.ior
            };

            // Total internal reflection falls back to the mirror direction
            let dir = refract(d, n, ratio).unwrap_or_else(|| reflect(d, n));
            let transmitted = Ray::with_bounce(rec.p, dir, ray.bounce() + 1);
            color += shader.kt * self.re_trace(&transmitted);
        }

        color
    }
}

/// Mirror `v` about the unit normal `n`.
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract the unit vector `uv` through the surface with unit normal `n`.
///
/// Returns `None` on total internal reflection.
fn refract(uv: Vec3, n: Vec3, etai_over_etat: f32) -> Option<Vec3> {
    let cos_theta = (-uv).dot(n).min(1.0);
    let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

    if etai_over_etat * sin_theta > 1.0 {
        return None;
    }

    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    Some(r_out_perp + r_out_parallel)
}
