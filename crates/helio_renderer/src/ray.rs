//! Ray type for tracing.
//!
//! A ray carries its origin, a unit direction, and a bounce counter used to
//! cut off recursive reflection/refraction.

use helio_math::Vec3;

/// A ray with origin, direction, and bounce depth.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    /// Origin point of the ray
    origin: Vec3,
    /// Direction vector (expected to be unit length)
    direction: Vec3,
    /// Number of shading bounces this ray has already taken
    bounce: u32,
}

impl Ray {
    /// Create a new primary ray (bounce 0).
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self::with_bounce(origin, direction, 0)
    }

    /// Create a secondary ray at a given bounce depth.
    #[inline]
    pub fn with_bounce(origin: Vec3, direction: Vec3, bounce: u32) -> Self {
        Self {
            origin,
            direction,
            bounce,
        }
    }

    /// Get the ray's origin point.
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Get the ray's direction vector.
    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Get the ray's bounce depth.
    #[inline]
    pub fn bounce(&self) -> u32 {
        self.bounce
    }

    /// Compute a point along the ray at parameter t.
    /// P(t) = origin + t * direction
    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }

    /// The same ray restarted from a new origin.
    ///
    /// Used by the boolean marching loops: the direction and bounce count
    /// are preserved while the origin is pushed past an intermediate surface.
    #[inline]
    pub fn advanced_to(&self, origin: Vec3) -> Ray {
        Ray { origin, ..*self }
    }
}

impl Default for Ray {
    fn default() -> Self {
        Self {
            origin: Vec3::ZERO,
            direction: Vec3::Z,
            bounce: 0,
        }
    }
}
