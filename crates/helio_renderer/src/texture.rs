//! Procedural textures evaluated at the hit point.

use crate::Color;
use helio_math::Vec3;
use std::f32::consts::PI;

/// Source of a surface's base color.
pub trait Texture: Send + Sync {
    /// Color at a point on the surface.
    fn texel(&self, p: Vec3) -> Color;
}

/// Uniform color.
pub struct FlatColor {
    color: Color,
}

impl FlatColor {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

impl Texture for FlatColor {
    fn texel(&self, _p: Vec3) -> Color {
        self.color
    }
}

/// Sinusoidal stripes along the X axis, blending between two colors.
pub struct Stripes {
    color_a: Color,
    color_b: Color,
    /// Frequency of the sine; one light/dark cycle spans 2/period units
    period: f32,
}

impl Stripes {
    pub fn new(color_a: Color, color_b: Color, period: f32) -> Self {
        Self {
            color_a,
            color_b,
            period,
        }
    }
}

impl Texture for Stripes {
    fn texel(&self, p: Vec3) -> Color {
        let value = 0.5 * (1.0 + (self.period * p.x * PI).sin());
        self.color_a.lerp(self.color_b, value)
    }
}
