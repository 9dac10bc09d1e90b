//! Light sources.

use crate::Color;
use helio_math::Vec3;

/// A light's contribution toward a shaded point.
#[derive(Debug, Clone, Copy)]
pub struct LightSample {
    /// Unit direction from the shaded point toward the light
    pub direction: Vec3,
    /// Incoming radiance at the point
    pub radiance: Color,
    /// Distance to the light, for shadow-ray clipping
    pub distance: f32,
}

/// A light source the scene can sample while shading.
pub trait Light: Send + Sync {
    /// Sample this light from `p`, or `None` if it cannot reach the point.
    fn illuminate(&self, p: Vec3) -> Option<LightSample>;

    fn casts_shadow(&self) -> bool {
        true
    }
}

/// An omnidirectional point light with inverse-square falloff.
pub struct PointLight {
    position: Vec3,
    intensity: Color,
}

impl PointLight {
    pub fn new(position: Vec3, intensity: Color) -> Self {
        Self {
            position,
            intensity,
        }
    }
}

impl Light for PointLight {
    fn illuminate(&self, p: Vec3) -> Option<LightSample> {
        let to_light = self.position - p;
        let distance = to_light.length();
        if distance <= 0.0 {
            return None;
        }

        Some(LightSample {
            direction: to_light / distance,
            radiance: self.intensity / (distance * distance),
            distance,
        })
    }
}

/// A directional light, as from a source at infinity.
pub struct DirectionalLight {
    /// Unit direction the light travels in
    direction: Vec3,
    radiance: Color,
}

impl DirectionalLight {
    pub fn new(direction: Vec3, radiance: Color) -> Self {
        Self {
            direction: direction.normalize(),
            radiance,
        }
    }
}

impl Light for DirectionalLight {
    fn illuminate(&self, _p: Vec3) -> Option<LightSample> {
        Some(LightSample {
            direction: -self.direction,
            radiance: self.radiance,
            distance: f32::INFINITY,
        })
    }
}
