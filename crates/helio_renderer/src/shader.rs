//! Shading coefficients attached to primitives.

use crate::texture::{FlatColor, Texture};
use helio_math::Vec3;
use std::sync::Arc;

/// Color type alias (RGB values typically 0-1)
pub type Color = Vec3;

/// Phong-style shading parameters.
///
/// Shaders are shared between primitives via `Arc`: a boolean composite's
/// operands commonly reuse one shader, and cloning the handle never
/// duplicates the texture behind it. Evaluation lives in
/// [`crate::Scene::ray_trace`]; this type only carries the coefficients.
pub struct Shader {
    texture: Arc<dyn Texture>,
    /// Ambient coefficient
    pub ka: f32,
    /// Diffuse coefficient
    pub kd: f32,
    /// Specular coefficient
    pub ks: f32,
    /// Specular (shininess) exponent
    pub ke: f32,
    /// Reflectance
    pub km: f32,
    /// Transmittance
    pub kt: f32,
    /// Refractive index used when kt > 0
    pub ior: f32,
}

impl Shader {
    /// A purely diffuse colored surface.
    pub fn flat(color: Color) -> Self {
        Self::textured(Arc::new(FlatColor::new(color)))
    }

    /// A diffuse surface reading its base color from a texture.
    pub fn textured(texture: Arc<dyn Texture>) -> Self {
        Self {
            texture,
            ka: 0.1,
            kd: 0.9,
            ks: 0.0,
            ke: 0.0,
            km: 0.0,
            kt: 0.0,
            ior: 1.0,
        }
    }

    /// Set ambient/diffuse/specular coefficients.
    pub fn with_phong(mut self, ka: f32, kd: f32, ks: f32, ke: f32) -> Self {
        self.ka = ka;
        self.kd = kd;
        self.ks = ks;
        self.ke = ke;
        self
    }

    /// Set the mirror-reflection coefficient.
    pub fn with_reflection(mut self, km: f32) -> Self {
        self.km = km;
        self
    }

    /// Set the transmission coefficient and refractive index.
    pub fn with_refraction(mut self, kt: f32, ior: f32) -> Self {
        self.kt = kt;
        self.ior = ior;
        self
    }

    /// Base color at a surface point.
    pub fn base_color(&self, p: Vec3) -> Color {
        self.texture.texel(p)
    }
}
