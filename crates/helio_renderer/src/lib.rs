//! Helio - CPU Whitted-style ray tracer with boolean solids.
//!
//! Rays are cast through a scene of primitives; hits are shaded with a
//! recursive local + global illumination model (ambient, diffuse, specular,
//! reflection, refraction). Complex shapes are built by combining sub-solids
//! with boolean operators ([`Csg`]) without ever meshing the result: the
//! composite answers ray queries directly via an iterative marching scheme.

mod bvh;
mod camera;
mod csg;
mod light;
mod plane;
mod primitive;
mod ray;
mod renderer;
mod scene;
mod shader;
mod solid;
mod sphere;
mod texture;

pub use bvh::BvhNode;
pub use camera::Camera;
pub use csg::{BoolOp, Classification, Csg};
pub use light::{DirectionalLight, Light, LightSample, PointLight};
pub use plane::Plane;
pub use primitive::{HitRecord, Primitive, RAY_EPSILON};
pub use ray::Ray;
pub use renderer::{color_to_rgba, render, ImageBuffer, RenderConfig, RenderError};
pub use scene::Scene;
pub use shader::{Color, Shader};
pub use solid::Solid;
pub use sphere::Sphere;
pub use texture::{FlatColor, Stripes, Texture};

/// Re-export common math types from helio_math
pub use helio_math::{Aabb, Interval, Mat4, Vec2, Vec3};
