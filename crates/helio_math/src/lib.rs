// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;

pub use aabb::Aabb;
pub use interval::Interval;
