//! Lantern math types.
//!
//! Re-exports glam and adds the small geometric vocabulary the path tracer
//! is written in: rays, parametric intervals, bounding boxes and
//! orthonormal bases.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod onb;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use onb::Onb;
pub use ray::Ray;
