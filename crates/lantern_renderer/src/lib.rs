//! Lantern - CPU Path Tracing
//!
//! A Monte Carlo path tracer for physically-based rendering. The core is
//! the [`PathIntegrator`] (next-event estimation mixed with material
//! sampling), the stratified [`Camera`], and the row-parallel [`Renderer`].
//! Primitives, materials and PDFs are the minimal collaborator set needed to
//! build scenes for it.

mod camera;
mod error;
mod hittable;
mod instance;
mod integrator;
mod material;
mod output;
mod pdf;
mod quad;
mod renderer;
mod sampling;
mod settings;
mod sphere;

pub use camera::Camera;
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use instance::{RotateY, Translate};
pub use integrator::{PathIntegrator, MIN_PDF, RAY_T_MIN};
pub use material::{
    Color, Dielectric, DiffuseLight, Lambertian, Material, Metal, Scatter, ScatterRecord,
};
pub use output::{color_to_rgb, linear_to_gamma, Image, Rgb};
pub use pdf::{CosinePdf, HittablePdf, MixturePdf, Pdf, SpherePdf};
pub use quad::{make_box, Quad};
pub use renderer::Renderer;
pub use sampling::gen_f32;
pub use settings::{RenderSettings, MAX_IMAGE_DIMENSION, MAX_IMAGE_PIXELS};
pub use sphere::Sphere;

/// Re-export Vec3 and common math types from lantern_math
pub use lantern_math::{Aabb, Interval, Onb, Ray, Vec3};
