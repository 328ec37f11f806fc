//! Light transport estimator.
//!
//! Traces a single path per call. At every diffuse vertex the continuation
//! direction is drawn from an equal mixture of the light aggregate's density
//! and the material's own density, and the path throughput is weighted by
//! `scattering_pdf / mixture_pdf`. Specular vertices follow their fixed ray
//! without light sampling.

use lantern_math::{Interval, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};
use crate::material::{Color, Scatter};
use crate::pdf::{HittablePdf, MixturePdf, Pdf};
use crate::RenderSettings;

/// Lower bound of the ray parameter, keeps bounced rays off their own surface.
pub const RAY_T_MIN: f32 = 0.001;

/// Densities below this end the path.
pub const MIN_PDF: f32 = 1e-5;

/// Iterative path tracer with mixture importance sampling.
#[derive(Debug, Clone, Copy)]
pub struct PathIntegrator {
    max_depth: u32,
    background: Color,
}

impl PathIntegrator {
    pub fn new(max_depth: u32, background: Color) -> Self {
        Self {
            max_depth,
            background,
        }
    }

    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self::new(settings.max_depth, settings.background)
    }

    pub fn max_depth(&self) -> u32 {
        self.max_depth
    }

    /// Estimate the radiance arriving along `ray`.
    ///
    /// `lights` is the aggregate sampled for next-event directions. With
    /// `None` every diffuse bounce samples the material alone.
    ///
    /// At most `max_depth` scene intersections are made; a path that runs
    /// out of bounces contributes nothing further. `max_depth == 0` returns
    /// black without touching the scene.
    pub fn radiance(
        &self,
        ray: &Ray,
        world: &dyn Hittable,
        lights: Option<&dyn Hittable>,
        rng: &mut dyn RngCore,
    ) -> Color {
        let mut radiance = Color::ZERO;
        let mut throughput = Color::ONE;
        let mut ray = *ray;

        for _ in 0..self.max_depth {
            let mut rec = HitRecord::default();
            if !world.hit(&ray, Interval::new(RAY_T_MIN, f32::INFINITY), &mut rec) {
                radiance += throughput * self.background;
                break;
            }

            // Light-sampling targets carry no material and end the path
            let Some(material) = rec.material else {
                break;
            };

            radiance += throughput * material.emitted(&ray, &rec, rec.u, rec.v, rec.p);

            let Some(srec) = material.scatter(&ray, &rec, rng) else {
                break;
            };

            match srec.scatter {
                Scatter::Specular(next) => {
                    throughput *= srec.attenuation;
                    ray = next;
                }
                Scatter::Diffuse(surface_pdf) => {
                    let (direction, density) =
                        sample_direction(surface_pdf.as_ref(), lights, &rec, rng);

                    let scattered = Ray::new(rec.p, direction, ray.time());
                    let scattering_pdf = material.scattering_pdf(&ray, &rec, &scattered);

                    // Negated comparisons also reject NaN
                    if !(density >= MIN_PDF) || !(scattering_pdf >= MIN_PDF) {
                        break;
                    }

                    throughput *= srec.attenuation * scattering_pdf / density;
                    ray = scattered;
                }
            }
        }

        radiance
    }
}

/// Draw a continuation direction and the density it was drawn with.
fn sample_direction(
    surface_pdf: &dyn Pdf,
    lights: Option<&dyn Hittable>,
    rec: &HitRecord,
    rng: &mut dyn RngCore,
) -> (Vec3, f32) {
    match lights {
        Some(lights) => {
            let light_pdf = HittablePdf::new(lights, rec.p);
            let mixture = MixturePdf::new(&light_pdf, surface_pdf);
            let direction = mixture.generate(rng);
            (direction, mixture.value(direction))
        }
        None => {
            let direction = surface_pdf.generate(rng);
            (direction, surface_pdf.value(direction))
        }
    }
}
