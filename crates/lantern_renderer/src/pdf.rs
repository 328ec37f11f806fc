//! Direction sampling densities.
//!
//! A [`Pdf`] can draw a direction and report the solid-angle density of
//! drawing any given direction. The integrator mixes a light-targeted
//! density with the material's own density through [`MixturePdf`].

use std::f32::consts::PI;

use lantern_math::{Onb, Vec3};
use rand::RngCore;

use crate::hittable::Hittable;
use crate::sampling::{gen_f32, random_cosine_direction, random_unit_vector};

/// A probability density over directions.
pub trait Pdf {
    /// Density of sampling `direction`.
    fn value(&self, direction: Vec3) -> f32;

    /// Draw a direction from this density.
    fn generate(&self, rng: &mut dyn RngCore) -> Vec3;
}

/// Uniform density over the whole sphere of directions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpherePdf;

impl Pdf for SpherePdf {
    fn value(&self, _direction: Vec3) -> f32 {
        1.0 / (4.0 * PI)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        random_unit_vector(rng)
    }
}

/// Cosine-weighted density around a surface normal.
#[derive(Debug, Clone, Copy)]
pub struct CosinePdf {
    uvw: Onb,
}

impl CosinePdf {
    pub fn new(w: Vec3) -> Self {
        Self { uvw: Onb::new(w) }
    }
}

impl Pdf for CosinePdf {
    fn value(&self, direction: Vec3) -> f32 {
        let cosine_theta = direction.normalize().dot(self.uvw.w());
        (cosine_theta / PI).max(0.0)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.uvw.transform(random_cosine_direction(rng))
    }
}

/// Density of directions from `origin` towards a set of objects.
pub struct HittablePdf<'a> {
    objects: &'a dyn Hittable,
    origin: Vec3,
}

impl<'a> HittablePdf<'a> {
    pub fn new(objects: &'a dyn Hittable, origin: Vec3) -> Self {
        Self { objects, origin }
    }
}

impl Pdf for HittablePdf<'_> {
    fn value(&self, direction: Vec3) -> f32 {
        self.objects.pdf_value(self.origin, direction)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        self.objects.random(self.origin, rng)
    }
}

/// Equal-weight mixture of two densities.
///
/// `generate` picks one component with probability 1/2, `value` is the
/// mixture density `(p0 + p1) / 2`. Dividing a sample by this density is a
/// one-sample balance-heuristic MIS estimator.
pub struct MixturePdf<'a> {
    components: [&'a dyn Pdf; 2],
}

impl<'a> MixturePdf<'a> {
    pub fn new(p0: &'a dyn Pdf, p1: &'a dyn Pdf) -> Self {
        Self {
            components: [p0, p1],
        }
    }
}

impl Pdf for MixturePdf<'_> {
    fn value(&self, direction: Vec3) -> f32 {
        0.5 * self.components[0].value(direction) + 0.5 * self.components[1].value(direction)
    }

    fn generate(&self, rng: &mut dyn RngCore) -> Vec3 {
        if gen_f32(rng) < 0.5 {
            self.components[0].generate(rng)
        } else {
            self.components[1].generate(rng)
        }
    }
}
