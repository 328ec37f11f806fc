//! Camera for ray generation.
//!
//! A [`Camera`] is built once per render from validated [`RenderSettings`]
//! and is immutable afterwards, so every worker can read it without
//! synchronization.

use lantern_math::{Ray, Vec3};
use rand::RngCore;

use crate::sampling::{gen_f32, random_in_unit_disk};
use crate::{RenderResult, RenderSettings};

/// Viewport geometry and stratified pixel sampler.
#[derive(Debug, Clone)]
pub struct Camera {
    image_width: u32,
    image_height: u32,

    /// Side of the per-pixel stratification grid
    sqrt_spp: u32,
    recip_sqrt_spp: f32,

    center: Vec3,
    pixel00_loc: Vec3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,

    // Camera frame: u right, v up, w opposite the view direction
    u: Vec3,
    v: Vec3,
    w: Vec3,

    defocus_angle: f32,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
}

impl Camera {
    /// Validate the settings and derive the camera geometry.
    pub fn new(settings: &RenderSettings) -> RenderResult<Self> {
        settings.validate()?;

        let image_width = settings.image_width;
        let image_height = settings.image_height();
        let sqrt_spp = settings.sqrt_spp();

        let center = settings.look_from;
        let focus_dist = settings.focus_dist;

        // Calculate viewport dimensions
        let theta = settings.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * focus_dist;
        let viewport_width = viewport_height * (image_width as f32 / image_height as f32);

        // Calculate camera basis vectors
        let w = (settings.look_from - settings.look_at).normalize();
        let u = settings.vup.cross(w).normalize();
        let v = w.cross(u);

        // Viewport edges; the vertical edge runs down the image
        let viewport_u = viewport_width * u;
        let viewport_v = -viewport_height * v;

        let pixel_delta_u = viewport_u / image_width as f32;
        let pixel_delta_v = viewport_v / image_height as f32;

        let viewport_upper_left = center - focus_dist * w - viewport_u / 2.0 - viewport_v / 2.0;
        let pixel00_loc = viewport_upper_left + 0.5 * (pixel_delta_u + pixel_delta_v);

        let defocus_radius = focus_dist * (settings.defocus_angle / 2.0).to_radians().tan();

        Ok(Self {
            image_width,
            image_height,
            sqrt_spp,
            recip_sqrt_spp: 1.0 / sqrt_spp as f32,
            center,
            pixel00_loc,
            pixel_delta_u,
            pixel_delta_v,
            u,
            v,
            w,
            defocus_angle: settings.defocus_angle,
            defocus_disk_u: u * defocus_radius,
            defocus_disk_v: v * defocus_radius,
        })
    }

    pub fn image_width(&self) -> u32 {
        self.image_width
    }

    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    /// Side length of the stratification grid.
    pub fn sqrt_spp(&self) -> u32 {
        self.sqrt_spp
    }

    /// Samples traced per pixel (`sqrt_spp²`).
    pub fn samples_per_pixel(&self) -> u32 {
        self.sqrt_spp * self.sqrt_spp
    }

    /// Scale applied to a pixel's sample sum.
    pub fn pixel_samples_scale(&self) -> f32 {
        1.0 / self.samples_per_pixel() as f32
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    /// The camera frame (right, up, backward).
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }

    /// Generate a ray through pixel (`i`, `j`) inside stratification cell
    /// (`s_i`, `s_j`).
    ///
    /// The ray starts at the camera center, or at a random point on the
    /// defocus disk when depth of field is enabled, and carries a random
    /// time in [0, 1).
    pub fn get_ray(&self, i: u32, j: u32, s_i: u32, s_j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = self.sample_square_stratified(s_i, s_j, rng);

        let pixel_sample = self.pixel00_loc
            + (i as f32 + offset.x) * self.pixel_delta_u
            + (j as f32 + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        let ray_direction = pixel_sample - ray_origin;
        let ray_time = gen_f32(rng);

        Ray::new(ray_origin, ray_direction, ray_time)
    }

    /// Random offset inside sub-cell (`s_i`, `s_j`) of the pixel square
    /// [-0.5, 0.5) x [-0.5, 0.5).
    pub(crate) fn sample_square_stratified(&self, s_i: u32, s_j: u32, rng: &mut dyn RngCore) -> Vec3 {
        let px = ((s_i as f32 + gen_f32(rng)) * self.recip_sqrt_spp) - 0.5;
        let py = ((s_j as f32 + gen_f32(rng)) * self.recip_sqrt_spp) - 0.5;

        Vec3::new(px, py, 0.0)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Vec3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}
