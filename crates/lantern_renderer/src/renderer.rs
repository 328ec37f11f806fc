//! Row-parallel render scheduler.
//!
//! Every image row is one task on a fixed rayon pool. Rows write into
//! disjoint slices of a single flat buffer, and the end of the pool scope is
//! the only synchronization point. Each task owns its random generator.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{RngCore, SeedableRng};
use rayon::ThreadPoolBuilder;

use crate::output::{color_to_rgb, Image, Rgb};
use crate::{
    Camera, Color, Hittable, HittableList, PathIntegrator, RenderError, RenderResult,
    RenderSettings,
};

/// Spreads consecutive row indices across the seed space.
const ROW_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Renders a scene with a camera and integrator fixed at construction.
#[derive(Debug, Clone)]
pub struct Renderer {
    camera: Camera,
    integrator: PathIntegrator,
    seed: Option<u64>,
}

impl Renderer {
    /// Validate `settings` and prepare the camera and integrator.
    pub fn new(settings: &RenderSettings) -> RenderResult<Self> {
        let camera = Camera::new(settings)?;

        Ok(Self {
            camera,
            integrator: PathIntegrator::from_settings(settings),
            seed: settings.seed,
        })
    }

    /// Render `world` on a pool of `threads` workers (0 picks rayon's default).
    ///
    /// `lights` is the aggregate used for light sampling; when it is empty
    /// every bounce samples the material alone. If any row task panics the
    /// whole render is abandoned and [`RenderError::WorkerPanicked`] is
    /// returned.
    pub fn render(
        &self,
        world: &dyn Hittable,
        lights: &HittableList,
        threads: usize,
    ) -> RenderResult<Image> {
        let width = self.camera.image_width();
        let height = self.camera.image_height();

        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|index| format!("lantern-worker-{index}"))
            .build()?;

        let lights: Option<&dyn Hittable> = if lights.is_empty() {
            log::warn!("No lights to sample, falling back to material sampling only");
            None
        } else {
            Some(lights)
        };

        log::info!(
            "Rendering {}x{} at {} spp, max depth {}, on {} threads",
            width,
            height,
            self.camera.samples_per_pixel(),
            self.integrator.max_depth(),
            pool.current_num_threads()
        );

        let start = Instant::now();
        let completed = AtomicUsize::new(0);
        let mut image = Image::new(width, height);
        let rows = image.rows_mut();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pool.scope(|scope| {
                for (row, pixels) in rows.enumerate() {
                    let completed = &completed;
                    scope.spawn(move |_| {
                        let row = row as u32;
                        let mut rng = self.row_rng(row);
                        self.render_row(row, pixels, world, lights, &mut rng);

                        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                        log::debug!("Row {} done ({}/{})", row, done, height);
                    });
                }
            });
        }));

        if let Err(payload) = outcome {
            let message = panic_message(payload.as_ref());
            log::error!("Render aborted: {}", message);
            return Err(RenderError::WorkerPanicked(message));
        }

        log::info!("Render finished in {:.2?}", start.elapsed());
        Ok(image)
    }

    /// Generator for one row task.
    fn row_rng(&self, row: u32) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ (row as u64).wrapping_mul(ROW_SEED_STRIDE)),
            None => StdRng::from_entropy(),
        }
    }

    /// Estimate and tonemap every pixel of one row.
    fn render_row(
        &self,
        row: u32,
        pixels: &mut [Rgb],
        world: &dyn Hittable,
        lights: Option<&dyn Hittable>,
        rng: &mut dyn RngCore,
    ) {
        for (col, pixel) in pixels.iter_mut().enumerate() {
            let color = self.render_pixel(col as u32, row, world, lights, rng);
            *pixel = color_to_rgb(color);
        }
    }

    /// Average one sample from every cell of the pixel's stratification grid.
    fn render_pixel(
        &self,
        i: u32,
        j: u32,
        world: &dyn Hittable,
        lights: Option<&dyn Hittable>,
        rng: &mut dyn RngCore,
    ) -> Color {
        let sqrt_spp = self.camera.sqrt_spp();
        let mut pixel_color = Color::ZERO;

        for s_j in 0..sqrt_spp {
            for s_i in 0..sqrt_spp {
                let ray = self.camera.get_ray(i, j, s_i, s_j, rng);
                pixel_color += self.integrator.radiance(&ray, world, lights, rng);
            }
        }

        pixel_color * self.camera.pixel_samples_scale()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        make_box, DiffuseLight, HitRecord, Lambertian, Material, Pdf, Quad, Scatter,
        ScatterRecord, Sphere, Vec3,
    };
    use lantern_math::{Aabb, Interval, Ray};
    use std::sync::Arc;

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn small_settings(samples_per_pixel: u32) -> RenderSettings {
        RenderSettings::default()
            .with_resolution(12, 1.5)
            .with_quality(samples_per_pixel, 4)
            .with_background(Color::new(0.5, 0.25, 0.1))
    }

    /// A tiny lit box: diffuse walls, a ceiling light and a sphere.
    fn lit_box() -> (HittableList, HittableList) {
        let white: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.73)));
        let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::splat(10.0)));

        let mut world = HittableList::new();
        world.add(make_box(Vec3::new(-2.0, -2.0, -6.0), Vec3::new(2.0, 2.0, 2.0), white.clone()));
        world.add(Sphere::new(Vec3::new(0.0, -1.0, -3.0), 1.0, white));
        world.add(Quad::new(
            Vec3::new(-0.5, 1.99, -3.5),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
            light,
        ));

        let mut lights = HittableList::new();
        lights.add(Quad::light_target(
            Vec3::new(-0.5, 1.99, -3.5),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        ));

        (world, lights)
    }

    struct Exploding;

    impl Hittable for Exploding {
        fn hit<'a>(&'a self, _ray: &Ray, _ray_t: Interval, _rec: &mut HitRecord<'a>) -> bool {
            panic!("intersection blew up");
        }

        fn bounding_box(&self) -> Aabb {
            Aabb::EMPTY
        }
    }

    /// Glows faintly and scatters through a density that is zero everywhere.
    struct Smoke;

    struct ZeroPdf;

    impl Pdf for ZeroPdf {
        fn value(&self, _direction: Vec3) -> f32 {
            0.0
        }

        fn generate(&self, _rng: &mut dyn RngCore) -> Vec3 {
            Vec3::Y
        }
    }

    impl Material for Smoke {
        fn scatter(
            &self,
            _ray_in: &Ray,
            _rec: &HitRecord,
            _rng: &mut dyn RngCore,
        ) -> Option<ScatterRecord> {
            Some(ScatterRecord {
                attenuation: Color::ONE,
                scatter: Scatter::Diffuse(Box::new(ZeroPdf)),
            })
        }

        fn emitted(&self, _ray_in: &Ray, _rec: &HitRecord, _u: f32, _v: f32, _p: Vec3) -> Color {
            Color::splat(0.25)
        }
    }

    #[test]
    fn test_zero_density_keeps_pixels_finite() {
        init_logging();
        // Camera sits inside the glowing shell, the light target is inside too
        let mut world = HittableList::new();
        world.add(Sphere::new(Vec3::ZERO, 5.0, Arc::new(Smoke)));
        let mut lights = HittableList::new();
        lights.add(Sphere::light_target(Vec3::new(0.0, 0.0, -2.0), 0.5));

        let settings = small_settings(4).with_seed(42);
        let renderer = Renderer::new(&settings).unwrap();

        let mut rng = StdRng::seed_from_u64(42);
        let color = renderer.render_pixel(6, 4, &world, Some(&lights), &mut rng);
        assert!(color.is_finite());
        assert!((color - Color::splat(0.25)).abs().max_element() < 1e-6);

        let image = renderer.render(&world, &lights, 2).unwrap();
        let expected = color_to_rgb(Color::splat(0.25));
        assert!(image.pixels().iter().all(|&pixel| pixel == expected));
    }

    #[test]
    fn test_empty_scene_is_background() {
        init_logging();
        let world = HittableList::new();
        let lights = HittableList::new();

        for spp in [1, 9] {
            for threads in [1, 4] {
                let settings = small_settings(spp);
                let renderer = Renderer::new(&settings).unwrap();
                let image = renderer.render(&world, &lights, threads).unwrap();

                assert_eq!((image.width(), image.height()), (12, 8));
                let expected = color_to_rgb(settings.background);
                assert!(
                    image.pixels().iter().all(|&pixel| pixel == expected),
                    "spp {spp}, threads {threads}"
                );
            }
        }
    }

    #[test]
    fn test_fixed_seed_is_reproducible() {
        init_logging();
        let (world, lights) = lit_box();
        let settings = RenderSettings::default()
            .with_resolution(16, 1.0)
            .with_quality(4, 5)
            .with_lens(60.0, 0.0, 10.0)
            .with_seed(42);
        let renderer = Renderer::new(&settings).unwrap();

        let mut first = Vec::new();
        renderer.render(&world, &lights, 1).unwrap().write_ppm(&mut first).unwrap();
        let mut second = Vec::new();
        renderer.render(&world, &lights, 1).unwrap().write_ppm(&mut second).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn test_lit_box_is_not_black() {
        init_logging();
        let (world, lights) = lit_box();
        let settings = RenderSettings::default()
            .with_resolution(8, 1.0)
            .with_quality(4, 5)
            .with_lens(60.0, 0.0, 10.0)
            .with_seed(42);
        let image = Renderer::new(&settings)
            .unwrap()
            .render(&world, &lights, 2)
            .unwrap();

        let lit = image.pixels().iter().filter(|pixel| pixel.iter().any(|&c| c > 0)).count();
        assert!(lit > image.pixels().len() / 2);
    }

    #[test]
    fn test_worker_panic_aborts_render() {
        init_logging();
        let renderer = Renderer::new(&small_settings(1)).unwrap();
        let lights = HittableList::new();

        match renderer.render(&Exploding, &lights, 2) {
            Err(RenderError::WorkerPanicked(message)) => {
                assert!(message.contains("intersection blew up"));
            }
            other => panic!("expected a worker panic, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let settings = RenderSettings::default().with_resolution(0, 1.0);
        assert!(matches!(
            Renderer::new(&settings),
            Err(RenderError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_row_rngs_differ_per_row() {
        let renderer = Renderer::new(&small_settings(1).with_seed(7)).unwrap();
        let a = renderer.row_rng(0).next_u64();
        let b = renderer.row_rng(1).next_u64();
        assert_ne!(a, b);
        assert_eq!(a, renderer.row_rng(0).next_u64());
    }
}
