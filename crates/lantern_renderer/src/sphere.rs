//! Sphere primitive, optionally moving, usable as a light-sampling target.

use std::f32::consts::PI;
use std::sync::Arc;

use lantern_math::{Aabb, Interval, Onb, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable};
use crate::sampling::{cos_theta_max, random_to_sphere, random_unit_vector};
use crate::Material;

/// A sphere primitive.
///
/// The center is stored as a ray so that a sphere moving linearly between
/// two positions is evaluated at `center.at(ray.time())`; a stationary
/// sphere has a zero-length center direction.
pub struct Sphere {
    center: Ray,
    radius: f32,
    material: Option<Arc<dyn Material>>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a stationary sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        Self::build(center, center, radius, Some(material))
    }

    /// Create a sphere moving from `center1` at time 0 to `center2` at time 1.
    pub fn moving(center1: Vec3, center2: Vec3, radius: f32, material: Arc<dyn Material>) -> Self {
        Self::build(center1, center2, radius, Some(material))
    }

    /// Create a sphere with no material, only for use in a light aggregate.
    pub fn light_target(center: Vec3, radius: f32) -> Self {
        Self::build(center, center, radius, None)
    }

    fn build(
        center1: Vec3,
        center2: Vec3,
        radius: f32,
        material: Option<Arc<dyn Material>>,
    ) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let box1 = Aabb::from_points(center1 - rvec, center1 + rvec);
        let box2 = Aabb::from_points(center2 - rvec, center2 + rvec);

        Self {
            center: Ray::new_simple(center1, center2 - center1),
            radius,
            material,
            bbox: Aabb::surrounding(&box1, &box2),
        }
    }

    /// Whether a point at `distance_squared` from the center is on or inside.
    fn contains(&self, distance_squared: f32) -> bool {
        distance_squared <= self.radius * self.radius
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> (f32, f32) {
        // theta: angle down from +Y
        // phi: angle around Y axis from +X
        let theta = (-p.y).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }
}

impl Hittable for Sphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let current_center = self.center.at(ray.time());
        let oc = current_center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return false;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return false;
            }
        }

        rec.t = root;
        rec.p = ray.at(rec.t);
        let outward_normal = (rec.p - current_center) / self.radius;
        rec.set_face_normal(ray, outward_normal);
        (rec.u, rec.v) = Self::get_sphere_uv(outward_normal);
        rec.material = self.material.as_deref();

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Uniform density over the cone the sphere subtends from `origin`.
    ///
    /// From inside the sphere every direction hits it, so the density is
    /// uniform over the whole sphere of directions.
    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let distance_squared = (self.center.at(0.0) - origin).length_squared();
        if self.contains(distance_squared) {
            return 1.0 / (4.0 * PI);
        }

        let mut rec = HitRecord::default();
        let probe = Ray::new_simple(origin, direction);
        if !self.hit(&probe, Interval::new(0.001, f32::INFINITY), &mut rec) {
            return 0.0;
        }

        let solid_angle = 2.0 * PI * (1.0 - cos_theta_max(self.radius, distance_squared));

        1.0 / solid_angle
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let direction = self.center.at(0.0) - origin;
        let distance_squared = direction.length_squared();
        if self.contains(distance_squared) {
            return random_unit_vector(rng);
        }

        let uvw = Onb::new(direction);
        uvw.transform(random_to_sphere(self.radius, distance_squared, rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Lambertian;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn grey() -> Arc<dyn Material> {
        Arc::new(Lambertian::new(Vec3::new(0.5, 0.5, 0.5)))
    }

    #[test]
    fn test_sphere_hit() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, grey());

        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let interval = Interval::new(0.001, f32::INFINITY);
        let mut rec = HitRecord::default();

        assert!(sphere.hit(&ray, interval, &mut rec));
        assert!((rec.t - 0.5).abs() < 0.001); // Should hit at t=0.5
        assert!(rec.material.is_some());
    }

    #[test]
    fn test_sphere_miss() {
        let sphere = Sphere::new(Vec3::new(0.0, 0.0, -1.0), 0.5, grey());

        // Ray pointing away from sphere
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 1.0, 0.0));
        let mut rec = HitRecord::default();

        assert!(!sphere.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
    }

    #[test]
    fn test_light_target_has_no_material() {
        let sphere = Sphere::light_target(Vec3::new(0.0, 0.0, -3.0), 1.0);
        let ray = Ray::new_simple(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();

        assert!(sphere.hit(&ray, Interval::new(0.001, f32::INFINITY), &mut rec));
        assert!(rec.material.is_none());
    }

    #[test]
    fn test_moving_sphere_follows_ray_time() {
        let sphere = Sphere::moving(
            Vec3::new(0.0, 0.0, -2.0),
            Vec3::new(4.0, 0.0, -2.0),
            0.5,
            grey(),
        );
        let interval = Interval::new(0.001, f32::INFINITY);

        let early = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        let late = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 1.0);

        let mut rec = HitRecord::default();
        assert!(sphere.hit(&early, interval, &mut rec));
        assert!(!sphere.hit(&late, interval, &mut rec));

        let bbox = sphere.bounding_box();
        assert!(bbox.x.contains(-0.5) && bbox.x.contains(4.5));
    }

    #[test]
    fn test_pdf_matches_subtended_solid_angle() {
        let sphere = Sphere::light_target(Vec3::new(0.0, 0.0, -2.0), 1.0);

        // cos(theta_max) = sqrt(1 - 1/4)
        let solid_angle = 2.0 * PI * (1.0 - 0.75f32.sqrt());
        let pdf = sphere.pdf_value(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        assert!((pdf - 1.0 / solid_angle).abs() < 1e-3);

        assert_eq!(sphere.pdf_value(Vec3::ZERO, Vec3::X), 0.0);
    }

    #[test]
    fn test_random_directions_stay_in_subtended_cone() {
        let center = Vec3::new(3.0, 1.0, -2.0);
        let sphere = Sphere::light_target(center, 0.75);
        let cos_max = cos_theta_max(0.75, center.length_squared());
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..200 {
            let dir = sphere.random(Vec3::ZERO, &mut rng).normalize();
            assert!(dir.dot(center.normalize()) >= cos_max - 1e-4);
        }
    }

    /// Monte Carlo estimate of the density integrated over all directions.
    fn integrated_density(sphere: &Sphere, origin: Vec3, rng: &mut StdRng) -> f64 {
        let n = 100_000;
        let sum: f64 = (0..n)
            .map(|_| sphere.pdf_value(origin, random_unit_vector(rng)) as f64)
            .sum();
        4.0 * std::f64::consts::PI * sum / n as f64
    }

    #[test]
    fn test_density_integrates_to_one() {
        let mut rng = StdRng::seed_from_u64(42);

        let outside = Sphere::light_target(Vec3::new(0.0, 0.0, -2.0), 1.0);
        let total = integrated_density(&outside, Vec3::ZERO, &mut rng);
        assert!((total - 1.0).abs() < 0.05, "outside: {total}");

        let inside = Sphere::light_target(Vec3::ZERO, 2.0);
        let total = integrated_density(&inside, Vec3::new(0.5, 0.0, 0.0), &mut rng);
        assert!((total - 1.0).abs() < 1e-3, "inside: {total}");
    }

    #[test]
    fn test_random_from_inside_covers_every_direction() {
        let sphere = Sphere::light_target(Vec3::ZERO, 2.0);
        let origin = Vec3::new(0.5, 0.0, 0.0);
        let mut rng = StdRng::seed_from_u64(42);

        let n = 10_000;
        let away = (0..n)
            .map(|_| sphere.random(origin, &mut rng))
            .filter(|dir| dir.x > 0.0)
            .count();

        // Half of the uniform directions point away from the center
        let fraction = away as f32 / n as f32;
        assert!((fraction - 0.5).abs() < 0.03, "fraction = {fraction}");
        assert!(sphere.pdf_value(origin, Vec3::X) > 0.0);
    }
}
