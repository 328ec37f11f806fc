//! Planar parallelogram primitive and the box built from six of them.

use std::sync::Arc;

use lantern_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;

use crate::hittable::{HitRecord, Hittable, HittableList};
use crate::sampling::gen_f32;
use crate::Material;

/// A parallelogram spanned by `u` and `v` from corner `q`.
pub struct Quad {
    q: Vec3,
    u: Vec3,
    v: Vec3,
    /// `n / (n . n)` with `n = u x v`, used to get planar coordinates
    w: Vec3,
    normal: Vec3,
    d: f32,
    area: f32,
    material: Option<Arc<dyn Material>>,
    bbox: Aabb,
}

impl Quad {
    pub fn new(q: Vec3, u: Vec3, v: Vec3, material: Arc<dyn Material>) -> Self {
        Self::build(q, u, v, Some(material))
    }

    /// Create a quad with no material, only for use in a light aggregate.
    pub fn light_target(q: Vec3, u: Vec3, v: Vec3) -> Self {
        Self::build(q, u, v, None)
    }

    fn build(q: Vec3, u: Vec3, v: Vec3, material: Option<Arc<dyn Material>>) -> Self {
        let n = u.cross(v);
        let normal = n.normalize();

        let diagonal1 = Aabb::from_points(q, q + u + v);
        let diagonal2 = Aabb::from_points(q + u, q + v);

        Self {
            q,
            u,
            v,
            w: n / n.dot(n),
            normal,
            d: normal.dot(q),
            area: n.length(),
            material,
            bbox: Aabb::surrounding(&diagonal1, &diagonal2),
        }
    }

    /// Planar coordinates inside the unit square lie on the quad.
    fn is_interior(a: f32, b: f32) -> bool {
        Interval::UNIT.contains(a) && Interval::UNIT.contains(b)
    }
}

impl Hittable for Quad {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let denom = self.normal.dot(ray.direction());

        // Parallel to the plane
        if denom.abs() < 1e-8 {
            return false;
        }

        let t = (self.d - self.normal.dot(ray.origin())) / denom;
        if !ray_t.contains(t) {
            return false;
        }

        let intersection = ray.at(t);
        let planar = intersection - self.q;
        let alpha = self.w.dot(planar.cross(self.v));
        let beta = self.w.dot(self.u.cross(planar));
        if !Self::is_interior(alpha, beta) {
            return false;
        }

        rec.t = t;
        rec.p = intersection;
        rec.u = alpha;
        rec.v = beta;
        rec.material = self.material.as_deref();
        rec.set_face_normal(ray, self.normal);

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Area density converted to solid angle as seen from `origin`.
    fn pdf_value(&self, origin: Vec3, direction: Vec3) -> f32 {
        let mut rec = HitRecord::default();
        let probe = Ray::new_simple(origin, direction);
        if !self.hit(&probe, Interval::new(0.001, f32::INFINITY), &mut rec) {
            return 0.0;
        }

        let distance_squared = rec.t * rec.t * direction.length_squared();
        let cosine = (direction.dot(rec.normal) / direction.length()).abs();

        distance_squared / (cosine * self.area)
    }

    fn random(&self, origin: Vec3, rng: &mut dyn RngCore) -> Vec3 {
        let p = self.q + gen_f32(rng) * self.u + gen_f32(rng) * self.v;
        p - origin
    }
}

/// Build the closed axis-aligned box with opposite corners `a` and `b`.
pub fn make_box(a: Vec3, b: Vec3, material: Arc<dyn Material>) -> HittableList {
    let mut sides = HittableList::new();

    let min = a.min(b);
    let max = a.max(b);

    let dx = Vec3::new(max.x - min.x, 0.0, 0.0);
    let dy = Vec3::new(0.0, max.y - min.y, 0.0);
    let dz = Vec3::new(0.0, 0.0, max.z - min.z);

    // front, right, back, left, top, bottom
    sides.add(Quad::new(Vec3::new(min.x, min.y, max.z), dx, dy, material.clone()));
    sides.add(Quad::new(Vec3::new(max.x, min.y, max.z), -dz, dy, material.clone()));
    sides.add(Quad::new(Vec3::new(max.x, min.y, min.z), -dx, dy, material.clone()));
    sides.add(Quad::new(Vec3::new(min.x, min.y, min.z), dz, dy, material.clone()));
    sides.add(Quad::new(Vec3::new(min.x, max.y, max.z), dx, -dz, material.clone()));
    sides.add(Quad::new(Vec3::new(min.x, min.y, min.z), dx, dz, material));

    sides
}
