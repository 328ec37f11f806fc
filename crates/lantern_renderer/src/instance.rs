//! Instance transforms wrapping another hittable.
//!
//! The wrapped object is intersected in its own space: the incoming ray is
//! moved into object space, and the resulting hit point and normal are moved
//! back. Neither wrapper forwards light sampling.

use lantern_math::{Aabb, Interval, Ray, Vec3};

use crate::hittable::{HitRecord, Hittable};

/// Translate an object by a fixed offset.
pub struct Translate {
    object: Box<dyn Hittable>,
    offset: Vec3,
    bbox: Aabb,
}

impl Translate {
    pub fn new(object: impl Hittable + 'static, offset: Vec3) -> Self {
        let bbox = object.bounding_box().translate(offset);
        Self {
            object: Box::new(object),
            offset,
            bbox,
        }
    }
}

impl Hittable for Translate {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let offset_ray = Ray::new(ray.origin() - self.offset, ray.direction(), ray.time());

        if !self.object.hit(&offset_ray, ray_t, rec) {
            return false;
        }

        rec.p += self.offset;
        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// Rotate an object about the Y axis.
pub struct RotateY {
    object: Box<dyn Hittable>,
    sin_theta: f32,
    cos_theta: f32,
    bbox: Aabb,
}

impl RotateY {
    /// Rotate by `angle` degrees (counter-clockwise looking down -Y).
    pub fn new(object: impl Hittable + 'static, angle: f32) -> Self {
        let radians = angle.to_radians();
        let (sin_theta, cos_theta) = radians.sin_cos();

        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for corner in object.bounding_box().corners() {
            let rotated = Vec3::new(
                cos_theta * corner.x + sin_theta * corner.z,
                corner.y,
                -sin_theta * corner.x + cos_theta * corner.z,
            );
            min = min.min(rotated);
            max = max.max(rotated);
        }

        Self {
            object: Box::new(object),
            sin_theta,
            cos_theta,
            bbox: Aabb::from_points(min, max),
        }
    }

    /// World space to object space.
    #[inline]
    fn to_object(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x - self.sin_theta * v.z,
            v.y,
            self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }

    /// Object space to world space.
    #[inline]
    fn to_world(&self, v: Vec3) -> Vec3 {
        Vec3::new(
            self.cos_theta * v.x + self.sin_theta * v.z,
            v.y,
            -self.sin_theta * v.x + self.cos_theta * v.z,
        )
    }
}

impl Hittable for RotateY {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval, rec: &mut HitRecord<'a>) -> bool {
        let rotated = Ray::new(
            self.to_object(ray.origin()),
            self.to_object(ray.direction()),
            ray.time(),
        );

        if !self.object.hit(&rotated, ray_t, rec) {
            return false;
        }

        rec.p = self.to_world(rec.p);
        rec.normal = self.to_world(rec.normal);
        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
