//! Sphere primitives: static and linearly moving.

use crate::{
    error::{check_time_interval, RenderError, RenderResult},
    hittable::{HitRecord, Hittable},
    Material,
};
use ember_math::{Aabb, Interval, Ray, Vec3};
use std::f64::consts::PI;
use std::sync::Arc;

/// A sphere primitive.
pub struct Sphere {
    center: Vec3,
    radius: f64,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    ///
    /// The radius must be positive and finite.
    pub fn new(center: Vec3, radius: f64, material: Arc<dyn Material>) -> RenderResult<Self> {
        check_radius(radius)?;

        Ok(Self {
            center,
            radius,
            material,
            bbox: Aabb::around_sphere(center, radius),
        })
    }

    pub fn center(&self) -> Vec3 {
        self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }
}

impl Hittable for Sphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        hit_sphere(self.center, self.radius, self.material.as_ref(), ray, ray_t)
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> Aabb {
        self.bbox
    }
}

/// A sphere whose center moves linearly from `center0` at `time0` to
/// `center1` at `time1`.
///
/// Outside that window the center is extrapolated along the same line.
pub struct MovingSphere {
    center0: Vec3,
    center1: Vec3,
    time0: f64,
    time1: f64,
    radius: f64,
    material: Arc<dyn Material>,
}

impl MovingSphere {
    /// Create a new moving sphere. `time0` must be strictly before `time1`.
    pub fn new(
        center0: Vec3,
        center1: Vec3,
        time0: f64,
        time1: f64,
        radius: f64,
        material: Arc<dyn Material>,
    ) -> RenderResult<Self> {
        check_radius(radius)?;
        check_time_interval(time0, time1)?;
        if time0 == time1 {
            return Err(RenderError::InvalidPrimitive(format!(
                "moving sphere needs a non-empty time window, got [{time0}, {time1}]"
            )));
        }

        Ok(Self {
            center0,
            center1,
            time0,
            time1,
            radius,
            material,
        })
    }

    /// Center of the sphere at the given time.
    pub fn center(&self, time: f64) -> Vec3 {
        self.center0 + ((time - self.time0) / (self.time1 - self.time0)) * (self.center1 - self.center0)
    }
}

impl Hittable for MovingSphere {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        hit_sphere(
            self.center(ray.time()),
            self.radius,
            self.material.as_ref(),
            ray,
            ray_t,
        )
    }

    fn bounding_box(&self, time0: f64, time1: f64) -> Aabb {
        let box0 = Aabb::around_sphere(self.center(time0), self.radius);
        let box1 = Aabb::around_sphere(self.center(time1), self.radius);
        Aabb::surrounding(&box0, &box1)
    }
}

fn check_radius(radius: f64) -> RenderResult<()> {
    if radius.is_finite() && radius > 0.0 {
        Ok(())
    } else {
        Err(RenderError::InvalidPrimitive(format!(
            "sphere radius must be positive, got {radius}"
        )))
    }
}

/// Shared ray-sphere test for a sphere at `center`.
fn hit_sphere<'a>(
    center: Vec3,
    radius: f64,
    material: &'a dyn Material,
    ray: &Ray,
    ray_t: Interval,
) -> Option<HitRecord<'a>> {
    let oc = ray.origin() - center;
    let a = ray.direction().length_squared();
    let half_b = oc.dot(ray.direction());
    let c = oc.length_squared() - radius * radius;

    let discriminant = half_b * half_b - a * c;
    if discriminant < 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();

    // Find the nearest root in the acceptable range
    let mut root = (-half_b - sqrtd) / a;
    if !ray_t.contains(root) {
        root = (-half_b + sqrtd) / a;
        if !ray_t.contains(root) {
            return None;
        }
    }

    let outward_normal = (ray.at(root) - center) / radius;
    Some(HitRecord::new(
        ray,
        root,
        outward_normal,
        sphere_uv(outward_normal),
        material,
    ))
}

/// Get the UV coordinates for a point on the unit sphere.
fn sphere_uv(p: Vec3) -> (f64, f64) {
    // theta: angle down from +Y
    // phi: angle around Y axis from +X
    let theta = (-p.y).clamp(-1.0, 1.0).acos();
    let phi = (-p.z).atan2(p.x) + PI;

    (phi / (2.0 * PI), theta / PI)
}
