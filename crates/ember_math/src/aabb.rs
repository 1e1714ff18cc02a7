use crate::{Interval, Ray, Vec3};

/// Axis-Aligned Bounding Box for spatial acceleration structures (BVH).
///
/// Invariant: `minimum[i] <= maximum[i]` on every axis, except for
/// [`Aabb::EMPTY`] which is the identity of [`Aabb::surrounding`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub minimum: Vec3,
    pub maximum: Vec3,
}

impl Aabb {
    /// Create an AABB from its near-bottom-left and far-top-right corners.
    pub fn new(minimum: Vec3, maximum: Vec3) -> Self {
        debug_assert!(
            minimum.cmple(maximum).all(),
            "inverted bounding box: {minimum:?} > {maximum:?}"
        );
        Self { minimum, maximum }
    }

    /// Create an AABB from two arbitrary corner points.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self {
            minimum: a.min(b),
            maximum: a.max(b),
        }
    }

    /// Box of a sphere with the given center and radius.
    pub fn around_sphere(center: Vec3, radius: f64) -> Self {
        let rvec = Vec3::splat(radius.abs());
        Self::from_points(center - rvec, center + rvec)
    }

    /// Create an AABB that surrounds two other AABBs.
    pub fn surrounding(box0: &Aabb, box1: &Aabb) -> Self {
        Self {
            minimum: box0.minimum.min(box1.minimum),
            maximum: box0.maximum.max(box1.maximum),
        }
    }

    /// Extent along one axis (0=X, 1=Y, 2=Z).
    pub fn axis_interval(&self, axis: usize) -> Interval {
        Interval::new(self.minimum[axis], self.maximum[axis])
    }

    /// Minimum corner coordinate along one axis.
    #[inline]
    pub fn axis_min(&self, axis: usize) -> f64 {
        self.minimum[axis]
    }

    /// Test if a ray intersects this AABB within the given interval.
    ///
    /// Slab method. The reciprocal direction is deliberately unguarded: a zero
    /// component gives an infinite slab parameter, and `f64::max`/`f64::min`
    /// discard the NaN produced when the origin lies exactly on a slab plane.
    pub fn hit(&self, r: &Ray, mut ray_t: Interval) -> bool {
        let origin = r.origin();
        let direction = r.direction();

        for axis in 0..3 {
            let inv_d = 1.0 / direction[axis];
            let mut t0 = (self.minimum[axis] - origin[axis]) * inv_d;
            let mut t1 = (self.maximum[axis] - origin[axis]) * inv_d;
            if inv_d < 0.0 {
                std::mem::swap(&mut t0, &mut t1);
            }
            ray_t.min = t0.max(ray_t.min);
            ray_t.max = t1.min(ray_t.max);
            if ray_t.max <= ray_t.min {
                return false;
            }
        }

        true
    }

    /// Returns true if `other` lies entirely inside this box.
    pub fn contains_box(&self, other: &Aabb) -> bool {
        self.minimum.cmple(other.minimum).all() && other.maximum.cmple(self.maximum).all()
    }

    /// Returns the index (0=X, 1=Y, 2=Z) of the axis with the longest extent.
    pub fn longest_axis(&self) -> usize {
        let size = self.maximum - self.minimum;

        if size.x > size.y && size.x > size.z {
            0
        } else if size.y > size.z {
            1
        } else {
            2
        }
    }

    /// Returns the center point of the bounding box.
    pub fn centroid(&self) -> Vec3 {
        (self.minimum + self.maximum) * 0.5
    }

    pub const EMPTY: Aabb = Aabb {
        minimum: Vec3::INFINITY,
        maximum: Vec3::NEG_INFINITY,
    };
}
