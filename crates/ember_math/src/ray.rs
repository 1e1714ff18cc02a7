use crate::Vec3;

/// Half-line `origin + t * direction` sampled at a moment of the shutter.
///
/// `direction` keeps whatever length the caller gave it. `time` picks where
/// moving primitives are when the ray is tested against them.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
    time: f64,
}

impl Ray {
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3, time: f64) -> Self {
        Self {
            origin,
            direction,
            time,
        }
    }

    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Shutter time the ray was emitted at.
    #[inline]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Point reached after travelling `t` direction lengths.
    #[inline]
    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + t * self.direction
    }
}
