//! Camera for primary ray generation.
//!
//! [`CameraSettings`] is the plain, serializable description; [`Camera`] is
//! the validated, immutable ray generator built from it.

use crate::error::{check_time_interval, RenderError, RenderResult};
use crate::sampling::{gen_range, random_in_unit_disk};
use ember_math::{Ray, Vec3};
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Viewing parameters for a thin-lens camera with a shutter window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    pub look_from: Vec3,
    pub look_at: Vec3,
    pub vup: Vec3,
    /// Vertical field of view in degrees
    pub vfov: f64,
    /// Viewport width over height
    pub aspect_ratio: f64,
    /// Lens diameter; 0 gives a pinhole camera
    pub aperture: f64,
    /// Distance from camera to plane of perfect focus
    pub focus_dist: f64,
    /// Shutter open time
    pub time0: f64,
    /// Shutter close time
    pub time1: f64,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            look_from: Vec3::new(15.0, 6.0, 3.0),
            look_at: Vec3::ZERO,
            vup: Vec3::Y,
            vfov: 20.0,
            aspect_ratio: 3.0 / 2.0,
            aperture: 0.1,
            focus_dist: 10.0,
            time0: 0.0,
            time1: 1.0,
        }
    }
}

impl CameraSettings {
    /// Set camera position.
    pub fn with_position(mut self, look_from: Vec3, look_at: Vec3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f64, aperture: f64, focus_dist: f64) -> Self {
        self.vfov = vfov;
        self.aperture = aperture;
        self.focus_dist = focus_dist;
        self
    }

    /// Set viewport aspect ratio.
    pub fn with_aspect_ratio(mut self, aspect_ratio: f64) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// Set shutter open and close times.
    pub fn with_shutter(mut self, time0: f64, time1: f64) -> Self {
        self.time0 = time0;
        self.time1 = time1;
        self
    }

    /// Validate the settings and build the camera.
    pub fn build(&self) -> RenderResult<Camera> {
        self.validate()?;

        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h;
        let viewport_width = self.aspect_ratio * viewport_height;

        // Camera basis vectors
        let w = (self.look_from - self.look_at).normalize();
        let u = self.vup.cross(w).normalize();
        let v = w.cross(u);

        let origin = self.look_from;
        let horizontal = self.focus_dist * viewport_width * u;
        let vertical = self.focus_dist * viewport_height * v;
        let lower_left_corner = origin - horizontal / 2.0 - vertical / 2.0 - self.focus_dist * w;

        Ok(Camera {
            origin,
            lower_left_corner,
            horizontal,
            vertical,
            u,
            v,
            w,
            lens_radius: self.aperture / 2.0,
            time0: self.time0,
            time1: self.time1,
        })
    }

    fn validate(&self) -> RenderResult<()> {
        let invalid = |msg: String| Err(RenderError::InvalidCamera(msg));

        if !(self.vfov > 0.0 && self.vfov < 180.0) {
            return invalid(format!("vfov must be in (0, 180) degrees, got {}", self.vfov));
        }
        if !(self.aspect_ratio > 0.0 && self.aspect_ratio.is_finite()) {
            return invalid(format!("aspect ratio must be positive, got {}", self.aspect_ratio));
        }
        if !(self.aperture >= 0.0 && self.aperture.is_finite()) {
            return invalid(format!("aperture must be non-negative, got {}", self.aperture));
        }
        if !(self.focus_dist > 0.0 && self.focus_dist.is_finite()) {
            return invalid(format!("focus distance must be positive, got {}", self.focus_dist));
        }
        let view = self.look_from - self.look_at;
        if view.length_squared() == 0.0 {
            return invalid("look_from and look_at coincide".to_string());
        }
        if self.vup.cross(view).length_squared() == 0.0 {
            return invalid("vup is parallel to the view direction".to_string());
        }
        check_time_interval(self.time0, self.time1)
    }
}

/// Immutable primary ray generator.
#[derive(Debug, Clone)]
pub struct Camera {
    origin: Vec3,
    lower_left_corner: Vec3,
    horizontal: Vec3,
    vertical: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    lens_radius: f64,
    time0: f64,
    time1: f64,
}

impl Camera {
    /// Generate a ray through normalized viewport coordinates.
    ///
    /// `s` runs left to right and `t` bottom to top, both over [0, 1]. The
    /// origin is jittered across the lens and the time is drawn from the
    /// shutter window.
    pub fn get_ray(&self, s: f64, t: f64, rng: &mut dyn RngCore) -> Ray {
        let rd = self.lens_radius * random_in_unit_disk(rng);
        let offset = self.u * rd.x + self.v * rd.y;

        let direction =
            self.lower_left_corner + s * self.horizontal + t * self.vertical - self.origin - offset;
        let time = if self.time0 < self.time1 {
            gen_range(rng, self.time0, self.time1)
        } else {
            self.time0
        };

        Ray::new(self.origin + offset, direction, time)
    }

    /// Shutter open and close times.
    pub fn shutter(&self) -> (f64, f64) {
        (self.time0, self.time1)
    }

    /// Orthonormal basis `(u, v, w)`: right, up, and backward from the view.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        (self.u, self.v, self.w)
    }
}
