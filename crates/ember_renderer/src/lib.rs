//! Ember CPU path tracer.
//!
//! A Monte Carlo path tracer over spheres with diffuse, metal, glass and
//! emissive materials, accelerated by a BVH and rendered in parallel buckets.
//!
//! Scenes are immutable once built, and every sampling operation takes its
//! random generator explicitly, so rendering needs no shared mutable state.

mod bucket;
mod bvh;
mod camera;
mod error;
mod hittable;
mod image_buffer;
mod material;
mod renderer;
mod sphere;

pub mod sampling;

pub use bucket::{bucket_seed, generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::{BvhNode, SplitStrategy};
pub use camera::{Camera, CameraSettings};
pub use error::{RenderError, RenderResult};
pub use hittable::{HitRecord, Hittable, HittableList};
pub use image_buffer::{color_to_rgb8, linear_to_gamma, ImageBuffer, PixelSink};
pub use material::{Color, Dielectric, DiffuseLight, Lambertian, Material, Metal, ScatterResult};
pub use renderer::{ray_color, render, render_into, render_pixel, render_with_progress, RenderConfig, MAX_IMAGE_PIXELS, T_MIN};
pub use sphere::{MovingSphere, Sphere};

/// Re-export math types from ember_math
pub use ember_math::{Aabb, Interval, Ray, Vec3};
