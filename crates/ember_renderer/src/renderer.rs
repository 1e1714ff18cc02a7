//! Core path tracing renderer.
//!
//! Implements Monte Carlo path tracing with:
//! - Recursive ray tracing with a fixed bounce budget
//! - Anti-aliasing via multi-sampling
//! - Parallel bucket rendering with per-bucket seeded generators

use crate::bucket::{generate_buckets, render_bucket, BucketResult};
use crate::error::{RenderError, RenderResult};
use crate::image_buffer::{ImageBuffer, PixelSink};
use crate::sampling::gen_f64;
use crate::{Camera, Color, Hittable, SplitStrategy};
use ember_math::{Interval, Ray};
use rand::RngCore;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Smallest accepted hit distance; keeps bounced rays off their own surface.
pub const T_MIN: f64 = 1e-6;

/// Largest image the renderer will allocate (16384 x 16384).
pub const MAX_IMAGE_PIXELS: u64 = 1 << 28;

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Image width in pixels
    pub image_width: u32,
    /// Image width over height; the height is derived from it
    pub aspect_ratio: f64,
    /// Samples per pixel for anti-aliasing
    pub samples_per_pixel: u32,
    /// Maximum ray bounce depth
    pub max_depth: u32,
    /// Color seen by primary rays that escape the scene
    pub background: Color,
    /// Base seed for all per-bucket generators
    pub seed: u64,
    /// Bucket edge length in pixels
    pub bucket_size: u32,
    /// BVH split axis heuristic
    pub bvh_split: SplitStrategy,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            image_width: 600,
            aspect_ratio: 3.0 / 2.0,
            samples_per_pixel: 20,
            max_depth: 50,
            background: Color::new(0.0352, 0.0627, 0.2078),
            seed: 0,
            bucket_size: crate::bucket::DEFAULT_BUCKET_SIZE,
            bvh_split: SplitStrategy::RandomAxis,
        }
    }
}

impl RenderConfig {
    /// Image height derived from width and aspect ratio (at least 1).
    pub fn image_height(&self) -> u32 {
        ((self.image_width as f64 / self.aspect_ratio) as u32).max(1)
    }

    /// Reject configurations the renderer cannot honor.
    pub fn validate(&self) -> RenderResult<()> {
        let invalid = |msg: &str| Err(RenderError::InvalidConfig(msg.to_string()));

        if self.image_width == 0 {
            return invalid("image width must be at least 1");
        }
        if !(self.aspect_ratio > 0.0 && self.aspect_ratio.is_finite()) {
            return invalid("aspect ratio must be positive");
        }
        let height = self.image_width as f64 / self.aspect_ratio;
        if height > u32::MAX as f64 {
            return invalid("image height derived from the aspect ratio is too large");
        }
        if self.image_width as u64 * self.image_height() as u64 > MAX_IMAGE_PIXELS {
            return Err(RenderError::InvalidConfig(format!(
                "{}x{} image exceeds the limit of {} pixels",
                self.image_width,
                self.image_height(),
                MAX_IMAGE_PIXELS
            )));
        }
        if self.samples_per_pixel == 0 {
            return invalid("samples per pixel must be at least 1");
        }
        if self.bucket_size == 0 {
            return invalid("bucket size must be at least 1");
        }
        Ok(())
    }
}

/// Compute the color seen by a ray.
///
/// Follows the path until it reaches a light, escapes, is absorbed, or runs
/// out of bounces. Only a ray escaping at this level sees `background`; every
/// bounce below is traced against black.
pub fn ray_color(
    ray: &Ray,
    background: Color,
    world: &dyn Hittable,
    depth: u32,
    rng: &mut dyn RngCore,
) -> Color {
    // Bounce budget exhausted
    if depth == 0 {
        return Color::ZERO;
    }

    let Some(rec) = world.hit(ray, Interval::new(T_MIN, f64::INFINITY)) else {
        return background;
    };

    let emitted = rec.material.emitted(rec.u, rec.v, rec.p);

    match rec.material.scatter(ray, &rec, rng) {
        Some(result) => {
            result.attenuation * ray_color(&result.scattered, Color::ZERO, world, depth - 1, rng)
        }
        // Light source or absorbed
        None => emitted,
    }
}

/// Render a single pixel with multi-sampling.
///
/// `(x, y)` are image coordinates with row 0 at the top.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    config: &RenderConfig,
    rng: &mut dyn RngCore,
) -> Color {
    let width = config.image_width;
    let height = config.image_height();
    // Viewport t runs bottom to top
    let j = height - 1 - y;
    let s_scale = 1.0 / (width.max(2) - 1) as f64;
    let t_scale = 1.0 / (height.max(2) - 1) as f64;

    let mut pixel_color = Color::ZERO;

    for _ in 0..config.samples_per_pixel {
        let s = (x as f64 + gen_f64(rng)) * s_scale;
        let t = (j as f64 + gen_f64(rng)) * t_scale;
        let ray = camera.get_ray(s, t, rng);
        pixel_color += ray_color(&ray, config.background, world, config.max_depth, rng);
    }

    pixel_color / config.samples_per_pixel as f64
}

/// Render the scene and deliver every finished pixel to `sink`.
///
/// Buckets are rendered in parallel; `progress` is called with
/// `(finished, total)` buckets as each one completes. The result only
/// depends on `config.seed`, never on thread count or scheduling.
pub fn render_into<S, P>(
    sink: &mut S,
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    progress: P,
) -> RenderResult<()>
where
    S: PixelSink + ?Sized,
    P: Fn(usize, usize) + Sync,
{
    config.validate()?;
    render_buckets(sink, camera, world, config, progress);
    Ok(())
}

/// Bucket loop shared by the public entry points, which validate `config` first.
fn render_buckets<S, P>(sink: &mut S, camera: &Camera, world: &dyn Hittable, config: &RenderConfig, progress: P)
where
    S: PixelSink + ?Sized,
    P: Fn(usize, usize) + Sync,
{
    let width = config.image_width;
    let height = config.image_height();
    let buckets = generate_buckets(width, height, config.bucket_size);
    let total = buckets.len();
    let finished = AtomicUsize::new(0);

    log::info!(
        "Rendering {}x{} @ {} spp, max depth {}, {} buckets on {} threads",
        width,
        height,
        config.samples_per_pixel,
        config.max_depth,
        total,
        rayon::current_num_threads()
    );
    let start = Instant::now();

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let pixels = render_bucket(bucket, camera, world, config);
            let done = finished.fetch_add(1, Ordering::Relaxed) + 1;
            log::debug!("Bucket {} done ({}/{})", bucket.index, done, total);
            progress(done, total);
            BucketResult::new(*bucket, pixels)
        })
        .collect();

    for result in &results {
        result.write_to(sink);
    }

    log::info!("Rendered in {:?}", start.elapsed());
}

/// Render the entire scene to an image buffer.
pub fn render(camera: &Camera, world: &dyn Hittable, config: &RenderConfig) -> RenderResult<ImageBuffer> {
    render_with_progress(camera, world, config, |_, _| {})
}

/// [`render`] with a bucket progress callback.
pub fn render_with_progress<P>(
    camera: &Camera,
    world: &dyn Hittable,
    config: &RenderConfig,
    progress: P,
) -> RenderResult<ImageBuffer>
where
    P: Fn(usize, usize) + Sync,
{
    config.validate()?;
    let mut image = ImageBuffer::new(config.image_width, config.image_height());
    render_buckets(&mut image, camera, world, config, progress);
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BvhNode, CameraSettings, DiffuseLight, HittableList, Lambertian, Material, Sphere};
    use ember_math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::sync::Arc;

    /// Ground sphere plus a unit light at the origin.
    fn light_scene() -> BvhNode {
        let ground: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)));
        let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(Color::new(3.0, 3.0, 3.0)));

        let mut list = HittableList::new();
        list.add(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, ground).unwrap());
        list.add(Sphere::new(Vec3::ZERO, 1.0, light).unwrap());

        let mut rng = StdRng::seed_from_u64(0);
        BvhNode::new(list.into_objects(), 0.0, 1.0, &mut rng).unwrap()
    }

    fn small_config() -> RenderConfig {
        RenderConfig {
            image_width: 24,
            aspect_ratio: 3.0 / 2.0,
            samples_per_pixel: 4,
            max_depth: 5,
            background: Color::new(0.5, 0.7, 1.0),
            seed: 9,
            bucket_size: 8,
            bvh_split: SplitStrategy::RandomAxis,
        }
    }

    fn small_camera() -> Camera {
        CameraSettings::default()
            .with_position(Vec3::new(0.0, 2.0, 10.0), Vec3::ZERO, Vec3::Y)
            .with_lens(30.0, 0.0, 10.0)
            .build()
            .unwrap()
    }

    #[test]
    fn test_depth_zero_is_black() {
        let world = light_scene();
        let mut rng = StdRng::seed_from_u64(1);

        for _ in 0..20 {
            let dir = Vec3::new(
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
                rng.gen_range(-1.0..1.0),
            );
            let ray = Ray::new(Vec3::new(0.0, 3.0, 5.0), dir, 0.0);
            assert_eq!(ray_color(&ray, Color::ONE, &world, 0, &mut rng), Color::ZERO);
        }
    }

    #[test]
    fn test_ray_at_light_returns_emission() {
        let world = light_scene();
        let mut rng = StdRng::seed_from_u64(2);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, -1.0), 0.0);

        for depth in [1, 2, 50] {
            let color = ray_color(&ray, Color::new(0.1, 0.2, 0.3), &world, depth, &mut rng);
            assert_eq!(color, Color::new(3.0, 3.0, 3.0));
        }
    }

    #[test]
    fn test_escaping_ray_returns_background() {
        let world = light_scene();
        let mut rng = StdRng::seed_from_u64(3);
        let background = Color::new(0.0352, 0.0627, 0.2078);
        let ray = Ray::new(Vec3::new(0.0, 5.0, 0.0), Vec3::Y, 0.0);

        assert_eq!(ray_color(&ray, background, &world, 50, &mut rng), background);
    }

    #[test]
    fn test_bounce_does_not_see_background() {
        // A diffuse sphere in an empty world: every bounce escapes to black.
        let mut list = HittableList::new();
        let gray: Arc<dyn Material> = Arc::new(Lambertian::new(Color::splat(0.5)));
        list.add(Sphere::new(Vec3::ZERO, 1.0, gray).unwrap());

        let mut rng = StdRng::seed_from_u64(4);
        let ray = Ray::new(Vec3::new(0.0, 0.0, 5.0), Vec3::NEG_Z, 0.0);
        for _ in 0..20 {
            assert_eq!(ray_color(&ray, Color::ONE, &list, 10, &mut rng), Color::ZERO);
        }
    }

    #[test]
    fn test_lit_ground_receives_light() {
        let world = light_scene();
        let mut rng = StdRng::seed_from_u64(5);
        // Ground point right next to the light
        let ray = Ray::new(Vec3::new(1.5, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0), 0.0);

        let mean = (0..400)
            .map(|_| ray_color(&ray, Color::ZERO, &world, 5, &mut rng))
            .fold(Color::ZERO, |acc, c| acc + c)
            / 400.0;

        assert!(mean.x > 0.0);
        // Attenuated by the ground albedo at least once
        assert!(mean.max_element() < 3.0 * 0.5 + 1e-9);
    }

    #[test]
    fn test_render_pixel_hits_light() {
        let world = light_scene();
        let camera = small_camera();
        let config = small_config();
        let mut rng = StdRng::seed_from_u64(6);

        // Center of the image looks straight at the light
        let color = render_pixel(&camera, &world, 12, 8, &config, &mut rng);
        assert!(color.min_element() > 0.0);
        assert_ne!(color, config.background);
    }

    #[test]
    fn test_render_buffer_dimensions() {
        let world = light_scene();
        let camera = small_camera();
        let config = small_config();

        let image = render(&camera, &world, &config).unwrap();
        assert_eq!(image.width(), 24);
        assert_eq!(image.height(), 16);
        // Top row looks over the light into the sky
        assert_eq!(image.get(0, 0), config.background);
    }

    #[test]
    fn test_render_is_deterministic_across_thread_counts() {
        let world = light_scene();
        let camera = small_camera();
        let config = small_config();

        let single = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
        let multi = rayon::ThreadPoolBuilder::new().num_threads(4).build().unwrap();

        let a = single.install(|| render(&camera, &world, &config).unwrap());
        let b = multi.install(|| render(&camera, &world, &config).unwrap());
        assert_eq!(a.pixels(), b.pixels());

        let other_seed = RenderConfig { seed: 10, ..config };
        let c = render(&camera, &world, &other_seed).unwrap();
        assert_ne!(a.pixels(), c.pixels());
    }

    #[test]
    fn test_render_reports_progress() {
        let world = light_scene();
        let camera = small_camera();
        let config = small_config();
        let calls = AtomicUsize::new(0);
        let last_total = AtomicUsize::new(0);

        render_with_progress(&camera, &world, &config, |_, total| {
            calls.fetch_add(1, Ordering::Relaxed);
            last_total.store(total, Ordering::Relaxed);
        })
        .unwrap();

        // 24x16 in 8x8 buckets
        assert_eq!(calls.load(Ordering::Relaxed), 6);
        assert_eq!(last_total.load(Ordering::Relaxed), 6);
    }

    #[test]
    fn test_config_validation() {
        assert!(RenderConfig::default().validate().is_ok());

        let bad = [
            RenderConfig { image_width: 0, ..RenderConfig::default() },
            RenderConfig { samples_per_pixel: 0, ..RenderConfig::default() },
            RenderConfig { bucket_size: 0, ..RenderConfig::default() },
            RenderConfig { aspect_ratio: -1.0, ..RenderConfig::default() },
        ];
        for config in bad {
            assert!(matches!(config.validate(), Err(RenderError::InvalidConfig(_))));
        }
    }

    #[test]
    fn test_config_rejects_oversized_images() {
        let thin = RenderConfig { image_width: 600, aspect_ratio: 1e-9, ..RenderConfig::default() };
        assert!(matches!(thin.validate(), Err(RenderError::InvalidConfig(_))));

        let huge = RenderConfig { image_width: 20_000, aspect_ratio: 1.0, ..RenderConfig::default() };
        assert!(matches!(huge.validate(), Err(RenderError::InvalidConfig(_))));

        let largest = RenderConfig { image_width: 16_384, aspect_ratio: 1.0, ..RenderConfig::default() };
        assert!(largest.validate().is_ok());
        assert_eq!(largest.image_width as u64 * largest.image_height() as u64, MAX_IMAGE_PIXELS);
    }

    #[test]
    fn test_render_rejects_oversized_image_before_allocating() {
        let world = light_scene();
        let camera = CameraSettings::default().build().unwrap();
        let config = RenderConfig { image_width: 600, aspect_ratio: 1e-9, ..RenderConfig::default() };
        assert!(render(&camera, &world, &config).is_err());
    }

    #[test]
    fn test_config_height_and_json() {
        let config: RenderConfig =
            serde_json::from_str(r#"{ "image_width": 300, "bvh_split": "longest_axis" }"#).unwrap();

        assert_eq!(config.image_height(), 200);
        assert_eq!(config.bvh_split, SplitStrategy::LongestAxis);
        assert_eq!(config.samples_per_pixel, RenderConfig::default().samples_per_pixel);

        let tiny = RenderConfig { image_width: 1, aspect_ratio: 16.0, ..RenderConfig::default() };
        assert_eq!(tiny.image_height(), 1);
    }
}
