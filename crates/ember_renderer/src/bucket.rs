//! Image tiling for parallel rendering.
//!
//! The image is cut into square tiles ("buckets") handed to rayon workers.
//! Each bucket owns a generator seeded from its index, so its pixels come
//! out the same whichever thread renders it.

use crate::image_buffer::PixelSink;
use crate::renderer::render_pixel;
use crate::{Camera, Color, Hittable, RenderConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Edge length used when the config does not say otherwise.
pub const DEFAULT_BUCKET_SIZE: u32 = 64;

/// A tile of the image; `(x, y)` is its top-left pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bucket {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Position in the render order, also the seed stream id
    pub index: usize,
}

impl Bucket {
    pub fn new(x: u32, y: u32, width: u32, height: u32, index: usize) -> Self {
        Self { x, y, width, height, index }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Squared distance from the tile's middle to `(cx, cy)`.
    fn distance_sq_to(&self, cx: f64, cy: f64) -> f64 {
        let dx = self.x as f64 + self.width as f64 * 0.5 - cx;
        let dy = self.y as f64 + self.height as f64 * 0.5 - cy;
        dx * dx + dy * dy
    }
}

/// Tile a `width` x `height` image, nearest-to-center tiles first.
///
/// Edge tiles are clipped to the image. Ties keep row-major order, so the
/// list (and every index in it) is a pure function of the three sizes.
pub fn generate_buckets(width: u32, height: u32, bucket_size: u32) -> Vec<Bucket> {
    let step = bucket_size.max(1) as usize;
    let mut buckets: Vec<Bucket> = (0..height)
        .step_by(step)
        .flat_map(|y| {
            (0..width).step_by(step).map(move |x| {
                Bucket::new(x, y, bucket_size.min(width - x), bucket_size.min(height - y), 0)
            })
        })
        .collect();

    let (cx, cy) = (width as f64 * 0.5, height as f64 * 0.5);
    buckets.sort_by(|a, b| a.distance_sq_to(cx, cy).total_cmp(&b.distance_sq_to(cx, cy)));

    for (index, bucket) in buckets.iter_mut().enumerate() {
        bucket.index = index;
    }
    buckets
}

/// Seed of bucket `index`'s generator: the render seed mixed through the
/// SplitMix64 finalizer.
pub fn bucket_seed(seed: u64, index: usize) -> u64 {
    let mut z = seed ^ (index as u64).wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Trace every pixel of `bucket`, row by row.
pub fn render_bucket(bucket: &Bucket, camera: &Camera, world: &dyn Hittable, config: &RenderConfig) -> Vec<Color> {
    let mut rng = StdRng::seed_from_u64(bucket_seed(config.seed, bucket.index));

    let mut pixels = Vec::with_capacity(bucket.pixel_count());
    for y in bucket.y..bucket.y + bucket.height {
        for x in bucket.x..bucket.x + bucket.width {
            pixels.push(render_pixel(camera, world, x, y, config, &mut rng));
        }
    }
    pixels
}

/// Finished pixels of one bucket, row-major within the tile.
#[derive(Debug, Clone)]
pub struct BucketResult {
    pub bucket: Bucket,
    pub pixels: Vec<Color>,
}

impl BucketResult {
    pub fn new(bucket: Bucket, pixels: Vec<Color>) -> Self {
        Self { bucket, pixels }
    }

    /// Hand each pixel to `sink` at its image coordinates.
    pub fn write_to<S: PixelSink + ?Sized>(&self, sink: &mut S) {
        let rows = self.pixels.chunks(self.bucket.width.max(1) as usize);
        for (dy, row) in rows.enumerate() {
            for (dx, color) in row.iter().enumerate() {
                sink.put_pixel(self.bucket.x + dx as u32, self.bucket.y + dy as u32, *color);
            }
        }
    }
}
