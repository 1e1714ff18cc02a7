//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! Binary tree built top-down once per scene. Every branch owns exactly two
//! children and stores the union of their boxes over the build time window,
//! so a ray that misses a branch box can skip the whole subtree.

use crate::error::{check_time_interval, RenderError, RenderResult};
use crate::{HitRecord, Hittable};
use ember_math::{Aabb, Interval, Ray};
use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// How a node picks the axis its primitives are sorted along.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitStrategy {
    /// Uniformly random axis per node.
    #[default]
    RandomAxis,
    /// Longest axis of the centroid bounds of the node's primitives.
    LongestAxis,
}

/// BVH node - either a branch with two children or a leaf with one primitive.
pub enum BvhNode {
    /// Internal node with two children.
    Branch {
        left: Box<BvhNode>,
        right: Box<BvhNode>,
        bbox: Aabb,
    },
    /// Leaf wrapping a single primitive.
    Leaf {
        object: Box<dyn Hittable>,
        bbox: Aabb,
    },
}

impl BvhNode {
    /// Build a BVH with random split axes, valid for rays with times in
    /// `[time0, time1]`.
    pub fn new(
        objects: Vec<Box<dyn Hittable>>,
        time0: f64,
        time1: f64,
        rng: &mut dyn RngCore,
    ) -> RenderResult<Self> {
        Self::with_strategy(objects, time0, time1, SplitStrategy::RandomAxis, rng)
    }

    /// Build a BVH using the given split strategy.
    pub fn with_strategy(
        objects: Vec<Box<dyn Hittable>>,
        time0: f64,
        time1: f64,
        strategy: SplitStrategy,
        rng: &mut dyn RngCore,
    ) -> RenderResult<Self> {
        check_time_interval(time0, time1)?;
        if objects.is_empty() {
            return Err(RenderError::EmptyScene);
        }

        let count = objects.len();
        let builder = Builder {
            time0,
            time1,
            strategy,
        };
        let root = builder.build(objects, rng);

        log::debug!(
            "BVH: {} primitives, depth {}, {:?} split, time [{}, {}]",
            count,
            root.depth(),
            strategy,
            time0,
            time1
        );

        Ok(root)
    }

    /// Number of primitives in the tree.
    pub fn len(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => left.len() + right.len(),
        }
    }

    /// Always false: an empty BVH cannot be built.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Number of nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        match self {
            BvhNode::Leaf { .. } => 1,
            BvhNode::Branch { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn bbox(&self) -> Aabb {
        match self {
            BvhNode::Leaf { bbox, .. } | BvhNode::Branch { bbox, .. } => *bbox,
        }
    }
}

struct Builder {
    time0: f64,
    time1: f64,
    strategy: SplitStrategy,
}

impl Builder {
    fn build(&self, mut objects: Vec<Box<dyn Hittable>>, rng: &mut dyn RngCore) -> BvhNode {
        let axis = self.choose_axis(&objects, rng);

        match objects.len() {
            1 => self.leaf(objects.remove(0)),
            2 => {
                let second = objects.remove(1);
                let first = objects.remove(0);
                let (left, right) = if self.compare(&*first, &*second, axis) == Ordering::Greater {
                    (second, first)
                } else {
                    (first, second)
                };
                self.branch(self.leaf(left), self.leaf(right))
            }
            n => {
                // Stable: equal keys keep their input order
                objects.sort_by(|a, b| self.compare(a.as_ref(), b.as_ref(), axis));

                let right_objects = objects.split_off(n / 2);
                let left = self.build(objects, rng);
                let right = self.build(right_objects, rng);
                self.branch(left, right)
            }
        }
    }

    fn choose_axis(&self, objects: &[Box<dyn Hittable>], rng: &mut dyn RngCore) -> usize {
        match self.strategy {
            SplitStrategy::RandomAxis => rng.gen_range(0..3),
            SplitStrategy::LongestAxis => {
                let centroid_bounds = objects.iter().fold(Aabb::EMPTY, |acc, obj| {
                    let c = obj.bounding_box(self.time0, self.time1).centroid();
                    Aabb::surrounding(&acc, &Aabb::from_points(c, c))
                });
                centroid_bounds.longest_axis()
            }
        }
    }

    /// Order two primitives by the minimum corner of their boxes on `axis`.
    fn compare(&self, a: &dyn Hittable, b: &dyn Hittable, axis: usize) -> Ordering {
        let a_min = a.bounding_box(self.time0, self.time1).axis_min(axis);
        let b_min = b.bounding_box(self.time0, self.time1).axis_min(axis);
        a_min.total_cmp(&b_min)
    }

    fn leaf(&self, object: Box<dyn Hittable>) -> BvhNode {
        let bbox = object.bounding_box(self.time0, self.time1);
        BvhNode::Leaf { object, bbox }
    }

    fn branch(&self, left: BvhNode, right: BvhNode) -> BvhNode {
        let bbox = Aabb::surrounding(&left.bbox(), &right.bbox());
        BvhNode::Branch {
            left: Box::new(left),
            right: Box::new(right),
            bbox,
        }
    }
}

impl Hittable for BvhNode {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        match self {
            BvhNode::Leaf { object, .. } => object.hit(ray, ray_t),

            BvhNode::Branch { left, right, bbox } => {
                if !bbox.hit(ray, ray_t) {
                    return None;
                }

                let hit_left = left.hit(ray, ray_t);

                // Only check right up to closest hit
                let right_t = match &hit_left {
                    Some(rec) => ray_t.with_max(rec.t),
                    None => ray_t,
                };
                right.hit(ray, right_t).or(hit_left)
            }
        }
    }

    fn bounding_box(&self, _time0: f64, _time1: f64) -> Aabb {
        self.bbox()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HittableList, Lambertian, Material, MovingSphere, Sphere};
    use ember_math::Vec3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    const TIME0: f64 = 0.0;
    const TIME1: f64 = 1.0;

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::new(Vec3::new(0.5, 0.5, 0.5)))
    }

    fn random_point(rng: &mut StdRng, extent: f64) -> Vec3 {
        Vec3::new(
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
            rng.gen_range(-extent..extent),
        )
    }

    /// Random mix of static and moving spheres, built twice so one copy can
    /// serve as the brute-force oracle.
    fn random_scene(seed: u64, count: usize) -> (Vec<Box<dyn Hittable>>, HittableList) {
        let mut rng = StdRng::seed_from_u64(seed);
        let material = gray();
        let mut objects: Vec<Box<dyn Hittable>> = Vec::new();
        let mut oracle = HittableList::new();

        for i in 0..count {
            let center = random_point(&mut rng, 10.0);
            let radius = rng.gen_range(0.3..2.0);
            if i % 3 == 0 {
                let end = center + random_point(&mut rng, 1.0);
                let make = || {
                    MovingSphere::new(center, end, TIME0, TIME1, radius, material.clone()).unwrap()
                };
                objects.push(Box::new(make()));
                oracle.add(make());
            } else {
                let make = || Sphere::new(center, radius, material.clone()).unwrap();
                objects.push(Box::new(make()));
                oracle.add(make());
            }
        }

        (objects, oracle)
    }

    fn spheres_on_x(count: usize) -> Vec<Box<dyn Hittable>> {
        (0..count)
            .map(|i| {
                let sphere = Sphere::new(Vec3::new(i as f64, 0.0, -5.0), 0.5, gray()).unwrap();
                Box::new(sphere) as Box<dyn Hittable>
            })
            .collect()
    }

    #[test]
    fn test_bvh_empty_is_error() {
        let mut rng = StdRng::seed_from_u64(0);
        let result = BvhNode::new(vec![], TIME0, TIME1, &mut rng);
        assert!(matches!(result, Err(RenderError::EmptyScene)));
    }

    #[test]
    fn test_bvh_inverted_time_is_error() {
        let mut rng = StdRng::seed_from_u64(0);
        let result = BvhNode::new(spheres_on_x(3), 1.0, 0.0, &mut rng);
        assert!(matches!(result, Err(RenderError::InvalidTimeInterval { .. })));
    }

    #[test]
    fn test_bvh_single_sphere() {
        let mut rng = StdRng::seed_from_u64(0);
        let bvh = BvhNode::new(spheres_on_x(1), TIME0, TIME1, &mut rng).unwrap();

        assert!(matches!(bvh, BvhNode::Leaf { .. }));
        assert_eq!(bvh.len(), 1);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0), 0.0);
        assert!(bvh.hit(&ray, Interval::new(1e-6, f64::INFINITY)).is_some());
    }

    #[test]
    fn test_bvh_pair_is_ordered() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut objects = spheres_on_x(2);
        objects.reverse();

        let bvh = BvhNode::with_strategy(objects, TIME0, TIME1, SplitStrategy::LongestAxis, &mut rng)
            .unwrap();

        match bvh {
            BvhNode::Branch { left, right, .. } => {
                assert!(matches!(*left, BvhNode::Leaf { .. }));
                assert!(matches!(*right, BvhNode::Leaf { .. }));
                assert!(left.bbox().minimum.x < right.bbox().minimum.x);
            }
            BvhNode::Leaf { .. } => panic!("two primitives must form a branch"),
        }
    }

    #[test]
    fn test_bvh_multiple_spheres() {
        let mut rng = StdRng::seed_from_u64(0);
        let bvh = BvhNode::new(spheres_on_x(10), TIME0, TIME1, &mut rng).unwrap();
        assert_eq!(bvh.len(), 10);

        // Test ray that hits sphere at x=5
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0), 0.0);
        let rec = bvh.hit(&ray, Interval::new(1e-6, f64::INFINITY)).unwrap();

        // Hit point should be near z = -4.5 (sphere at z=-5, radius 0.5)
        assert!((rec.p.z - (-4.5)).abs() < 1e-9);
    }

    #[test]
    fn test_bvh_depth_is_logarithmic_for_spread_input() {
        let mut rng = StdRng::seed_from_u64(0);
        let bvh = BvhNode::with_strategy(
            spheres_on_x(64),
            TIME0,
            TIME1,
            SplitStrategy::LongestAxis,
            &mut rng,
        )
        .unwrap();

        // Midpoint splits of 64 primitives: 6 branch levels plus the leaf
        assert_eq!(bvh.depth(), 7);
    }

    /// Every node box contains the boxes of everything below it.
    fn check_containment(node: &BvhNode) {
        match node {
            BvhNode::Leaf { object, bbox } => {
                for i in 0..=8 {
                    let t = TIME0 + (TIME1 - TIME0) * i as f64 / 8.0;
                    assert!(bbox.contains_box(&object.bounding_box(t, t)));
                }
            }
            BvhNode::Branch { left, right, bbox } => {
                assert!(bbox.contains_box(&left.bbox()));
                assert!(bbox.contains_box(&right.bbox()));
                check_containment(left);
                check_containment(right);
            }
        }
    }

    #[test]
    fn test_bvh_box_containment() {
        for strategy in [SplitStrategy::RandomAxis, SplitStrategy::LongestAxis] {
            let (objects, _) = random_scene(21, 80);
            let mut rng = StdRng::seed_from_u64(1);
            let bvh = BvhNode::with_strategy(objects, TIME0, TIME1, strategy, &mut rng).unwrap();

            assert_eq!(bvh.len(), 80);
            check_containment(&bvh);
        }
    }

    #[test]
    fn test_bvh_matches_brute_force() {
        for (seed, strategy) in [
            (1, SplitStrategy::RandomAxis),
            (2, SplitStrategy::RandomAxis),
            (3, SplitStrategy::LongestAxis),
        ] {
            let (objects, oracle) = random_scene(seed, 60);
            let mut rng = StdRng::seed_from_u64(seed + 100);
            let bvh = BvhNode::with_strategy(objects, TIME0, TIME1, strategy, &mut rng).unwrap();

            let mut hits = 0;
            for _ in 0..2000 {
                let origin = random_point(&mut rng, 15.0);
                let direction = random_point(&mut rng, 10.0) - origin;
                let time = rng.gen_range(TIME0..TIME1);
                let ray = Ray::new(origin, direction, time);
                let t_max = if rng.gen_bool(0.5) { f64::INFINITY } else { rng.gen_range(1.0..20.0) };
                let range = Interval::new(1e-6, t_max);

                let expected = oracle.hit(&ray, range).map(|rec| rec.t);
                let actual = bvh.hit(&ray, range);
                assert_eq!(actual.map(|rec| rec.t), expected);

                if let Some(rec) = actual {
                    hits += 1;
                    assert!(rec.normal.dot(ray.direction()) <= 0.0);
                }
            }

            // Make sure the comparison is not vacuous
            assert!(hits > 100, "only {hits} hits");
        }
    }
}
