//! Built-in demo scenes.

use crate::cli::SceneKind;
use ember_renderer::sampling::{gen_f64, gen_range, random_vec3};
use ember_renderer::{
    Color, Dielectric, DiffuseLight, HittableList, Lambertian, Material, Metal, MovingSphere, RenderResult, Sphere,
    Vec3,
};
use rand::RngCore;
use std::sync::Arc;

/// Warm white used for the main light sources.
const SUN_COLOR: Color = Color::new(0.9568 * 3.0, 0.90588 * 3.0, 0.6431 * 3.0);

/// Assemble the chosen scene. Moving spheres travel over `[time0, time1]`.
pub fn build_scene(kind: SceneKind, time0: f64, time1: f64, rng: &mut dyn RngCore) -> RenderResult<HittableList> {
    let world = match kind {
        SceneKind::Showcase => showcase_scene()?,
        SceneKind::Random => random_scene(time0, time1, rng)?,
    };
    log::info!("Built {:?} scene with {} primitives", kind, world.len());
    Ok(world)
}

/// Ground, a light sphere and a glass sphere stacked on top of it.
pub fn showcase_scene() -> RenderResult<HittableList> {
    let ground: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)));
    let light: Arc<dyn Material> = Arc::new(DiffuseLight::new(SUN_COLOR));
    let glass: Arc<dyn Material> = Arc::new(Dielectric::new(1.4));

    let mut world = HittableList::new();
    world.add(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, ground)?);
    world.add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, light)?);
    world.add(Sphere::new(Vec3::new(0.0, 2.0, 0.0), 1.0, glass)?);
    Ok(world)
}

/// A 22x22 grid of small random spheres around four large ones.
///
/// Diffuse spheres bounce upward over the shutter when it is open for a
/// non-zero time.
pub fn random_scene(time0: f64, time1: f64, rng: &mut dyn RngCore) -> RenderResult<HittableList> {
    let mut world = HittableList::new();

    let ground: Arc<dyn Material> = Arc::new(Lambertian::new(Color::new(0.5, 0.5, 0.5)));
    world.add(Sphere::new(Vec3::new(0.0, -1000.0, 0.0), 1000.0, ground)?);

    let clearing = Vec3::new(4.0, 0.2, 0.0);
    for a in -11..11 {
        for b in -11..11 {
            let choose_mat = gen_f64(rng);
            let center = Vec3::new(a as f64 + 0.9 * gen_f64(rng), 0.2, b as f64 + 0.9 * gen_f64(rng));

            if (center - clearing).length() <= 0.9 {
                continue;
            }

            if choose_mat < 0.4 {
                let albedo = random_vec3(rng, 0.0, 1.0) * random_vec3(rng, 0.0, 1.0);
                let material: Arc<dyn Material> = Arc::new(Lambertian::new(albedo));
                let center1 = center + Vec3::new(0.0, gen_range(rng, 0.0, 0.5), 0.0);
                if time1 > time0 {
                    world.add(MovingSphere::new(center, center1, time0, time1, 0.2, material)?);
                } else {
                    world.add(Sphere::new(center, 0.2, material)?);
                }
            } else if choose_mat < 0.8 {
                let emit = random_vec3(rng, 0.0, 1.0) * 1.2;
                world.add(Sphere::new(center, 0.2, Arc::new(DiffuseLight::new(emit)))?);
            } else if choose_mat < 0.9 {
                let albedo = random_vec3(rng, 0.5, 1.0);
                let fuzz = gen_range(rng, 0.0, 0.5);
                world.add(Sphere::new(center, 0.2, Arc::new(Metal::new(albedo, fuzz)))?);
            } else {
                world.add(Sphere::new(center, 0.2, Arc::new(Dielectric::new(1.5)))?);
            }
        }
    }

    world.add(Sphere::new(Vec3::new(-8.0, 1.0, 0.0), 1.0, Arc::new(DiffuseLight::new(SUN_COLOR)))?);
    world.add(Sphere::new(Vec3::new(0.0, 1.0, 0.0), 1.0, Arc::new(Dielectric::new(1.5)))?);
    world.add(Sphere::new(
        Vec3::new(-4.0, 1.0, 0.0),
        1.0,
        Arc::new(Lambertian::new(Color::new(0.4, 0.2, 0.1))),
    )?);
    world.add(Sphere::new(
        Vec3::new(4.0, 1.0, 0.0),
        1.0,
        Arc::new(Metal::new(Color::new(0.7, 0.6, 0.5), 0.0)),
    )?);

    Ok(world)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_renderer::{Hittable, Interval, Ray};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_showcase_scene() {
        let world = showcase_scene().unwrap();
        assert_eq!(world.len(), 3);

        // Straight down onto the glass sphere's top
        let ray = Ray::new(Vec3::new(0.0, 10.0, 0.0), Vec3::new(0.0, -1.0, 0.0), 0.0);
        let hit = world.hit(&ray, Interval::new(1e-6, f64::INFINITY)).unwrap();
        assert!((hit.t - 7.0).abs() < 1e-9);
    }

    #[test]
    fn test_random_scene_is_seeded() {
        let a = random_scene(0.0, 1.0, &mut StdRng::seed_from_u64(3)).unwrap();
        let b = random_scene(0.0, 1.0, &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(a.len(), b.len());
        // Ground, four feature spheres and most of the 484 grid cells
        assert!(a.len() > 400 && a.len() <= 1 + 484 + 4);

        let bbox_a = a.bounding_box(0.0, 1.0);
        let bbox_b = b.bounding_box(0.0, 1.0);
        assert_eq!(bbox_a, bbox_b);
    }

    #[test]
    fn test_random_scene_bounds() {
        let world = random_scene(0.0, 1.0, &mut StdRng::seed_from_u64(11)).unwrap();
        let bbox = world.bounding_box(0.0, 1.0);
        // Bounced diffuse balls stay below the feature spheres' tops
        assert!((bbox.maximum.y - 2.0).abs() < 1e-9);
        assert!((bbox.minimum.y + 2000.0).abs() < 1e-9);
    }

    #[test]
    fn test_random_scene_static_shutter() {
        let world = build_scene(SceneKind::Random, 0.5, 0.5, &mut StdRng::seed_from_u64(5)).unwrap();
        assert!(world.len() > 400);
    }
}
