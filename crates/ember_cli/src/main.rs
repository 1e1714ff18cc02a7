//! Ember command line renderer.
//!
//! Builds one of the demo scenes, renders it with the settings from an
//! optional JSON file and command line flags, and writes the image.

mod cli;
mod config;
mod logger;
mod progress;
mod scenes;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Args;
use config::Config;
use ember_renderer::{render_with_progress, BvhNode};
use progress::ProgressReporter;
use rand::rngs::StdRng;
use rand::SeedableRng;

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_logger(args.log_level.into());

    let config = Config::from_args(&args)?;
    if args.dump_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }
    config.render.validate()?;

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("Failed to configure the worker thread pool")?;
    }

    let camera = config.camera.build()?;
    let (time0, time1) = camera.shutter();

    let mut rng = StdRng::seed_from_u64(config.render.seed);
    let scene = scenes::build_scene(args.scene, time0, time1, &mut rng)?;
    let world = BvhNode::with_strategy(scene.into_objects(), time0, time1, config.render.bvh_split, &mut rng)?;

    let reporter = ProgressReporter::new();
    let image = render_with_progress(&camera, &world, &config.render, |done, total| {
        reporter.report(done, total)
    })?;
    reporter.finish();

    image
        .save(&args.output)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    Ok(())
}
