use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::path::PathBuf;

/// Log levels selectable on the command line.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Built-in demo scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SceneKind {
    /// Ground, a light and a glass sphere above it
    Showcase,
    /// Grid of small random spheres around three large ones
    Random,
}

#[derive(Debug, Parser)]
#[command(name = "ember", version, about = "Batch CPU path tracer")]
pub struct Args {
    /// Scene to render
    #[arg(long, value_enum, default_value = "showcase")]
    pub scene: SceneKind,

    /// JSON file with "render" and "camera" sections
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output image path (.png, .ppm, ...)
    #[arg(short, long, default_value = "output.png")]
    pub output: PathBuf,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Number of samples per pixel
    #[arg(short, long)]
    pub samples: Option<u32>,

    /// Maximum bounces per path
    #[arg(long)]
    pub depth: Option<u32>,

    /// Seed for scene assembly and sampling
    #[arg(long)]
    pub seed: Option<u64>,

    /// Worker threads (defaults to all cores)
    #[arg(short = 'j', long)]
    pub threads: Option<usize>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    pub dump_config: bool,

    /// Set the logging level
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,
}
