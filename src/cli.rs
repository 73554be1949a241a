use std::path::PathBuf;

use clap::{ ArgEnum, Parser };
use log::LevelFilter;

use crate::consts::DEFAULT_OUT_FILE;
use crate::scene::RenderSettings;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ArgEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> LevelFilter {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Renders a scene of spheres, planes and lights with a Whitted-style ray
/// tracer.
#[derive(Debug, Parser)]
#[clap(name = "whitted-tracer", version, about)]
pub struct Args {
    /// JSON scene description; the built-in demo room is used when omitted
    #[clap(short, long)]
    pub scene: Option<PathBuf>,

    /// Output image (.png or .ppm)
    #[clap(short, long, default_value = DEFAULT_OUT_FILE)]
    pub output: PathBuf,

    /// Image width in pixels
    #[clap(long)]
    pub width: Option<usize>,

    /// Image height in pixels
    #[clap(long)]
    pub height: Option<usize>,

    /// Vertical field of view in degrees
    #[clap(long)]
    pub fov: Option<f64>,

    /// Worker threads; defaults to one per core
    #[clap(short = 'j', long)]
    pub threads: Option<usize>,

    #[clap(long, arg_enum, default_value = "info")]
    pub log_level: LogLevel,
}

impl Args {
    /// Overrides `settings` with whatever was given on the command line.
    pub fn apply(&self, settings: RenderSettings) -> RenderSettings {
        RenderSettings {
            width: self.width.unwrap_or(settings.width),
            height: self.height.unwrap_or(settings.height),
            field_of_view: self.fov.unwrap_or(settings.field_of_view),
            threads: self.threads.or(settings.threads),
        }
    }
}

#[test]
fn defaults_without_flags() {
    let args = Args::try_parse_from(["whitted-tracer"]).unwrap();

    assert!(args.scene.is_none());
    assert_eq!(args.output, PathBuf::from(DEFAULT_OUT_FILE));
    assert_eq!(args.log_level, LogLevel::Info);
    assert_eq!(args.apply(RenderSettings::default()), RenderSettings::default());
}

#[test]
fn flags_override_scene_settings() {
    let args = Args::try_parse_from([
        "whitted-tracer", "--width", "64", "--fov", "45", "-j", "2",
        "--log-level", "debug",
    ]).unwrap();

    let from_file = RenderSettings {
        width: 320,
        height: 200,
        field_of_view: 90.0,
        threads: Some(8),
    };
    let merged = args.apply(from_file);

    assert_eq!(merged.width, 64);
    assert_eq!(merged.height, 200);
    assert_eq!(merged.field_of_view, 45.0);
    assert_eq!(merged.threads, Some(2));
    assert_eq!(LevelFilter::from(args.log_level), LevelFilter::Debug);
}

#[test]
fn unknown_log_level_is_rejected() {
    assert!(Args::try_parse_from(["whitted-tracer", "--log-level", "loud"]).is_err());
}
