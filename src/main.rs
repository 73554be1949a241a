use anyhow::Context;
use clap::Parser;
use log::info;

use whitted_tracer::cli::Args;
use whitted_tracer::logger::init_logger;
use whitted_tracer::parallel::parallel_render;
use whitted_tracer::scene::{ RenderSettings, Scene };

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logger(args.log_level.into());

    let (scene, from_file) = match &args.scene {
        Some(path) => Scene::load(path)
            .with_context(|| format!("loading scene {}", path.display()))?,
        None => {
            info!("No scene given, rendering the demo room.");
            (Scene::demo(), RenderSettings::default())
        },
    };

    let settings = args.apply(from_file);
    let canvas = parallel_render(scene, &settings.projection(),
        settings.worker_count())
        .context("rendering scene")?;

    canvas.save(&args.output)
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!("Wrote {}.", args.output.display());

    Ok(())
}
