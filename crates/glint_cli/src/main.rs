use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glint_core::load_scene_path;
use glint_render::{write_image, Renderer};

/// Offline recursive ray tracer.
#[derive(Parser)]
#[command(name = "glint", version, about)]
struct Args {
    /// Scene description file
    scene: PathBuf,

    /// Output image path (.ppm is native; other extensions use the
    /// image crate's format dispatch)
    #[arg(short, long, default_value = "render.ppm")]
    output: PathBuf,

    /// Override the worker thread count from the scene file
    #[arg(long)]
    threads: Option<u32>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    // A scene that fails to load aborts before any render work starts.
    let (scene, mut config) = load_scene_path(&args.scene)
        .with_context(|| format!("failed to load scene {}", args.scene.display()))?;
    if let Some(threads) = args.threads {
        config.num_threads = threads;
    }

    let renderer = Renderer::new(scene, config).with_progress(true);
    let (pixels, _stats) = renderer.render();

    let config = renderer.config();
    write_image(&args.output, &pixels, config.width, config.height)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    Ok(())
}
