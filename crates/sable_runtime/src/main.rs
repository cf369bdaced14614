//! Sable Runtime
//!
//! The `sable` binary: loads settings, then runs the windowed sprite demo,
//! a headless frame loop, or the render benchmark.

mod app;
mod benchmark;
mod demo;
mod windowed;

use anyhow::Result;
use app::Application;
use benchmark::{write_results, RenderBenchmark};
use clap::{Parser, Subcommand, ValueEnum};
use sable_render::HeadlessBackend;
use sable_services::Settings;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sable")]
#[command(about = "Batched 2D sprite renderer on an archetype ECS")]
struct Cli {
    /// Settings file (JSON); missing files fall back to defaults
    #[arg(long, default_value = "sable.json")]
    settings: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Open a window and render the demo scene (default)
    Run,
    /// Render the demo scene without a GPU and log frame statistics
    Headless {
        #[arg(long, default_value_t = 120)]
        frames: usize,
    },
    /// Run the headless render benchmark
    Bench {
        #[arg(long, value_enum, default_value_t = BenchMode::Single)]
        mode: BenchMode,
        /// Where to write JSON results; overrides the settings file
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write the effective settings to the settings path
    WriteSettings,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum BenchMode {
    Single,
    Compare,
    Scale,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    info!("Sable v{}", sable_core::VERSION);
    let settings = Settings::load(&cli.settings)?;

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => windowed::run(settings),
        Commands::Headless { frames } => run_headless(settings, frames),
        Commands::Bench { mode, output } => run_benchmark(settings, mode, output),
        Commands::WriteSettings => {
            settings.save(&cli.settings)?;
            info!(path = %cli.settings.display(), "settings written");
            Ok(())
        }
    }
}

fn run_headless(settings: Settings, frames: usize) -> Result<()> {
    let aspect_ratio = settings.window.width.max(1) as f32 / settings.window.height.max(1) as f32;
    let mut backend = HeadlessBackend::new();
    let mut app = Application::new(settings);
    app.init(&mut backend, aspect_ratio)?;

    for _ in 0..frames {
        app.frame(1.0 / 60.0, &mut backend)?;
    }

    let stats = app.stats();
    info!(
        frames,
        entities = app.world().entity_count(),
        atlases = app.atlases().atlas_names().len(),
        sprites = app.sprite_count(),
        draw_calls = stats.draw_calls,
        rendered = stats.sprites_rendered,
        culled = stats.sprites_culled,
        batches = stats.batches_created,
        frame_ms = format_args!("{:.3}", app.frame_stats().avg_ms),
        "headless run complete"
    );
    app.shutdown(&mut backend);
    Ok(())
}

fn run_benchmark(settings: Settings, mode: BenchMode, output: Option<PathBuf>) -> Result<()> {
    let aspect_ratio = settings.window.width.max(1) as f32 / settings.window.height.max(1) as f32;
    let output = output.or_else(|| settings.benchmark.output_path.clone());
    let bench = RenderBenchmark::new(settings.benchmark.clone(), app::batcher_config(&settings), aspect_ratio);

    let mut backend = HeadlessBackend::new();
    let results = match mode {
        BenchMode::Single => vec![bench.run_default(&mut backend)?],
        BenchMode::Compare => bench.run_comparison(&mut backend)?,
        BenchMode::Scale => bench.run_scalability(&mut backend)?,
    };

    if let Some(path) = output {
        write_results(&results, &path)?;
    }
    Ok(())
}
