//! Headless streaming driver
//!
//! Walks a viewpoint across the world and reports what the chunk store does.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clap::Parser;

use terrastream::{ChunkPosition, World, WorldError, WorldSettings};

#[derive(Parser, Debug)]
#[command(
    name = "terrastream",
    about = "Stream procedurally generated chunks around a moving viewpoint"
)]
struct Args {
    /// World seed; 0 derives one from the current time
    #[arg(long)]
    seed: Option<u32>,

    /// TOML file with world settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of streaming ticks to run
    #[arg(long, default_value_t = 32)]
    ticks: u32,

    /// Chunks the viewpoint moves along +x per tick
    #[arg(long, default_value_t = 1)]
    step: i32,
}

fn run(args: Args) -> Result<(), WorldError> {
    let mut settings = match &args.config {
        Some(path) => WorldSettings::load(path)?,
        None => WorldSettings::default(),
    };
    if let Some(seed) = args.seed {
        settings.seed = seed;
    }

    let mut world = World::with_settings(&settings)?;

    // Spawn column is generated before the worker has anything to race with
    let spawn = ChunkPosition::new(0, 0);
    world.generate_chunk(spawn);
    tracing::info!(
        seed = world.seed(),
        spawn_height = world.get_terrain_height(0, 0),
        chunks = world.get_chunk_count(),
        "Spawn ready"
    );

    let mut center = spawn;
    for tick in 0..args.ticks {
        let stats = world.update_streaming(center);
        tracing::info!(
            tick,
            x = center.x,
            z = center.z,
            ready = stats.ready,
            unloaded = stats.unloaded,
            pending = stats.pending,
            pooled = world.pooled_chunk_count(),
            "Tick"
        );
        world.wait_until_idle(Duration::from_millis(50));
        center = ChunkPosition::new(center.x + args.step, center.z);
    }

    let visible = world
        .get_chunks_around(center, world.settings().render_radius)
        .len();
    tracing::info!(
        active = world.get_chunk_count(),
        visible,
        pooled = world.pooled_chunk_count(),
        "Finished"
    );

    world.shutdown();
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::info!("Starting terrastream...");
    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
