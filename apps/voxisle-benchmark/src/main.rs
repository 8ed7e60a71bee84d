//! Voxisle headless benchmark
//!
//! Builds an island world, meshes its clouds, then casts picking rays down
//! onto the terrain and alternates voxel additions and removals at the hits.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --release -p voxisle-benchmark -- [OPTIONS]
//! ```
//!
//! ## Environment Variables
//!
//! - `RUST_LOG`: Set log level (e.g., info, debug, trace)

mod params;

use std::time::Instant;

use glam::Vec3;
use tracing::info;
use tracing_subscriber::EnvFilter;
use voxisle_core::constants::CHUNK_SIZE;
use voxisle_world::{ChunkManager, CloudLayer, EditMode, MoveDirection, ViewState, World};

use crate::params::RunParams;

fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "-h" || arg == "--help") {
        print_help();
        return Ok(());
    }

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let params = RunParams::from_args();
    let config = params.world_config();
    info!("Voxisle benchmark: {:?}", params);

    let world = World::new(config)?;
    let dims = world.dims();
    let non_empty = world.chunks().iter().filter(|c| !c.is_empty()).count();
    info!(
        "{} chunks, {} non-empty, {} vertices ({:.1} MiB)",
        world.chunks().len(),
        non_empty,
        world.vertex_count(),
        (world.vertex_count() * 4) as f64 / (1024.0 * 1024.0)
    );

    let start = Instant::now();
    let clouds = CloudLayer::generate(world.generator().noise(), dims);
    let cloud_vertices = clouds.build_mesh();
    info!(
        "Clouds: {} cells, {} quads at y={}, meshed in {:.2?}",
        clouds.coverage(),
        cloud_vertices.len() / 6,
        clouds.altitude(),
        start.elapsed()
    );

    let mut manager = ChunkManager::new(world);
    run_edits(&mut manager, params.casts);

    Ok(())
}

/// Cast rays straight down over a grid of columns, editing wherever one hits.
fn run_edits(manager: &mut ChunkManager, casts: usize) {
    let dims = manager.world().dims();
    let (width, _, depth) = dims.voxel_extent();
    let side = (casts as f64).sqrt().ceil().max(1.0) as usize;
    let step_x = (width as usize / side).max(1);
    let step_z = (depth as usize / side).max(1);

    let start = Instant::now();
    let (mut hits, mut edits, mut rebuilt, mut blocked) = (0usize, 0usize, 0usize, 0usize);
    for i in 0..casts {
        let x = (i % side) * step_x;
        let z = (i / side) * step_z;
        let height = manager.world().generator().height_at(x as i32, z as i32);
        let eye = Vec3::new(x as f32 + 0.5, height as f32 + 4.5, z as f32 + 0.5);
        let view = ViewState::looking(eye, Vec3::NEG_Y);

        if manager.check_collision(&view, MoveDirection::Forward) {
            blocked += 1;
        }
        if !manager.update(&view) {
            continue;
        }
        hits += 1;

        let wanted = if i % 2 == 0 {
            EditMode::Remove
        } else {
            EditMode::Add
        };
        if manager.mode() != wanted {
            manager.toggle_mode();
        }
        if let Some(outcome) = manager.apply_edit() {
            edits += 1;
            rebuilt += outcome.rebuilt.len();
        }
    }

    let elapsed = start.elapsed();
    info!(
        "{} casts over {}x{} voxels: {} hits, {} blocked probes, {} edits, {} chunk rebuilds in {:.2?} ({:.2?}/cast)",
        casts,
        width,
        depth,
        hits,
        blocked,
        edits,
        rebuilt,
        elapsed,
        elapsed / u32::try_from(casts.max(1)).unwrap_or(u32::MAX)
    );
    info!(
        "Final mesh: {} vertices across {} chunks of {}^3",
        manager.world().vertex_count(),
        dims.chunk_count(),
        CHUNK_SIZE
    );
}

fn print_help() {
    eprintln!(
        "Voxisle headless benchmark

USAGE:
    cargo run --release -p voxisle-benchmark -- [OPTIONS]

WORLD OPTIONS:
    --seed <N>      World generation seed (default: random)
    --width <N>     World width in chunks (default: 8)
    --height <N>    World height in chunks (default: 2)
    --depth <N>     World depth in chunks (default: 8)

RUN OPTIONS:
    --casts <N>     Number of picking rays to cast and edit at (default: 256)

OTHER:
    -h, --help      Print this help message

ENVIRONMENT VARIABLES:
    RUST_LOG        Set log level (e.g., info, debug, trace)"
    );
}
