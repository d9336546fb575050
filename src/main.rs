use std::fs;
use std::path::{Path, PathBuf};

use bevy::prelude::*;
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lockstep_nav::nav::config::{NavConfig, NavSettings, DEFAULT_CONFIG_PATH};
use lockstep_nav::nav::fixed_math::FixedVec3;
use lockstep_nav::nav::mesh::{NavMeshData, NavMeshRegistry, TriangleRef};
use lockstep_nav::nav::movement::{MoveRequest, MoveScratch, MovementResolver};
use lockstep_nav::nav::rasterizer::NavRasterizer;

const LOG_PREFIX: &str = "navreplay";

fn setup_file_logging() -> String {
    let log_dir = PathBuf::from("logs");
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Failed to create {}: {}", log_dir.display(), e);
    }

    // Clean up old log files, keeping only the last 25
    cleanup_old_logs(&log_dir, 25);

    let now = chrono::Local::now();
    let log_filename = format!("{}_{}.log", LOG_PREFIX, now.format("%Y%m%d_%H%M%S"));
    let log_path_str = log_dir.join(&log_filename).to_string_lossy().to_string();

    let file_appender = RollingFileAppender::new(
        Rotation::NEVER, // One file per run
        &log_dir,
        &log_filename,
    );

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false);

    let stdout_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(false);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("lockstep_nav=info,navreplay=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    log_path_str
}

fn cleanup_old_logs(log_dir: &Path, keep_count: usize) {
    if let Ok(entries) = fs::read_dir(log_dir) {
        let mut log_files: Vec<_> = entries
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|s| s.starts_with(LOG_PREFIX) && s.ends_with(".log"))
            })
            .collect();

        // Oldest first
        log_files.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));

        if log_files.len() > keep_count {
            for file in log_files.iter().take(log_files.len() - keep_count) {
                let _ = fs::remove_file(file.path());
            }
        }
    }
}

/// Replay seeded random movement over a navmesh and print a checksum of
/// every final agent position.
#[derive(Parser, Debug)]
#[command(name = "navreplay", version)]
struct ReplayArgs {
    /// RON navmesh to load. A 12 x 12 grid is used when omitted.
    mesh: Option<String>,

    #[arg(long, default_value_t = 200)]
    agents: usize,

    #[arg(long, default_value_t = 600)]
    ticks: u64,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Largest per-tick displacement along each axis, in raw units.
    #[arg(long, default_value_t = 1500, value_parser = clap::value_parser!(i32).range(1..=1_000_000))]
    step: i32,
}

fn load_mesh(path: Option<&str>) -> NavMeshData {
    let Some(path) = path else {
        info!("[REPLAY] No mesh given, using a 12 x 12 grid");
        return NavMeshData::grid(12, 12, 4000);
    };
    match NavMeshData::load(path) {
        Ok(data) => data,
        Err(e) => {
            error!("[REPLAY] {}", e);
            error!("[REPLAY] Falling back to a 12 x 12 grid");
            NavMeshData::grid(12, 12, 4000)
        }
    }
}

struct Agent {
    position: FixedVec3,
    hint: Option<TriangleRef>,
}

/// Order-sensitive fold over every agent position.
fn checksum(agents: &[Agent]) -> u64 {
    agents.iter().fold(0xcbf2_9ce4_8422_2325u64, |hash, agent| {
        [agent.position.x, agent.position.y, agent.position.z]
            .into_iter()
            .fold(hash, |h, v| (h ^ v as u32 as u64).wrapping_mul(0x0000_0100_0000_01b3))
    })
}

fn main() {
    let args = ReplayArgs::parse();

    let log_file = setup_file_logging();
    println!("navreplay - logging to {}", log_file);

    let (_, settings) = NavSettings::from_config_or_default(NavConfig::load_or_default(DEFAULT_CONFIG_PATH));
    let mut registry = NavMeshRegistry::new();
    let mesh_id = match registry.insert(&load_mesh(args.mesh.as_deref())) {
        Ok(id) => id,
        Err(e) => {
            error!("[REPLAY] Mesh rejected: {}", e);
            std::process::exit(1);
        }
    };
    let rasterizer = NavRasterizer::build(&registry, settings.cell_size);
    let resolver = match MovementResolver::new(&registry, &rasterizer, &settings) {
        Ok(resolver) => resolver,
        Err(e) => {
            error!("[REPLAY] {}", e);
            std::process::exit(1);
        }
    };

    let triangle_count = match registry.mesh(mesh_id) {
        Ok(mesh) => mesh.triangle_count() as u32,
        Err(e) => {
            error!("[REPLAY] {}", e);
            std::process::exit(1);
        }
    };
    if triangle_count == 0 {
        error!("[REPLAY] Mesh has no triangles");
        std::process::exit(1);
    }

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut agents: Vec<Agent> = (0..args.agents)
        .filter_map(|_| {
            let tri = TriangleRef::new(mesh_id, rng.random_range(0..triangle_count));
            registry.triangle(tri).map(|t| Agent { position: t.centroid, hint: Some(tri) })
        })
        .collect();
    info!(
        "[REPLAY] {} agents on mesh {:?}, {} ticks, seed {}",
        agents.len(),
        mesh_id,
        args.ticks,
        args.seed
    );

    let mut scratch = MoveScratch::default();
    let mut collisions = 0u64;
    for tick in 1..=args.ticks {
        for agent in agents.iter_mut() {
            let delta = FixedVec3::ground(
                rng.random_range(-args.step..=args.step),
                rng.random_range(-args.step..=args.step),
            );
            let outcome = resolver.resolve(&MoveRequest::new(agent.position, delta).with_hint(agent.hint), &mut scratch);
            agent.position += outcome.displacement;
            agent.hint = outcome.triangle;
            collisions += outcome.collided as u64;
        }
        if tick % 100 == 0 {
            debug!("[REPLAY] Tick {}: checksum {:016x}", tick, checksum(&agents));
        }
    }

    let sum = checksum(&agents);
    info!("[REPLAY] Done: {} boundary collisions, checksum {:016x}", collisions, sum);
    println!("{:016x}", sum);
}
