mod behaviours;

use std::error::Error;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use log::LevelFilter;
use simplelog::{ColorChoice, CombinedLogger, ConfigBuilder, SharedLogger, TermLogger, TerminalMode, WriteLogger};
use strata_blocks::BlockRegistry;
use strata_io::{PersistError, WorldStore};
use strata_mesh_cpu::RenderPass;
use strata_runtime::{EngineConfig, Runtime, TickLoop};
use strata_world::worldgen::load_config_from_path;
use strata_world::{TerrainGenerator, VoxelPos, World, WorldGenConfig, WorldGenParams};

#[derive(Parser, Debug)]
#[command(name = "strata", about = "Headless chunked voxel world engine")]
struct Cli {
    /// Block registry
    #[arg(long, default_value = "assets/blocks.toml")]
    blocks: PathBuf,
    /// Terrain and world layout
    #[arg(long, default_value = "assets/worldgen.toml")]
    worldgen: PathBuf,
    /// Runtime settings
    #[arg(long, default_value = "assets/engine.toml")]
    engine: PathBuf,
    /// Log level (off, error, warn, info, debug, trace). Without it RUST_LOG applies.
    #[arg(long)]
    log_level: Option<LevelFilter>,
    /// Also write the log to this file
    #[arg(long)]
    log_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Stream chunks along a scripted walk, tick behaviours, then save
    Run {
        #[arg(long)]
        seed: Option<i32>,
        /// World directory name under the save dir
        #[arg(long)]
        world: Option<String>,
        #[arg(long)]
        view_distance: Option<i32>,
        /// Chunk boundaries to cross walking along +X
        #[arg(long, default_value_t = 4)]
        steps: u32,
        /// Move any existing world aside and start over
        #[arg(long)]
        fresh: bool,
    },
    /// Print the generated block column at one (x, z)
    Inspect {
        #[arg(long, allow_hyphen_values = true)]
        x: i32,
        #[arg(long, allow_hyphen_values = true)]
        z: i32,
        #[arg(long)]
        seed: Option<i32>,
    },
}

fn init_logging(level: Option<LevelFilter>, file: Option<&Path>) -> Result<(), Box<dyn Error>> {
    if level.is_none() && file.is_none() {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
        return Ok(());
    }
    let level = level.unwrap_or(LevelFilter::Info);
    let config = ConfigBuilder::new().set_target_level(LevelFilter::Error).build();
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        level,
        config.clone(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )];
    if let Some(path) = file {
        loggers.push(WriteLogger::new(level, config, File::create(path)?));
    }
    CombinedLogger::init(loggers)?;
    Ok(())
}

fn load_engine_config(path: &Path) -> Result<EngineConfig, Box<dyn Error>> {
    if !path.exists() {
        log::warn!("{} not found, using default engine settings", path.display());
        return Ok(EngineConfig::default());
    }
    EngineConfig::load_from_path(path)
}

/// Opens the configured world. A saved world with a different layout is moved
/// aside and a fresh one started.
fn open_world(engine: &EngineConfig, layout: World, fresh: bool) -> Result<WorldStore, PersistError> {
    if fresh {
        return WorldStore::create_fresh(&engine.save_dir, &engine.world_name, layout);
    }
    match WorldStore::open(&engine.save_dir, &engine.world_name, layout) {
        Err(PersistError::Mismatch { what, expected, found }) => {
            log::warn!("saved {what} is {found}, configured {expected}; starting a fresh world");
            WorldStore::create_fresh(&engine.save_dir, &engine.world_name, layout)
        }
        other => other,
    }
}

#[derive(Default)]
struct MeshTotals {
    meshes: usize,
    vertices: usize,
    opaque: usize,
    transparent: usize,
    liquid: usize,
}

impl MeshTotals {
    /// Takes every ready mesh, as the render thread would.
    fn drain(&mut self, rt: &Runtime) -> usize {
        let mut n = 0;
        while let Some(mesh) = rt.drain_ready_mesh() {
            n += 1;
            self.vertices += mesh.vertex_count();
            self.opaque += mesh.triangle_count(RenderPass::Opaque);
            self.transparent += mesh.triangle_count(RenderPass::Transparent);
            self.liquid += mesh.triangle_count(RenderPass::Liquid);
        }
        self.meshes += n;
        n
    }
}

struct RunArgs {
    seed: Option<i32>,
    world: Option<String>,
    view_distance: Option<i32>,
    steps: u32,
    fresh: bool,
}

fn run(cli: &Cli, args: RunArgs) -> Result<(), Box<dyn Error>> {
    let reg = Arc::new(BlockRegistry::load_from_path(&cli.blocks)?);
    let gen_cfg: WorldGenConfig = load_config_from_path(&cli.worldgen)?;
    let mut engine = load_engine_config(&cli.engine)?;
    if let Some(seed) = args.seed {
        engine.seed = Some(seed);
    }
    if let Some(name) = args.world {
        engine.world_name = name;
    }
    if let Some(v) = args.view_distance {
        engine.view_distance = v;
    }

    let layout = World {
        seed: engine.seed.unwrap_or(gen_cfg.world.seed),
        ..gen_cfg.world
    };
    let store = Arc::new(open_world(&engine, layout, args.fresh)?);
    let world = store.world();
    let params = WorldGenParams::from_config(&gen_cfg, &reg);
    let generator = Arc::new(TerrainGenerator::new(world, params));
    let behaviours = behaviours::default_behaviours(&reg);
    let rt = Runtime::new(engine.clone(), reg, generator, Some(store), behaviours)?;
    let ticks = TickLoop::spawn(rt.clone(), Duration::from_millis(engine.tick_length_ms.max(1)))?;

    let started = Instant::now();
    let mut totals = MeshTotals::default();
    let mut pos = world.spawn_position();
    rt.update_player_position(pos);
    rt.flush();
    let n = totals.drain(&rt);
    log::info!("warm-up: {} meshes in {:?}", n, started.elapsed());

    for step in 1..=args.steps {
        let next = pos.x + world.chunk_width as f32;
        if !world.voxel_in_world(VoxelPos::new(next as i32, 0, pos.z as i32)) {
            log::info!("reached the world edge after {} steps", step - 1);
            break;
        }
        pos.x = next;
        let t0 = Instant::now();
        rt.update_player_position(pos);
        rt.flush();
        let n = totals.drain(&rt);
        log::info!("step {}: {} meshes in {:?}", step, n, t0.elapsed());
    }

    ticks.stop();
    rt.flush();
    totals.drain(&rt);
    let saved = rt.save()?;
    rt.flush();

    let stats = rt.stats();
    log::info!(
        "chunks: {} active, {} inactive, {} populated ({} generated, {} from disk, {} unreadable)",
        stats.chunks.active,
        stats.chunks.inactive,
        stats.chunks.populated,
        stats.generated,
        stats.loaded_from_disk,
        stats.load_failures
    );
    log::info!(
        "meshes: {} built, {} drained, {} vertices, triangles {} opaque / {} transparent / {} liquid",
        stats.meshes_built,
        totals.meshes,
        totals.vertices,
        totals.opaque,
        totals.transparent,
        totals.liquid
    );
    log::info!(
        "edits: {} applied, {} pending; saved {} chunks ({} failed) in {:?}",
        stats.edits_applied,
        stats.pending.voxel_mods,
        saved,
        stats.save_failures,
        started.elapsed()
    );
    Ok(())
}

fn inspect(cli: &Cli, x: i32, z: i32, seed: Option<i32>) -> Result<(), Box<dyn Error>> {
    let reg = BlockRegistry::load_from_path(&cli.blocks)?;
    let gen_cfg = load_config_from_path(&cli.worldgen)?;
    let world = World {
        seed: seed.unwrap_or(gen_cfg.world.seed),
        ..gen_cfg.world
    };
    let params = WorldGenParams::from_config(&gen_cfg, &reg);
    let generator = TerrainGenerator::new(world, params);
    let col = generator.column(x, z);
    let biome = generator
        .params()
        .biomes
        .get(col.biome)
        .map_or("none", |b| b.name.as_str());
    println!(
        "column ({x}, {z}) seed {}: biome {biome}, terrain height {}",
        world.seed, col.terrain_height
    );

    // Runs of equal blocks, top down.
    let name = |id| reg.get(id).map_or("?", |b| b.name.as_str());
    let mut top = world.chunk_height as i32 - 1;
    let mut current = generator.generate(VoxelPos::new(x, top, z));
    for y in (0..top).rev() {
        let id = generator.generate(VoxelPos::new(x, y, z));
        if id != current {
            println!("  {:>4}..={:<4} {}", y + 1, top, name(current));
            top = y;
            current = id;
        }
    }
    println!("  {:>4}..={:<4} {}", 0, top, name(current));
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_level, cli.log_file.as_deref())?;
    match &cli.command {
        Command::Run {
            seed,
            world,
            view_distance,
            steps,
            fresh,
        } => {
            let args = RunArgs {
                seed: *seed,
                world: world.clone(),
                view_distance: *view_distance,
                steps: *steps,
                fresh: *fresh,
            };
            run(&cli, args)
        }
        Command::Inspect { x, z, seed } => inspect(&cli, *x, *z, *seed),
    }
}
