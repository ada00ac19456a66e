use std::collections::BTreeMap;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use sim_core::{CombatEvent, FactionId, SystemId};
use sim_runtime::{RenderSnapshot, RunMode, Runtime, RuntimeSettings};
use tracing::info;
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "sim_cli", about = "Star system battle sim CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Drive the runtime headlessly for a fixed number of frames.
    Run {
        #[arg(long)]
        frames: u64,
        /// Wall-clock seconds per frame.
        #[arg(long, default_value_t = 1.0 / 60.0)]
        frame_dt: f32,
        /// World seed. Random when omitted.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        /// Logic ticks per logic step of wall time.
        #[arg(long, default_value_t = 1.0)]
        speed: f32,
        /// Record substep traces for this system index.
        #[arg(long)]
        observe: Option<u32>,
        /// Write the final render snapshot as JSON to this path.
        #[arg(long)]
        dump_snapshot: Option<String>,
        #[arg(long, default_value_t = 60)]
        print_every: u64,
        /// Wait for each scheduled tick before the next frame. Makes runs
        /// reproducible at the cost of real-time pacing.
        #[arg(long)]
        lockstep: bool,
    },
}

struct RunArgs {
    frames: u64,
    frame_dt: f32,
    seed: u64,
    content_dir: String,
    settings: RuntimeSettings,
    dump_snapshot: Option<String>,
    print_every: u64,
    lockstep: bool,
}

// ---------------------------------------------------------------------------
// Run loop
// ---------------------------------------------------------------------------

/// Per-run combat totals.
#[derive(Default)]
struct Tally {
    shots: u64,
    damage: f64,
    kills: u64,
}

impl Tally {
    fn record(&mut self, events: &[CombatEvent]) {
        for event in events {
            self.shots += u64::from(event.shots_fired);
            self.damage += f64::from(event.damage);
            if event.target_destroyed {
                self.kills += 1;
            }
        }
    }
}

fn run(args: &RunArgs) -> Result<()> {
    if !(args.frame_dt.is_finite() && args.frame_dt > 0.0) {
        bail!("--frame-dt must be positive, got {}", args.frame_dt);
    }
    let mut runtime = Runtime::load(&args.content_dir, args.seed, args.settings)?;
    let systems = runtime.logic_snapshot().systems.len();

    println!(
        "Starting simulation: frames={} frame_dt={:.4} seed={} systems={systems} speed={}",
        args.frames, args.frame_dt, args.seed, args.settings.speed_multiplier,
    );
    println!("{}", "-".repeat(80));

    let mut tally = Tally::default();
    for frame in 1..=args.frames {
        let report = runtime.tick(args.frame_dt)?;
        if args.lockstep && report.scheduled && !runtime.wait_idle(Duration::from_secs(10)) {
            bail!("simulation thread did not finish a tick within 10s");
        }
        tally.record(&runtime.drain_combat_events());

        if frame % args.print_every == 0 {
            print_status(frame, runtime.logic_snapshot().tick, runtime.render_snapshot(), &tally);
        }
    }

    println!("{}", "-".repeat(80));
    let tick = runtime.logic_snapshot().tick;
    println!("Done after {} frames, tick {tick}:", args.frames);
    print_status(args.frames, tick, runtime.render_snapshot(), &tally);

    if let Some(path) = &args.dump_snapshot {
        write_snapshot(path, runtime.render_snapshot())?;
        println!("Render snapshot written to {path}");
    }

    let report = runtime.shutdown();
    info!(ticks = report.ticks_collected, "run finished");
    Ok(())
}

fn print_status(frame: u64, tick: u64, render: &RenderSnapshot, tally: &Tally) {
    let mut per_faction: BTreeMap<FactionId, usize> = BTreeMap::new();
    let mut per_system: BTreeMap<SystemId, usize> = BTreeMap::new();
    for ship in &render.ships {
        *per_faction.entry(ship.faction).or_default() += 1;
        *per_system.entry(ship.system).or_default() += 1;
    }
    let factions = per_faction
        .iter()
        .map(|(faction, n)| format!("f{faction}={n}"))
        .collect::<Vec<_>>()
        .join(" ");
    let systems = per_system
        .iter()
        .map(|(system, n)| format!("s{system}={n}"))
        .collect::<Vec<_>>()
        .join(" ");

    println!(
        "[frame={frame:05}  tick={tick:04}]  ships={ships:3}  [{factions}]  [{systems}]  \
         shots={shots}  damage={damage:.1}  kills={kills}",
        ships = render.ships.len(),
        shots = tally.shots,
        damage = tally.damage,
        kills = tally.kills,
    );
}

fn write_snapshot(path: &str, snapshot: &RenderSnapshot) -> Result<()> {
    let file = std::fs::File::create(path).with_context(|| format!("creating {path}"))?;
    serde_json::to_writer_pretty(file, snapshot).with_context(|| format!("writing {path}"))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Run {
            frames,
            frame_dt,
            seed,
            content_dir,
            speed,
            observe,
            dump_snapshot,
            print_every,
            lockstep,
        } => {
            let args = RunArgs {
                frames,
                frame_dt,
                seed: seed.unwrap_or_else(rand::random),
                content_dir,
                settings: RuntimeSettings {
                    run_mode: RunMode::Auto,
                    speed_multiplier: speed,
                    observed_system: observe.map(SystemId),
                },
                dump_snapshot,
                print_every: print_every.max(1),
                lockstep,
            };
            run(&args)?;
        }
    }
    Ok(())
}
