//! Lurk
//!
//! Runs a scripted player through a level against the Overseer and writes
//! periodic snapshots of its decision state.

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use lurk_sim::{Level, RunConfig, Runner, Scenario, SimError, SnapshotWriter};
use overseer::{default_config_toml, OverseerConfig};

/// Command line arguments for the runner
#[derive(Parser, Debug)]
#[command(name = "lurk")]
#[command(about = "Headless runner for the stealth pursuer Overseer")]
struct Args {
    /// Level file (TOML); the built-in demo level if omitted
    #[arg(long)]
    level: Option<PathBuf>,

    /// Scenario file (TOML); the built-in demo scenario if omitted
    #[arg(long)]
    scenario: Option<PathBuf>,

    /// Overseer tuning file (TOML); defaults if omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Random seed for reproducibility
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Seconds to simulate; the scenario's duration if omitted
    #[arg(long)]
    duration: Option<f32>,

    /// Tick length in seconds
    #[arg(long, default_value_t = 0.1)]
    dt: f32,

    /// Seconds between snapshots
    #[arg(long, default_value_t = 1.0)]
    snapshot_interval: f32,

    /// Snapshot log (JSONL); nothing is written if omitted
    #[arg(long)]
    output: Option<PathBuf>,

    /// Print the default Overseer config and exit
    #[arg(long)]
    print_default_config: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    if args.print_default_config {
        print!("{}", default_config_toml());
        return;
    }

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// `RUST_LOG` directives when given and valid, INFO otherwise.
fn log_filter(directives: Option<&str>) -> EnvFilter {
    directives
        .and_then(|d| EnvFilter::try_new(d).ok())
        .unwrap_or_else(|| EnvFilter::new("info"))
}

fn run(args: Args) -> Result<(), SimError> {
    let level = match &args.level {
        Some(path) => Level::from_file(path)?,
        None => Level::demo()?,
    };
    let scenario = match &args.scenario {
        Some(path) => Scenario::from_file(path)?,
        None => Scenario::demo()?,
    };
    let config = match &args.config {
        Some(path) => OverseerConfig::from_file(path)?,
        None => OverseerConfig::default(),
    };

    let run_config = RunConfig {
        duration_secs: args.duration.unwrap_or(scenario.duration_secs),
        dt: args.dt,
        snapshot_interval_secs: args.snapshot_interval,
    };

    println!("Lurk");
    println!("====");
    println!("Level: {} ({} zones)", level.name, level.zones.len());
    println!("Scenario: {}", scenario.name);
    println!("Seed: {}", args.seed);
    println!("Duration: {}s at dt={}", run_config.duration_secs, run_config.dt);
    println!();

    let mut writer = match &args.output {
        Some(path) => SnapshotWriter::new(path)?,
        None => SnapshotWriter::null(),
    };

    let mut runner = Runner::new(&level, scenario, config, args.seed)?;
    let summary = runner.run(&run_config, &mut writer)?;

    println!("Run complete");
    println!("  Ticks: {}", summary.ticks);
    println!("  Jobs issued: {}", summary.jobs_issued);
    println!("  Chases: {}", summary.chases);
    println!("  Searches cleared: {}", summary.searches_cleared);
    println!("  Rests: {}", summary.rests);
    println!("  Sightings: {}", summary.sightings);
    println!("  Camera detections: {}", summary.camera_detections);
    println!("  Final tension: {:.1}", summary.final_tension);
    if let Some(zone) = summary.hottest_zone {
        println!("  Hottest zone: {}", zone);
    }
    println!("  Time in state:");
    for (state, secs) in &summary.time_in_state {
        println!("    {:<12} {:>7.1}s", state, secs);
    }
    if let Some(path) = &args.output {
        println!(
            "  Wrote {} snapshots to {}",
            summary.snapshots_written,
            path.display()
        );
    }

    Ok(())
}
