use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use glam::Vec3;
use lantern::config::MachineConfig;
use lantern::sim::{InputScript, SimConfig, Simulation};
use tracing_subscriber::EnvFilter;

const WALKTHROUGH: &str = include_str!("../demos/walkthrough.json");

#[derive(Parser)]
#[command(name = "lantern", about = "Replay scripted input against character state machines")]
struct Args {
    /// Input script (JSON). Defaults to the bundled walkthrough.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Machine tunables (JSON). Missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of characters to spawn, lined up along X.
    #[arg(long, default_value_t = 1)]
    characters: usize,

    /// Frames to simulate. Defaults to one second past the last scripted event.
    #[arg(long)]
    frames: Option<u64>,

    /// Fixed frame time in seconds.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f32,

    /// Seconds an unchained swing lasts.
    #[arg(long, default_value_t = 0.6)]
    attack_duration: f32,

    /// Log every transition and action change.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    setup_logging(args.verbose);

    let machine_config = match &args.config {
        Some(path) => MachineConfig::from_path(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => MachineConfig::default(),
    };

    let script = match &args.script {
        Some(path) => InputScript::from_path(path)
            .with_context(|| format!("loading script {}", path.display()))?,
        None => InputScript::from_json(WALKTHROUGH).context("parsing bundled walkthrough")?,
    };
    script.check_characters(args.characters)?;

    let sim_config = SimConfig {
        dt: args.dt,
        attack_duration: args.attack_duration,
        ..SimConfig::default()
    };
    sim_config.validate().context("invalid simulation settings")?;
    let mut sim = Simulation::new(sim_config, machine_config);
    for i in 0..args.characters {
        sim.spawn_character(format!("character-{i}"), Vec3::new(i as f32 * 300.0, 0.0, 0.0));
    }

    let frames = args.frames.unwrap_or_else(|| {
        let tail = (1.0 / sim_config.dt).ceil() as u64;
        script.last_frame().unwrap_or(0).saturating_add(tail)
    });
    tracing::info!(frames, characters = args.characters, "running simulation");
    sim.run(&script, frames);

    for report in sim.report() {
        println!(
            "{:<14} {:<10} actions={:?} pos=({:.1}, {:.1}, {:.1}) health={} transitions={}",
            report.name,
            report.state,
            report.actions,
            report.position.x,
            report.position.y,
            report.position.z,
            report.health,
            report.transitions,
        );
    }
    Ok(())
}

fn setup_logging(verbose: bool) {
    let default = if verbose { "lantern=trace" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
