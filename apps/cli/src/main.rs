#![deny(warnings)]

//! Headless scenario runner: apply a build order, optionally train, tick.

use anyhow::{bail, Context, Result};
use sim_core::{BuildingKind, Intent};
use sim_runtime::Simulation;
use std::time::Duration;
use tracing::{info, warn, Level};
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
struct Args {
    preset: String,
    build: Vec<BuildingKind>,
    train: bool,
    seconds: u32,
    tick_ms: u64,
}

fn parse_args() -> Result<Args> {
    let mut args = Args {
        preset: "canonical".to_string(),
        build: Vec::new(),
        train: false,
        seconds: 60,
        tick_ms: 1000,
    };
    let mut it = std::env::args().skip(1);
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--preset" => args.preset = it.next().context("--preset needs a value")?,
            "--build" => {
                let list = it.next().context("--build needs a value")?;
                for key in list.split(',').filter(|k| !k.trim().is_empty()) {
                    args.build.push(key.parse()?);
                }
            }
            "--train" => args.train = true,
            "--seconds" => {
                args.seconds = it.next().context("--seconds needs a value")?.parse()?;
            }
            "--tick-ms" => {
                args.tick_ms = it.next().context("--tick-ms needs a value")?.parse()?;
            }
            other => bail!("unknown argument: {other}"),
        }
    }
    if args.tick_ms == 0 {
        bail!("--tick-ms must be > 0");
    }
    Ok(args)
}

/// Log intents; a blocking narrative pauses the session until the next tick.
fn present(sim: &mut Simulation) {
    for intent in sim.drain_intents() {
        match intent {
            Intent::ShowPopup(msg) => info!(%msg, "popup"),
            Intent::ShowNarrative { message, blocking } => {
                info!(%message, blocking, "narrative");
                if blocking {
                    sim.pause();
                }
            }
            Intent::PlaySound(cue) => tracing::debug!(?cue, "sound"),
            Intent::RevealVisual(kind) => tracing::debug!(%kind, "reveal"),
        }
    }
}

/// Run `ticks` unpaused ticks of `dt`. A paused tick resumes the session
/// and does not count. Returns the number of paused ticks.
fn run(sim: &mut Simulation, dt: Duration, ticks: u64) -> u64 {
    let mut done = 0;
    let mut blocked = 0;
    while done < ticks {
        let Ok(report) = sim.tick(dt) else {
            break;
        };
        if report.paused {
            info!("narrative acknowledged");
            sim.resume();
            blocked += 1;
        } else {
            done += 1;
        }
        present(sim);
    }
    blocked
}

fn main() -> Result<()> {
    // Logging setup
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_max_level(Level::INFO)
        .init();

    let args = parse_args()?;
    info!(version = env!("CARGO_PKG_VERSION"), ?args, "starting CLI");

    let preset = presets::resolve(&args.preset)?;
    let (config, catalog) = preset.build()?;
    let mut sim = Simulation::new(config, catalog)?;

    for kind in &args.build {
        if let Err(reason) = sim.purchase(*kind) {
            warn!(building = %kind, %reason, "build order step rejected");
        }
    }
    if args.train {
        if let Err(err) = sim.start_training_run() {
            warn!(%err, "training run not started");
        }
    }
    present(&mut sim);

    let dt = Duration::from_millis(args.tick_ms);
    let ticks = (u64::from(args.seconds) * 1000).div_ceil(args.tick_ms);
    let blocked = run(&mut sim, dt, ticks);
    info!(blocked, "run finished");

    let snap = sim.snapshot();
    println!(
        "Preset {} | elapsed: {:.1}s | budget: ${} | AI: {:.2} | computing: {} | net power: {} | heat: {} | game over: {}",
        preset.name,
        sim.elapsed().as_secs_f64(),
        snap.budget.round_dp(0),
        snap.ai_ability,
        snap.computing_power,
        snap.effective_net_electricity(),
        snap.heat_level,
        snap.game_over
    );
    println!("{}", serde_json::to_string_pretty(&snap)?);
    Ok(())
}
