use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use parking_simulator_core_rs::garage::ParkingGarage;
use parking_simulator_core_rs::ledger::Finances;
use parking_simulator_core_rs::{
    config_fingerprint, ImmediatePacer, Pacer, ReferenceEngine, RunTotals, ScenarioConfig,
    SchedulerState, TickResult, TickScheduler, TimeSeries, WallClockPacer,
};
use serde_json::json;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// How often the output loop checks whether the run has stopped
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// One simulated week
const DEFAULT_TICKS: u64 = 7 * 24 * 60;

/// Parking garage traffic simulator
#[derive(Parser)]
#[command(name = "parking-sim")]
#[command(about = "Tick-based parking garage traffic simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulation, writing one JSON line per tick and a summary line
    Run {
        /// Scenario file (JSON); anything it leaves out takes the default
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Ticks (simulated minutes) to run
        #[arg(short, long, default_value_t = DEFAULT_TICKS)]
        ticks: u64,

        /// Override the scenario's RNG seed
        #[arg(short, long)]
        seed: Option<u64>,

        /// Wall-clock pause between ticks; 0 runs as fast as possible
        #[arg(long, default_value_t = 0)]
        pace_ms: u64,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the default scenario as JSON
    DefaultConfig,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            ticks,
            seed,
            pace_ms,
            output,
        } => run(config.as_deref(), ticks, seed, pace_ms, output.as_deref()),
        Commands::DefaultConfig => {
            println!("{}", serde_json::to_string_pretty(&ScenarioConfig::default())?);
            Ok(())
        }
    }
}

fn load_scenario(path: Option<&Path>, seed: Option<u64>) -> Result<ScenarioConfig> {
    let mut scenario = match path {
        Some(path) => {
            let json = fs::read_to_string(path)
                .with_context(|| format!("failed to read scenario {}", path.display()))?;
            ScenarioConfig::from_json(&json)
                .with_context(|| format!("failed to parse scenario {}", path.display()))?
        }
        None => ScenarioConfig::default(),
    };

    if let Some(seed) = seed {
        scenario.simulation.rng_seed = seed;
    }
    scenario.validate()?;
    Ok(scenario)
}

fn run(
    config: Option<&Path>,
    ticks: u64,
    seed: Option<u64>,
    pace_ms: u64,
    output: Option<&Path>,
) -> Result<()> {
    let scenario = load_scenario(config, seed)?;
    info!(
        ticks,
        seed = scenario.simulation.rng_seed,
        config_hash = %config_fingerprint(&scenario)?,
        "starting simulation"
    );

    let mut engine = ReferenceEngine::from_scenario(scenario)?;
    let rx = engine.subscribe_channel();

    let mut out: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let interval = Duration::from_millis(pace_ms);
    let (series, totals) = if pace_ms == 0 {
        drive(TickScheduler::with_pacer(engine, ImmediatePacer), ticks, interval, &rx, &mut out)?
    } else {
        drive(TickScheduler::with_pacer(engine, WallClockPacer), ticks, interval, &rx, &mut out)?
    };

    let summary = json!({
        "summary": {
            "ticks": totals.ticks,
            "arrivals": totals.arrivals,
            "cars_served": totals.departed,
            "turned_away": totals.turned_away,
            "settled_standard": totals.settled_standard,
            "settled_subscriber": totals.settled_subscriber,
            "total_revenue_cents": totals.revenue_cents,
            "daily_revenue_cents": series.daily_revenue(),
            "peak_occupied": series.peak_occupied(),
            "mean_occupancy": series.mean_occupancy(),
            "peak_entrance_queue": series.peak_entrance_queue(),
        }
    });
    writeln!(out, "{}", summary)?;
    out.flush()?;

    info!(
        ticks = totals.ticks,
        cars_served = totals.departed,
        turned_away = totals.turned_away,
        revenue_cents = totals.revenue_cents,
        "simulation finished"
    );
    Ok(())
}

/// Run the scheduler to completion, streaming every tick to `out`
fn drive<P: Pacer>(
    mut scheduler: TickScheduler<ParkingGarage, Finances, P>,
    ticks: u64,
    interval: Duration,
    rx: &Receiver<TickResult>,
    out: &mut dyn Write,
) -> Result<(TimeSeries, RunTotals)> {
    let mut series = TimeSeries::new();
    scheduler.start(ticks, interval)?;

    loop {
        match rx.recv_timeout(POLL_INTERVAL) {
            Ok(result) => write_tick(out, &mut series, &result)?,
            Err(RecvTimeoutError::Timeout) => {
                if scheduler.state() == SchedulerState::Stopped {
                    break;
                }
            }
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    scheduler
        .wait()
        .context("simulation stopped before completing")?;
    for result in rx.try_iter() {
        write_tick(out, &mut series, &result)?;
    }

    let totals = scheduler.engine().lock().totals().clone();
    Ok((series, totals))
}

fn write_tick(out: &mut dyn Write, series: &mut TimeSeries, result: &TickResult) -> Result<()> {
    writeln!(out, "{}", serde_json::to_string(result)?)?;
    series.record(result);
    Ok(())
}
