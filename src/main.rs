use std::{
    error::Error,
    path::PathBuf,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use clap::Parser;
use dashmap::DashMap;
use serde::Serialize;
use tracing::{debug, info, warn};

use traffic_light::{logging, CyclerConfig, Phase, PhaseCycler, RecvError};

/// Runs a traffic light for a while and lets vehicle threads cross on green
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// JSON file with cycler settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Shortest phase length in seconds
    #[arg(long)]
    min_cycle: Option<f64>,

    /// Longest phase length in seconds
    #[arg(long)]
    max_cycle: Option<f64>,

    /// Seed for the phase length generator
    #[arg(long)]
    seed: Option<u64>,

    /// Number of vehicle threads (defaults to the number of CPUs)
    #[arg(long)]
    vehicles: Option<usize>,

    /// How long the simulation runs
    #[arg(long, default_value_t = 20.0)]
    run_seconds: f64,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Log as newline-delimited JSON
    #[arg(long)]
    json_logs: bool,
}

#[derive(Debug, Serialize)]
struct Report {
    run_seconds: f64,
    final_phase: Phase,
    total_crossings: usize,
    crossings: Vec<VehicleReport>,
}

#[derive(Debug, Serialize)]
struct VehicleReport {
    vehicle: usize,
    crossings: usize,
}

fn load_config(args: &Args) -> Result<CyclerConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => CyclerConfig::from_json_file(path)?,
        None => CyclerConfig::default(),
    };
    if let Some(min_cycle) = args.min_cycle {
        config.min_cycle_seconds = min_cycle;
    }
    if let Some(max_cycle) = args.max_cycle {
        config.max_cycle_seconds = max_cycle;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    Ok(config)
}

/// Waits for green until the light is shut down, counting every crossing
fn drive(id: usize, light: Arc<PhaseCycler>, crossings: Arc<DashMap<usize, usize>>) {
    loop {
        match light.wait_for_phase_timeout(Phase::Green, Duration::from_secs(1)) {
            Ok(()) => {
                *crossings.entry(id).or_insert(0) += 1;
                debug!(vehicle = id, "crossed on green");
            }
            Err(RecvError::Timeout) => continue,
            Err(RecvError::Closed | RecvError::Empty) => break,
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    logging::init_logging(args.verbose, args.json_logs);

    let config = load_config(&args)?;
    let run_time = Duration::try_from_secs_f64(args.run_seconds)?;
    let vehicle_count = args.vehicles.unwrap_or_else(num_cpus::get);

    let light = Arc::new(PhaseCycler::with_config(config)?);
    let crossings = Arc::new(DashMap::new());
    light.simulate()?;

    let vehicles = (0..vehicle_count)
        .map(|id| {
            let light = light.clone();
            let crossings = crossings.clone();
            thread::Builder::new()
                .name(format!("vehicle{}", id))
                .spawn(move || drive(id, light, crossings))
        })
        .collect::<Result<Vec<_>, _>>()?;
    info!(vehicles = vehicle_count, "vehicles waiting at the intersection");

    let start = Instant::now();
    thread::sleep(run_time);
    light.shutdown();

    for vehicle in vehicles {
        if let Err(e) = vehicle.join() {
            warn!("Couldn't join a vehicle thread: {:?}", e);
        }
    }

    let per_vehicle: Vec<VehicleReport> = (0..vehicle_count)
        .map(|vehicle| VehicleReport {
            vehicle,
            crossings: crossings.get(&vehicle).map_or(0, |count| *count),
        })
        .collect();

    let report = Report {
        run_seconds: start.elapsed().as_secs_f64(),
        final_phase: light.current_phase(),
        total_crossings: per_vehicle.iter().map(|report| report.crossings).sum(),
        crossings: per_vehicle,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
