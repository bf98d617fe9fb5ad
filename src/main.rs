//! Demo driver: sample an RSSI lattice for every access point in a scenario
//! and write it out as CSV for downstream plotting or model training.

use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use env_logger::Builder;
use log::{LevelFilter, info};
use serde::Serialize;

use wifi_signal_simulator::Point;
use wifi_signal_simulator::propagation::PropagationModel;
use wifi_signal_simulator::scenario::load_scenario;

#[derive(Parser)]
#[command(about = "Simulate indoor WiFi signal strength for a building scenario")]
struct Cli {
    /// Path to the scenario JSON file
    scenario: PathBuf,

    /// Sample lattice spacing in meters
    #[arg(long, default_value_t = 0.5)]
    step: f64,

    /// Output CSV path (stdout when omitted)
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Serialize)]
struct SampleRow<'a> {
    ap: &'a str,
    x: f64,
    y: f64,
    rssi_dbm: f64,
}

fn main() -> anyhow::Result<()> {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .filter(Some("wifi_signal_simulator"), LevelFilter::Debug)
        .init();

    let cli = Cli::parse();
    if !(cli.step > 0.0) {
        anyhow::bail!("--step must be positive, got {}", cli.step);
    }

    let scenario = load_scenario(&cli.scenario)
        .with_context(|| format!("Failed to load scenario {}", cli.scenario.display()))?;
    info!(
        "Loaded scenario: {} x {} m, {} access point(s), {} wall(s)",
        scenario.width,
        scenario.height,
        scenario.access_points.len(),
        scenario.walls.len()
    );

    let grid = scenario.build_grid()?;
    let model = PropagationModel::new(scenario.propagation.clone())?;
    let points = lattice(scenario.width, scenario.height, cli.step);
    info!("Sampling {} points per access point", points.len());

    let writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(
            File::create(path).with_context(|| format!("Failed to create {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout().lock()),
    };
    let mut csv_writer = csv::Writer::from_writer(writer);

    let mut rng = rand::thread_rng();
    for ap in &scenario.access_points {
        let samples = model.collect_samples(&points, ap.position, Some(&grid), &mut rng)?;

        let min = samples.iter().cloned().fold(f64::INFINITY, f64::min);
        let max = samples.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        info!(
            "AP '{}': RSSI min {:.1} dBm, mean {:.1} dBm, max {:.1} dBm",
            ap.name, min, mean, max
        );

        for (point, rssi_dbm) in points.iter().zip(&samples) {
            csv_writer.serialize(SampleRow {
                ap: &ap.name,
                x: point.x,
                y: point.y,
                rssi_dbm: *rssi_dbm,
            })?;
        }
    }
    csv_writer.flush()?;

    Ok(())
}

/// Regular sample lattice covering the building extent, row by row.
fn lattice(width: f64, height: f64, step: f64) -> Vec<Point> {
    let cols = (width / step).floor() as usize + 1;
    let rows = (height / step).floor() as usize + 1;
    let mut points = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            points.push(Point::new(col as f64 * step, row as f64 * step));
        }
    }
    points
}
