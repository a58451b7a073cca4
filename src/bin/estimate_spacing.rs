use serde::Serialize;
use std::env;
use std::path::Path;
use z_spacing::config::load_config;
use z_spacing::diagnostics::{EstimationTrace, IterationSnapshot};
use z_spacing::io::write_json_file;
use z_spacing::matrix::MatrixView;
use z_spacing::observer::SnapshotCollector;
use z_spacing::CoordinateEstimator;

fn main() {
    if let Err(err) = run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let config_path = env::args().nth(1).ok_or_else(usage)?;
    let config = load_config(Path::new(&config_path))?;

    let matrix = config.matrix.load()?;
    let start = config.starting_coordinates(matrix.size())?;

    let estimator = CoordinateEstimator::new(config.estimator);
    let mut collector = SnapshotCollector::new();
    let report = estimator
        .run(&matrix, &start, &mut collector)
        .map_err(|e| format!("Estimation failed ({} stage): {e}", e.stage()))?;

    let summary = SpacingReport {
        thickness: report
            .coordinates
            .windows(2)
            .map(|w| w[1] - w[0])
            .collect(),
        coordinates: report.coordinates,
        trace: report.trace,
    };
    write_json_file(&config.output.report_json, &summary)?;
    println!(
        "Saved coordinates of {} slices to {} ({:.1} ms)",
        summary.coordinates.len(),
        config.output.report_json.display(),
        summary.trace.timings.total_ms
    );

    if let Some(path) = &config.output.snapshots_json {
        let snapshots: Vec<IterationSnapshot> = collector.into_snapshots();
        write_json_file(path, &snapshots)?;
        println!(
            "Saved {} iteration snapshots to {}",
            snapshots.len(),
            path.display()
        );
    }

    Ok(())
}

fn usage() -> String {
    "Usage: estimate_spacing <config.json>".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpacingReport {
    coordinates: Vec<f64>,
    /// Differences between consecutive slice coordinates.
    thickness: Vec<f64>,
    trace: EstimationTrace,
}
